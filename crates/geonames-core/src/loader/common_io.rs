// crates/geonames-core/src/loader/common_io.rs
use crate::error::{GeoError, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

#[cfg(feature = "compact")]
use flate2::read::GzDecoder;

/// True when the file name ends in `.gz`.
pub fn is_gzip_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Opens a file for reading, transparently gunzipping `.gz` files.
pub fn open_stream(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|e| {
        GeoError::NotFound(format!("Dataset not found at {}: {}", path.display(), e))
    })?;

    let reader = BufReader::new(file);

    if is_gzip_path(path) {
        #[cfg(feature = "compact")]
        {
            return Ok(Box::new(GzDecoder::new(reader)));
        }
        #[cfg(not(feature = "compact"))]
        {
            return Err(GeoError::InvalidData(format!(
                "{} is gzip-compressed but 'compact' is disabled",
                path.display()
            )));
        }
    }

    Ok(Box::new(reader))
}

/// Creates (or truncates) a buffered writer at `path`.
pub fn create_stream(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(GeoError::Io)?;
        }
    }
    let file = File::create(path).map_err(GeoError::Io)?;
    Ok(BufWriter::new(file))
}

/// Writes `bytes` to `path` in one go.
pub fn write_all(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut writer = create_stream(path)?;
    writer.write_all(bytes).map_err(GeoError::Io)?;
    writer.flush().map_err(GeoError::Io)
}
