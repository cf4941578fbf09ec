// crates/geonames-core/src/config.rs
//! Where the dataset lives and which position proximity searches start from.

use crate::calendar::Environment;
use crate::error::{GeoError, Result};
use crate::loader::{BundleSource, DirectorySource};
use crate::model::Coordinates;
use crate::traits::ColumnSource;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const ENV_DATA_DIR: &str = "GEONAMES_DATA_DIR";
pub const ENV_BUNDLE: &str = "GEONAMES_BUNDLE";
pub const ENV_LATITUDE: &str = "GEONAMES_LATITUDE";
pub const ENV_LONGITUDE: &str = "GEONAMES_LONGITUDE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GazetteerConfig {
    /// Directory holding one file per packed column.
    pub data_dir: PathBuf,
    /// Single-file dataset; takes precedence over `data_dir` when set.
    pub bundle: Option<PathBuf>,
    /// Default centre for proximity-ranked searches.
    pub device_location: Coordinates,
}

impl Default for GazetteerConfig {
    fn default() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
            bundle: None,
            device_location: Coordinates::default(),
        }
    }
}

impl GazetteerConfig {
    pub fn default_data_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("data")
            .join("eslocation")
    }

    /// Defaults overridden by the `GEONAMES_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(bundle) = lookup(ENV_BUNDLE).filter(|v| !v.is_empty()) {
            config.bundle = Some(PathBuf::from(bundle));
        }
        if let Some(lat) = lookup(ENV_LATITUDE) {
            config.device_location.latitude = parse_degrees(ENV_LATITUDE, &lat, 90.0)?;
        }
        if let Some(lon) = lookup(ENV_LONGITUDE) {
            config.device_location.longitude = parse_degrees(ENV_LONGITUDE, &lon, 180.0)?;
        }
        Ok(config)
    }

    /// Reads a JSON config file; missing fields keep their defaults.
    #[cfg(feature = "json")]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let reader = crate::loader::common_io::open_stream(path.as_ref())?;
        serde_json::from_reader(reader).map_err(GeoError::Json)
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self.bundle = None;
        self
    }

    pub fn with_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.bundle = Some(path.into());
        self
    }

    pub fn with_device_location(mut self, at: Coordinates) -> Self {
        self.device_location = at;
        self
    }

    /// The column source this config points at.
    pub fn source(&self) -> Arc<dyn ColumnSource> {
        match &self.bundle {
            Some(bundle) => Arc::new(BundleSource::new(bundle)),
            None => Arc::new(DirectorySource::new(&self.data_dir)),
        }
    }

    /// System calendar and clock, positioned at `device_location`.
    pub fn environment(&self) -> Environment {
        Environment::system(self.device_location)
    }

    pub fn dataset_path(&self) -> &Path {
        self.bundle.as_deref().unwrap_or(&self.data_dir)
    }
}

fn parse_degrees(key: &str, value: &str, limit: f64) -> Result<f64> {
    let degrees: f64 = value
        .trim()
        .parse()
        .map_err(|_| GeoError::Config(format!("{key}={value:?} is not a number")))?;
    if !degrees.is_finite() || degrees.abs() > limit {
        return Err(GeoError::Config(format!(
            "{key}={degrees} is outside ±{limit}"
        )));
    }
    Ok(degrees)
}
