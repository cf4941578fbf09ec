// crates/geonames-core/src/loader/mod.rs

//! # Data Loader
//!
//! Handles the physical layer: locating column bytes on disk or in memory,
//! decompressing bundles, and decoding fixed-stride records (see [`packed`]).

use crate::error::{GeoError, Result};
use crate::traits::ColumnSource;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod common_io;
pub mod packed;

#[cfg(feature = "builder")]
pub mod builder;

/// Upper bound for a deserialized bundle; the full world dataset is far below.
const BUNDLE_SIZE_LIMIT: u64 = 256 * 1024 * 1024;

/// Every column the gazetteer knows how to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    CityData,
    CityNames,
    NameIndices,
    Regions,
    RegionDescs,
    CountryNames,
    CountryCodes,
    Admin1Names,
    Admin2Names,
    Admin1Codes,
    TzIndices,
    TzNames,
    TzNamesChecksum,
}

impl ColumnKind {
    pub const ALL: [ColumnKind; 13] = [
        ColumnKind::CityData,
        ColumnKind::CityNames,
        ColumnKind::NameIndices,
        ColumnKind::Regions,
        ColumnKind::RegionDescs,
        ColumnKind::CountryNames,
        ColumnKind::CountryCodes,
        ColumnKind::Admin1Names,
        ColumnKind::Admin2Names,
        ColumnKind::Admin1Codes,
        ColumnKind::TzIndices,
        ColumnKind::TzNames,
        ColumnKind::TzNamesChecksum,
    ];

    /// File name of the column inside a dataset directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            ColumnKind::CityData => "loc-data.dat",
            ColumnKind::CityNames => "loc-names.dat",
            ColumnKind::NameIndices => "loc-index.dat",
            ColumnKind::Regions => "loc-region.dat",
            ColumnKind::RegionDescs => "loc-regiondesc.dat",
            ColumnKind::CountryNames => "loc-cc.dat",
            ColumnKind::CountryCodes => "loc-ccCodes.dat",
            ColumnKind::Admin1Names => "loc-a1.dat",
            ColumnKind::Admin2Names => "loc-a2.dat",
            ColumnKind::Admin1Codes => "loc-a1Codes.dat",
            ColumnKind::TzIndices => "loc-tz.dat",
            ColumnKind::TzNames => "loc-tzNames.dat",
            ColumnKind::TzNamesChecksum => "loc-tzNames.sum",
        }
    }

    /// True for columns holding exactly one element per city.
    pub fn is_per_city(&self) -> bool {
        matches!(
            self,
            ColumnKind::CityData
                | ColumnKind::NameIndices
                | ColumnKind::Regions
                | ColumnKind::TzIndices
        )
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

// -----------------------------------------------------------------------------
// COLUMN SET
// -----------------------------------------------------------------------------

/// Raw bytes of a full dataset, keyed by column. This is also the on-disk
/// bundle format (bincode).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSet {
    pub columns: BTreeMap<ColumnKind, Vec<u8>>,
}

impl ColumnSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: ColumnKind, bytes: Vec<u8>) {
        self.columns.insert(kind, bytes);
    }

    pub fn get(&self, kind: ColumnKind) -> Option<&[u8]> {
        self.columns.get(&kind).map(Vec::as_slice)
    }

    /// Reads a bincode bundle, gunzipping it when the path ends in `.gz`.
    pub fn read_bundle(path: &Path) -> Result<Self> {
        let mut reader = common_io::open_stream(path)?;
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).map_err(GeoError::Io)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        use bincode::Options;
        bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .allow_trailing_bytes()
            .with_limit(BUNDLE_SIZE_LIMIT)
            .deserialize(bytes)
            .map_err(GeoError::Bincode)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        use bincode::Options;
        bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .serialize(self)
            .map_err(GeoError::Bincode)
    }
}

fn missing(kind: ColumnKind, origin: &str) -> GeoError {
    GeoError::NotFound(format!("Column {kind} not present in {origin}"))
}

// -----------------------------------------------------------------------------
// SOURCES
// -----------------------------------------------------------------------------

/// Columns held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    set: ColumnSet,
}

impl MemorySource {
    pub fn new(set: ColumnSet) -> Self {
        Self { set }
    }
}

impl From<ColumnSet> for MemorySource {
    fn from(set: ColumnSet) -> Self {
        Self::new(set)
    }
}

impl ColumnSource for MemorySource {
    fn read_column(&self, kind: ColumnKind) -> Result<Vec<u8>> {
        self.set
            .get(kind)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| missing(kind, "memory"))
    }

    fn describe(&self) -> String {
        format!("memory ({} columns)", self.set.columns.len())
    }
}

/// One file per column under a dataset directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, kind: ColumnKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }
}

impl ColumnSource for DirectorySource {
    fn read_column(&self, kind: ColumnKind) -> Result<Vec<u8>> {
        let path = self.path_for(kind);
        debug!(path = %path.display(), "reading column file");
        std::fs::read(&path).map_err(|e| {
            GeoError::NotFound(format!("Column file not found at {}: {}", path.display(), e))
        })
    }

    fn describe(&self) -> String {
        format!("directory {}", self.dir.display())
    }
}

/// A single bundle file, read on the first column request.
#[derive(Debug)]
pub struct BundleSource {
    path: PathBuf,
    set: OnceCell<ColumnSet>,
}

impl BundleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            set: OnceCell::new(),
        }
    }

    fn columns(&self) -> Result<&ColumnSet> {
        self.set.get_or_try_init(|| ColumnSet::read_bundle(&self.path))
    }
}

impl ColumnSource for BundleSource {
    fn read_column(&self, kind: ColumnKind) -> Result<Vec<u8>> {
        self.columns()?
            .get(kind)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| missing(kind, &self.path.display().to_string()))
    }

    fn describe(&self) -> String {
        format!("bundle {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_unique() {
        let mut names: Vec<_> = ColumnKind::ALL.iter().map(|k| k.file_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ColumnKind::ALL.len());
    }

    #[test]
    fn memory_source_reports_missing_column() {
        let mut set = ColumnSet::new();
        set.insert(ColumnKind::TzNames, b"UTC\0".to_vec());
        let source = MemorySource::new(set);
        assert_eq!(source.read_column(ColumnKind::TzNames).unwrap(), b"UTC\0");
        assert!(matches!(
            source.read_column(ColumnKind::CityData),
            Err(GeoError::NotFound(_))
        ));
    }

    #[test]
    fn column_set_bytes_survive_bincode() {
        let mut set = ColumnSet::new();
        set.insert(ColumnKind::Regions, vec![1, 0, 2, 0]);
        let back = ColumnSet::from_bytes(&set.to_bytes().unwrap()).unwrap();
        assert_eq!(back, set);
    }
}
