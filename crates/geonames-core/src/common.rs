// crates/geonames-core/src/common.rs
use serde::{Deserialize, Serialize};

/// Simple aggregate statistics for a loaded gazetteer.
///
/// Returned by [`crate::GazetteerStore::stats`]; computing them loads the
/// city, region and timezone columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbStats {
    pub cities: usize,
    pub regions: usize,
    pub countries: usize,
    pub admin1: usize,
    pub timezones: usize,
    pub tz_names_checksum: u32,
}
