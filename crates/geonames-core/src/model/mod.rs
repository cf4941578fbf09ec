// crates/geonames-core/src/model/mod.rs
pub mod timezone;

pub use timezone::{SlotInclusionClass, TimezoneEntry};

use serde::{Deserialize, Serialize};

/// Fixed-stride per-city record: population and position.
///
/// Layout on disk is `{u32 population; f32 latitude; f32 longitude}`, 12 bytes,
/// native byte order, no padding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CityData {
    pub population: u32,
    pub latitude: f32,
    pub longitude: f32,
}

/// One unique (country, admin1, admin2) combination shared by many cities.
///
/// `-1` in any field means the level is not present for this region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionDesc {
    pub country: i16,
    pub admin1: i16,
    pub admin2: i16,
}

impl RegionDesc {
    pub fn country_index(&self) -> Option<usize> {
        usize::try_from(self.country).ok()
    }

    pub fn admin1_index(&self) -> Option<usize> {
        usize::try_from(self.admin1).ok()
    }

    pub fn admin2_index(&self) -> Option<usize> {
        usize::try_from(self.admin2).ok()
    }
}

/// A point on the globe, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Everything a client needs to show a selected city, including the one or
/// two world-clock slots it occupies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityInfo {
    pub index: usize,
    pub name: String,
    pub region_name: String,
    pub country_code: String,
    pub tz_name: String,
    pub latitude: f32,
    pub longitude: f32,
    pub population: u32,
    /// Slot hour (0..24) the city belongs to, if any.
    pub primary_slot: Option<u8>,
    /// Neighbouring slot for cities that straddle a boundary.
    pub secondary_slot: Option<u8>,
}
