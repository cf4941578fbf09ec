// crates/geonames-core/src/diagnostics.rs

//! Offline checks of a packaged dataset: every timezone name should resolve
//! and map to a city, and cities should sit roughly under their zone.

use crate::error::Result;
use crate::search::{SearchEngine, TimezoneTier};
use crate::store::GazetteerStore;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Longitude slack used by [`find_wacky_zones`] when callers have no opinion.
pub const DEFAULT_WACKY_THRESHOLD_DEGREES: f64 = 25.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimezoneReport {
    pub tz_index: usize,
    pub name: String,
    /// The calendar knows the zone.
    pub resolved: bool,
    pub std_offset: Option<i16>,
    pub dst_offset: Option<i16>,
    pub city_index: Option<usize>,
    pub city_name: Option<String>,
    pub tier: Option<TimezoneTier>,
}

impl TimezoneReport {
    pub fn is_problem(&self) -> bool {
        !self.resolved || self.city_index.is_none()
    }
}

/// Resolves every packaged timezone name and reports which city represents it.
pub fn validate_timezone_names(store: &GazetteerStore) -> Result<Vec<TimezoneReport>> {
    let engine = SearchEngine::new(store);
    let names = store.tz_names()?;
    let cache = store.timezones()?;

    let mut reports = Vec::with_capacity(names.len());
    for (tz_index, name) in names.iter().enumerate() {
        let entry = cache.get(tz_index).copied().flatten();
        let found = engine.resolve_timezone(name)?;
        let city_name = match found {
            Some(m) => Some(store.display_name(m.city_index)?.to_string()),
            None => None,
        };
        let report = TimezoneReport {
            tz_index,
            name: name.to_string(),
            resolved: entry.is_some(),
            std_offset: entry.map(|e| e.std_offset),
            dst_offset: entry.map(|e| e.dst_offset),
            city_index: found.map(|m| m.city_index),
            city_name,
            tier: found.map(|m| m.tier),
        };
        if report.is_problem() {
            warn!(zone = name, resolved = report.resolved, "timezone name has no usable city");
        }
        reports.push(report);
    }
    Ok(reports)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WackyCity {
    pub city_index: usize,
    pub name: String,
    pub tz_name: String,
    pub longitude: f32,
    /// Longitude implied by the zone's standard offset (15° per hour).
    pub zone_longitude: f64,
    /// Circular distance between the two, in degrees.
    pub deviation: f64,
}

/// Cities whose longitude is more than `threshold_degrees` away from the
/// longitude their zone's standard offset implies.
pub fn find_wacky_zones(store: &GazetteerStore, threshold_degrees: f64) -> Result<Vec<WackyCity>> {
    let cities = store.city_data()?;
    let mut wacky = Vec::new();

    for (i, city) in cities.iter().enumerate() {
        let Some(entry) = store.city_timezone(i)? else {
            continue;
        };
        let zone_longitude = f64::from(entry.std_offset) / 4.0;
        let deviation = circular_degrees(f64::from(city.longitude) - zone_longitude);
        if deviation > threshold_degrees {
            wacky.push(WackyCity {
                city_index: i,
                name: store.display_name(i)?.to_string(),
                tz_name: store.city_tz_name(i)?.to_string(),
                longitude: city.longitude,
                zone_longitude,
                deviation,
            });
        }
    }
    Ok(wacky)
}

fn circular_degrees(delta: f64) -> f64 {
    let d = delta.rem_euclid(360.0);
    if d > 180.0 {
        360.0 - d
    } else {
        d
    }
}
