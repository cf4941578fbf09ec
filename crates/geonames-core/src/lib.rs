// crates/geonames-core/src/lib.rs

//! Read-only gazetteer and timezone-slot matching.
//!
//! A [`Gazetteer`] shell hands out [`SearchSession`]s over a shared, lazily
//! loaded [`GazetteerStore`]. The [`SearchEngine`] runs nearest-city,
//! name-fragment, address and timezone-to-city searches over the store.

pub mod calendar;
pub mod common;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod loader;
pub mod model;
pub mod search;
pub mod session;
pub mod shared;
pub mod store;
pub mod text;
pub mod traits;

// Re-exports
pub use crate::calendar::{
    ChronoTzCalendar, DeviceLocation, Environment, FixedClock, StaticCalendar, SystemClock,
    ZoneRule,
};
pub use crate::common::DbStats;
pub use crate::config::GazetteerConfig;
pub use crate::error::{GeoError, Result};
pub use crate::loader::{BundleSource, ColumnKind, ColumnSet, DirectorySource, MemorySource};
pub use crate::model::{
    CityData, CityInfo, Coordinates, RegionDesc, SlotInclusionClass, TimezoneEntry,
};
pub use crate::search::{
    AddressQuery, CityMatchSummary, SearchCandidate, SearchEngine, TimezoneMatch, TimezoneTier,
};
pub use crate::session::SearchSession;
pub use crate::shared::Gazetteer;
pub use crate::store::GazetteerStore;
pub use crate::traits::{Calendar, Clock, ColumnSource, LocationProvider};

#[cfg(feature = "builder")]
pub use crate::loader::builder::{DatasetBuilder, RawCity};
