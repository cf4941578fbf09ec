// crates/geonames-core/src/traits.rs
//! Capabilities the gazetteer consumes but does not implement itself.
//!
//! The store reads its columns through a [`ColumnSource`], resolves timezone
//! offsets through a [`Calendar`], asks a [`Clock`] for "now", and uses a
//! [`LocationProvider`] as the default centre for proximity-ranked queries.
//! Concrete implementations live in [`crate::loader`] and [`crate::calendar`].

use crate::error::Result;
use crate::loader::ColumnKind;
use crate::model::Coordinates;

/// Packed-column loader: returns the raw bytes of one column.
///
/// Decoding into typed records happens in [`crate::loader::packed`]; a source
/// only has to locate the bytes.
pub trait ColumnSource: Send + Sync {
    fn read_column(&self, kind: ColumnKind) -> Result<Vec<u8>>;

    /// Short human-readable description used in log lines.
    fn describe(&self) -> String {
        "column source".to_string()
    }
}

/// Calendar resolver over IANA ("Olson") zone names.
///
/// Times are Unix seconds; offsets are seconds east of UTC.
pub trait Calendar: Send + Sync {
    /// UTC offset of `zone` at `at`, or `None` if the zone is unknown.
    fn offset_at(&self, zone: &str, at: i64) -> Option<i32>;

    /// First instant after `at` at which the zone's offset changes, if any.
    fn next_transition_after(&self, zone: &str, at: i64) -> Option<i64>;

    fn knows_zone(&self, zone: &str) -> bool {
        self.offset_at(zone, 0).is_some()
    }
}

/// Current-time source, Unix seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// Device-location provider.
pub trait LocationProvider: Send + Sync {
    fn device_location(&self) -> Coordinates;
}
