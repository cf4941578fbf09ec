// crates/geonames-core/src/error.rs
use crate::loader::ColumnKind;
use thiserror::Error;

/// Errors produced while loading or querying the gazetteer.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Column {column} has {bytes} bytes, not a multiple of its {stride}-byte stride")]
    Stride {
        column: ColumnKind,
        bytes: usize,
        stride: usize,
    },

    /// Two per-city columns disagree on the number of cities. The dataset is
    /// corrupt or from mismatched builds; the store refuses all further loads.
    #[error("City file mismatch: {column} holds {found} cities, expected {expected}")]
    CityCountMismatch {
        column: ColumnKind,
        found: usize,
        expected: usize,
    },

    #[error("City index {index} out of range (0..{count})")]
    CityIndexOutOfRange { index: usize, count: usize },

    #[error("{table} index {index} out of range (0..{count})")]
    TableIndexOutOfRange {
        table: &'static str,
        index: i64,
        count: usize,
    },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Gazetteer load lock poisoned")]
    LockPoisoned,

    #[error("Config error: {0}")]
    Config(String),
}

impl GeoError {
    /// True for data-integrity failures that must not be retried.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GeoError::CityCountMismatch { .. })
    }
}

pub type Result<T> = std::result::Result<T, GeoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_count_mismatch_is_fatal() {
        let mismatch = GeoError::CityCountMismatch {
            column: ColumnKind::Regions,
            found: 3,
            expected: 4,
        };
        assert!(mismatch.is_fatal());
        assert_eq!(
            mismatch.to_string(),
            "City file mismatch: loc-region.dat holds 3 cities, expected 4"
        );
        assert!(!GeoError::InvalidQuery("empty".into()).is_fatal());
    }
}
