//! Workspace facade over [`geonames_core`], used by the demos.

pub use geonames_core::*;

pub mod prelude {
    pub use geonames_core::{
        Coordinates, Gazetteer, GazetteerConfig, GeoError, Result, SearchEngine, SearchSession,
        SlotInclusionClass,
    };
}
