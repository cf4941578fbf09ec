//! geonames-cli
//! ============
//!
//! Command-line interface for the `geonames-core` gazetteer.
//!
//! The binary (`geonames`) is the deliverable; this library target only gives
//! docs.rs a page to render.
//!
//! ```text
//! cargo install geonames-cli
//! geonames --help
//! geonames stats
//! geonames nearest 48.85 2.35
//! geonames timezone Europe/Berlin
//! geonames address Paris --state Texas --code US
//! ```
//!
//! Use `geonames-core` directly for programmatic access.
#![cfg_attr(docsrs, feature(doc_cfg))]
