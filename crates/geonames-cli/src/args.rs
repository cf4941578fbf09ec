use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for geonames-cli
#[derive(Debug, Parser)]
#[command(
    name = "geonames",
    version,
    about = "CLI for querying and inspecting a packed geonames-core gazetteer"
)]
pub struct CliArgs {
    /// Directory holding the packed column files (default: GEONAMES_DATA_DIR or the bundled data)
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Single-file dataset (.bin or .bin.gz); takes precedence over --data-dir
    #[arg(short = 'b', long = "bundle", global = true)]
    pub bundle: Option<PathBuf>,

    /// JSON config file; flags override its values
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Device latitude for proximity ranking and timezone fallback
    #[arg(long = "lat", global = true, allow_negative_numbers = true)]
    pub latitude: Option<f64>,

    /// Device longitude for proximity ranking and timezone fallback
    #[arg(long = "lon", global = true, allow_negative_numbers = true)]
    pub longitude: Option<f64>,

    /// More logging (-v info, -vv debug); RUST_LOG overrides
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show a summary of the dataset contents
    Stats,

    /// City closest to a point
    Nearest {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },

    /// Best city near a point, weighing distance against population
    BestMatch {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },

    /// Representative city for an Olson timezone name
    Timezone {
        /// Olson name, e.g. America/Los_Angeles
        name: String,
    },

    /// Search cities by name fragment (word-prefix, case-insensitive)
    Search {
        /// Fragment to match; empty matches every city
        #[arg(default_value = "")]
        fragment: String,

        /// Rank nearby large cities first instead of by population
        #[arg(short = 'p', long)]
        proximity: bool,

        /// Keep only cities fitting this world-clock slot (UTC offset hours)
        #[arg(short = 's', long, allow_negative_numbers = true, conflicts_with = "proximity")]
        slot: Option<i32>,

        /// Maximum number of results to print
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Address search: city name plus optional state/country qualifiers
    Address {
        /// City name
        name: String,

        /// State name or code (e.g. California, CA)
        #[arg(long, default_value = "")]
        state: String,

        /// Country name or code (e.g. United States, USA)
        #[arg(long, default_value = "")]
        country: String,

        /// Two-letter country code
        #[arg(long, default_value = "")]
        code: String,

        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Everything about one city by index
    Info {
        index: usize,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that every packaged timezone resolves and maps to a city
    Validate {
        /// Report cities further than this many degrees from their zone's longitude
        #[arg(long, default_value_t = geonames_core::diagnostics::DEFAULT_WACKY_THRESHOLD_DEGREES)]
        threshold: f64,
    },

    /// Pack a raw JSON city list into a dataset
    #[cfg(feature = "builder")]
    Build {
        /// Raw cities (.json or .json.gz)
        #[arg(short = 'i', long)]
        input: PathBuf,

        /// Write one file per column into this directory
        #[arg(long, required_unless_present = "bundle_out")]
        out_dir: Option<PathBuf>,

        /// Write a single bundle (.bin, or .bin.gz for gzip)
        #[arg(long, conflicts_with = "out_dir")]
        bundle_out: Option<PathBuf>,
    },
}
