//! Basic usage example for geonames-rs
//!
//! This example demonstrates how to:
//! - Build a tiny dataset in memory and open a session over it
//! - Search by name fragment, by address and by world-clock slot
//! - Pick a representative city for a timezone name
//!
//! Set `GEONAMES_DATA_DIR` to run the same queries against a packed dataset.

use geonames_rs::prelude::*;
use geonames_rs::{
    DatasetBuilder, DeviceLocation, Environment, MemorySource, RawCity, StaticCalendar, SystemClock,
    ZoneRule,
};
use std::sync::Arc;

fn demo_gazetteer(device: Coordinates) -> Result<Gazetteer> {
    let cities = vec![
        RawCity::new("Los Angeles", 34.05, -118.24, 3_898_747, "America/Los_Angeles")
            .with_country("US", "United States")
            .with_admin1("US.CA", "California"),
        RawCity::new("Phoenix", 33.45, -112.07, 1_608_139, "America/Phoenix")
            .with_country("US", "United States")
            .with_admin1("US.AZ", "Arizona"),
        RawCity::new("Paris", 48.8566, 2.3522, 2_140_526, "Europe/Paris")
            .with_country("FR", "France")
            .with_admin1("FR.11", "Ile-de-France"),
        RawCity::new("Paris", 33.66, -95.55, 24_171, "America/Chicago")
            .with_country("US", "United States")
            .with_admin1("US.TX", "Texas"),
        RawCity::new("Zurich", 47.37, 8.55, 341_730, "Europe/Zurich")
            .with_display_name("Zürich")
            .with_country("CH", "Switzerland")
            .with_admin1("CH.ZH", "Zurich"),
    ];
    let set = DatasetBuilder::from_cities(cities).build()?;

    // Fixed offsets keep the output stable across the year.
    let calendar = StaticCalendar::new()
        .with_zone("America/Los_Angeles", ZoneRule::fixed(-480))
        .with_zone("America/Phoenix", ZoneRule::fixed(-420))
        .with_zone("America/Denver", ZoneRule::fixed(-420))
        .with_zone("America/Chicago", ZoneRule::fixed(-360))
        .with_zone("Europe/Paris", ZoneRule::fixed(60))
        .with_zone("Europe/Zurich", ZoneRule::fixed(60));
    let env = Environment::new(
        Arc::new(calendar),
        Arc::new(SystemClock),
        Arc::new(DeviceLocation::new(device)),
    );
    Ok(Gazetteer::new(Arc::new(MemorySource::new(set)), env))
}

fn main() -> Result<()> {
    println!("=== geonames-rs Basic Usage Example ===\n");

    let gazetteer = match std::env::var_os("GEONAMES_DATA_DIR") {
        Some(_) => Gazetteer::from_config(&GazetteerConfig::from_env()?),
        None => demo_gazetteer(Coordinates::new(33.0, -96.0))?,
    };
    let mut session = gazetteer.session()?;

    println!("--- Example 1: Name fragment 'par' near the device ---");
    session.search_by_name_fragment("par", true)?;
    for n in 0..session.num_matches() {
        let name = session.top_city_name_at(n)?;
        println!("{}. {} ({})", n + 1, name, session.selected_city_region_name()?);
    }
    println!();

    println!("--- Example 2: Address search 'Paris, Texas' ---");
    let best = session.search_by_city("Paris", "Texas", "", "US")?;
    println!("Best confidence: {best:?}");
    println!("Top match: {}", session.top_city_name_at(0)?);
    println!("Region: {}\n", session.selected_city_region_name()?);

    println!("--- Example 3: Cities in the UTC-8 world-clock slot ---");
    session.search_by_name_fragment_for_tz_slot("", -8)?;
    for n in 0..session.num_matches() {
        let name = session.top_city_name_at(n)?;
        println!("- {} [{}]", name, session.selected_city_inclusion_class(-8)?.as_str());
    }
    println!();

    println!("--- Example 4: A city for America/Denver ---");
    match session.find_best_city_for_tz_name("America/Denver")? {
        Some(_) => println!("Resolved to {}", session.selected_city_name()?),
        None => println!("No city shares Denver's offset"),
    }

    println!("\n=== Example completed successfully ===");
    Ok(())
}
