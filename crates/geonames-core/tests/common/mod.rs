// crates/geonames-core/tests/common/mod.rs
#![allow(dead_code)]

use geonames_core::{
    ColumnSet, Coordinates, DatasetBuilder, DeviceLocation, Environment, FixedClock, Gazetteer,
    GazetteerStore, MemorySource, RawCity, SearchSession, StaticCalendar, ZoneRule,
};
use std::sync::Arc;

/// 2023-11-14T22:13:20Z: northern winter, DST changes still ahead.
pub const NOW: i64 = 1_700_000_000;
/// 2024-03-10T10:00:00Z, US Pacific spring-forward.
pub const US_PACIFIC_SPRING: i64 = 1_710_064_800;
pub const US_MOUNTAIN_SPRING: i64 = 1_710_061_200;
pub const US_CENTRAL_SPRING: i64 = 1_710_057_600;
/// 2024-03-31T01:00:00Z, EU spring-forward.
pub const EU_SPRING: i64 = 1_711_846_800;

pub const LOS_ANGELES: usize = 0;
pub const SAN_FRANCISCO: usize = 1;
pub const PARIS: usize = 2;
pub const DISPARITY: usize = 3;
pub const PHOENIX: usize = 4;
pub const ZURICH: usize = 5;
pub const KOLKATA: usize = 6;
pub const PARIS_TEXAS: usize = 7;
pub const KATHMANDU: usize = 8;
pub const TIJUANA: usize = 9;
pub const REYKJAVIK: usize = 10;
pub const LHASA: usize = 11;
pub const DAGZE: usize = 12;
pub const DOILUNGDEQEN: usize = 13;
pub const CITY_COUNT: usize = 14;

pub const SAN_FRANCISCO_AT: Coordinates = Coordinates {
    latitude: 37.77,
    longitude: -122.42,
};

pub fn cities() -> Vec<RawCity> {
    vec![
        RawCity::new("Los Angeles", 34.05, -118.24, 3_898_747, "America/Los_Angeles")
            .with_country("US", "United States")
            .with_admin1("US.CA", "California")
            .with_admin2("Los Angeles County"),
        RawCity::new("San Francisco", 37.77, -122.42, 873_965, "America/Los_Angeles")
            .with_country("US", "United States")
            .with_admin1("US.CA", "California"),
        RawCity::new("Paris", 48.8566, 2.3522, 2_140_526, "Europe/Paris")
            .with_country("FR", "France")
            .with_admin1("FR.11", "Ile-de-France"),
        RawCity::new("Disparity", 48.0, 3.0, 100, "Europe/Paris")
            .with_country("FR", "France")
            .with_admin1("FR.44", "Grand Est"),
        RawCity::new("Phoenix", 33.45, -112.07, 1_608_139, "America/Phoenix")
            .with_country("US", "United States")
            .with_admin1("US.AZ", "Arizona"),
        RawCity::new("Zurich", 47.37, 8.55, 341_730, "Europe/Zurich")
            .with_display_name("Zürich")
            .with_country("CH", "Switzerland")
            .with_admin1("CH.ZH", "Zurich"),
        RawCity::new("Kolkata", 22.57, 88.36, 4_496_694, "Asia/Kolkata")
            .with_alternates(&["Calcutta"])
            .with_country("IN", "India")
            .with_admin1("IN.28", "West Bengal"),
        RawCity::new("Paris", 33.66, -95.55, 24_171, "America/Chicago")
            .with_country("US", "United States")
            .with_admin1("US.TX", "Texas")
            .with_admin2("Lamar County"),
        RawCity::new("Kathmandu", 27.7, 85.3, 1_003_285, "Asia/Kathmandu")
            .with_country("NP", "Nepal"),
        RawCity::new("Tijuana", 32.5, -117.0, 1_376_457, "America/Tijuana")
            .with_country("MX", "Mexico")
            .with_admin1("MX.02", "Baja California"),
        RawCity::new("Reykjavik", 64.15, -21.94, 118_918, "Atlantic/Reykjavik")
            .with_display_name("Reykjavík")
            .with_country("IS", "Iceland")
            .with_admin1("IS.39", "Capital Region"),
        RawCity::new("Lhasa", 29.65, 91.1, 199_159, "Asia/Shanghai")
            .with_country("CN", "China")
            .with_admin1("CN.14", "Tibet"),
        RawCity::new("Dagze", 29.67, 91.35, 30_000, "Asia/Shanghai")
            .with_country("CN", "China")
            .with_admin1("CN.14", "Tibet"),
        RawCity::new("Doilungdeqen", 29.651, 91.14, 500, "Asia/Shanghai")
            .with_country("CN", "China")
            .with_admin1("CN.14", "Tibet"),
    ]
}

/// Offsets in minutes; transitions at fixed instants after [`NOW`].
pub fn calendar() -> StaticCalendar {
    let pacific = ZoneRule::transition(-480, US_PACIFIC_SPRING, -420);
    let central_european = ZoneRule::transition(60, EU_SPRING, 120);
    StaticCalendar::new()
        .with_zone("America/Los_Angeles", pacific)
        .with_zone("America/Tijuana", pacific)
        .with_zone("America/Ensenada", pacific)
        .with_zone("America/Phoenix", ZoneRule::fixed(-420))
        .with_zone("America/Denver", ZoneRule::transition(-420, US_MOUNTAIN_SPRING, -360))
        .with_zone("America/Chicago", ZoneRule::transition(-360, US_CENTRAL_SPRING, -300))
        .with_zone("Europe/Paris", central_european)
        .with_zone("Europe/Zurich", central_european)
        .with_zone("Asia/Kolkata", ZoneRule::fixed(330))
        .with_zone("Asia/Kathmandu", ZoneRule::fixed(345))
        .with_zone("Atlantic/Reykjavik", ZoneRule::fixed(0))
        .with_zone("Asia/Shanghai", ZoneRule::fixed(480))
        .with_zone("Asia/Chongqing", ZoneRule::fixed(480))
        .with_zone("Pacific/Chatham", ZoneRule::fixed(765))
}

pub fn column_set() -> ColumnSet {
    DatasetBuilder::from_cities(cities())
        .build()
        .expect("fixture dataset builds")
}

pub fn environment_at(at: Coordinates) -> Environment {
    Environment::new(
        Arc::new(calendar()),
        Arc::new(FixedClock(NOW)),
        Arc::new(DeviceLocation::new(at)),
    )
}

pub fn store_from(set: ColumnSet, at: Coordinates) -> Arc<GazetteerStore> {
    Arc::new(GazetteerStore::new(
        Arc::new(MemorySource::new(set)),
        environment_at(at),
    ))
}

pub fn store_at(at: Coordinates) -> Arc<GazetteerStore> {
    store_from(column_set(), at)
}

pub fn session_at(at: Coordinates) -> SearchSession {
    SearchSession::new(store_at(at))
}

pub fn gazetteer_at(at: Coordinates) -> Gazetteer {
    Gazetteer::new(Arc::new(MemorySource::new(column_set())), environment_at(at))
}
