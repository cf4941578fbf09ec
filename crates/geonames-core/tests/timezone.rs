#![cfg(feature = "builder")]

mod common;

use common::*;
use geonames_core::{
    ChronoTzCalendar, Coordinates, DatasetBuilder, DeviceLocation, Environment, FixedClock,
    GazetteerStore, GeoError, MemorySource, RawCity, SearchEngine, TimezoneTier,
};
use std::sync::Arc;

fn resolve(at: Coordinates, zone: &str) -> Option<(usize, TimezoneTier)> {
    let store = store_at(at);
    SearchEngine::new(&store)
        .resolve_timezone(zone)
        .unwrap()
        .map(|m| (m.city_index, m.tier))
}

#[test]
fn packaged_zone_resolves_to_its_largest_city() {
    assert_eq!(
        resolve(SAN_FRANCISCO_AT, "Asia/Kathmandu"),
        Some((KATHMANDU, TimezoneTier::ExactName))
    );
    assert_eq!(
        resolve(SAN_FRANCISCO_AT, "America/Los_Angeles"),
        Some((LOS_ANGELES, TimezoneTier::ExactName))
    );
    // Device position does not matter for the exact tier.
    assert_eq!(
        resolve(Coordinates::new(29.65, 91.1), "America/Los_Angeles"),
        Some((LOS_ANGELES, TimezoneTier::ExactName))
    );
}

#[test]
fn alias_zone_picks_the_nearest_olson_city_on_the_same_schedule() {
    assert_eq!(
        resolve(SAN_FRANCISCO_AT, "America/Ensenada"),
        Some((LOS_ANGELES, TimezoneTier::OlsonSchedule))
    );
    assert_eq!(
        resolve(Coordinates::new(32.7, -117.16), "America/Ensenada"),
        Some((TIJUANA, TimezoneTier::OlsonSchedule))
    );
}

#[test]
fn cities_with_alternate_names_still_count_as_olson_cities() {
    let set = DatasetBuilder::from_cities(vec![RawCity::new(
        "Los Angeles",
        34.05,
        -118.24,
        3_898_747,
        "America/Los_Angeles",
    )
    .with_alternates(&["LA"])
    .with_country("US", "United States")])
    .build()
    .unwrap();
    let store = store_from(set, SAN_FRANCISCO_AT);
    assert_eq!(store.display_name(0).unwrap(), "Los Angeles");

    let engine = SearchEngine::new(&store);
    assert!(engine.is_olson_city(0).unwrap());
    let found = engine.resolve_timezone("America/Ensenada").unwrap().unwrap();
    assert_eq!(found.city_index, 0);
    assert_eq!(found.tier, TimezoneTier::OlsonSchedule);

    // The shared fixture's Kolkata carries "Calcutta" as an alternate.
    let store = store_at(SAN_FRANCISCO_AT);
    assert_eq!(store.display_name(KOLKATA).unwrap(), "Kolkata");
    assert!(SearchEngine::new(&store).is_olson_city(KOLKATA).unwrap());
}

#[test]
fn zone_without_schedule_twin_falls_back_to_current_offset() {
    // Denver observes DST; only Phoenix shares its winter offset.
    assert_eq!(
        resolve(SAN_FRANCISCO_AT, "America/Denver"),
        Some((PHOENIX, TimezoneTier::OlsonOffset))
    );
}

#[test]
fn last_tier_prefers_the_largest_city_nearby() {
    // Lhasa is 3.8 km away, the suburb 0.15 km.
    assert_eq!(
        resolve(Coordinates::new(29.652, 91.139), "Asia/Chongqing"),
        Some((LHASA, TimezoneTier::AnyOffset))
    );
    // Nothing within 15 km: the closest city wins regardless of size.
    assert_eq!(
        resolve(Coordinates::new(29.3, 91.45), "Asia/Chongqing"),
        Some((DAGZE, TimezoneTier::AnyOffset))
    );
}

#[test]
fn unmatched_and_unknown_zones_give_no_city() {
    assert_eq!(resolve(SAN_FRANCISCO_AT, "Pacific/Chatham"), None);
    assert_eq!(resolve(SAN_FRANCISCO_AT, "Mars/Base"), None);
}

#[test]
fn session_records_the_resolved_city() {
    let mut session = session_at(SAN_FRANCISCO_AT);
    assert_eq!(
        session.find_best_city_for_tz_name("Europe/Zurich").unwrap(),
        Some(ZURICH)
    );
    assert_eq!(session.selected_city_name().unwrap(), "Zürich");
    assert_eq!(session.find_best_city_for_tz_name("Mars/Base").unwrap(), None);
    assert_eq!(session.selected_index(), None);
}

#[test]
fn timezone_cache_holds_offsets_per_zone() {
    let store = store_at(SAN_FRANCISCO_AT);
    let kolkata = store.city_timezone(KOLKATA).unwrap().unwrap();
    assert_eq!(
        (kolkata.std_offset, kolkata.dst_offset, kolkata.current_offset),
        (330, 330, 330)
    );
    assert!(!kolkata.has_dst());

    let paris = store.city_timezone(PARIS).unwrap().unwrap();
    assert_eq!((paris.std_offset, paris.dst_offset), (60, 120));
    assert_eq!(paris.next_transition, Some(EU_SPRING));
    assert_eq!(paris.center(), 90);

    // Shared zone, shared entry.
    assert_eq!(
        store.city_timezone(LOS_ANGELES).unwrap(),
        store.city_timezone(SAN_FRANCISCO).unwrap()
    );
}

#[test]
fn zone_centres_from_the_calendar() {
    let session = session_at(SAN_FRANCISCO_AT);
    assert_eq!(session.tz_center_for_zone("America/Denver").unwrap(), -390);
    assert!(session.valid_tz("America/Denver", -7).unwrap());
    assert!(!session.valid_tz("America/Denver", -5).unwrap());
    assert!(matches!(
        session.tz_center_for_zone("Mars/Base"),
        Err(GeoError::UnknownTimezone(_))
    ));
}

#[test]
fn real_tz_database_offsets() {
    // 2021-01-15, northern winter.
    let env = Environment::new(
        Arc::new(ChronoTzCalendar),
        Arc::new(FixedClock(1_610_668_800)),
        Arc::new(DeviceLocation::new(SAN_FRANCISCO_AT)),
    );
    let store = GazetteerStore::new(Arc::new(MemorySource::new(column_set())), env);
    let engine = SearchEngine::new(&store);

    assert_eq!(engine.tz_center_for_zone("Asia/Kolkata").unwrap(), 330);
    assert_eq!(engine.tz_center_for_zone("Europe/Berlin").unwrap(), 90);
    assert_eq!(engine.tz_center_for_zone("America/Phoenix").unwrap(), -420);
    assert_eq!(
        engine.resolve_timezone("Europe/Berlin").unwrap().map(|m| m.city_index),
        Some(PARIS)
    );
}
