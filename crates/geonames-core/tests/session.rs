#![cfg(feature = "builder")]

mod common;

use common::*;
use geonames_core::loader::packed::encode_packed;
use geonames_core::{ColumnKind, GeoError, SlotInclusionClass};

#[test]
fn store_lives_as_long_as_a_session() {
    let gazetteer = gazetteer_at(SAN_FRANCISCO_AT);
    assert!(!gazetteer.is_live());

    let mut first = gazetteer.session().unwrap();
    assert!(gazetteer.is_live());
    assert!(first.store().loaded_columns().is_empty());

    first.search_by_name_fragment("paris", false).unwrap();
    let second = gazetteer.session().unwrap();
    assert!(std::sync::Arc::ptr_eq(first.store(), second.store()));
    assert!(second.store().loaded_columns().contains(&ColumnKind::CityNames));

    drop(first);
    assert!(gazetteer.is_live());
    drop(second);
    assert!(!gazetteer.is_live());

    // A fresh store starts empty and loads lazily again.
    let third = gazetteer.session().unwrap();
    assert!(third.store().loaded_columns().is_empty());
}

#[test]
fn nearest_lookup_touches_only_city_data() {
    let mut session = session_at(SAN_FRANCISCO_AT);
    assert_eq!(
        session.find_closest_city(SAN_FRANCISCO_AT).unwrap(),
        Some(SAN_FRANCISCO)
    );
    assert_eq!(session.store().loaded_columns(), vec![ColumnKind::CityData]);
}

#[test]
fn selection_follows_the_ranked_results() {
    let mut session = session_at(SAN_FRANCISCO_AT);
    assert_eq!(session.search_by_name_fragment("paris", false).unwrap(), 2);

    assert_eq!(session.top_city_name_at(1).unwrap(), "Paris");
    assert_eq!(session.selected_index(), Some(PARIS_TEXAS));
    assert_eq!(session.selected_city_country_code().unwrap(), "US");
    assert_eq!(
        session.selected_city_region_name().unwrap(),
        "Lamar County, Texas, United States"
    );
    assert_eq!(session.selected_city_tz_name().unwrap(), "America/Chicago");
    assert_eq!(session.selected_city_population().unwrap(), Some(24_171));

    assert_eq!(session.select_nth_top_city(0), Some(PARIS));
    assert_eq!(session.selected_city_region_name().unwrap(), "Ile-de-France, France");

    // Past the end clears the selection; the name lookup does not select.
    assert_eq!(session.top_city_name_at(5).unwrap(), "");
    assert_eq!(session.selected_index(), Some(PARIS));
    assert_eq!(session.select_nth_top_city(5), None);
    assert_eq!(session.selected_index(), None);
}

#[test]
fn direct_selection_is_bounds_checked() {
    let mut session = session_at(SAN_FRANCISCO_AT);
    session.select_city_with_index(KATHMANDU).unwrap();
    assert_eq!(session.selected_city_name().unwrap(), "Kathmandu");
    assert_eq!(session.selected_city_region_name().unwrap(), "Nepal");
    assert_eq!(session.selected_city_region_confidence("", "NP", "").unwrap(), 1);

    assert!(matches!(
        session.select_city_with_index(CITY_COUNT),
        Err(GeoError::CityIndexOutOfRange { index, count }) if index == CITY_COUNT && count == CITY_COUNT
    ));
    assert_eq!(session.selected_index(), Some(KATHMANDU));
}

#[test]
fn projections_without_selection_are_empty() {
    let mut session = session_at(SAN_FRANCISCO_AT);
    session.search_by_city("Paris", "Texas", "", "").unwrap();
    session.select_nth_top_city(0);
    session.clear_selection();

    assert_eq!(session.num_matches(), 0);
    assert_eq!(session.num_matches_at_level(1), 0);
    assert_eq!(session.selected_city_name().unwrap(), "");
    assert_eq!(session.selected_city_region_name().unwrap(), "");
    assert_eq!(session.selected_city_latitude().unwrap(), None);
    assert_eq!(session.selected_city_population().unwrap(), None);
    assert!(!session.selected_city_valid_for_slot(-8).unwrap());
    assert_eq!(
        session.selected_city_inclusion_class(-8).unwrap(),
        SlotInclusionClass::NotIncluded
    );
    assert_eq!(session.selected_city_info().unwrap(), None);
}

#[test]
fn city_info_carries_world_clock_slots() {
    let session = session_at(SAN_FRANCISCO_AT);
    let slots = |index| {
        let info = session.city_info(index).unwrap();
        (info.primary_slot, info.secondary_slot)
    };
    assert_eq!(slots(PHOENIX), (Some(17), Some(16)));
    assert_eq!(slots(KOLKATA), (Some(5), None));
    assert_eq!(slots(LOS_ANGELES), (Some(16), None));
    assert_eq!(slots(REYKJAVIK), (Some(0), Some(23)));

    let info = session.city_info(ZURICH).unwrap();
    assert_eq!(info.name, "Zürich");
    assert_eq!(info.country_code, "CH");
    assert_eq!(info.tz_name, "Europe/Zurich");
}

#[test]
fn selected_city_slot_checks() {
    let mut session = session_at(SAN_FRANCISCO_AT);
    session.find_best_city_for_tz_name("America/Phoenix").unwrap();
    assert!(session.selected_city_valid_for_slot(-7).unwrap());
    assert!(session.selected_city_valid_for_slot(-8).unwrap());
    assert_eq!(
        session.selected_city_inclusion_class(-7).unwrap(),
        SlotInclusionClass::NormalNoDstRight
    );
    let latitude = session.selected_city_latitude().unwrap().unwrap();
    assert!((latitude - 33.45).abs() < 1e-4);
}

#[test]
fn mismatched_column_poisons_the_store() {
    let mut set = column_set();
    set.insert(ColumnKind::TzIndices, encode_packed(&[0i16, 0, 0]));
    let store = store_from(set, SAN_FRANCISCO_AT);

    assert_eq!(store.num_cities().unwrap(), CITY_COUNT);
    let err = store.tz_indices().unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(
        err,
        GeoError::CityCountMismatch { column: ColumnKind::TzIndices, found: 3, expected } if expected == CITY_COUNT
    ));

    // Already loaded columns stop answering too.
    assert!(store.city_data().unwrap_err().is_fatal());
    assert!(store.display_name(PARIS).unwrap_err().is_fatal());
}

#[test]
fn malformed_column_is_not_fatal() {
    let mut set = column_set();
    set.insert(ColumnKind::CityData, vec![0; 13]);
    let store = store_from(set, SAN_FRANCISCO_AT);

    let err = store.city_data().unwrap_err();
    assert!(matches!(err, GeoError::Stride { .. }));
    assert!(!err.is_fatal());
}
