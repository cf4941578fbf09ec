// crates/geonames-core/src/session.rs

//! # Search Session
//!
//! A per-client cursor over the shared store: the candidates of the last
//! search, a per-confidence histogram, and one selected city. Every accessor
//! reads straight from the store; nothing projected is cached.

use crate::error::{GeoError, Result};
use crate::model::{CityInfo, Coordinates, SlotInclusionClass};
use crate::search::{AddressQuery, SearchCandidate, SearchEngine, MAX_CONFIDENCE};
use crate::store::GazetteerStore;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct SearchSession {
    store: Arc<GazetteerStore>,
    candidates: Vec<SearchCandidate>,
    level_counts: [usize; MAX_CONFIDENCE as usize + 1],
    selected: Option<usize>,
}

impl SearchSession {
    pub fn new(store: Arc<GazetteerStore>) -> Self {
        Self {
            store,
            candidates: Vec::new(),
            level_counts: [0; MAX_CONFIDENCE as usize + 1],
            selected: None,
        }
    }

    pub fn store(&self) -> &Arc<GazetteerStore> {
        &self.store
    }

    pub fn engine(&self) -> SearchEngine<'_> {
        SearchEngine::new(&self.store)
    }

    /// Sizes the buffer for the whole dataset before the first search.
    fn prepare_buffer(&mut self) -> Result<()> {
        if self.candidates.capacity() == 0 {
            let n = self.store.num_cities()?;
            self.candidates.reserve(n);
        }
        self.level_counts = [0; MAX_CONFIDENCE as usize + 1];
        Ok(())
    }

    // -------------------------------------------------------------------------
    // SEARCHES
    // -------------------------------------------------------------------------

    /// Returns the number of matches.
    pub fn search_by_name_fragment(&mut self, fragment: &str, proximity: bool) -> Result<usize> {
        self.prepare_buffer()?;
        let engine = SearchEngine::new(&self.store);
        engine.search_by_name_fragment(fragment, proximity, &mut self.candidates)?;
        Ok(self.candidates.len())
    }

    pub fn search_by_name_fragment_for_tz_slot(
        &mut self,
        fragment: &str,
        offset_hours: i32,
    ) -> Result<usize> {
        self.prepare_buffer()?;
        let engine = SearchEngine::new(&self.store);
        engine.search_by_name_fragment_for_tz_slot(fragment, offset_hours, &mut self.candidates)?;
        Ok(self.candidates.len())
    }

    /// Address search. Returns the best confidence seen, `None` if no city
    /// matched the name.
    pub fn search_by_city(
        &mut self,
        name: &str,
        state: &str,
        country: &str,
        code: &str,
    ) -> Result<Option<u8>> {
        self.prepare_buffer()?;
        let engine = SearchEngine::new(&self.store);
        let query = AddressQuery::new(state, country, code);
        let summary = engine.search_by_city(name, &query, &mut self.candidates)?;
        self.level_counts = summary.level_counts;
        Ok(summary.max_confidence)
    }

    /// Selects and returns the city closest to `at`.
    pub fn find_closest_city(&mut self, at: Coordinates) -> Result<Option<usize>> {
        self.selected = self.engine().nearest_city(at)?;
        Ok(self.selected)
    }

    pub fn find_best_match_city(&mut self, at: Coordinates) -> Result<Option<usize>> {
        self.selected = self.engine().best_match_city(at)?;
        Ok(self.selected)
    }

    pub fn find_best_city_for_tz_name(&mut self, tz_name: &str) -> Result<Option<usize>> {
        self.selected = self.engine().best_city_for_timezone_name(tz_name)?;
        Ok(self.selected)
    }

    // -------------------------------------------------------------------------
    // RESULTS & SELECTION
    // -------------------------------------------------------------------------

    pub fn candidates(&self) -> &[SearchCandidate] {
        &self.candidates
    }

    pub fn num_matches(&self) -> usize {
        self.candidates.len()
    }

    /// Matches at confidence `level` from the last address search.
    pub fn num_matches_at_level(&self, level: usize) -> usize {
        self.level_counts.get(level).copied().unwrap_or(0)
    }

    /// Selects the n-th ranked candidate; clears the selection when `n` is
    /// past the end.
    pub fn select_nth_top_city(&mut self, n: usize) -> Option<usize> {
        self.selected = self.candidates.get(n).map(|c| c.city_index);
        self.selected
    }

    /// Selects a city by raw index, bypassing search.
    pub fn select_city_with_index(&mut self, index: usize) -> Result<()> {
        let count = self.store.num_cities()?;
        if index >= count {
            return Err(GeoError::CityIndexOutOfRange { index, count });
        }
        self.selected = Some(index);
        Ok(())
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Drops the result buffer and resets counts and selection.
    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.level_counts = [0; MAX_CONFIDENCE as usize + 1];
        self.candidates = Vec::new();
        debug!("session selection cleared");
    }

    /// Display name of the n-th candidate, selecting it; empty if out of range.
    pub fn top_city_name_at(&mut self, n: usize) -> Result<String> {
        if n >= self.candidates.len() {
            return Ok(String::new());
        }
        self.select_nth_top_city(n);
        self.selected_city_name()
    }

    // -------------------------------------------------------------------------
    // PROJECTIONS OF THE SELECTED CITY
    // -------------------------------------------------------------------------

    fn project<T>(&self, unset: T, read: impl FnOnce(usize) -> Result<T>) -> Result<T> {
        match self.selected {
            Some(index) => read(index),
            None => Ok(unset),
        }
    }

    pub fn selected_city_name(&self) -> Result<String> {
        self.project(String::new(), |i| {
            Ok(self.store.display_name(i)?.to_string())
        })
    }

    pub fn selected_city_region_name(&self) -> Result<String> {
        self.project(String::new(), |i| self.store.region_name(i))
    }

    pub fn selected_city_tz_name(&self) -> Result<String> {
        self.project(String::new(), |i| Ok(self.store.city_tz_name(i)?.to_string()))
    }

    pub fn selected_city_country_code(&self) -> Result<String> {
        self.project(String::new(), |i| self.store.city_country_code(i))
    }

    pub fn selected_city_latitude(&self) -> Result<Option<f32>> {
        self.project(None, |i| self.store.latitude(i).map(Some))
    }

    pub fn selected_city_longitude(&self) -> Result<Option<f32>> {
        self.project(None, |i| self.store.longitude(i).map(Some))
    }

    pub fn selected_city_population(&self) -> Result<Option<u32>> {
        self.project(None, |i| self.store.population(i).map(Some))
    }

    pub fn selected_city_valid_for_slot(&self, offset_hours: i32) -> Result<bool> {
        self.project(false, |i| self.engine().valid_city(i, offset_hours))
    }

    pub fn selected_city_inclusion_class(&self, offset_hours: i32) -> Result<SlotInclusionClass> {
        self.project(SlotInclusionClass::NotIncluded, |i| {
            self.engine().inclusion_class_for_slot(i, offset_hours)
        })
    }

    pub fn selected_city_region_confidence(&self, state: &str, country: &str, code: &str) -> Result<u8> {
        let query = AddressQuery::new(state, country, code);
        self.project(0, |i| self.engine().region_match_confidence(i, &query))
    }

    /// Everything about the selected city in one record.
    pub fn selected_city_info(&self) -> Result<Option<CityInfo>> {
        self.project(None, |i| self.city_info(i).map(Some))
    }

    pub fn city_info(&self, index: usize) -> Result<CityInfo> {
        let city = self.store.city(index)?;
        let (primary_slot, secondary_slot) = self.engine().slots_for_city(index)?;
        Ok(CityInfo {
            index,
            name: self.store.display_name(index)?.to_string(),
            region_name: self.store.region_name(index)?,
            country_code: self.store.city_country_code(index)?,
            tz_name: self.store.city_tz_name(index)?.to_string(),
            latitude: city.latitude,
            longitude: city.longitude,
            population: city.population,
            primary_slot,
            secondary_slot,
        })
    }

    // -------------------------------------------------------------------------
    // ZONE HELPERS
    // -------------------------------------------------------------------------

    pub fn tz_center_for_zone(&self, zone: &str) -> Result<i16> {
        self.engine().tz_center_for_zone(zone)
    }

    pub fn valid_tz(&self, zone: &str, offset_hours: i32) -> Result<bool> {
        self.engine().valid_tz(zone, offset_hours)
    }
}
