// crates/geonames-core/src/search/mod.rs

//! # Search Engine
//!
//! Stateless scans over a [`GazetteerStore`]. Every operation loads the
//! columns it needs on demand; candidate-producing searches write into a
//! caller-owned buffer (normally a [`crate::SearchSession`]'s).

pub mod confidence;
pub mod geo;
pub mod slots;

pub use confidence::{region_match_confidence, AddressQuery, RegionFields, MAX_CONFIDENCE};
pub use geo::{distance_km, distance_to_city, EARTH_RADIUS_KM};
pub use slots::{inclusion_class, slots_for_center, valid_tz_centered_at};

use crate::error::{GeoError, Result};
use crate::model::{CityData, Coordinates, SlotInclusionClass, TimezoneEntry};
use crate::store::GazetteerStore;
use crate::text::{self, FragmentMatcher};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info};

/// Sentinel for "nothing found yet" in the nearest-city scans.
const NO_DISTANCE: f64 = 1e20;

/// Radius around the device inside which the most populous city wins the
/// last timezone-resolution tier.
pub const NEARBY_RADIUS_KM: f64 = 15.0;

/// Exponent applied to population in the proximity rank.
const PROXIMITY_POPULATION_EXPONENT: f64 = 2.8;

/// One matching city from the last search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchCandidate {
    pub city_index: usize,
    /// Ascending sort key: proximity rank or negated population.
    pub rank: f64,
    /// Address-match confidence (0..=2); 0 for plain name searches.
    pub confidence: u8,
}

impl SearchCandidate {
    /// Higher confidence first, then ascending rank. Stable, so equal keys keep
    /// ascending city order.
    pub fn sort(candidates: &mut [SearchCandidate]) {
        candidates.sort_by(compare_candidates);
    }
}

/// Outcome of an address search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityMatchSummary {
    /// Best confidence among all matches; `None` when nothing matched.
    pub max_confidence: Option<u8>,
    /// Number of matches at each confidence level.
    pub level_counts: [usize; 3],
}

/// Which fallback step resolved a timezone name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimezoneTier {
    /// Largest city in the named zone.
    ExactName,
    /// Nearest Olson city whose zone follows the same offset schedule.
    OlsonSchedule,
    /// Nearest Olson city with the same current offset.
    OlsonOffset,
    /// Any city with the same current offset, preferring large ones nearby.
    AnyOffset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimezoneMatch {
    pub city_index: usize,
    pub tier: TimezoneTier,
}

fn proximity_rank(distance: f64, population: u32) -> f64 {
    distance / f64::from(population).powf(PROXIMITY_POPULATION_EXPONENT)
}

fn population_rank(population: u32) -> f64 {
    -f64::from(population)
}

#[derive(Debug, Clone, Copy)]
pub struct SearchEngine<'a> {
    store: &'a GazetteerStore,
}

impl<'a> SearchEngine<'a> {
    pub fn new(store: &'a GazetteerStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &'a GazetteerStore {
        self.store
    }

    // -------------------------------------------------------------------------
    // COORDINATE LOOKUPS
    // -------------------------------------------------------------------------

    /// Index of the city minimizing `score`, lowest index on ties. Scores not
    /// below the sentinel never win.
    fn min_by_score(&self, score: impl Fn(&CityData) -> f64) -> Result<Option<usize>> {
        let mut best = None;
        let mut best_score = NO_DISTANCE;
        for (i, city) in self.store.city_data()?.iter().enumerate() {
            let s = score(city);
            if s < best_score {
                best_score = s;
                best = Some(i);
            }
        }
        Ok(best)
    }

    /// The city closest to `at`.
    pub fn nearest_city(&self, at: Coordinates) -> Result<Option<usize>> {
        self.min_by_score(|city| distance_to_city(at, city))
    }

    /// The city near `at` that best balances distance against size:
    /// minimizes `distance / sqrt(population)`.
    pub fn best_match_city(&self, at: Coordinates) -> Result<Option<usize>> {
        self.min_by_score(|city| distance_to_city(at, city) / f64::from(city.population).sqrt())
    }

    // -------------------------------------------------------------------------
    // TIMEZONE RESOLUTION
    // -------------------------------------------------------------------------

    /// True if the city's display name is the city part of its own zone's
    /// Olson name (Los Angeles in America/Los_Angeles).
    pub fn is_olson_city(&self, index: usize) -> Result<bool> {
        let olson = text::olson_city_name(self.store.city_tz_name(index)?);
        Ok(olson == self.store.display_name(index)?)
    }

    pub fn best_city_for_timezone_name(&self, tz_name: &str) -> Result<Option<usize>> {
        Ok(self.resolve_timezone(tz_name)?.map(|m| m.city_index))
    }

    /// Picks a representative city for an Olson name, falling back through
    /// progressively looser tiers. The first tier that finds a city wins.
    pub fn resolve_timezone(&self, tz_name: &str) -> Result<Option<TimezoneMatch>> {
        let found = |city_index: usize, tier: TimezoneTier| -> Result<Option<TimezoneMatch>> {
            info!(zone = tz_name, city_index, ?tier, "timezone resolved");
            Ok(Some(TimezoneMatch { city_index, tier }))
        };

        if let Some(city) = self.largest_city_in_zone(tz_name)? {
            return found(city, TimezoneTier::ExactName);
        }

        let env = self.store.environment();
        let Some(target) = TimezoneEntry::resolve(env.calendar.as_ref(), tz_name, env.now()) else {
            info!(zone = tz_name, "timezone unknown to the calendar; no city");
            return Ok(None);
        };
        let device = self.store.device_location();

        if let Some(city) =
            self.nearest_matching(device, true, |entry| entry.same_schedule(&target))?
        {
            return found(city, TimezoneTier::OlsonSchedule);
        }

        if let Some(city) = self.nearest_matching(device, true, |entry| {
            entry.current_offset == target.current_offset
        })? {
            return found(city, TimezoneTier::OlsonOffset);
        }

        if let Some(city) = self.nearby_with_offset(device, target.current_offset)? {
            return found(city, TimezoneTier::AnyOffset);
        }

        info!(zone = tz_name, "no city shares the zone's offset");
        Ok(None)
    }

    fn largest_city_in_zone(&self, tz_name: &str) -> Result<Option<usize>> {
        let Some(tz_index) = self.store.tz_index_for_name(tz_name)? else {
            return Ok(None);
        };
        let cities = self.store.city_data()?;
        let tz_indices = self.store.tz_indices()?;

        let mut best: Option<(usize, u32)> = None;
        for (i, (city, tz)) in cities.iter().zip(tz_indices).enumerate() {
            if usize::try_from(*tz).ok() != Some(tz_index) {
                continue;
            }
            if best.map_or(true, |(_, pop)| city.population > pop) {
                best = Some((i, city.population));
            }
        }
        if best.is_none() {
            debug!(zone = tz_name, "zone is packaged but no city uses it");
        }
        Ok(best.map(|(i, _)| i))
    }

    fn city_entries(&self) -> Result<impl Iterator<Item = (usize, &'a CityData, Option<TimezoneEntry>)>> {
        let cities = self.store.city_data()?;
        let tz_indices = self.store.tz_indices()?;
        let cache = self.store.timezones()?;
        Ok(cities
            .iter()
            .zip(tz_indices)
            .enumerate()
            .map(move |(i, (city, tz))| {
                let entry = usize::try_from(*tz)
                    .ok()
                    .and_then(|t| cache.get(t).copied().flatten());
                (i, city, entry)
            }))
    }

    fn nearest_matching(
        &self,
        device: Coordinates,
        olson_only: bool,
        accept: impl Fn(&TimezoneEntry) -> bool,
    ) -> Result<Option<usize>> {
        let mut best = None;
        let mut best_distance = NO_DISTANCE;
        for (i, city, entry) in self.city_entries()? {
            if !entry.is_some_and(|e| accept(&e)) {
                continue;
            }
            if olson_only && !self.is_olson_city(i)? {
                continue;
            }
            let distance = distance_to_city(device, city);
            if distance < best_distance {
                best_distance = distance;
                best = Some(i);
            }
        }
        Ok(best)
    }

    /// Largest city within [`NEARBY_RADIUS_KM`] of the device sharing
    /// `offset`, else the closest such city anywhere.
    fn nearby_with_offset(&self, device: Coordinates, offset: i16) -> Result<Option<usize>> {
        let mut closest = None;
        let mut closest_distance = NO_DISTANCE;
        let mut largest_nearby: Option<(usize, u32)> = None;

        for (i, city, entry) in self.city_entries()? {
            if entry.map(|e| e.current_offset) != Some(offset) {
                continue;
            }
            let distance = distance_to_city(device, city);
            if distance < closest_distance {
                closest_distance = distance;
                closest = Some(i);
            }
            if distance < NEARBY_RADIUS_KM
                && largest_nearby.map_or(true, |(_, pop)| city.population > pop)
            {
                largest_nearby = Some((i, city.population));
            }
        }

        if largest_nearby.is_none() {
            debug!("no city within {NEARBY_RADIUS_KM} km of the device");
        }
        Ok(largest_nearby.map(|(i, _)| i).or(closest))
    }

    // -------------------------------------------------------------------------
    // NAME SEARCH
    // -------------------------------------------------------------------------

    /// Runs `matcher` over every compound name and pushes a candidate for each
    /// city `rank` accepts.
    fn collect_matches(
        &self,
        matcher: &FragmentMatcher,
        out: &mut Vec<SearchCandidate>,
        mut rank: impl FnMut(usize, &CityData) -> Result<Option<(f64, u8)>>,
    ) -> Result<()> {
        out.clear();
        let cities = self.store.city_data()?;
        let offsets = self.store.name_offsets()?;
        let blob = self.store.name_blob()?;

        let match_all = matcher.matches_all();
        for (i, (city, offset)) in cities.iter().zip(offsets).enumerate() {
            if !match_all {
                let name = blob.bytes_at(*offset).ok_or(GeoError::TableIndexOutOfRange {
                    table: "name blob",
                    index: i64::from(*offset),
                    count: blob.byte_count(),
                })?;
                if !matcher.matches(name) {
                    continue;
                }
            }
            if let Some((rank, confidence)) = rank(i, city)? {
                out.push(SearchCandidate {
                    city_index: i,
                    rank,
                    confidence,
                });
            }
        }
        SearchCandidate::sort(out);
        Ok(())
    }

    /// Cities whose name contains `fragment` at a word boundary; an empty
    /// fragment matches every city. With `proximity`, nearby large cities
    /// come first; otherwise the most populous.
    pub fn search_by_name_fragment(
        &self,
        fragment: &str,
        proximity: bool,
        out: &mut Vec<SearchCandidate>,
    ) -> Result<()> {
        let matcher = FragmentMatcher::new(fragment);
        let device = self.store.device_location();
        self.collect_matches(&matcher, out, |_, city| {
            let rank = if proximity {
                proximity_rank(distance_to_city(device, city), city.population)
            } else {
                population_rank(city.population)
            };
            Ok(Some((rank, 0)))
        })?;
        debug!(fragment, proximity, matches = out.len(), "name search");
        Ok(())
    }

    /// Like [`search_by_name_fragment`](Self::search_by_name_fragment), keeping
    /// only cities that fit world-clock slot `offset_hours`, largest first.
    pub fn search_by_name_fragment_for_tz_slot(
        &self,
        fragment: &str,
        offset_hours: i32,
        out: &mut Vec<SearchCandidate>,
    ) -> Result<()> {
        let matcher = FragmentMatcher::new(fragment);
        self.collect_matches(&matcher, out, |i, city| {
            Ok(self
                .valid_city(i, offset_hours)?
                .then(|| (population_rank(city.population), 0)))
        })?;
        debug!(fragment, offset_hours, matches = out.len(), "slot name search");
        Ok(())
    }

    /// Address search: cities named like `name`, ranked by how well their
    /// region matches `query`, then by proximity to the device.
    pub fn search_by_city(
        &self,
        name: &str,
        query: &AddressQuery<'_>,
        out: &mut Vec<SearchCandidate>,
    ) -> Result<CityMatchSummary> {
        if name.is_empty() {
            return Err(GeoError::InvalidQuery("city name must not be empty".into()));
        }
        let matcher = FragmentMatcher::new(name);
        let device = self.store.device_location();
        let mut summary = CityMatchSummary::default();

        self.collect_matches(&matcher, out, |i, city| {
            let confidence = self.region_match_confidence(i, query)?;
            summary.level_counts[usize::from(confidence)] += 1;
            summary.max_confidence = summary.max_confidence.max(Some(confidence));
            let rank = proximity_rank(distance_to_city(device, city), city.population);
            Ok(Some((rank, confidence)))
        })?;
        debug!(name, matches = out.len(), ?summary, "address search");
        Ok(summary)
    }

    // -------------------------------------------------------------------------
    // REGION CONFIDENCE
    // -------------------------------------------------------------------------

    pub fn region_match_confidence(&self, index: usize, query: &AddressQuery<'_>) -> Result<u8> {
        let desc = self.store.region_desc(index)?;

        let (admin1_name, admin1_code) = match desc.admin1_index() {
            Some(a1) => (self.store.admin1_name(a1)?, self.store.admin1_code(a1)?),
            None => ("", ""),
        };
        let (country_name, country_code) = match desc.country_index() {
            Some(c) => (self.store.country_name(c)?, self.store.country_code(c)?),
            None => ("", String::new()),
        };

        let fields = RegionFields {
            admin1_name,
            admin1_code,
            country_code: &country_code,
            country_name,
        };
        Ok(region_match_confidence(&fields, query))
    }

    // -------------------------------------------------------------------------
    // SLOTS
    // -------------------------------------------------------------------------

    /// True if the city's zone centre lies in slot `offset_hours`. Cities whose
    /// zone the calendar does not know fit no slot.
    pub fn valid_city(&self, index: usize, offset_hours: i32) -> Result<bool> {
        Ok(self
            .store
            .city_timezone(index)?
            .is_some_and(|entry| slots::valid_entry(&entry, offset_hours)))
    }

    pub fn inclusion_class_for_slot(
        &self,
        index: usize,
        offset_hours: i32,
    ) -> Result<SlotInclusionClass> {
        Ok(match self.store.city_timezone(index)? {
            Some(entry) => inclusion_class(&entry, offset_hours),
            None => SlotInclusionClass::NotIncluded,
        })
    }

    /// Primary and secondary world-clock slots of a city. Slot hours are
    /// scanned from 23 down to 0; a pair that is not adjacent keeps only the
    /// primary, except 23/0 which wraps to primary 0, secondary 23.
    pub fn slots_for_city(&self, index: usize) -> Result<(Option<u8>, Option<u8>)> {
        let Some(entry) = self.store.city_timezone(index)? else {
            return Ok((None, None));
        };
        let found = slots_for_center(i32::from(entry.center()));
        if found.len() > 2 {
            debug!(city = index, slots = ?found, "city fits more than two slots; extra ignored");
        }
        Ok(match found.as_slice() {
            [] => (None, None),
            [only] => (Some(*only), None),
            [23, 0, ..] => (Some(0), Some(23)),
            [primary, secondary, ..] if *secondary + 1 == *primary => {
                (Some(*primary), Some(*secondary))
            }
            [primary, ..] => (Some(*primary), None),
        })
    }

    /// Centre of `zone`'s offset range in minutes, from the calendar now.
    pub fn tz_center_for_zone(&self, zone: &str) -> Result<i16> {
        let env = self.store.environment();
        TimezoneEntry::resolve(env.calendar.as_ref(), zone, env.now())
            .map(|entry| entry.center())
            .ok_or_else(|| GeoError::UnknownTimezone(zone.to_string()))
    }

    pub fn valid_tz(&self, zone: &str, offset_hours: i32) -> Result<bool> {
        Ok(valid_tz_centered_at(
            i32::from(self.tz_center_for_zone(zone)?),
            offset_hours,
        ))
    }
}

/// Result order: confidence descending, then rank ascending.
pub fn compare_candidates(a: &SearchCandidate, b: &SearchCandidate) -> Ordering {
    b.confidence
        .cmp(&a.confidence)
        .then_with(|| a.rank.total_cmp(&b.rank))
}
