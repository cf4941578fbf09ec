// crates/geonames-core/src/store.rs

//! # Gazetteer Store
//!
//! All packed columns of one dataset, loaded on first use and kept until the
//! store is dropped. Each column is a [`OnceCell`]: unloaded until the first
//! request, then read without locking. Loads and the timezone-cache build are
//! serialized by a single mutex, which also holds the city-count bookkeeping
//! that every per-city column is validated against.

use crate::calendar::Environment;
use crate::common::DbStats;
use crate::error::{GeoError, Result};
use crate::loader::packed::{self, NameBlob, Packed, PackedArray, StringTable};
use crate::loader::ColumnKind;
use crate::model::{CityData, Coordinates, RegionDesc, TimezoneEntry};
use crate::text;
use crate::traits::ColumnSource;
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

// -----------------------------------------------------------------------------
// COLUMN DECODING
// -----------------------------------------------------------------------------

/// A decoded column together with how many elements it holds.
trait LoadedColumn: Sized {
    fn decode(kind: ColumnKind, bytes: Vec<u8>) -> Result<Self>;
    fn element_count(&self) -> usize;
}

impl<T: Packed> LoadedColumn for PackedArray<T> {
    fn decode(kind: ColumnKind, bytes: Vec<u8>) -> Result<Self> {
        PackedArray::decode(kind, &bytes)
    }

    fn element_count(&self) -> usize {
        self.len()
    }
}

impl LoadedColumn for StringTable {
    fn decode(_kind: ColumnKind, bytes: Vec<u8>) -> Result<Self> {
        Ok(StringTable::from_bytes(&bytes))
    }

    fn element_count(&self) -> usize {
        self.len()
    }
}

impl LoadedColumn for NameBlob {
    fn decode(_kind: ColumnKind, bytes: Vec<u8>) -> Result<Self> {
        Ok(NameBlob::new(bytes))
    }

    fn element_count(&self) -> usize {
        self.byte_count()
    }
}

impl LoadedColumn for u32 {
    fn decode(_kind: ColumnKind, bytes: Vec<u8>) -> Result<Self> {
        packed::read_checksum(&bytes)
    }

    fn element_count(&self) -> usize {
        1
    }
}

// -----------------------------------------------------------------------------
// LOAD BOOKKEEPING
// -----------------------------------------------------------------------------

#[derive(Debug, Default)]
struct LoadState {
    num_cities: Option<usize>,
    num_region_descs: Option<usize>,
    /// (column, found, expected) of the first city-count mismatch.
    mismatch: Option<(ColumnKind, usize, usize)>,
}

impl LoadState {
    fn check_usable(&self) -> Result<()> {
        match self.mismatch {
            Some((column, found, expected)) => Err(GeoError::CityCountMismatch {
                column,
                found,
                expected,
            }),
            None => Ok(()),
        }
    }

    fn record(&mut self, kind: ColumnKind, count: usize) -> Result<()> {
        if kind == ColumnKind::RegionDescs {
            self.num_region_descs = Some(count);
            return Ok(());
        }
        if !kind.is_per_city() {
            return Ok(());
        }
        match self.num_cities {
            None => {
                self.num_cities = Some(count);
                Ok(())
            }
            Some(expected) if expected == count => Ok(()),
            Some(expected) => {
                error!(column = %kind, found = count, expected, "City file mismatch");
                self.mismatch = Some((kind, count, expected));
                self.check_usable()
            }
        }
    }
}

// -----------------------------------------------------------------------------
// STORE
// -----------------------------------------------------------------------------

pub struct GazetteerStore {
    source: Arc<dyn ColumnSource>,
    env: Environment,
    load_lock: Mutex<LoadState>,
    poisoned: AtomicBool,

    city_data: OnceCell<PackedArray<CityData>>,
    city_names: OnceCell<NameBlob>,
    name_indices: OnceCell<PackedArray<i32>>,
    regions: OnceCell<PackedArray<i16>>,
    region_descs: OnceCell<PackedArray<RegionDesc>>,
    country_names: OnceCell<StringTable>,
    country_codes: OnceCell<PackedArray<i16>>,
    admin1_names: OnceCell<StringTable>,
    admin2_names: OnceCell<StringTable>,
    admin1_codes: OnceCell<StringTable>,
    tz_indices: OnceCell<PackedArray<i16>>,
    tz_names: OnceCell<StringTable>,
    tz_checksum: OnceCell<u32>,
    tz_cache: OnceCell<Vec<Option<TimezoneEntry>>>,
}

impl std::fmt::Debug for GazetteerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GazetteerStore")
            .field("source", &self.source.describe())
            .field("loaded", &self.loaded_columns())
            .finish()
    }
}

impl GazetteerStore {
    pub fn new(source: Arc<dyn ColumnSource>, env: Environment) -> Self {
        Self {
            source,
            env,
            load_lock: Mutex::new(LoadState::default()),
            poisoned: AtomicBool::new(false),
            city_data: OnceCell::new(),
            city_names: OnceCell::new(),
            name_indices: OnceCell::new(),
            regions: OnceCell::new(),
            region_descs: OnceCell::new(),
            country_names: OnceCell::new(),
            country_codes: OnceCell::new(),
            admin1_names: OnceCell::new(),
            admin2_names: OnceCell::new(),
            admin1_codes: OnceCell::new(),
            tz_indices: OnceCell::new(),
            tz_names: OnceCell::new(),
            tz_checksum: OnceCell::new(),
            tz_cache: OnceCell::new(),
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn device_location(&self) -> Coordinates {
        self.env.device_location()
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    fn state(&self) -> Result<std::sync::MutexGuard<'_, LoadState>> {
        self.load_lock.lock().map_err(|_| GeoError::LockPoisoned)
    }

    fn column<'a, T: LoadedColumn>(
        &'a self,
        cell: &'a OnceCell<T>,
        kind: ColumnKind,
    ) -> Result<&'a T> {
        if !self.poisoned.load(Ordering::Acquire) {
            if let Some(loaded) = cell.get() {
                return Ok(loaded);
            }
        }

        let mut state = self.state()?;
        state.check_usable()?;
        cell.get_or_try_init(|| {
            let bytes = self.source.read_column(kind)?;
            let byte_count = bytes.len();
            let column = T::decode(kind, bytes)?;
            let elements = column.element_count();
            if let Err(e) = state.record(kind, elements) {
                self.poisoned.store(true, Ordering::Release);
                return Err(e);
            }
            info!(column = %kind, bytes = byte_count, elements, "column loaded");
            Ok(column)
        })
    }

    /// Loads `kind` if it is not loaded yet.
    pub fn ensure_column(&self, kind: ColumnKind) -> Result<()> {
        match kind {
            ColumnKind::CityData => self.city_data().map(|_| ()),
            ColumnKind::CityNames => self.column(&self.city_names, kind).map(|_| ()),
            ColumnKind::NameIndices => self.column(&self.name_indices, kind).map(|_| ()),
            ColumnKind::Regions => self.column(&self.regions, kind).map(|_| ()),
            ColumnKind::RegionDescs => self.column(&self.region_descs, kind).map(|_| ()),
            ColumnKind::CountryNames => self.column(&self.country_names, kind).map(|_| ()),
            ColumnKind::CountryCodes => self.column(&self.country_codes, kind).map(|_| ()),
            ColumnKind::Admin1Names => self.column(&self.admin1_names, kind).map(|_| ()),
            ColumnKind::Admin2Names => self.column(&self.admin2_names, kind).map(|_| ()),
            ColumnKind::Admin1Codes => self.column(&self.admin1_codes, kind).map(|_| ()),
            ColumnKind::TzIndices => self.column(&self.tz_indices, kind).map(|_| ()),
            ColumnKind::TzNames => self.tz_names().map(|_| ()),
            ColumnKind::TzNamesChecksum => self.tz_names_checksum().map(|_| ()),
        }
    }

    /// Columns currently held in memory.
    pub fn loaded_columns(&self) -> Vec<ColumnKind> {
        let loaded = [
            self.city_data.get().is_some(),
            self.city_names.get().is_some(),
            self.name_indices.get().is_some(),
            self.regions.get().is_some(),
            self.region_descs.get().is_some(),
            self.country_names.get().is_some(),
            self.country_codes.get().is_some(),
            self.admin1_names.get().is_some(),
            self.admin2_names.get().is_some(),
            self.admin1_codes.get().is_some(),
            self.tz_indices.get().is_some(),
            self.tz_names.get().is_some(),
            self.tz_checksum.get().is_some(),
        ];
        ColumnKind::ALL
            .iter()
            .zip(loaded)
            .filter_map(|(kind, is_loaded)| is_loaded.then_some(*kind))
            .collect()
    }

    // --- Raw columns ---

    pub fn city_data(&self) -> Result<&[CityData]> {
        Ok(&self.column(&self.city_data, ColumnKind::CityData)?.items)
    }

    pub fn tz_names(&self) -> Result<&StringTable> {
        self.column(&self.tz_names, ColumnKind::TzNames)
    }

    pub fn tz_indices(&self) -> Result<&[i16]> {
        Ok(&self.column(&self.tz_indices, ColumnKind::TzIndices)?.items)
    }

    pub fn tz_names_checksum(&self) -> Result<u32> {
        self.column(&self.tz_checksum, ColumnKind::TzNamesChecksum)
            .copied()
    }

    /// Byte offset of each city's name in the name blob.
    pub fn name_offsets(&self) -> Result<&[i32]> {
        Ok(&self.column(&self.name_indices, ColumnKind::NameIndices)?.items)
    }

    pub fn name_blob(&self) -> Result<&NameBlob> {
        self.column(&self.city_names, ColumnKind::CityNames)
    }

    // --- Counts ---

    pub fn num_cities(&self) -> Result<usize> {
        Ok(self.city_data()?.len())
    }

    pub fn num_region_descs(&self) -> Result<usize> {
        Ok(self
            .column(&self.region_descs, ColumnKind::RegionDescs)?
            .len())
    }

    pub fn num_timezones(&self) -> Result<usize> {
        Ok(self.tz_names()?.len())
    }

    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            cities: self.num_cities()?,
            regions: self.num_region_descs()?,
            countries: self.column(&self.country_names, ColumnKind::CountryNames)?.len(),
            admin1: self.column(&self.admin1_names, ColumnKind::Admin1Names)?.len(),
            timezones: self.num_timezones()?,
            tz_names_checksum: self.tz_names_checksum()?,
        })
    }

    // --- Per-city reads ---

    fn check_city(&self, index: usize) -> Result<usize> {
        let count = self.num_cities()?;
        if index < count {
            Ok(index)
        } else {
            Err(GeoError::CityIndexOutOfRange { index, count })
        }
    }

    pub fn city(&self, index: usize) -> Result<CityData> {
        let cities = self.city_data()?;
        cities
            .get(index)
            .copied()
            .ok_or(GeoError::CityIndexOutOfRange {
                index,
                count: cities.len(),
            })
    }

    pub fn population(&self, index: usize) -> Result<u32> {
        Ok(self.city(index)?.population)
    }

    pub fn latitude(&self, index: usize) -> Result<f32> {
        Ok(self.city(index)?.latitude)
    }

    pub fn longitude(&self, index: usize) -> Result<f32> {
        Ok(self.city(index)?.longitude)
    }

    /// Raw bytes of the city's compound name.
    pub fn compound_name_bytes(&self, index: usize) -> Result<&[u8]> {
        let index = self.check_city(index)?;
        let offsets = self.column(&self.name_indices, ColumnKind::NameIndices)?;
        let blob = self.column(&self.city_names, ColumnKind::CityNames)?;
        let offset = offsets.items[index];
        blob.bytes_at(offset).ok_or(GeoError::TableIndexOutOfRange {
            table: "name blob",
            index: i64::from(offset),
            count: blob.byte_count(),
        })
    }

    /// Full `'+'`-separated name of the city.
    pub fn compound_name(&self, index: usize) -> Result<&str> {
        let index = self.check_city(index)?;
        let offsets = self.column(&self.name_indices, ColumnKind::NameIndices)?;
        let blob = self.column(&self.city_names, ColumnKind::CityNames)?;
        blob.name_at(offsets.items[index])
    }

    pub fn display_name(&self, index: usize) -> Result<&str> {
        Ok(text::display_component(self.compound_name(index)?))
    }

    pub fn region_index(&self, index: usize) -> Result<usize> {
        let index = self.check_city(index)?;
        let regions = self.column(&self.regions, ColumnKind::Regions)?;
        let raw = regions.items[index];
        let count = self.num_region_descs()?;
        usize::try_from(raw)
            .ok()
            .filter(|r| *r < count)
            .ok_or(GeoError::TableIndexOutOfRange {
                table: "region",
                index: i64::from(raw),
                count,
            })
    }

    pub fn region_desc(&self, index: usize) -> Result<RegionDesc> {
        let region = self.region_index(index)?;
        let descs = self.column(&self.region_descs, ColumnKind::RegionDescs)?;
        Ok(descs.items[region])
    }

    // --- Region tables ---

    fn table_entry<'a>(
        &'a self,
        cell: &'a OnceCell<StringTable>,
        kind: ColumnKind,
        table: &'static str,
        index: usize,
    ) -> Result<&'a str> {
        let strings = self.column(cell, kind)?;
        strings.get(index).ok_or(GeoError::TableIndexOutOfRange {
            table,
            index: index as i64,
            count: strings.len(),
        })
    }

    pub fn country_name(&self, country: usize) -> Result<&str> {
        self.table_entry(&self.country_names, ColumnKind::CountryNames, "country", country)
    }

    pub fn admin1_name(&self, admin1: usize) -> Result<&str> {
        self.table_entry(&self.admin1_names, ColumnKind::Admin1Names, "admin1", admin1)
    }

    pub fn admin2_name(&self, admin2: usize) -> Result<&str> {
        self.table_entry(&self.admin2_names, ColumnKind::Admin2Names, "admin2", admin2)
    }

    /// Admin1 code such as `US.CA`.
    pub fn admin1_code(&self, admin1: usize) -> Result<&str> {
        self.table_entry(&self.admin1_codes, ColumnKind::Admin1Codes, "admin1 code", admin1)
    }

    /// Two-letter code of the country at `country`.
    pub fn country_code(&self, country: usize) -> Result<String> {
        let codes = self.column(&self.country_codes, ColumnKind::CountryCodes)?;
        codes
            .get(country)
            .map(|packed| packed::code_from_packed(*packed))
            .ok_or(GeoError::TableIndexOutOfRange {
                table: "country code",
                index: country as i64,
                count: codes.len(),
            })
    }

    /// Two-letter country code of the city, empty if it has no country.
    pub fn city_country_code(&self, index: usize) -> Result<String> {
        match self.region_desc(index)?.country_index() {
            Some(country) => self.country_code(country),
            None => Ok(String::new()),
        }
    }

    /// Admin2, admin1 and country display names joined with ", ", skipping
    /// levels that are absent or empty.
    pub fn region_name(&self, index: usize) -> Result<String> {
        let desc = self.region_desc(index)?;
        let mut parts = Vec::with_capacity(3);
        if let Some(admin2) = desc.admin2_index() {
            parts.push(self.admin2_name(admin2)?);
        }
        if let Some(admin1) = desc.admin1_index() {
            parts.push(self.admin1_name(admin1)?);
        }
        if let Some(country) = desc.country_index() {
            parts.push(self.country_name(country)?);
        }
        parts.retain(|p| !p.is_empty());
        Ok(parts.join(", "))
    }

    // --- Timezones ---

    pub fn tz_index_for_city(&self, index: usize) -> Result<usize> {
        let index = self.check_city(index)?;
        let raw = self.tz_indices()?[index];
        let count = self.num_timezones()?;
        usize::try_from(raw)
            .ok()
            .filter(|t| *t < count)
            .ok_or(GeoError::TableIndexOutOfRange {
                table: "timezone",
                index: i64::from(raw),
                count,
            })
    }

    pub fn timezone_name(&self, tz_index: usize) -> Result<&str> {
        self.table_entry(&self.tz_names, ColumnKind::TzNames, "timezone", tz_index)
    }

    pub fn city_tz_name(&self, index: usize) -> Result<&str> {
        self.timezone_name(self.tz_index_for_city(index)?)
    }

    /// Position of `name` in the unique timezone-name table.
    pub fn tz_index_for_name(&self, name: &str) -> Result<Option<usize>> {
        Ok(self.tz_names()?.position(name))
    }

    /// Offset summary per unique timezone name, built on first use from the
    /// calendar and clock. Names the calendar does not know map to `None`.
    pub fn timezones(&self) -> Result<&[Option<TimezoneEntry>]> {
        if let Some(cache) = self.tz_cache.get() {
            return Ok(cache);
        }
        let names = self.tz_names()?;
        self.tz_indices()?;

        let state = self.state()?;
        state.check_usable()?;
        let cache = self.tz_cache.get_or_init(|| {
            let now = self.env.now();
            let calendar = self.env.calendar.as_ref();
            let entries: Vec<_> = names
                .iter()
                .map(|name| {
                    let entry = TimezoneEntry::resolve(calendar, name, now);
                    if entry.is_none() {
                        warn!(zone = name, "timezone not known to the calendar");
                    }
                    entry
                })
                .collect();
            info!(
                zones = entries.len(),
                resolved = entries.iter().filter(|e| e.is_some()).count(),
                "timezone cache generated"
            );
            entries
        });
        drop(state);
        Ok(cache)
    }

    pub fn timezone_entry(&self, tz_index: usize) -> Result<Option<TimezoneEntry>> {
        let cache = self.timezones()?;
        cache
            .get(tz_index)
            .copied()
            .ok_or(GeoError::TableIndexOutOfRange {
                table: "timezone",
                index: tz_index as i64,
                count: cache.len(),
            })
    }

    pub fn city_timezone(&self, index: usize) -> Result<Option<TimezoneEntry>> {
        self.timezone_entry(self.tz_index_for_city(index)?)
    }
}
