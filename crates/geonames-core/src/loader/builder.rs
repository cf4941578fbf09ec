// crates/geonames-core/src/loader/builder.rs
#![cfg(feature = "builder")]

use super::common_io;
use super::packed::{code_to_packed, encode_packed, StringTable};
use super::{ColumnKind, ColumnSet};
use crate::error::{GeoError, Result};
use crate::model::{CityData, RegionDesc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use tracing::info;

#[cfg(feature = "compact")]
use flate2::{write::GzEncoder, Compression};

// -----------------------------------------------------------------------------
// CONFIGURATION
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMode {
    Gzip,
    None,
}

impl CompressionMode {
    /// Gzip for `.gz` paths, plain otherwise.
    pub fn for_path(path: &Path) -> Self {
        if common_io::is_gzip_path(path) {
            CompressionMode::Gzip
        } else {
            CompressionMode::None
        }
    }
}

// -----------------------------------------------------------------------------
// RAW INPUT
// -----------------------------------------------------------------------------

/// One city as it comes out of the upstream gazetteer export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCity {
    /// ASCII search form.
    pub name: String,
    pub alternate_names: Vec<String>,
    /// UTF-8 display form, when it differs from `name`.
    pub display_name: Option<String>,
    pub population: u32,
    pub latitude: f32,
    pub longitude: f32,
    pub country_code: String,
    pub country_name: String,
    /// Country-qualified admin1 code, e.g. `US.CA`.
    pub admin1_code: String,
    pub admin1_name: String,
    pub admin2_name: String,
    pub timezone: String,
}

impl RawCity {
    pub fn new(name: &str, latitude: f32, longitude: f32, population: u32, timezone: &str) -> Self {
        Self {
            name: name.to_string(),
            latitude,
            longitude,
            population,
            timezone: timezone.to_string(),
            ..Self::default()
        }
    }

    pub fn with_country(mut self, code: &str, name: &str) -> Self {
        self.country_code = code.to_string();
        self.country_name = name.to_string();
        self
    }

    pub fn with_admin1(mut self, code: &str, name: &str) -> Self {
        self.admin1_code = code.to_string();
        self.admin1_name = name.to_string();
        self
    }

    pub fn with_admin2(mut self, name: &str) -> Self {
        self.admin2_name = name.to_string();
        self
    }

    pub fn with_alternates(mut self, names: &[&str]) -> Self {
        self.alternate_names = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_display_name(mut self, name: &str) -> Self {
        self.display_name = Some(name.to_string());
        self
    }

    /// `name[+alternate...][+display]`. Readers take the last component as
    /// the display form, so it is only omitted for a lone `name` that is
    /// already its own display form.
    pub fn compound_name(&self) -> String {
        let display = self.display_name.as_deref().unwrap_or(&self.name);
        if self.alternate_names.is_empty() && display == self.name {
            return self.name.clone();
        }
        let mut parts: Vec<&str> = Vec::with_capacity(2 + self.alternate_names.len());
        parts.push(&self.name);
        parts.extend(self.alternate_names.iter().map(String::as_str));
        parts.push(display);
        parts.join("+")
    }
}

/// Reads a JSON array of [`RawCity`] (`.json` or `.json.gz`).
#[cfg(feature = "json")]
pub fn load_raw_json(path: impl AsRef<Path>) -> Result<Vec<RawCity>> {
    let reader = common_io::open_stream(path.as_ref())?;
    serde_json::from_reader(reader).map_err(GeoError::Json)
}

// -----------------------------------------------------------------------------
// BUILDER
// -----------------------------------------------------------------------------

/// Assigns dense `i16` ids to distinct keys in first-seen order.
#[derive(Debug, Default)]
struct Interner<K> {
    ids: HashMap<K, i16>,
    order: Vec<K>,
}

impl<K: std::hash::Hash + Eq + Clone> Interner<K> {
    fn intern(&mut self, table: &str, key: K) -> Result<i16> {
        if let Some(id) = self.ids.get(&key) {
            return Ok(*id);
        }
        let id = i16::try_from(self.order.len())
            .map_err(|_| GeoError::InvalidData(format!("too many distinct {table} entries")))?;
        self.ids.insert(key.clone(), id);
        self.order.push(key);
        Ok(id)
    }
}

/// Packs [`RawCity`] records into the column layouts the store reads.
#[derive(Debug, Clone, Default)]
pub struct DatasetBuilder {
    cities: Vec<RawCity>,
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cities(cities: Vec<RawCity>) -> Self {
        Self { cities }
    }

    pub fn push(&mut self, city: RawCity) -> &mut Self {
        self.cities.push(city);
        self
    }

    pub fn with_city(mut self, city: RawCity) -> Self {
        self.cities.push(city);
        self
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn build(&self) -> Result<ColumnSet> {
        let mut city_data = Vec::with_capacity(self.cities.len());
        let mut name_blob = Vec::new();
        let mut name_offsets = Vec::with_capacity(self.cities.len());
        let mut city_regions = Vec::with_capacity(self.cities.len());
        let mut city_tzs = Vec::with_capacity(self.cities.len());

        // Countries are keyed by code, admin1 by its qualified code, admin2 by
        // (admin1 code, name).
        let mut countries: Interner<String> = Interner::default();
        let mut country_names: Vec<String> = Vec::new();
        let mut admin1: Interner<String> = Interner::default();
        let mut admin1_names: Vec<String> = Vec::new();
        let mut admin2: Interner<(String, String)> = Interner::default();
        let mut regions: Interner<(i16, i16, i16)> = Interner::default();
        let mut timezones: Interner<String> = Interner::default();

        for city in &self.cities {
            city_data.push(CityData {
                population: city.population,
                latitude: city.latitude,
                longitude: city.longitude,
            });

            let offset = i32::try_from(name_blob.len())
                .map_err(|_| GeoError::InvalidData("name blob exceeds 2 GiB".into()))?;
            name_offsets.push(offset);
            name_blob.extend_from_slice(city.compound_name().as_bytes());
            name_blob.push(0);

            let country = if city.country_code.is_empty() {
                -1
            } else {
                let before = countries.order.len();
                let id = countries.intern("country", city.country_code.clone())?;
                if countries.order.len() > before {
                    country_names.push(city.country_name.clone());
                }
                id
            };
            let a1 = if city.admin1_code.is_empty() {
                -1
            } else {
                let before = admin1.order.len();
                let id = admin1.intern("admin1", city.admin1_code.clone())?;
                if admin1.order.len() > before {
                    admin1_names.push(city.admin1_name.clone());
                }
                id
            };
            let a2 = if city.admin2_name.is_empty() {
                -1
            } else {
                admin2.intern(
                    "admin2",
                    (city.admin1_code.clone(), city.admin2_name.clone()),
                )?
            };
            city_regions.push(regions.intern("region", (country, a1, a2))?);
            city_tzs.push(timezones.intern("timezone", city.timezone.clone())?);
        }

        let region_descs: Vec<RegionDesc> = regions
            .order
            .iter()
            .map(|&(country, admin1, admin2)| RegionDesc {
                country,
                admin1,
                admin2,
            })
            .collect();
        let country_codes: Vec<i16> = countries.order.iter().map(|c| code_to_packed(c)).collect();
        let admin2_names: Vec<&str> = admin2.order.iter().map(|(_, n)| n.as_str()).collect();
        let tz_blob = StringTable::encode(timezones.order.as_slice());

        let mut set = ColumnSet::new();
        set.insert(ColumnKind::CityData, encode_packed(&city_data));
        set.insert(ColumnKind::CityNames, name_blob);
        set.insert(ColumnKind::NameIndices, encode_packed(&name_offsets));
        set.insert(ColumnKind::Regions, encode_packed(&city_regions));
        set.insert(ColumnKind::RegionDescs, encode_packed(&region_descs));
        set.insert(ColumnKind::CountryNames, StringTable::encode(country_names.as_slice()));
        set.insert(ColumnKind::CountryCodes, encode_packed(&country_codes));
        set.insert(ColumnKind::Admin1Names, StringTable::encode(admin1_names.as_slice()));
        set.insert(ColumnKind::Admin1Codes, StringTable::encode(admin1.order.as_slice()));
        set.insert(ColumnKind::Admin2Names, StringTable::encode(admin2_names.as_slice()));
        set.insert(
            ColumnKind::TzNamesChecksum,
            crc32fast::hash(&tz_blob).to_ne_bytes().to_vec(),
        );
        set.insert(ColumnKind::TzIndices, encode_packed(&city_tzs));
        set.insert(ColumnKind::TzNames, tz_blob);

        info!(
            cities = self.cities.len(),
            regions = region_descs.len(),
            countries = country_names.len(),
            timezones = timezones.order.len(),
            "dataset built"
        );
        Ok(set)
    }
}

// -----------------------------------------------------------------------------
// WRITERS
// -----------------------------------------------------------------------------

impl ColumnSet {
    /// Writes one file per column into `dir`, creating it if needed.
    pub fn write_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(GeoError::Io)?;
        for (kind, bytes) in &self.columns {
            common_io::write_all(&dir.join(kind.file_name()), bytes)?;
        }
        info!(dir = %dir.display(), columns = self.columns.len(), "column files written");
        Ok(())
    }

    /// Writes the set as one bincode bundle; gzip when the path ends in `.gz`.
    pub fn write_bundle(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        write_generic(path, &self.to_bytes()?, CompressionMode::for_path(path))?;
        info!(path = %path.display(), "bundle written");
        Ok(())
    }
}

fn write_generic(path: &Path, bytes: &[u8], compression: CompressionMode) -> Result<()> {
    let writer = common_io::create_stream(path)?;

    let mut encoder: Box<dyn Write> = match compression {
        CompressionMode::Gzip => {
            #[cfg(feature = "compact")]
            {
                Box::new(GzEncoder::new(writer, Compression::default()))
            }
            #[cfg(not(feature = "compact"))]
            {
                return Err(GeoError::InvalidData(
                    "Gzip requested but 'compact' disabled".into(),
                ));
            }
        }
        CompressionMode::None => Box::new(writer),
    };

    encoder.write_all(bytes).map_err(GeoError::Io)?;
    encoder.flush().map_err(GeoError::Io)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::packed::{decode_packed, read_checksum};

    fn sample() -> DatasetBuilder {
        DatasetBuilder::new()
            .with_city(
                RawCity::new("Zurich", 47.37, 8.55, 341_730, "Europe/Zurich")
                    .with_display_name("Zürich")
                    .with_country("CH", "Switzerland")
                    .with_admin1("CH.ZH", "Zurich"),
            )
            .with_city(
                RawCity::new("Winterthur", 47.5, 8.72, 91_908, "Europe/Zurich")
                    .with_country("CH", "Switzerland")
                    .with_admin1("CH.ZH", "Zurich")
                    .with_admin2("Bezirk Winterthur"),
            )
    }

    #[test]
    fn compound_name_ends_with_display_form() {
        let plain = RawCity::new("Paris", 0.0, 0.0, 1, "Europe/Paris");
        assert_eq!(plain.compound_name(), "Paris");
        assert_eq!(plain.clone().with_display_name("Paris").compound_name(), "Paris");

        let with_alternate = plain.with_alternates(&["Lutece"]);
        assert_eq!(with_alternate.compound_name(), "Paris+Lutece+Paris");
        assert_eq!(
            with_alternate.with_display_name("Paris").compound_name(),
            "Paris+Lutece+Paris"
        );

        let accented = RawCity::new("Zurich", 0.0, 0.0, 1, "Europe/Zurich")
            .with_alternates(&["Zuerich"])
            .with_display_name("Zürich");
        assert_eq!(accented.compound_name(), "Zurich+Zuerich+Zürich");
        assert_eq!(
            crate::text::display_component(&accented.compound_name()),
            "Zürich"
        );
    }

    #[test]
    fn shared_metadata_is_interned() {
        let set = sample().build().unwrap();
        let regions: Vec<i16> =
            decode_packed(ColumnKind::Regions, set.get(ColumnKind::Regions).unwrap()).unwrap();
        assert_eq!(regions, vec![0, 1]);
        let tz = StringTable::from_bytes(set.get(ColumnKind::TzNames).unwrap());
        assert_eq!(tz.len(), 1);
        let countries = StringTable::from_bytes(set.get(ColumnKind::CountryNames).unwrap());
        assert_eq!(countries.get(0), Some("Switzerland"));
        assert_eq!(set.get(ColumnKind::CityNames).unwrap(), "Zurich+Zürich\0Winterthur\0".as_bytes());
    }

    #[test]
    fn checksum_is_crc_of_timezone_blob() {
        let set = sample().build().unwrap();
        let sum = read_checksum(set.get(ColumnKind::TzNamesChecksum).unwrap()).unwrap();
        assert_eq!(sum, crc32fast::hash(b"Europe/Zurich\0"));
    }
}
