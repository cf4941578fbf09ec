// crates/geonames-core/src/search/confidence.rs
use crate::text::{admin1_suffix, same_text};

/// Highest confidence level an address match can reach.
pub const MAX_CONFIDENCE: u8 = 2;

/// The region metadata of one city that address fields are compared against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionFields<'a> {
    pub admin1_name: &'a str,
    /// Full admin1 code such as `US.CA`.
    pub admin1_code: &'a str,
    pub country_code: &'a str,
    pub country_name: &'a str,
}

/// Address fields supplied by a caller; empty means "not given".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddressQuery<'a> {
    pub state: &'a str,
    pub country: &'a str,
    pub code: &'a str,
}

impl<'a> AddressQuery<'a> {
    pub fn new(state: &'a str, country: &'a str, code: &'a str) -> Self {
        Self {
            state,
            country,
            code,
        }
    }
}

fn code_matches(given: &str, country_code: &str) -> bool {
    !country_code.is_empty()
        && !given.is_empty()
        && (same_text(given, country_code)
            || (same_text(given, "GB") && same_text(country_code, "UK")))
}

fn country_name_matches(given: &str, country_name: &str) -> bool {
    !country_name.is_empty()
        && !given.is_empty()
        && (same_text(given, country_name)
            || (same_text(given, "USA") && same_text(country_name, "United States"))
            || (same_text(given, "GB") && same_text(country_name, "United Kingdom")))
}

/// Scores 0..=2: one point each for a matching state and a matching country.
/// A field that was supplied but does not match zeroes the score.
pub fn region_match_confidence(region: &RegionFields<'_>, query: &AddressQuery<'_>) -> u8 {
    let state_code = admin1_suffix(region.admin1_code);

    let states_match = !query.state.is_empty()
        && ((!region.admin1_name.is_empty() && same_text(query.state, region.admin1_name))
            || (!state_code.is_empty() && same_text(query.state, state_code)));

    let countries_match = code_matches(query.code, region.country_code)
        || code_matches(query.country, region.country_code)
        || country_name_matches(query.country, region.country_name);

    let state_given = !query.state.is_empty();
    let country_given = !query.code.is_empty() || !query.country.is_empty();
    if (state_given && !states_match) || (country_given && !countries_match) {
        return 0;
    }

    u8::from(states_match) + u8::from(countries_match)
}
