// crates/geonames-core/src/text.rs
//! Text helpers for compound city names and free-text query fields.
//!
//! A compound name is one or more `'+'`-separated components: the ASCII search
//! form first, then alternates, then the UTF-8 display form. A name with no
//! alternates omits the display form when it equals the search form.

use deunicode::deunicode;

/// Normalizes a string into a comparison key (transliterated, lowercase).
pub fn fold_key(s: &str) -> String {
    deunicode(s).to_lowercase()
}

/// Case-insensitive equality that also accepts matching transliterations
/// ("Zürich" == "zurich").
pub fn same_text(a: &str, b: &str) -> bool {
    if a.eq_ignore_ascii_case(b) {
        return true;
    }
    if a.is_ascii() && b.is_ascii() {
        return false;
    }
    fold_key(a) == fold_key(b)
}

/// True if `fragment` occurs in `compound` (ASCII case-insensitively) at the
/// start of the name or right after a space or `'+'`. Every occurrence is
/// tried, including overlapping ones.
pub fn fragment_matches(compound: &[u8], fragment: &[u8]) -> bool {
    if fragment.is_empty() {
        return true;
    }
    if fragment.len() > compound.len() {
        return false;
    }
    (0..=compound.len() - fragment.len()).any(|start| {
        let at_boundary = start == 0 || matches!(compound[start - 1], b' ' | b'+');
        at_boundary && compound[start..start + fragment.len()].eq_ignore_ascii_case(fragment)
    })
}

/// A prepared name-fragment query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentMatcher {
    raw: String,
    folded: Option<String>,
}

impl FragmentMatcher {
    pub fn new(fragment: &str) -> Self {
        let folded = if fragment.is_ascii() {
            None
        } else {
            Some(deunicode(fragment)).filter(|f| f != fragment && !f.is_empty())
        };
        Self {
            raw: fragment.to_string(),
            folded,
        }
    }

    pub fn matches_all(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn matches(&self, compound: &[u8]) -> bool {
        fragment_matches(compound, self.raw.as_bytes())
            || self
                .folded
                .as_deref()
                .is_some_and(|f| fragment_matches(compound, f.as_bytes()))
    }
}

/// The display form: the last `'+'` component.
pub fn display_component(compound: &str) -> &str {
    compound.rsplit('+').next().unwrap_or(compound)
}

/// City part of an Olson name: `America/Port_of_Spain` -> `Port of Spain`.
pub fn olson_city_name(tz_name: &str) -> String {
    tz_name
        .rsplit('/')
        .next()
        .unwrap_or(tz_name)
        .replace('_', " ")
}

/// State suffix of an admin1 code: `US.CA` -> `CA`.
pub fn admin1_suffix(code: &str) -> &str {
    match code.get(3..) {
        Some(rest) => rest.get(..2).unwrap_or(rest),
        None => "",
    }
}
