use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;

static STREET_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b\S+\.?$").expect("valid regex"));

pub fn default_abbreviations() -> BTreeMap<String, String> {
    [
        ("Av", "Avenue"),
        ("Av.", "Avenue"),
        ("Ave", "Avenue"),
        ("Ave.", "Avenue"),
        ("Blvd", "Boulevard"),
        ("Dr", "Drive"),
        ("dr", "Drive"),
        ("DR", "Drive"),
        ("Dr.", "Drive"),
        ("Hwy", "Highway"),
        ("Ln", "Lane"),
        ("Pl", "Place"),
        ("Rd", "Road"),
        ("ST", "Street"),
        ("St", "Street"),
        ("Sq", "Square"),
        ("St.", "Street"),
        ("Ter", "Terrace"),
        ("Ct", "Court"),
        ("CT", "Court"),
        ("center", "Center"),
    ]
    .into_iter()
    .map(|(abbreviation, canonical)| (abbreviation.to_string(), canonical.to_string()))
    .collect()
}

pub fn default_expected_suffixes() -> Vec<String> {
    [
        "Street", "Avenue", "Boulevard", "Drive", "Court", "Place", "Square", "Lane", "Road",
        "Trail", "Parkway", "Commons", "Ring Road", "Route", "Alley", "Circle", "Terrace", "Way",
        "Highway",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetNames {
    abbreviations: BTreeMap<String, String>,
}

impl Default for StreetNames {
    fn default() -> Self {
        StreetNames::new(default_abbreviations())
    }
}

impl StreetNames {
    pub fn new(abbreviations: BTreeMap<String, String>) -> Self {
        StreetNames { abbreviations }
    }

    /// Expands an abbreviated last token (`St.` -> `Street`) and title-cases
    /// the whole name.
    pub fn normalize(&self, raw: &str) -> String {
        let mut tokens: Vec<&str> = raw.split_whitespace().collect();
        if let Some(last) = tokens.last_mut() {
            if let Some(canonical) = self.abbreviations.get(*last) {
                *last = canonical.as_str();
            }
        }
        title_case(&tokens.join(" "))
    }
}

/// Uppercases the first letter of every run of letters and lowercases the
/// rest, so `o'hara` becomes `O'Hara` and `3rd` becomes `3Rd`.
fn title_case(text: &str) -> String {
    let mut titled = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if in_word {
            titled.extend(c.to_lowercase());
        } else {
            titled.extend(c.to_uppercase());
        }
        in_word = c.is_alphabetic();
    }
    titled
}

/// The trailing street type token of a name, e.g. `Ave.` in `Forbes Ave.`.
pub fn street_type(name: &str) -> Option<&str> {
    STREET_TYPE.find(name).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_abbreviated_suffix() {
        let streets = StreetNames::default();
        assert_eq!(streets.normalize("123 Main St."), "123 Main Street");
        assert_eq!(streets.normalize("Forbes Ave"), "Forbes Avenue");
        assert_eq!(streets.normalize("Penn Circle DR"), "Penn Circle Drive");
        assert_eq!(streets.normalize("Shopping center"), "Shopping Center");
    }

    #[test]
    fn title_cases_without_substitution() {
        let streets = StreetNames::default();
        assert_eq!(streets.normalize("WOODLAND road"), "Woodland Road");
        assert_eq!(streets.normalize("  liberty   avenue "), "Liberty Avenue");
        assert_eq!(streets.normalize(""), "");
    }

    #[test]
    fn only_last_token_is_substituted_case_sensitively() {
        let streets = StreetNames::default();
        assert_eq!(streets.normalize("St Clair Way"), "St Clair Way");
        assert_eq!(streets.normalize("Main st"), "Main St");
    }

    #[test]
    fn mapped_suffix_ends_with_canonical_form() {
        let streets = StreetNames::default();
        for (abbreviation, canonical) in default_abbreviations() {
            let normalized = streets.normalize(&format!("Some Place {abbreviation}"));
            assert_eq!(normalized.rsplit(' ').next(), Some(title_case(&canonical).as_str()));
        }
    }

    #[test]
    fn every_letter_run_starts_a_word() {
        let streets = StreetNames::default();
        assert_eq!(streets.normalize("o'hara st"), "O'Hara St");
        assert_eq!(streets.normalize("Lebanon-bethel Rd"), "Lebanon-Bethel Road");
        assert_eq!(streets.normalize("north 3rd ST"), "North 3Rd Street");
        assert_eq!(streets.normalize("McKNIGHT rd"), "Mcknight Rd");
    }

    #[test]
    fn finds_street_type() {
        assert_eq!(street_type("Forbes Ave."), Some("Ave."));
        assert_eq!(street_type("Fifth Avenue"), Some("Avenue"));
        assert_eq!(street_type("Main Street "), None);
        assert_eq!(street_type(""), None);
    }
}
