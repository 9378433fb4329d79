use std::fmt;

use serde::{Deserialize, Serialize};

/// Inclusive range of postal codes accepted for the mapped region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZipCodeRange {
    pub min: u64,
    pub max: u64,
}

impl Default for ZipCodeRange {
    fn default() -> Self {
        // Pittsburgh metropolitan area.
        ZipCodeRange {
            min: 15001,
            max: 16263,
        }
    }
}

/// Output of [`ZipCodeRange::normalize`]. `Invalid` renders as the sentinel `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostalCode {
    Valid(u64),
    Invalid,
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostalCode::Valid(code) => write!(f, "{code}"),
            PostalCode::Invalid => f.write_str("0"),
        }
    }
}

impl ZipCodeRange {
    pub fn contains(&self, code: u64) -> bool {
        self.min <= code && code <= self.max
    }

    /// Keeps the first run of digits, so `PA 15213-1234` becomes `15213`.
    pub fn normalize(&self, raw: &str) -> PostalCode {
        let first_run = raw
            .split(|c: char| !c.is_ascii_digit())
            .find(|run| !run.is_empty());
        match first_run.and_then(|run| run.parse::<u64>().ok()) {
            Some(code) if self.contains(code) => PostalCode::Valid(code),
            _ => PostalCode::Invalid,
        }
    }

    /// Audit check: the raw value must be a plain integer inside the range.
    pub fn accepts_raw(&self, raw: &str) -> bool {
        match raw.trim().parse::<i64>() {
            Ok(code) => u64::try_from(code).is_ok_and(|code| self.contains(code)),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_digit_run() {
        let range = ZipCodeRange::default();
        assert_eq!(range.normalize("PA 15213-1234"), PostalCode::Valid(15213));
        assert_eq!(range.normalize("15213"), PostalCode::Valid(15213));
        assert_eq!(range.normalize("015213"), PostalCode::Valid(15213));
        assert_eq!(range.normalize("15001"), PostalCode::Valid(15001));
        assert_eq!(range.normalize("16263"), PostalCode::Valid(16263));
    }

    #[test]
    fn falls_back_to_sentinel() {
        let range = ZipCodeRange::default();
        for raw in ["", "PA", "15000", "16264", "1234 15213", "99999999999999999999999"] {
            assert_eq!(range.normalize(raw), PostalCode::Invalid, "{raw}");
        }
        assert_eq!(PostalCode::Invalid.to_string(), "0");
    }

    #[test]
    fn output_is_sentinel_or_in_range_and_idempotent() {
        let range = ZipCodeRange::default();
        for raw in ["15213-1234", "Pittsburgh, PA 15222", "1", "x16000y", "15001.5", "+15220"] {
            let first = range.normalize(raw);
            match first {
                PostalCode::Valid(code) => {
                    assert!(range.contains(code));
                    assert_eq!(range.normalize(&first.to_string()), first);
                }
                PostalCode::Invalid => assert_eq!(first.to_string(), "0"),
            }
        }
    }

    #[test]
    fn raw_audit_requires_plain_integer() {
        let range = ZipCodeRange::default();
        assert!(range.accepts_raw("15213"));
        assert!(range.accepts_raw(" 15213 "));
        assert!(!range.accepts_raw("15213-1234"));
        assert!(!range.accepts_raw("PA 15213"));
        assert!(!range.accepts_raw("44101"));
        assert!(!range.accepts_raw("-15213"));
    }
}
