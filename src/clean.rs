//! Tag key classification and the value normalizers applied while
//! tabulating. Lookup tables are owned by the normalizer values, so every
//! normalizer is a pure function of its configuration and input.

pub mod classify;
pub mod landuse;
pub mod street;
pub mod zipcode;

pub use classify::{classify, is_well_formed, KeyClass};
pub use landuse::{LandUse, LandUseTable};
pub use street::{street_type, StreetNames};
pub use zipcode::{PostalCode, ZipCodeRange};

use crate::config::UserConfig;
use crate::data::TagValue;

pub const POSTCODE_KEY: &str = "addr:postcode";
pub const STREET_KEY: &str = "addr:street";
pub const BUILDING_KEY: &str = "building";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalizers {
    pub zip_codes: ZipCodeRange,
    pub streets: StreetNames,
    pub land_use: LandUseTable,
}

impl Normalizers {
    pub fn from_config(config: &UserConfig) -> Self {
        Normalizers {
            zip_codes: config.zip_codes,
            streets: StreetNames::new(config.street_abbreviations.clone()),
            land_use: LandUseTable::new(config.land_use.clone()),
        }
    }

    pub fn normalize_zip(&self, raw: &str) -> PostalCode {
        self.zip_codes.normalize(raw)
    }

    pub fn normalize_street(&self, raw: &str) -> String {
        self.streets.normalize(raw)
    }

    pub fn normalize_landuse(&self, raw: &str) -> LandUse {
        self.land_use.normalize(raw)
    }

    /// Picks the normalizer by exact key; other values pass through untouched.
    pub fn normalize_value(&self, raw_key: &str, raw_value: &str) -> TagValue {
        match raw_key {
            POSTCODE_KEY => TagValue::PostalCode(self.normalize_zip(raw_value)),
            STREET_KEY => TagValue::Text(self.normalize_street(raw_value)),
            BUILDING_KEY => TagValue::LandUse(self.normalize_landuse(raw_value)),
            _ => TagValue::Text(raw_value.to_string()),
        }
    }
}
