use std::{collections::BTreeMap, fs::File, io::BufReader, path::{Path, PathBuf}};

use serde::Deserialize;

use crate::clean::{
    landuse::{default_land_use_table, LandUse},
    street::{default_abbreviations, default_expected_suffixes},
    ZipCodeRange,
};
use crate::errors::{Error, Result};

/// How a primary-element column is filled when its attribute is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingAttributePolicy {
    /// Carry the previous element's value of the same column forward.
    #[default]
    ForwardFill,
    /// Leave the column null.
    Null,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UserConfig {
    pub data_path: PathBuf,
    pub dest_path: PathBuf,
    pub log_level: String,
    pub missing_attributes: MissingAttributePolicy,
    pub zip_codes: ZipCodeRange,
    pub street_abbreviations: BTreeMap<String, String>,
    pub expected_street_suffixes: Vec<String>,
    pub land_use: BTreeMap<String, LandUse>,
}

impl Default for UserConfig {
    fn default() -> Self {
        UserConfig {
            data_path: PathBuf::from("data/pittsburgh_pennsylvania.osm"),
            dest_path: PathBuf::from("output"),
            log_level: "info".to_string(),
            missing_attributes: MissingAttributePolicy::default(),
            zip_codes: ZipCodeRange::default(),
            street_abbreviations: default_abbreviations(),
            expected_street_suffixes: default_expected_suffixes(),
            land_use: default_land_use_table(),
        }
    }
}

impl UserConfig {
    pub fn validate(&self) -> Result<()> {
        if self.zip_codes.min > self.zip_codes.max {
            return Err(Error::config(format!(
                "zip_codes.min ({}) is greater than zip_codes.max ({})",
                self.zip_codes.min, self.zip_codes.max
            )));
        }
        Ok(())
    }
}

pub fn load_user_config(path: &Path) -> Result<UserConfig> {
    let file = File::open(path).map_err(|err| {
        Error::config(format!("could not open {}: {err}", path.display()))
    })?;
    let config: UserConfig = serde_json::from_reader(BufReader::new(file)).map_err(|err| {
        Error::config(format!("could not parse {}: {err}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}
