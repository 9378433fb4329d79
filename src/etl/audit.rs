use std::fs::{self, File};
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::audit::{AuditAccumulator, AuditReport};
use crate::config::UserConfig;
use crate::errors::Result;
use crate::etl::{remove_outputs, with_progress, Etl};
use crate::parse_osm::{open_osm_file, OsmElementReader};

pub const ETL_NAME: &str = "audit";
pub const OUTPUT_FILE_NAME: &str = "audit.json";

/// Number of offending values spelled out in the log summary.
const LOGGED_EXAMPLES: usize = 10;

/// Second, read-only pass collecting data-quality tallies and the element
/// survey into `audit.json`.
pub struct AuditEtl {
    input_path: PathBuf,
    config: UserConfig,
    report: Option<AuditReport>,
}

impl AuditEtl {
    fn output_path(dir: &Path) -> PathBuf {
        dir.join(OUTPUT_FILE_NAME)
    }

    pub fn new(config: &UserConfig) -> AuditEtl {
        AuditEtl {
            input_path: config.data_path.clone(),
            config: config.clone(),
            report: None,
        }
    }

    pub fn report(&self) -> Option<&AuditReport> {
        self.report.as_ref()
    }

}

impl Etl for AuditEtl {
    type Input = OsmElementReader<Box<dyn BufRead>>;
    type Output = AuditReport;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn is_cached(&self, dir: &Path) -> Result<bool> {
        Ok(Self::output_path(dir).try_exists()?)
    }

    fn clean(&self, dir: &Path) -> Result<()> {
        remove_outputs(&[Self::output_path(dir)])
    }

    fn extract(&mut self, _dir: &Path) -> Result<Self::Input> {
        open_osm_file(&self.input_path)
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        AuditAccumulator::from_config(&self.config).run(with_progress(input))
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        fs::create_dir_all(dir)?;
        let mut writer = BufWriter::new(File::create(Self::output_path(dir))?);
        serde_json::to_writer_pretty(&mut writer, &output)?;
        writer.flush()?;

        self.report = Some(output);
        Ok(())
    }

    fn log_outcome(&self) {
        let Some(report) = &self.report else {
            return;
        };
        let tally = &report.tally;
        info!(etl_name = ETL_NAME,
            invalid_zipcodes = tally.invalid_zipcodes.len(),
            unexpected_street_suffixes = tally.unexpected_street_suffixes.len(),
            contributors = report.survey.contributor_count(),
            surveyed_keys = report.survey.key_values.len();
            "Audit finished");
        for (zipcode, count) in tally.invalid_zipcodes.iter().take(LOGGED_EXAMPLES) {
            warn!(zipcode = zipcode.as_str(), count = *count; "Invalid zipcode");
        }
        for (suffix, names) in tally.unexpected_street_suffixes.iter().take(LOGGED_EXAMPLES) {
            warn!(suffix = suffix.as_str(), streets = names.len(); "Unexpected street suffix");
        }
    }
}
