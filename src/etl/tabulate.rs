use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use log::info;

use crate::clean::Normalizers;
use crate::config::{MissingAttributePolicy, UserConfig};
use crate::errors::Result;
use crate::etl::{remove_outputs, with_progress, ElementStream, Etl};
use crate::extract::{ExtractSummary, RecordExtractor, Records};
use crate::parse_osm::{open_osm_file, OsmElementReader};
use crate::sink::CsvSink;

pub const ETL_NAME: &str = "tabulate";

/// Streams the OSM document into the `nodes`, `ways`, `nodes_tags` and
/// `ways_tags` CSV tables.
pub struct TabulateEtl {
    input_path: PathBuf,
    normalizers: Normalizers,
    policy: MissingAttributePolicy,
    summary: Option<ExtractSummary>,
}

impl TabulateEtl {
    pub fn new(config: &UserConfig) -> TabulateEtl {
        TabulateEtl {
            input_path: config.data_path.clone(),
            normalizers: Normalizers::from_config(config),
            policy: config.missing_attributes,
            summary: None,
        }
    }

    /// Counts from the last load, if one ran.
    pub fn summary(&self) -> Option<&ExtractSummary> {
        self.summary.as_ref()
    }
}

impl Etl for TabulateEtl {
    type Input = OsmElementReader<Box<dyn BufRead>>;
    type Output = Records<ElementStream>;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn is_cached(&self, dir: &Path) -> Result<bool> {
        for path in CsvSink::table_paths(dir) {
            if !path.try_exists()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn clean(&self, dir: &Path) -> Result<()> {
        remove_outputs(&CsvSink::table_paths(dir))
    }

    fn extract(&mut self, _dir: &Path) -> Result<Self::Input> {
        open_osm_file(&self.input_path)
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        let extractor = RecordExtractor::new(self.normalizers.clone(), self.policy);
        Ok(extractor.records(with_progress(input)))
    }

    fn load(&mut self, dir: &Path, mut output: Self::Output) -> Result<()> {
        fs::create_dir_all(dir)?;
        let mut sink = CsvSink::create(dir)?;
        let written = output.write_to(&mut sink);
        drop(sink);
        if let Err(err) = written {
            // Half-written tables must not pass for a cached result.
            self.clean(dir)?;
            return Err(err);
        }

        self.summary = Some(output.summary().clone());
        Ok(())
    }

    fn log_outcome(&self) {
        if let Some(summary) = &self.summary {
            info!(etl_name = ETL_NAME, nodes = summary.nodes, ways = summary.ways,
                node_tags = summary.node_tags, way_tags = summary.way_tags,
                dropped_tags = summary.dropped_tags, carried_forward = summary.carried_forward,
                null_attributes = summary.null_attributes, skipped_elements = summary.skipped_elements;
                "Tables written");
        }
    }
}
