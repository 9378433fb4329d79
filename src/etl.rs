pub mod audit;
pub mod tabulate;

use std::io::{self, BufRead, IsTerminal};
use std::path::Path;

use log::{error, info};

use crate::data::OsmElement;
use crate::errors::Result;
use crate::parse_osm::OsmElementReader;

pub type ElementStream = Box<dyn Iterator<Item = Result<OsmElement>>>;

/// One pass over the source document. Stages whose outputs already exist in
/// the output directory are skipped until [`Etl::clean`] removes them.
pub trait Etl {
    type Input;
    type Output;

    fn etl_name(&self) -> &str;

    fn is_cached(&self, dir: &Path) -> Result<bool>;
    fn clean(&self, dir: &Path) -> Result<()>;

    fn extract(&mut self, dir: &Path) -> Result<Self::Input>;
    fn transform(&mut self, input: Self::Input) -> Result<Self::Output>;
    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()>;

    /// Logs what the last successful load produced.
    fn log_outcome(&self) {}

    fn process(&mut self, dir: &Path) -> Result<()> {
        let etl_name = self.etl_name().to_string();
        if self.is_cached(dir)? {
            info!(etl_name = etl_name.as_str(), dir = dir.display().to_string(); "Outputs present, skipping stage");
            return Ok(());
        }

        info!(etl_name = etl_name.as_str(), dir = dir.display().to_string(); "Running stage");
        let input = step_result(&etl_name, "extract", self.extract(dir))?;
        let output = step_result(&etl_name, "transform", self.transform(input))?;
        step_result(&etl_name, "load", self.load(dir, output))?;
        self.log_outcome();
        Ok(())
    }
}

fn step_result<T>(etl_name: &str, step: &str, result: Result<T>) -> Result<T> {
    result.inspect_err(|err| {
        error!(etl_name = etl_name, step = step, err = err.to_string(); "Stage step failed");
    })
}

/// Removes whichever of `paths` exist.
pub(crate) fn remove_outputs<P: AsRef<Path>>(paths: &[P]) -> Result<()> {
    for path in paths {
        let path = path.as_ref();
        if path.try_exists()? {
            std::fs::remove_file(path)?;
        }
    }
    Ok(())
}

/// Shows a progress bar over the element stream when stderr is a terminal.
pub(crate) fn with_progress(elements: OsmElementReader<Box<dyn BufRead>>) -> ElementStream {
    if io::stderr().is_terminal() {
        Box::new(tqdm::tqdm(elements))
    } else {
        Box::new(elements)
    }
}
