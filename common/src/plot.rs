use core::fmt::Debug;
use std::path::Path;

use dyn_clone::{DynClone, clone_trait_object};
use eyre::{Report, Result, WrapErr};
use tracing::debug;

use crate::{
    config::Settings,
    error::DataLoadError,
    series::{ResultSeries, load_all},
};

#[typetag::serde(tag = "type")]
pub trait Plot: Debug + DynClone {
    /// Identifier used in logs and by `kvs-plots list`
    fn name(&self) -> &'static str;
    /// Benchmark script that produces this plot's input, suggested when input is missing
    fn benchmark_script(&self) -> &'static str;
    /// Loads the input, renders the figure and prints the summary
    ///
    /// Arguments:
    /// * `settings` - Output directory, global annotate switch and display mode
    fn plot(&self, settings: &Settings) -> Result<()>;
}
clone_trait_object!(Plot);

/// Loads every input, adding a hint to run `script` when a file is missing
pub fn load_inputs<P: AsRef<Path>>(paths: &[P], script: &str) -> Result<Vec<ResultSeries>> {
    match load_all(paths) {
        Ok(series) => {
            for s in &series {
                println!("Loaded {} data points from {}", s.len(), s.source().display());
            }
            Ok(series)
        }
        Err(err @ DataLoadError::NotFound(_)) => {
            Err(Report::new(err).wrap_err(format!("Run the benchmark script first: {script}")))
        }
        Err(err) => Err(err.into()),
    }
}

pub fn plot(plots: &[Box<dyn Plot>], settings: &Settings) -> Result<()> {
    if plots.is_empty() {
        debug!("No plots");
        return Ok(());
    }

    for plot in plots {
        debug!("Running plot {}", plot.name());
        plot.plot(settings)
            .wrap_err_with(|| format!("Plot {} failed", plot.name()))?;
    }
    Ok(())
}
