use std::path::PathBuf;

use common::{
    BATCH_SIZE, THROUGHPUT,
    chart::{Chart, Figure, render},
    config::Settings,
    plot::{Plot, load_inputs},
    series::ResultSeries,
    summary::{PeakMetric, Summary, XPhrase, summarize},
};
use eyre::{ContextCompat, Result};
use plotters::style::GREEN;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_INPUT: &str = "batch_scaling_results.csv";
pub const DEFAULT_OUTPUT: &str = "batch_scaling_plot.png";

/// Throughput against batch size for a single run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchScaling {
    pub input: PathBuf,
    pub output: PathBuf,
    pub annotate: bool,
}

impl Default for BatchScaling {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            annotate: true,
        }
    }
}

#[typetag::serde]
impl Plot for BatchScaling {
    fn name(&self) -> &'static str {
        "batch-scaling"
    }

    fn benchmark_script(&self) -> &'static str {
        "./benchmark-batch.sh"
    }

    fn plot(&self, settings: &Settings) -> Result<()> {
        let series = load_inputs(&[&self.input], self.benchmark_script())?
            .into_iter()
            .next()
            .context("No batch scaling results loaded")?;
        debug!("{} batch sizes in {}", series.len(), self.input.display());

        render(&self.figure(series.clone(), settings))?;
        print!("\n{}", self.summary(&series)?);
        Ok(())
    }
}

impl BatchScaling {
    pub fn figure(&self, series: ResultSeries, settings: &Settings) -> Figure {
        let chart = Chart::new(BATCH_SIZE, THROUGHPUT)
            .labels("Batch Size", "Throughput (ops/s)")
            .title("KVS Batch Size Scaling: Throughput vs Batch Size")
            .annotate(self.annotate && settings.annotate)
            .color(GREEN)
            .with_series(series);
        Figure::new(settings.output_target(&self.output))
            .size(1000, 600)
            .with_chart(chart)
    }

    pub fn summary(&self, series: &ResultSeries) -> Result<Summary> {
        Ok(summarize(
            series,
            BATCH_SIZE,
            &[PeakMetric::throughput(XPhrase::Prefix("batch size"))],
        )?)
    }
}
