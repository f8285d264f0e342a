use std::path::PathBuf;

use common::{
    EFFICIENCY, NUM_CLIENTS, THROUGHPUT,
    chart::{Chart, Figure, render},
    config::Settings,
    plot::{Plot, load_inputs},
    series::{DerivedColumn, ResultSeries, compute_derived_column},
    summary::{PeakMetric, Summary, XPhrase, summarize},
};
use eyre::{ContextCompat, Result};
use plotters::style::{BLUE, RED};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_INPUT: &str = "client_scaling_results.csv";
pub const DEFAULT_OUTPUT: &str = "client_scaling_plot.png";

/// Throughput and per-client efficiency against the number of clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientScaling {
    pub input: PathBuf,
    pub output: PathBuf,
    pub annotate: bool,
}

impl Default for ClientScaling {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            annotate: true,
        }
    }
}

#[typetag::serde]
impl Plot for ClientScaling {
    fn name(&self) -> &'static str {
        "client-scaling"
    }

    fn benchmark_script(&self) -> &'static str {
        "./benchmark-clients.sh"
    }

    fn plot(&self, settings: &Settings) -> Result<()> {
        let series = load_inputs(&[&self.input], self.benchmark_script())?
            .into_iter()
            .next()
            .context("No client scaling results loaded")?;
        debug!("{} client counts in {}", series.len(), self.input.display());
        let series = compute_derived_column(&series, DerivedColumn::Efficiency)?;

        render(&self.figure(series.clone(), settings))?;
        print!("\n{}", self.summary(&series)?);
        Ok(())
    }
}

impl ClientScaling {
    /// Throughput on top, efficiency below. `series` must already carry the efficiency column.
    pub fn figure(&self, series: ResultSeries, settings: &Settings) -> Figure {
        let annotate = self.annotate && settings.annotate;
        let throughput = Chart::new(NUM_CLIENTS, THROUGHPUT)
            .labels("Number of Clients", "Throughput (ops/s)")
            .title("KVS Client Scaling: Throughput vs Number of Clients")
            .annotate(annotate)
            .color(BLUE)
            .with_series(series.clone());
        let efficiency = Chart::new(NUM_CLIENTS, EFFICIENCY)
            .labels("Number of Clients", "Efficiency (ops/s per client)")
            .title("Client Efficiency: Throughput per Client vs Number of Clients")
            .annotate(annotate)
            .color(RED)
            .with_series(series);
        Figure::new(settings.output_target(&self.output))
            .size(1200, 800)
            .with_chart(throughput)
            .with_chart(efficiency)
    }

    pub fn summary(&self, series: &ResultSeries) -> Result<Summary> {
        Ok(summarize(
            series,
            NUM_CLIENTS,
            &[
                PeakMetric::throughput(XPhrase::Suffix("clients")),
                PeakMetric::efficiency(XPhrase::Suffix("clients")),
            ],
        )?)
    }
}
