pub use batch_scaling::{self, BatchScaling};
pub use client_scaling::{self, ClientScaling};
use common::plot::Plot;
pub use node_scaling::{self, NodeScaling, Source};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlotKind {
    BatchScaling,
    ClientScaling,
    NodeScaling,
}

impl PlotKind {
    pub const ALL: [PlotKind; 3] = [
        PlotKind::BatchScaling,
        PlotKind::ClientScaling,
        PlotKind::NodeScaling,
    ];

    pub fn name(&self) -> &'static str {
        self.default_plot().name()
    }

    pub fn default_plot(&self) -> Box<dyn Plot> {
        match *self {
            PlotKind::BatchScaling => Box::new(BatchScaling::default()),
            PlotKind::ClientScaling => Box::new(ClientScaling::default()),
            PlotKind::NodeScaling => Box::new(NodeScaling::default()),
        }
    }
}

/// Links every plot crate so their config tags are registered
pub fn init_plots() {
    for kind in PlotKind::ALL {
        // Only forces the plot crates to link, the output is not needed
        let _ = serde_json::to_string(&kind.default_plot());
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn names_are_unique() {
        let names = PlotKind::ALL.iter().map(PlotKind::name).collect::<Vec<_>>();
        assert_eq!(names, vec!["batch-scaling", "client-scaling", "node-scaling"]);
    }

    #[test]
    fn default_plots_serialize_with_type_tag() {
        init_plots();
        let json = serde_json::to_value(PlotKind::ClientScaling.default_plot()).unwrap();
        assert_eq!(json["type"], "ClientScaling");
        assert_eq!(json["input"], "client_scaling_results.csv");
    }

    #[test]
    fn tagged_plot_round_trips() {
        init_plots();
        let plot: Box<dyn Plot> = serde_json::from_str(
            r#"{"type": "BatchScaling", "input": "runs/batch.csv", "annotate": false}"#,
        )
        .unwrap();
        assert_eq!(plot.name(), "batch-scaling");
        assert_eq!(plot.benchmark_script(), "./benchmark-batch.sh");
    }
}
