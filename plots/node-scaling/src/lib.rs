use std::path::{Path, PathBuf};

use common::{
    BATCH_SIZE, NUM_CLIENTS, THROUGHPUT,
    chart::{Chart, Figure, render},
    config::Settings,
    error::DataLoadError,
    label::{RunLabel, derive_label},
    plot::{Plot, load_inputs},
    series::{DerivedColumn, ResultSeries, compute_derived_column},
    summary::{PeakMetric, Summary, XPhrase, summarize},
    util::find_sources,
};
use eyre::{Report, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One results file. When both counts are given they label the series,
/// otherwise the label is read from the file name, strictly if it follows
/// the naming convention and token by token if it does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Source {
    pub path: PathBuf,
    #[serde(default)]
    pub servers: Option<u32>,
    #[serde(default)]
    pub clients: Option<u32>,
}

impl Source {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            servers: None,
            clients: None,
        }
    }

    pub fn labelled(path: impl Into<PathBuf>, label: RunLabel) -> Self {
        Self {
            path: path.into(),
            servers: Some(label.servers),
            clients: Some(label.clients),
        }
    }

    pub fn label(&self) -> String {
        match (self.servers, self.clients) {
            (Some(servers), Some(clients)) => RunLabel::new(servers, clients).to_string(),
            _ => RunLabel::from_path(&self.path)
                .map_or_else(|| derive_label(&self.path), |label| label.to_string()),
        }
    }
}

/// Several server/client topologies of one sweep on a shared chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeScaling {
    /// Directory searched for `{prefix}*.csv`
    pub dir: Option<PathBuf>,
    pub prefix: String,
    /// Listed before anything found in `dir`
    pub sources: Vec<Source>,
    pub x_column: String,
    pub y_column: String,
    pub derive: Option<DerivedColumn>,
    pub x_label: String,
    pub y_label: String,
    pub title: String,
    pub annotate: bool,
    pub output: PathBuf,
}

impl Default for NodeScaling {
    fn default() -> Self {
        Self::clients("node_scaling_exp_4_nodes", "client_scaling_4_nodes.png")
    }
}

#[typetag::serde]
impl Plot for NodeScaling {
    fn name(&self) -> &'static str {
        "node-scaling"
    }

    fn benchmark_script(&self) -> &'static str {
        "./benchmark-nodes.sh"
    }

    fn plot(&self, settings: &Settings) -> Result<()> {
        let sources = self.resolve_sources()?;
        if sources.is_empty() {
            warn!("No inputs for '{}'", self.title);
        }

        let paths = sources.iter().map(|s| &s.path).collect::<Vec<_>>();
        let series = load_inputs(&paths, self.benchmark_script())?
            .into_iter()
            .zip(&sources)
            .map(|(series, source)| series.with_label(source.label()))
            .collect::<Vec<_>>();
        let series = match self.derive {
            Some(op) => series
                .iter()
                .map(|s| compute_derived_column(s, op))
                .collect::<Result<Vec<_>, _>>()?,
            None => series,
        };

        render(&self.figure(series.clone(), settings))?;
        for summary in self.summaries(&series)? {
            print!("\n{summary}");
        }
        Ok(())
    }
}

impl NodeScaling {
    /// Throughput against concurrent client goroutines
    pub fn clients(dir: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            prefix: "client".to_owned(),
            sources: Vec::new(),
            x_column: NUM_CLIENTS.to_owned(),
            y_column: THROUGHPUT.to_owned(),
            derive: None,
            x_label: "Number of Concurrent Goroutines".to_owned(),
            y_label: "Throughput (ops/s)".to_owned(),
            title: "Client side goroutine scaling across varying client-node combinations"
                .to_owned(),
            annotate: true,
            output: output.into(),
        }
    }

    /// Throughput against batch size
    pub fn batch(dir: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            prefix: "batch".to_owned(),
            x_column: BATCH_SIZE.to_owned(),
            x_label: "Batch Size".to_owned(),
            title: "Batch size scaling across varying client-node combinations".to_owned(),
            ..Self::clients(dir, output)
        }
    }

    pub fn with_annotate(mut self, annotate: bool) -> Self {
        self.annotate = annotate;
        self
    }

    /// The node scaling experiments under `root`: 4 node client and batch
    /// sweeps, and the 8 node client sweep without annotations
    pub fn experiments(root: &Path) -> Vec<NodeScaling> {
        let four_nodes = root.join("node_scaling_exp_4_nodes");
        let eight_nodes = root.join("node_scaling_exp_8_nodes");
        vec![
            Self::clients(&four_nodes, "client_scaling_4_nodes.png"),
            Self::batch(&four_nodes, "batch_scaling_4_nodes.png"),
            Self::clients(&eight_nodes, "client_scaling_8_nodes.png").with_annotate(false),
        ]
    }

    pub fn resolve_sources(&self) -> Result<Vec<Source>> {
        let mut sources = self.sources.clone();
        if let Some(dir) = &self.dir {
            match find_sources(dir, &self.prefix) {
                Ok(found) => sources.extend(found.into_iter().map(Source::new)),
                Err(err @ DataLoadError::NotFound(_)) => {
                    return Err(Report::new(err).wrap_err(format!(
                        "Run the benchmark script first: {}",
                        self.benchmark_script()
                    )));
                }
                Err(err) => return Err(err.into()),
            }
        }
        debug!("{} sources for '{}'", sources.len(), self.title);
        Ok(sources)
    }

    fn x_phrase(&self) -> XPhrase {
        match self.x_column.as_str() {
            BATCH_SIZE => XPhrase::Prefix("batch size"),
            NUM_CLIENTS => XPhrase::Suffix("clients"),
            _ => XPhrase::Prefix("x ="),
        }
    }

    pub fn figure(&self, series: Vec<ResultSeries>, settings: &Settings) -> Figure {
        let chart = Chart::new(&self.x_column, &self.y_column)
            .labels(&self.x_label, &self.y_label)
            .title(&self.title)
            .annotate(self.annotate && settings.annotate)
            .legend(true)
            .extend_series(series);
        Figure::new(settings.output_target(&self.output))
            .size(1000, 600)
            .with_chart(chart)
    }

    /// One summary per series, headed by its label
    pub fn summaries(&self, series: &[ResultSeries]) -> Result<Vec<Summary>> {
        let metric = PeakMetric::for_column(&self.y_column, self.x_phrase());
        series
            .iter()
            .map(|s| {
                Ok(summarize(s, &self.x_column, std::slice::from_ref(&metric))?
                    .with_label(s.label()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use common::{EFFICIENCY, chart::OutputTarget, series::load_series};
    use pretty_assertions::assert_eq;

    use super::*;

    const HEADER: &str = "numClients,batchSize,throughput_ops_per_sec\n";

    fn experiment_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("client_scaling_4_servers_4_clients_batchsize_8192.csv"),
            format!("{HEADER}1,8192,1000\n2,8192,1900\n4,8192,3500\n"),
        )
        .unwrap();
        fs::write(
            dir.path().join("client_scaling_4_servers_8_clients_batchsize_8192.csv"),
            format!("{HEADER}1,8192,1800\n2,8192,3000\n4,8192,3100\n"),
        )
        .unwrap();
        fs::write(
            dir.path().join("batch_scaling_4_servers_4_clients.csv"),
            format!("{HEADER}64,1,500\n128,2,700\n"),
        )
        .unwrap();
        dir
    }

    #[test]
    fn sources_come_from_prefix_glob() {
        let dir = experiment_dir();
        let plot = NodeScaling::clients(dir.path(), "out.png");
        let labels = plot
            .resolve_sources()
            .unwrap()
            .iter()
            .map(Source::label)
            .collect::<Vec<_>>();
        assert_eq!(
            labels,
            vec!["Servers: 4, clients: 4", "Servers: 4, clients: 8"]
        );

        let batch = NodeScaling::batch(dir.path(), "out.png");
        assert_eq!(batch.resolve_sources().unwrap().len(), 1);
        assert_eq!(batch.x_column, BATCH_SIZE);
    }

    #[test]
    fn declared_labels_win_over_file_names() {
        let source = Source::labelled("results/run-a.csv", RunLabel::new(2, 16));
        assert_eq!(source.label(), "Servers: 2, clients: 16");
        assert_eq!(Source::new("results/run-a.csv").label(), "Servers: ?, clients: ?");
    }

    #[test]
    fn explicit_sources_come_first() {
        let dir = experiment_dir();
        let explicit = Source::labelled(dir.path().join("extra.csv"), RunLabel::new(1, 1));
        let plot = NodeScaling {
            sources: vec![explicit.clone()],
            ..NodeScaling::clients(dir.path(), "out.png")
        };
        let sources = plot.resolve_sources().unwrap();
        assert_eq!(sources.len(), 3);
        assert_eq!(sources[0], explicit);
    }

    #[test]
    fn missing_experiment_dir_suggests_benchmark() {
        let plot = NodeScaling::clients("no_such_node_scaling_exp", "out.png");
        let err = plot.resolve_sources().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Run the benchmark script first: ./benchmark-nodes.sh"
        );
    }

    #[test]
    fn figure_has_legend_for_every_topology() {
        let dir = experiment_dir();
        let plot = NodeScaling::clients(dir.path(), "client_scaling_4_nodes.png").with_annotate(false);
        let series = plot
            .resolve_sources()
            .unwrap()
            .into_iter()
            .map(|s| load_series(&s.path).unwrap().with_label(s.label()))
            .collect::<Vec<_>>();
        let settings = Settings {
            output_dir: Some(PathBuf::from("charts/node_scaling")),
            ..Default::default()
        };
        let figure = plot.figure(series, &settings);
        assert_eq!(
            figure.output,
            OutputTarget::File(PathBuf::from("charts/node_scaling/client_scaling_4_nodes.png"))
        );
        let chart = &figure.charts[0];
        assert!(chart.has_legend());
        assert!(!chart.annotate);
        figure.validate().unwrap();
    }

    #[test]
    fn summaries_are_per_series() {
        let dir = experiment_dir();
        let plot = NodeScaling::clients(dir.path(), "out.png");
        let series = plot
            .resolve_sources()
            .unwrap()
            .into_iter()
            .map(|s| load_series(&s.path).unwrap().with_label(s.label()))
            .collect::<Vec<_>>();
        let summaries = plot.summaries(&series).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].label.as_deref(), Some("Servers: 4, clients: 4"));
        assert_eq!(
            summaries[0].peaks[0].to_string(),
            "Peak throughput: 3500.00 ops/s with 4 clients"
        );
        assert_eq!(
            summaries[1].peaks[0].to_string(),
            "Peak throughput: 3100.00 ops/s with 4 clients"
        );
    }

    #[test]
    fn efficiency_can_be_plotted_per_topology() {
        let dir = experiment_dir();
        let plot = NodeScaling {
            derive: Some(DerivedColumn::Efficiency),
            y_column: EFFICIENCY.to_owned(),
            ..NodeScaling::clients(dir.path(), "out.png")
        };
        let series = plot
            .resolve_sources()
            .unwrap()
            .iter()
            .map(|s| compute_derived_column(&load_series(&s.path).unwrap(), DerivedColumn::Efficiency).unwrap())
            .collect::<Vec<_>>();
        let summaries = plot.summaries(&series).unwrap();
        assert_eq!(
            summaries[1].peaks[0].to_string(),
            "Best efficiency: 1800.00 ops/s per client with 1 clients"
        );
    }

    #[test]
    fn experiments_match_the_recorded_layout() {
        let experiments = NodeScaling::experiments(Path::new("."));
        let outputs = experiments
            .iter()
            .map(|e| (e.output.to_string_lossy().into_owned(), e.annotate))
            .collect::<Vec<_>>();
        assert_eq!(
            outputs,
            vec![
                ("client_scaling_4_nodes.png".to_owned(), true),
                ("batch_scaling_4_nodes.png".to_owned(), true),
                ("client_scaling_8_nodes.png".to_owned(), false),
            ]
        );
        assert_eq!(
            experiments[2].dir.as_deref(),
            Some(Path::new("./node_scaling_exp_8_nodes"))
        );
    }

    #[test]
    fn conventional_names_are_parsed_as_numbers() {
        let source = Source::new("client_scaling_04_servers_8_clients_batchsize_8192.csv");
        assert_eq!(source.label(), "Servers: 4, clients: 8");

        let source = Source::new("batch_4_servers_8_clients.csv");
        assert_eq!(source.label(), "Servers: servers, clients: clients");
    }

    #[test]
    fn plot_writes_one_chart_for_all_topologies() {
        let dir = experiment_dir();
        let out = tempfile::tempdir().unwrap();
        let plot = NodeScaling::clients(dir.path(), "client_scaling_4_nodes.png");
        let settings = Settings {
            output_dir: Some(out.path().join("node_scaling")),
            ..Default::default()
        };
        plot.plot(&settings).unwrap();
        assert!(out.path().join("node_scaling/client_scaling_4_nodes.png").is_file());
    }
}
