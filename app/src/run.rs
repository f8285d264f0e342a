use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};

use common::{
    config::{Config, Settings},
    plot::{Plot, plot},
};
use default_plots::{BatchScaling, ClientScaling, NodeScaling, PlotKind};
use eyre::{Context, Result};
use tracing::info;

pub fn load_config(path: &Path) -> Result<Config> {
    let text = read_to_string(path)
        .wrap_err_with(|| format!("Reading config {}", path.display()))?;
    let config = serde_yml::from_str(&text)
        .wrap_err_with(|| format!("Parsing config {}", path.display()))?;
    Ok(config)
}

pub fn run_config(path: &Path) -> Result<()> {
    let config = load_config(path)?;
    info!("Running {} plot(s) from '{}'", config.plots.len(), config.name);
    plot(&config.plots, &config.settings)
}

pub fn settings(show: bool, no_annotate: bool) -> Settings {
    Settings {
        show,
        annotate: !no_annotate,
        ..Default::default()
    }
}

pub fn run_batch(input: PathBuf, output: PathBuf, settings: &Settings) -> Result<()> {
    let plot = BatchScaling {
        input,
        output,
        ..Default::default()
    };
    plot.plot(settings)
}

pub fn run_clients(input: PathBuf, output: PathBuf, settings: &Settings) -> Result<()> {
    let plot = ClientScaling {
        input,
        output,
        ..Default::default()
    };
    plot.plot(settings)
}

pub fn node_experiments(root: &Path, output_dir: PathBuf, settings: Settings) -> (Vec<Box<dyn Plot>>, Settings) {
    let plots = NodeScaling::experiments(root)
        .into_iter()
        .map(|p| Box::new(p) as Box<dyn Plot>)
        .collect();
    let settings = Settings {
        output_dir: Some(output_dir),
        ..settings
    };
    (plots, settings)
}

pub fn run_nodes(root: &Path, output_dir: PathBuf, settings: Settings) -> Result<()> {
    let (plots, settings) = node_experiments(root, output_dir, settings);
    plot(&plots, &settings)
}

pub fn list_plots() {
    for kind in PlotKind::ALL {
        let plot = kind.default_plot();
        println!("{:?} ({}) <- {}", kind, plot.name(), plot.benchmark_script());
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    const CONFIG: &str = r#"
name: kvs-sweep
settings:
  output_dir: charts
  annotate: false
plots:
  - type: BatchScaling
    input: runs/batch_scaling_results.csv
  - type: ClientScaling
    output: clients.svg
  - type: NodeScaling
    dir: runs/node_scaling_exp_4_nodes
    prefix: batch
    x_column: batchSize
    sources:
      - path: runs/extra.csv
        servers: 2
        clients: 8
"#;

    #[test]
    fn config_with_every_plot_type() {
        default_plots::init_plots();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, CONFIG).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.name, "kvs-sweep");
        assert_eq!(config.settings.output_dir, Some(PathBuf::from("charts")));
        assert!(!config.settings.annotate);
        assert!(!config.settings.show);
        let names = config.plots.iter().map(|p| p.name()).collect::<Vec<_>>();
        assert_eq!(names, vec!["batch-scaling", "client-scaling", "node-scaling"]);
    }

    #[test]
    fn unknown_plot_type_is_rejected() {
        default_plots::init_plots();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "name: x\nplots:\n  - type: Histogram\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().starts_with("Parsing config"));
    }

    #[test]
    fn missing_config_names_the_file() {
        let err = load_config(Path::new("no_such_config.yaml")).unwrap_err();
        assert_eq!(err.to_string(), "Reading config no_such_config.yaml");
    }

    #[test]
    fn node_experiments_write_to_output_dir() {
        let (plots, settings) = node_experiments(
            Path::new("."),
            PathBuf::from("charts/node_scaling"),
            settings(false, true),
        );
        assert_eq!(plots.len(), 3);
        assert_eq!(settings.output_dir, Some(PathBuf::from("charts/node_scaling")));
        assert!(!settings.annotate);
    }

    #[test]
    fn missing_batch_results_fail_with_hint() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_batch(
            dir.path().join("batch_scaling_results.csv"),
            dir.path().join("plot.png"),
            &settings(false, false),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Run the benchmark script first: ./benchmark-batch.sh");
    }
}
