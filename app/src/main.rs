use std::path::PathBuf;

use clap::{Parser, Subcommand};
use default_plots::{batch_scaling, client_scaling};
use eyre::Result;
use tracing::error;
use tracing_subscriber::{
    EnvFilter,
    fmt::{layer, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

mod run;

const MODULES: &[&str] = &[
    "common",
    "batch_scaling",
    "client_scaling",
    "node_scaling",
    "default_plots",
];

#[derive(Parser)]
#[command(about = "Charts for the key-value store benchmark results")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Extra tracing directives, eg. `common=debug`
    #[arg(short, long)]
    log: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Throughput against batch size
    Batch {
        #[arg(default_value = batch_scaling::DEFAULT_INPUT)]
        input: PathBuf,
        #[arg(short, long, default_value = batch_scaling::DEFAULT_OUTPUT)]
        output: PathBuf,
        /// Open the chart instead of saving it
        #[arg(long, default_value_t = false)]
        show: bool,
        #[arg(long, default_value_t = false)]
        no_annotate: bool,
    },
    /// Throughput and per-client efficiency against client count
    Clients {
        #[arg(default_value = client_scaling::DEFAULT_INPUT)]
        input: PathBuf,
        #[arg(short, long, default_value = client_scaling::DEFAULT_OUTPUT)]
        output: PathBuf,
        #[arg(long, default_value_t = false)]
        show: bool,
        #[arg(long, default_value_t = false)]
        no_annotate: bool,
    },
    /// The node scaling experiments, one chart per sweep
    Nodes {
        /// Directory holding the `node_scaling_exp_*` folders
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
        #[arg(short, long, default_value = "charts/node_scaling")]
        output_dir: PathBuf,
        #[arg(long, default_value_t = false)]
        show: bool,
        #[arg(long, default_value_t = false)]
        no_annotate: bool,
    },
    /// Run the plots listed in a config file
    Run {
        #[arg(short, long, default_value = "config.yaml")]
        config_file: PathBuf,
    },
    /// List available plots
    List,
}

fn main() -> Result<()> {
    let log_level = std::env::var("RUST_LOG").unwrap_or("info".to_owned());
    let args = Cli::parse();
    let file_appender = tracing_appender::rolling::never(".", "log.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let mut env_filter = EnvFilter::new(format!("kvs_plots={log_level}"));
    for log in &args.log {
        env_filter = env_filter.add_directive(log.parse()?);
    }
    for module in MODULES {
        if !args.log.iter().any(|x| x.starts_with(module)) {
            env_filter = env_filter.add_directive(format!("{module}={log_level}").parse()?);
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            layer()
                .with_timer(ChronoLocal::new("%v %k:%M:%S %z".to_owned()))
                .compact(),
        )
        .with(layer().with_writer(non_blocking))
        .init();

    default_plots::init_plots();

    let result = match args.command {
        Commands::Batch {
            input,
            output,
            show,
            no_annotate,
        } => run::run_batch(input, output, &run::settings(show, no_annotate)),
        Commands::Clients {
            input,
            output,
            show,
            no_annotate,
        } => run::run_clients(input, output, &run::settings(show, no_annotate)),
        Commands::Nodes {
            root,
            output_dir,
            show,
            no_annotate,
        } => run::run_nodes(&root, output_dir, run::settings(show, no_annotate)),
        Commands::Run { config_file } => run::run_config(&config_file),
        Commands::List => {
            run::list_plots();
            Ok(())
        }
    };

    if let Err(err) = result {
        error!("{err:#}");
        // Flush log.log before exiting
        drop(guard);
        std::process::exit(1);
    }
    Ok(())
}
