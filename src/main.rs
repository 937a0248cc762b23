//! tfviz CLI entry point

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "tfviz")]
#[command(about = "Convert `terraform graph` output into Cytoscape.js or cleaned-up Graphviz", long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    #[command(flatten)]
    convert: commands::ConvertArgs,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Print the version and exit
    #[arg(short = 'v', long)]
    version: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("tfviz {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Logs go to stderr; stdout may carry the rendered graph.
    let log_level = if cli.debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("tfviz v{}", env!("CARGO_PKG_VERSION"));
    commands::convert(cli.convert)
}
