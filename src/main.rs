//! `tsp-ga`: command-line driver for the TSP genetic algorithm benchmark.
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tsp_ga::cli::{execute, Cli};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = execute(cli) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
