//! `tc-ceetm`: configure CEETM qdiscs and classes the way `tc` does.
//!
//! ```text
//! tc-ceetm qdisc add --dev eth0 --handle 1: type root rate 1000mbit ceil 1000mbit overhead 24
//! tc-ceetm class add --dev eth0 --parent 1: --classid 1:1 type root tbl 1
//! tc-ceetm qdisc show --dev eth0 --stats
//! ```

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match commands::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
