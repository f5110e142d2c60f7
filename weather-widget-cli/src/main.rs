//! Binary crate for the `weather-widget` command-line host.
//!
//! This crate focuses on:
//! - Supplying the API key and location to the widget core
//! - Interactive configuration
//! - Human-friendly rendering of the city list

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
