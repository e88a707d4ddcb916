//! Genre Radio - command-line front end for the track acquisition core.

use clap::Parser;
use genre_radio::cli;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("genre_radio=info".parse()?))
        .init();

    cli::run_command(&args)
}
