//! CLI command definitions and dispatch.
//!
//! Each subcommand lives in its own submodule:
//! - `genres`: list the built-in genre catalog
//! - `fetch`: run acquisitions against the configured provider
//! - `listen`: drive a whole session against a simulated audio clock

mod fetch;
mod genres;
mod listen;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

pub use fetch::cmd_fetch;
pub use genres::cmd_genres;
pub use listen::cmd_listen;

use crate::acquisition::TrackCoordinator;
use crate::config::{self, Config};
use crate::error::ResultExt;
use crate::genre::{GenreCatalog, LiveParameters};
use crate::provider::{FreesoundClient, RetryPolicy, TrackFetcher};

/// Genre Radio CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to the OS config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// List known genres and their base parameters
    Genres,
    /// Acquire tracks for a genre and print their metadata
    Fetch {
        /// Genre label, e.g. "Lo-Fi Beats"
        genre: String,
        /// Provider API key (or set GENRE_RADIO_API_KEY env var)
        #[arg(short, long, env = "GENRE_RADIO_API_KEY")]
        api_key: Option<String>,
        /// Number of tracks to acquire
        #[arg(short = 'n', long, default_value = "1")]
        count: u32,
    },
    /// Play a genre on a simulated clock, prefetching as a real session would
    Listen {
        /// Genre label, e.g. "Lo-Fi Beats"
        genre: String,
        /// Provider API key (or set GENRE_RADIO_API_KEY env var)
        #[arg(short, long, env = "GENRE_RADIO_API_KEY")]
        api_key: Option<String>,
        /// Stop after this many tracks have finished
        #[arg(short, long, default_value = "3")]
        tracks: u32,
        /// Simulated seconds per real second
        #[arg(long, default_value = "20")]
        speed: u32,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => config::load_from(path).with_context("--config")?,
        None => config::load(),
    };

    match &cli.command {
        Commands::Genres => cmd_genres(&config),
        Commands::Fetch {
            genre,
            api_key,
            count,
        } => {
            let rt = Runtime::new()?;
            cmd_fetch(&rt, &config, genre, api_key.as_deref(), *count)
        }
        Commands::Listen {
            genre,
            api_key,
            tracks,
            speed,
        } => {
            let rt = Runtime::new()?;
            cmd_listen(&rt, &config, genre, api_key.as_deref(), *tracks, *speed)
        }
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Build a coordinator from config, preferring an explicit API key.
pub(crate) fn build_coordinator(
    config: &Config,
    api_key: Option<&str>,
) -> anyhow::Result<TrackCoordinator> {
    let api_key = api_key.map(str::to_string).or_else(|| config.api_key());
    if api_key.is_none() {
        eprintln!("Warning: no API key configured; the provider will likely reject requests.");
        eprintln!("Use --api-key YOUR_KEY or set {}", config::API_KEY_ENV);
    }

    let client = FreesoundClient::new(&config.provider, api_key)
        .with_context("Failed to set up the provider client")?;
    let fetcher = TrackFetcher::new(Arc::new(client), RetryPolicy::from(&config.retry))
        .with_tempo_lookup(config.provider.fetch_tempo);
    let params = LiveParameters::new(Arc::new(GenreCatalog::builtin()));

    Ok(TrackCoordinator::new(fetcher, params)
        .with_base_param_count(config.playback.base_param_count))
}
