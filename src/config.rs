//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\genre-radio\config.toml
//! - macOS: ~/Library/Application Support/genre-radio/config.toml
//! - Linux: ~/.config/genre-radio/config.toml
//!
//! The file is read once at startup. Nothing in a session writes back to it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides `credentials.api_key`.
pub const API_KEY_ENV: &str = "GENRE_RADIO_API_KEY";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Provider credentials
    pub credentials: Credentials,

    /// Search provider settings
    pub provider: ProviderConfig,

    /// Retry policy for provider searches
    pub retry: RetryConfig,

    /// Playback and prefetch tuning
    pub playback: PlaybackConfig,
}

/// API credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Search provider API key
    pub api_key: Option<String>,
}

/// Search provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API root, e.g. `https://freesound.org/apiv2`
    pub base_url: String,

    /// Candidates requested per search
    pub page_size: u32,

    /// Shortest acceptable track, in seconds
    pub min_duration_secs: u32,

    /// Longest acceptable track, in seconds
    pub max_duration_secs: u32,

    /// Provider sort order
    pub sort: String,

    /// Per-request timeout
    pub request_timeout_ms: u64,

    /// Whether to look up a tempo estimate for chosen tracks
    pub fetch_tempo: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://freesound.org/apiv2".to_string(),
            page_size: 15,
            min_duration_secs: 30,
            max_duration_secs: 600,
            sort: "rating_desc".to_string(),
            request_timeout_ms: 10_000,
            fetch_tempo: true,
        }
    }
}

/// Retry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Backoff unit; the wait after attempt N is N times this
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 600,
        }
    }
}

/// Playback settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Remaining seconds at which the next track is prefetched
    pub prefetch_threshold_secs: f64,

    /// Position drift tolerated before a seek is applied
    pub seek_tolerance_secs: f64,

    /// Base parameters sent for cross-genre requests
    pub base_param_count: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            prefetch_threshold_secs: 10.0,
            seek_tolerance_secs: 0.25,
            base_param_count: 3,
        }
    }
}

impl Config {
    /// API key from the environment, falling back to the config file.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.credentials.api_key.clone())
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("genre-radio"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };

    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match load_from(&path) {
        Ok(config) => {
            tracing::info!("Loaded config from {:?}", path);
            config
        }
        Err(e) => {
            tracing::error!("{}", e);
            tracing::warn!("Using default configuration");
            Config::default()
        }
    }
}

/// Load configuration from an explicit path, reporting failures.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),
}

// ============================================================================
// Tests
// ============================================================================
