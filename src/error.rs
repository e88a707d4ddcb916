//! Application-wide error types.
//!
//! Library modules use their own `thiserror` enums; this module gathers them
//! for callers that just want one error type. The binary uses `anyhow` on
//! top.
//!
//! - [`ProviderError`](crate::provider::ProviderError): search and track acquisition
//! - [`PlaybackFault`](crate::player::PlaybackFault): the audio resource
//! - [`ConfigError`](crate::config::ConfigError): config file loading

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Track acquisition error
    #[error("Provider error: {0}")]
    Provider(#[from] crate::provider::ProviderError),

    /// Audio playback error
    #[error("Playback error: {0}")]
    Playback(#[from] crate::player::PlaybackFault),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Genre label that can't be used
    #[error("Invalid genre: {0:?}")]
    InvalidGenre(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn invalid_genre(label: impl Into<String>) -> Self {
        Self::InvalidGenre(label.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, crate::provider::ProviderError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Provider(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, crate::config::ConfigError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Config(e).context(ctx))
    }
}
