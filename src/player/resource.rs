//! Contract for the single shared audio output.
//!
//! The session owns exactly one resource and only the
//! [`PlaybackSynchronizer`](super::PlaybackSynchronizer) writes to it.
//! Decoding and output are the implementor's business.

/// Errors reported by the audio resource.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlaybackFault {
    #[error("Failed to load {url}: {message}")]
    Load { url: String, message: String },

    #[error("Playback refused: {0}")]
    Play(String),

    #[error("Audio resource error: {0}")]
    Resource(String),
}

/// Signals the resource raises while it works.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceEvent {
    /// The current source can start playing
    Ready,
    /// Periodic position update, in seconds
    PositionChanged(f64),
    /// Duration of the current source became known, in seconds
    DurationKnown(f64),
    /// Natural end of the current source
    Ended,
    /// The resource failed to load or play
    Error(String),
}

/// A single audio output that plays one source at a time.
pub trait AudioResource {
    /// Locator of the loaded source.
    fn source(&self) -> Option<&str>;

    /// Replace the source. The resource reports [`ResourceEvent::Ready`]
    /// once the new source can play.
    fn set_source(&mut self, url: &str);

    /// Drop the current source and stop.
    fn clear_source(&mut self);

    fn position(&self) -> f64;

    fn set_position(&mut self, secs: f64);

    fn duration(&self) -> Option<f64>;

    fn is_ready(&self) -> bool;

    fn is_playing(&self) -> bool;

    fn play(&mut self) -> Result<(), PlaybackFault>;

    fn pause(&mut self);
}
