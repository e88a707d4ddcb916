//! Internal domain models for track acquisition.
//!
//! These types are OUR types - they don't change when the provider API changes.
//! All provider responses get converted into these types via the adapter.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

use crate::genre::ParameterSet;

/// A search hit from the provider, before one is chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Provider-unique identifier
    pub id: String,
    pub title: String,
    /// Duration in seconds, if the provider reports it
    pub duration_secs: Option<f64>,
    /// Streamable resource URLs, highest quality first
    pub urls: Vec<String>,
}

impl Candidate {
    /// The highest-quality URL available.
    pub fn best_url(&self) -> Option<&str> {
        self.urls.first().map(String::as_str)
    }
}

static NEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

/// A playable track produced by a successful acquisition.
///
/// Immutable once created. The provider can hand out the same sound twice,
/// so `id` does not identify a queue entry; `serial` does.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackMetadata {
    /// Unique per acquired track within the process
    pub serial: u64,
    /// Provider-unique identifier
    pub id: String,
    pub title: String,
    /// Label of the genre this track was acquired for
    pub genre: String,
    /// Locator handed to the audio resource
    pub url: String,
    /// Duration in seconds; may stay unknown until the resource loads
    pub duration_secs: Option<f64>,
    /// Best-effort tempo estimate
    pub tempo_bpm: Option<f32>,
    /// Parameters in effect when the track was requested
    pub params: ParameterSet,
    pub acquired_at: DateTime<Utc>,
}

impl TrackMetadata {
    /// Build track metadata from the chosen candidate.
    ///
    /// Returns `None` when the candidate has no playable URL.
    pub fn from_candidate(
        candidate: Candidate,
        genre: &str,
        params: ParameterSet,
        tempo_bpm: Option<f32>,
    ) -> Option<Self> {
        let url = candidate.best_url()?.to_string();
        Some(Self {
            serial: NEXT_SERIAL.fetch_add(1, Ordering::Relaxed),
            id: candidate.id,
            title: candidate.title,
            genre: genre.to_string(),
            url,
            duration_secs: candidate.duration_secs,
            tempo_bpm,
            params,
            acquired_at: Utc::now(),
        })
    }
}

/// Classification of provider failures used by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Superseded by the user or the system; never shown as an error
    Cancelled,
    /// The query produced nothing usable
    NoResults,
    /// Retryable transport fault that exhausted its attempts
    Transient,
    /// Anything else that will not get better by retrying
    Permanent,
}

/// Errors that can occur while acquiring a track
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("Request cancelled")]
    Cancelled,

    #[error("No candidates found for \"{0}\"")]
    NoResults(String),

    #[error("Transient provider failure: {0}")]
    Transient(String),

    #[error("API request failed with HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Provider task failed: {0}")]
    Internal(String),
}

impl ProviderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Cancelled => ErrorKind::Cancelled,
            Self::NoResults(_) => ErrorKind::NoResults,
            Self::Transient(_) => ErrorKind::Transient,
            Self::Api { .. }
            | Self::Network(_)
            | Self::Parse(_)
            | Self::InvalidRequest(_)
            | Self::Internal(_) => ErrorKind::Permanent,
        }
    }

    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(urls: &[&str]) -> Candidate {
        Candidate {
            id: "42".to_string(),
            title: "Rainy Window".to_string(),
            duration_secs: Some(95.0),
            urls: urls.iter().map(|u| u.to_string()).collect(),
        }
    }

    #[test]
    fn test_from_candidate_uses_best_url() {
        let track = TrackMetadata::from_candidate(
            candidate(&["https://cdn/hq.ogg", "https://cdn/lq.mp3"]),
            "Lo-Fi Beats",
            ParameterSet::new(),
            Some(82.0),
        )
        .unwrap();
        assert_eq!(track.url, "https://cdn/hq.ogg");
        assert_eq!(track.genre, "Lo-Fi Beats");
        assert_eq!(track.tempo_bpm, Some(82.0));
    }

    #[test]
    fn test_same_candidate_twice_gets_distinct_serials() {
        let first =
            TrackMetadata::from_candidate(candidate(&["https://cdn/a.ogg"]), "Jazz", ParameterSet::new(), None)
                .unwrap();
        let second =
            TrackMetadata::from_candidate(candidate(&["https://cdn/a.ogg"]), "Jazz", ParameterSet::new(), None)
                .unwrap();
        assert_eq!(first.id, second.id);
        assert_ne!(first.serial, second.serial);
    }

    #[test]
    fn test_from_candidate_without_url() {
        let track =
            TrackMetadata::from_candidate(candidate(&[]), "Jazz", ParameterSet::new(), None);
        assert!(track.is_none());
    }

    #[test]
    fn test_error_kinds() {
        assert!(ProviderError::Transient("timeout".into()).is_retryable());
        assert!(!ProviderError::NoResults("x".into()).is_retryable());
        assert_eq!(
            ProviderError::Api {
                status: 401,
                message: "bad token".into()
            }
            .kind(),
            ErrorKind::Permanent
        );
        assert!(ProviderError::Cancelled.is_cancelled());
        assert_eq!(ProviderError::Cancelled.kind(), ErrorKind::Cancelled);
    }
}
