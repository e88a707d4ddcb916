//! Test utilities and fixtures for genre-radio tests.
//!
//! Mock factories for provider candidates and tracks, plus a coordinator
//! wired to a mock search provider with near-zero backoff.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{lofi, mock_candidate, test_coordinator};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let mock = Arc::new(MockSearch::returning(vec![mock_candidate("a")]));
//!     let coordinator = test_coordinator(mock);
//!     let outcome = coordinator.acquire(&lofi(), Purpose::ExplicitNext).await;
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::acquisition::TrackCoordinator;
use crate::genre::{GenreCatalog, GenreSelector, LiveParameters, ParameterSet};
use crate::provider::traits::mocks::MockSearch;
use crate::provider::{Candidate, RetryPolicy, TrackFetcher, TrackMetadata};

/// The genre most tests use.
pub fn lofi() -> GenreSelector {
    GenreSelector::new("Lo-Fi Beats")
}

/// A 40 second candidate with one preview URL.
pub fn mock_candidate(id: &str) -> Candidate {
    Candidate {
        id: id.to_string(),
        title: format!("Track {}", id),
        duration_secs: Some(40.0),
        urls: vec![format!("https://cdn.example.test/previews/{}.ogg", id)],
    }
}

/// A Lo-Fi Beats track built from [`mock_candidate`].
pub fn mock_track(id: &str) -> TrackMetadata {
    mock_track_in(id, &lofi())
}

/// A track acquired for `genre`.
pub fn mock_track_in(id: &str, genre: &GenreSelector) -> TrackMetadata {
    TrackMetadata::from_candidate(mock_candidate(id), genre.label(), ParameterSet::new(), None)
        .expect("mock candidate has a URL")
}

/// Coordinator over the builtin catalog with a 1 ms retry backoff.
pub fn test_coordinator(mock: Arc<MockSearch>) -> TrackCoordinator {
    let params = LiveParameters::new(Arc::new(GenreCatalog::builtin()));
    let fetcher = TrackFetcher::new(mock, RetryPolicy::new(3, Duration::from_millis(1)));
    TrackCoordinator::new(fetcher, params)
}
