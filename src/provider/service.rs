//! Track fetching - turns a genre request into one playable track.
//!
//! 1. Sanitize the search phrase
//! 2. Search the provider (retried with linear backoff)
//! 3. Pick one candidate uniformly at random
//! 4. Best-effort tempo lookup for the chosen candidate

use std::sync::Arc;

use rand::Rng;
use tokio_util::sync::CancellationToken;

use crate::genre::{GenreSelector, ParameterSet};
use crate::provider::domain::{Candidate, ProviderError, TrackMetadata};
use crate::provider::retry::{RetryPolicy, with_retry};
use crate::provider::traits::SearchApi;

/// Everything the provider needs to fetch one track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRequest {
    pub genre: GenreSelector,
    /// Free-text phrase to search for (sanitized before sending)
    pub phrase: String,
    pub params: ParameterSet,
}

/// Fetches tracks from a search provider with retry semantics.
pub struct TrackFetcher {
    api: Arc<dyn SearchApi>,
    retry: RetryPolicy,
    fetch_tempo: bool,
}

impl TrackFetcher {
    pub fn new(api: Arc<dyn SearchApi>, retry: RetryPolicy) -> Self {
        Self {
            api,
            retry,
            fetch_tempo: true,
        }
    }

    /// Enable or disable the secondary tempo lookup.
    pub fn with_tempo_lookup(mut self, enabled: bool) -> Self {
        self.fetch_tempo = enabled;
        self
    }

    /// Search with retry.
    pub async fn search(
        &self,
        query: &str,
        token: &CancellationToken,
    ) -> Result<Vec<Candidate>, ProviderError> {
        let api = &self.api;
        with_retry(&self.retry, token, move |attempt| {
            tracing::debug!("Searching \"{}\" (attempt {})", query, attempt);
            api.search(query, token)
        })
        .await
    }

    /// Fetch one random track matching the request.
    pub async fn fetch_track(
        &self,
        request: &TrackRequest,
        token: &CancellationToken,
    ) -> Result<TrackMetadata, ProviderError> {
        let query = sanitize_query(&request.phrase).ok_or_else(|| {
            ProviderError::InvalidRequest(format!("empty query for \"{}\"", request.genre))
        })?;

        let mut candidates = self.search(&query, token).await?;
        if candidates.is_empty() {
            return Err(ProviderError::NoResults(query));
        }

        let chosen = {
            let index = rand::rng().random_range(0..candidates.len());
            candidates.swap_remove(index)
        };

        let tempo = if self.fetch_tempo {
            self.lookup_tempo(&chosen.id, token).await
        } else {
            None
        };

        TrackMetadata::from_candidate(chosen, request.genre.label(), request.params.clone(), tempo)
            .ok_or(ProviderError::NoResults(query))
    }

    /// Tempo lookup whose failure never fails the caller.
    async fn lookup_tempo(&self, candidate_id: &str, token: &CancellationToken) -> Option<f32> {
        if token.is_cancelled() {
            return None;
        }
        match self.api.tempo(candidate_id, token).await {
            Ok(tempo) => tempo,
            Err(e) => {
                tracing::debug!("Tempo lookup for {} failed: {}", candidate_id, e);
                None
            }
        }
    }
}

/// Normalize a free-text phrase into a provider query.
///
/// Lower-cases, replaces anything other than alphanumerics, `&` and `-` with
/// spaces, and collapses whitespace. Returns `None` if nothing is left.
pub fn sanitize_query(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '&' || c == '-' {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();
    let query = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    (!query.is_empty()).then_some(query)
}
