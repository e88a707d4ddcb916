//! Trait definitions for the external search provider.
//!
//! This trait enables dependency injection and mocking for tests.
//! Production code uses [`FreesoundClient`](super::client::FreesoundClient),
//! while tests substitute [`mocks::MockSearch`].

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::domain::{Candidate, ProviderError};

/// Search provider used to find candidate tracks.
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// Search for candidates matching a sanitized query.
    async fn search(
        &self,
        query: &str,
        token: &CancellationToken,
    ) -> Result<Vec<Candidate>, ProviderError>;

    /// Optional per-candidate tempo estimate.
    async fn tempo(
        &self,
        candidate_id: &str,
        token: &CancellationToken,
    ) -> Result<Option<f32>, ProviderError>;
}

#[async_trait]
impl SearchApi for super::client::FreesoundClient {
    async fn search(
        &self,
        query: &str,
        token: &CancellationToken,
    ) -> Result<Vec<Candidate>, ProviderError> {
        self.search(query, token).await
    }

    async fn tempo(
        &self,
        candidate_id: &str,
        token: &CancellationToken,
    ) -> Result<Option<f32>, ProviderError> {
        self.tempo(candidate_id, token).await
    }
}
