//! Track provider - finds playable tracks on an external search service.
//!
//! # Architecture
//!
//! Same split as any external API integration in this crate:
//! - **Domain models** (`domain.rs`) - [`TrackMetadata`], [`Candidate`], [`ProviderError`]
//! - **API DTOs** (`dto.rs`) - exact response shapes of the search service
//! - **Adapter** (`adapter.rs`) - converts DTOs to domain models
//! - **Client** (`client.rs`) - HTTP client for the search service
//! - **Retry** (`retry.rs`) - linear backoff with cancellation
//! - **Service** (`service.rs`) - search, random pick, tempo lookup
//!
//! # Usage
//!
//! ```ignore
//! let client = FreesoundClient::new(&config.provider, config.credentials.api_key.clone())?;
//! let fetcher = TrackFetcher::new(Arc::new(client), RetryPolicy::from(&config.retry));
//! let track = fetcher.fetch_track(&request, &CancellationToken::new()).await?;
//! ```

pub mod adapter;
pub mod client;
pub mod domain;
pub mod dto;
pub mod retry;
pub mod service;
pub mod traits;

pub use client::FreesoundClient;
pub use domain::{Candidate, ErrorKind, ProviderError, TrackMetadata};
pub use retry::{RetryPolicy, with_retry};
pub use service::{TrackFetcher, TrackRequest, sanitize_query};
pub use traits::SearchApi;
