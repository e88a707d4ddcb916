//! Freesound-style HTTP search client
//!
//! Talks to a text-search API that returns short stock recordings with
//! streamable previews, plus an optional per-sound analysis endpoint used
//! for tempo estimates.
//!
//! ## Request shape
//! `GET {base}/search/text/?query=..&fields=id,name,duration,previews&filter=duration:[min TO max]&page_size=N&sort=S`
//!
//! The `filter` value contains spaces and brackets and must be URL-encoded;
//! the `fields` list is sent literally (commas are accepted as-is).
//!
//! Cancellation is checked before each request is sent. An in-flight request
//! is never aborted; the caller decides what to do with a late result.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use super::{adapter, dto};
use crate::config::ProviderConfig;
use crate::provider::domain::{Candidate, ProviderError};

/// Fields requested for each search hit
const SEARCH_FIELDS: &str = "id,name,duration,previews";

/// Descriptor requested from the analysis endpoint
const TEMPO_DESCRIPTOR: &str = "rhythm.bpm";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Search API client
pub struct FreesoundClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    settings: ProviderConfig,
}

impl FreesoundClient {
    /// Create a new client from provider settings.
    pub fn new(settings: &ProviderConfig, api_key: Option<String>) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()
            .map_err(|e| ProviderError::InvalidRequest(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key,
            settings: settings.clone(),
        })
    }

    /// Search for candidates matching an already-sanitized query.
    pub async fn search(
        &self,
        query: &str,
        token: &CancellationToken,
    ) -> Result<Vec<Candidate>, ProviderError> {
        let url = self.search_url(query);
        let response: dto::SearchResponse = self.get_json(&url, token).await?;
        tracing::debug!(
            "Search \"{}\" returned {} of {} results",
            query,
            response.results.len(),
            response.count
        );
        Ok(adapter::to_candidates(response))
    }

    /// Look up a tempo estimate for a candidate.
    pub async fn tempo(
        &self,
        candidate_id: &str,
        token: &CancellationToken,
    ) -> Result<Option<f32>, ProviderError> {
        let url = self.with_token(format!(
            "{}/sounds/{}/analysis/?descriptors={}",
            self.base_url,
            urlencoding::encode(candidate_id),
            TEMPO_DESCRIPTOR
        ));
        let response: dto::AnalysisResponse = self.get_json(&url, token).await?;
        Ok(adapter::to_tempo(response))
    }

    fn search_url(&self, query: &str) -> String {
        let filter = format!(
            "duration:[{} TO {}]",
            self.settings.min_duration_secs, self.settings.max_duration_secs
        );
        self.with_token(format!(
            "{}/search/text/?query={}&fields={}&filter={}&page_size={}&sort={}",
            self.base_url,
            urlencoding::encode(query),
            SEARCH_FIELDS,
            urlencoding::encode(&filter),
            self.settings.page_size,
            urlencoding::encode(&self.settings.sort)
        ))
    }

    fn with_token(&self, url: String) -> String {
        match &self.api_key {
            Some(key) => format!("{}&token={}", url, urlencoding::encode(key)),
            None => url,
        }
    }

    /// Send a GET request and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &CancellationToken,
    ) -> Result<T, ProviderError> {
        if token.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = match response.json::<dto::ApiError>().await {
                Ok(body) => body.detail,
                Err(_) => status.canonical_reason().unwrap_or("Unknown").to_string(),
            };
            return Err(classify_status(status, detail));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }
}

/// Map a non-success status onto the error taxonomy.
fn classify_status(status: StatusCode, detail: String) -> ProviderError {
    if is_retriable_status(status) {
        ProviderError::Transient(format!("HTTP {}: {}", status.as_u16(), detail))
    } else {
        ProviderError::Api {
            status: status.as_u16(),
            message: detail,
        }
    }
}

fn classify_transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
        ProviderError::Transient(err.to_string())
    } else {
        ProviderError::Network(err.to_string())
    }
}

fn is_retriable_status(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}
