//! Provider API Data Transfer Objects
//!
//! These types match what the Freesound-style text search API returns.
//! DO NOT use these types outside the provider module - convert to domain types.
//!
//! Example search response:
//! ```json
//! {
//!   "count": 1,
//!   "next": null,
//!   "results": [{
//!     "id": 412017,
//!     "name": "Rainy Window Loop",
//!     "duration": 95.4,
//!     "previews": {
//!       "preview-hq-mp3": "https://cdn.example/412017-hq.mp3",
//!       "preview-lq-mp3": "https://cdn.example/412017-lq.mp3"
//!     }
//!   }]
//! }
//! ```
//!
//! Example analysis response (`descriptors=rhythm.bpm`):
//! ```json
//! { "rhythm": { "bpm": 84.0 } }
//! ```

use serde::{Deserialize, Serialize};

/// Top-level search response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// A single search hit
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResult {
    pub id: u64,
    pub name: Option<String>,
    /// Duration in seconds
    pub duration: Option<f64>,
    #[serde(default)]
    pub previews: Previews,
}

/// Streamable preview URLs
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Previews {
    #[serde(rename = "preview-hq-ogg")]
    pub hq_ogg: Option<String>,
    #[serde(rename = "preview-hq-mp3")]
    pub hq_mp3: Option<String>,
    #[serde(rename = "preview-lq-ogg")]
    pub lq_ogg: Option<String>,
    #[serde(rename = "preview-lq-mp3")]
    pub lq_mp3: Option<String>,
}

/// Per-sound analysis response
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnalysisResponse {
    pub rhythm: Option<Rhythm>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Rhythm {
    pub bpm: Option<f64>,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_response() {
        let json = r#"{
            "count": 2,
            "next": "https://freesound.org/apiv2/search/text/?page=2",
            "results": [
                {
                    "id": 412017,
                    "name": "Rainy Window Loop",
                    "duration": 95.4,
                    "previews": {
                        "preview-hq-mp3": "https://cdn.example/412017-hq.mp3",
                        "preview-lq-mp3": "https://cdn.example/412017-lq.mp3"
                    }
                },
                { "id": 7, "name": null }
            ]
        }"#;

        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.count, 2);
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].id, 412017);
        assert_eq!(
            response.results[0].previews.hq_mp3.as_deref(),
            Some("https://cdn.example/412017-hq.mp3")
        );
        assert!(response.results[1].previews.hq_ogg.is_none());
    }

    #[test]
    fn test_parse_empty_search_response() {
        let response: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(response.results.is_empty());
    }

    #[test]
    fn test_parse_analysis_response() {
        let response: AnalysisResponse =
            serde_json::from_str(r#"{"rhythm": {"bpm": 84.0}}"#).unwrap();
        assert_eq!(response.rhythm.unwrap().bpm, Some(84.0));
    }
}
