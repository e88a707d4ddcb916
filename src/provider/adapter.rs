//! Converts provider DTOs into domain models.

use super::dto;
use crate::provider::domain::Candidate;

/// Convert a search response into candidates.
///
/// Hits without any streamable URL are dropped.
pub fn to_candidates(response: dto::SearchResponse) -> Vec<Candidate> {
    response.results.into_iter().filter_map(to_candidate).collect()
}

fn to_candidate(result: dto::SearchResult) -> Option<Candidate> {
    let urls = ranked_urls(result.previews);
    if urls.is_empty() {
        return None;
    }

    Some(Candidate {
        id: result.id.to_string(),
        title: result
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Untitled #{}", result.id)),
        duration_secs: result.duration.filter(|d| d.is_finite() && *d > 0.0),
        urls,
    })
}

/// Preview URLs in descending quality order.
fn ranked_urls(previews: dto::Previews) -> Vec<String> {
    [
        previews.hq_ogg,
        previews.hq_mp3,
        previews.lq_ogg,
        previews.lq_mp3,
    ]
    .into_iter()
    .flatten()
    .filter(|url| !url.is_empty())
    .collect()
}

/// Extract a tempo estimate from an analysis response.
pub fn to_tempo(response: dto::AnalysisResponse) -> Option<f32> {
    response
        .rhythm
        .and_then(|r| r.bpm)
        .filter(|bpm| bpm.is_finite() && *bpm > 0.0)
        .map(|bpm| bpm as f32)
}
