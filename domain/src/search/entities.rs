//! Search result value object and evidence formatting

use crate::util::truncate_with_ellipsis;
use serde::{Deserialize, Serialize};

/// Maximum bytes of concatenated evidence handed to the summarizer.
pub const MAX_EVIDENCE_BYTES: usize = 1500;

/// Maximum bytes of raw evidence used in place of a failed summary.
pub const FALLBACK_SUMMARY_BYTES: usize = 500;

/// One ranked hit returned by a search engine (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

impl SearchResult {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
        }
    }
}

/// Concatenate results into one evidence block, keeping the engine's order.
///
/// ```text
/// Source 1:
/// Title: ...
/// URL: ...
/// Snippet: ...
/// ---
/// ```
///
/// Blocks are separated by a blank line and the whole text is capped at
/// [`MAX_EVIDENCE_BYTES`].
pub fn format_evidence(results: &[SearchResult]) -> String {
    let blocks: Vec<String> = results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "Source {}:\nTitle: {}\nURL: {}\nSnippet: {}\n---",
                i + 1,
                r.title,
                r.url,
                r.snippet
            )
        })
        .collect();

    truncate_with_ellipsis(&blocks.join("\n\n"), MAX_EVIDENCE_BYTES)
}
