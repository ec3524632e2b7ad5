//! Parsing of single-purpose stage responses.
//!
//! Pure text handling, no I/O. Each function turns a free-form model reply
//! into the narrow value its stage needs, and treats anything it cannot read
//! as the safe alternative.

use serde::{Deserialize, Serialize};

/// Marker the evaluator is asked to emit before its verdict.
pub const EVALUATION_MARKER: &str = "[Evaluation]";

/// Verdict of the sufficiency evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sufficiency {
    /// The direct answer can be returned as is
    Sufficient,
    /// The direct answer should be checked against web evidence
    NeedsVerification,
}

impl Sufficiency {
    pub fn is_sufficient(&self) -> bool {
        matches!(self, Sufficiency::Sufficient)
    }
}

/// Parse the evaluator reply.
///
/// Looks for `[Evaluation] - Yes` / `[Evaluation] - No` (case-insensitive,
/// with `-`, `:` or markdown emphasis between marker and verdict).
/// Conservative: only an unambiguous Yes is [`Sufficiency::Sufficient`];
/// a missing marker, a No, or both is [`Sufficiency::NeedsVerification`].
pub fn parse_sufficiency(response: &str) -> Sufficiency {
    let upper = response.to_uppercase();
    let marker = EVALUATION_MARKER.to_uppercase();

    let mut saw_yes = false;
    let mut saw_no = false;

    for (idx, _) in upper.match_indices(&marker) {
        let rest = upper[idx + marker.len()..]
            .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '-' | ':' | '*' | '='));
        if rest.starts_with("YES") {
            saw_yes = true;
        } else if rest.starts_with("NO") {
            saw_no = true;
        }
    }

    if saw_yes && !saw_no {
        Sufficiency::Sufficient
    } else {
        Sufficiency::NeedsVerification
    }
}

/// Labels models like to put in front of a rewritten query.
const QUERY_LABELS: &[&str] = &[
    "optimized search query:",
    "optimized query:",
    "search query:",
    "query:",
];

/// Extract the search query from a query-rewrite reply.
///
/// Takes the first non-empty line, drops a leading label such as `Query:`,
/// and strips surrounding quotes or backticks. Returns `None` when nothing
/// usable is left, so the caller can fall back to the original prompt.
pub fn clean_search_query(response: &str) -> Option<String> {
    let line = response.lines().map(str::trim).find(|l| !l.is_empty())?;

    let lower = line.to_lowercase();
    let without_label = QUERY_LABELS
        .iter()
        .find(|label| lower.starts_with(*label))
        .and_then(|label| line.get(label.len()..))
        .unwrap_or(line);

    let query = without_label
        .trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '*'))
        .trim();

    if query.is_empty() {
        None
    } else {
        Some(query.to_string())
    }
}
