//! Result of one pipeline run

use super::state::PipelineState;
use serde::{Deserialize, Serialize};

/// A recoverable failure the pipeline absorbed instead of aborting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Degradation {
    /// State in which the failure happened
    pub state: PipelineState,
    /// Human-readable cause
    pub reason: String,
}

impl Degradation {
    pub fn new(state: PipelineState, reason: impl Into<String>) -> Self {
        Self {
            state,
            reason: reason.into(),
        }
    }
}

/// What `Oracle::ask` returns to the shell.
///
/// Only `final_answer` is kept (in the conversation history); the rest is
/// for display and logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub final_answer: String,
    /// True when the final answer was composed from search evidence.
    pub used_search: bool,
    /// The query sent to the search engine, if a search ran.
    pub search_query: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degradations: Vec<Degradation>,
    /// States visited, in order, ending with a terminal state.
    pub path: Vec<PipelineState>,
}

impl PipelineOutcome {
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }

    /// The terminal state of the run.
    pub fn terminal_state(&self) -> Option<PipelineState> {
        self.path.last().copied()
    }

    pub fn visited(&self, state: PipelineState) -> bool {
        self.path.contains(&state)
    }
}
