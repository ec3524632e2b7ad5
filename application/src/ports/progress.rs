//! Progress notification port
//!
//! Defines the interface for reporting progress during a pipeline run.

use oracle_domain::{SearchEngine, Stage};

/// Callback for progress updates during an `ask`
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (spinner, plain text, nothing).
pub trait PipelineProgressNotifier: Send + Sync {
    /// Called before a stage's model call is issued
    fn on_stage_start(&self, stage: Stage);

    /// Called when a stage's model call has finished (after retries)
    fn on_stage_complete(&self, stage: Stage, success: bool);

    /// Called before the search engine is queried
    fn on_search_start(&self, _engine: SearchEngine, _query: &str) {}

    /// Called with the number of results, or `None` when the search failed
    fn on_search_complete(&self, _results: Option<usize>) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl PipelineProgressNotifier for NoProgress {
    fn on_stage_start(&self, _stage: Stage) {}
    fn on_stage_complete(&self, _stage: Stage, _success: bool) {}
}
