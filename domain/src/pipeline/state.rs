//! Pipeline stages and states

use serde::{Deserialize, Serialize};

/// A model call within one pipeline run.
///
/// Each stage has its own single-purpose instructions, built by
/// [`StageRequest`](crate::prompt::StageRequest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Answer the prompt with the conversation as context
    DirectAnswer,
    /// Judge whether the direct answer needs verification
    Evaluate,
    /// Rewrite the prompt into a search query
    RefactorQuery,
    /// Condense search results into evidence
    Summarize,
    /// Answer the prompt from the evidence
    ComposeFinal,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::DirectAnswer => "direct_answer",
            Stage::Evaluate => "evaluate",
            Stage::RefactorQuery => "refactor_query",
            Stage::Summarize => "summarize",
            Stage::ComposeFinal => "compose_final",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::DirectAnswer => "Thinking",
            Stage::Evaluate => "Checking answer",
            Stage::RefactorQuery => "Writing search query",
            Stage::Summarize => "Reading results",
            Stage::ComposeFinal => "Composing answer",
        }
    }

    /// The pipeline state in which this stage's call is made.
    pub fn state(&self) -> PipelineState {
        match self {
            Stage::DirectAnswer => PipelineState::DirectAnswer,
            Stage::Evaluate => PipelineState::Evaluate,
            Stage::RefactorQuery => PipelineState::RefactorQuery,
            Stage::Summarize => PipelineState::Summarize,
            Stage::ComposeFinal => PipelineState::ComposeFinal,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// State of the decision pipeline.
///
/// ```text
/// Init -> DirectAnswer -> Done                                  (search disabled)
///                      -> Evaluate -> Done                      (sufficient)
///                                  -> RefactorQuery -> Search -> Summarize -> ComposeFinal -> Done
///                                                             -> DoneWithDirect  (no results / error)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Init,
    DirectAnswer,
    Evaluate,
    RefactorQuery,
    Search,
    Summarize,
    ComposeFinal,
    Done,
    DoneWithDirect,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Init => "init",
            PipelineState::DirectAnswer => "direct_answer",
            PipelineState::Evaluate => "evaluate",
            PipelineState::RefactorQuery => "refactor_query",
            PipelineState::Search => "search",
            PipelineState::Summarize => "summarize",
            PipelineState::ComposeFinal => "compose_final",
            PipelineState::Done => "done",
            PipelineState::DoneWithDirect => "done_with_direct",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::DoneWithDirect)
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
