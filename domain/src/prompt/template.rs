//! Prompt templates for the decision pipeline

use crate::pipeline::parsing::EVALUATION_MARKER;
use crate::pipeline::state::Stage;
use crate::session::entities::Message;

/// Instruction texts for each single-purpose stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for the sufficiency evaluation
    pub fn evaluation_system() -> String {
        format!(
            r#"You are a strict fact-checking reviewer.
You decide whether an answer can be trusted as is, or whether it must be verified against current web sources.
Reply with a short justification followed by exactly one final line:
{marker} - Yes
or
{marker} - No"#,
            marker = EVALUATION_MARKER
        )
    }

    /// User prompt for the sufficiency evaluation
    pub fn evaluation_prompt(question: &str, answer: &str) -> String {
        format!(
            r#"Assess whether this question concerns a well-established fact or concept in a domain such as history, science, technology or culture:

{question}

If it does, evaluate whether the answer below explains it clearly and concisely, without ambiguity or oversimplification.
Consider relevance, accuracy, timeliness and potential bias. Anything that depends on recent events, current figures or live data is NOT sufficient.
Answer "{marker} - Yes" only if the answer can be returned without verification; otherwise answer "{marker} - No".

This was the answer:

{answer}"#,
            question = question,
            answer = answer,
            marker = EVALUATION_MARKER
        )
    }

    /// System prompt for query rewriting
    pub fn refactor_system() -> &'static str {
        r#"You turn information requests into web search queries.
Your output is submitted directly to a search engine, so reply with the query only: no explanation, no quotes, no labels."#
    }

    /// User prompt for query rewriting
    pub fn refactor_prompt(question: &str) -> String {
        format!(
            r#"Rewrite the following information request as the most effective, concise, keyword-oriented search engine query:

{}"#,
            question
        )
    }

    /// System prompt for evidence summarization
    pub fn summarize_system() -> &'static str {
        r#"You condense raw web search results into evidence.
Keep only facts stated in the results that help answer the query, mention the sources they came from, and never add information that is not in the text."#
    }

    /// User prompt for evidence summarization
    pub fn summarize_prompt(question: &str, evidence: &str) -> String {
        format!(
            r#"Based on the following search results, extract and synthesize the information that is most relevant to answering the query: '{}'.
Provide a concise summary of the key findings.

Search results:

{}"#,
            question, evidence
        )
    }

    /// System prompt for final composition
    pub fn compose_system() -> &'static str {
        r#"You answer questions using the evidence you are given.
Ground every claim in that evidence. If the evidence is insufficient or contradictory, say so plainly instead of guessing or making up facts."#
    }

    /// User prompt for final composition
    pub fn compose_prompt(question: &str, summary: &str) -> String {
        format!(
            r#"Evidence gathered from a web search:

{}

Using this evidence, answer the following query:

{}"#,
            summary, question
        )
    }
}

/// The request for one model call, tagged by stage.
///
/// [`messages`](Self::messages) is a pure function of the variant: the
/// conversation history is only ever sent by [`StageRequest::DirectAnswer`];
/// every other stage is a side call that sees just its own inputs.
#[derive(Debug, Clone, Copy)]
pub enum StageRequest<'a> {
    DirectAnswer {
        history: &'a [Message],
        prompt: &'a str,
    },
    Evaluate {
        prompt: &'a str,
        candidate: &'a str,
    },
    RefactorQuery {
        prompt: &'a str,
    },
    Summarize {
        prompt: &'a str,
        evidence: &'a str,
    },
    ComposeFinal {
        prompt: &'a str,
        summary: &'a str,
    },
}

impl StageRequest<'_> {
    pub fn stage(&self) -> Stage {
        match self {
            StageRequest::DirectAnswer { .. } => Stage::DirectAnswer,
            StageRequest::Evaluate { .. } => Stage::Evaluate,
            StageRequest::RefactorQuery { .. } => Stage::RefactorQuery,
            StageRequest::Summarize { .. } => Stage::Summarize,
            StageRequest::ComposeFinal { .. } => Stage::ComposeFinal,
        }
    }

    /// Build the role-tagged messages to send to the model.
    pub fn messages(&self) -> Vec<Message> {
        match *self {
            StageRequest::DirectAnswer { history, prompt } => {
                let mut messages = Vec::with_capacity(history.len() + 1);
                messages.extend_from_slice(history);
                messages.push(Message::user(prompt));
                messages
            }
            StageRequest::Evaluate { prompt, candidate } => vec![
                Message::system(PromptTemplate::evaluation_system()),
                Message::user(PromptTemplate::evaluation_prompt(prompt, candidate)),
            ],
            StageRequest::RefactorQuery { prompt } => vec![
                Message::system(PromptTemplate::refactor_system()),
                Message::user(PromptTemplate::refactor_prompt(prompt)),
            ],
            StageRequest::Summarize { prompt, evidence } => vec![
                Message::system(PromptTemplate::summarize_system()),
                Message::user(PromptTemplate::summarize_prompt(prompt, evidence)),
            ],
            StageRequest::ComposeFinal { prompt, summary } => vec![
                Message::system(PromptTemplate::compose_system()),
                Message::user(PromptTemplate::compose_prompt(prompt, summary)),
            ],
        }
    }
}
