//! Oracle use case.
//!
//! Answers a prompt with a local model and, when search is enabled and the
//! model's own answer needs verification, grounds the answer in web search
//! evidence.
//!
//! One [`Oracle::ask`] walks the decision pipeline:
//!
//! ```text
//! INIT -> DIRECT_ANSWER
//! DIRECT_ANSWER -> DONE (search disabled) | EVALUATE (search enabled)
//! EVALUATE -> DONE (sufficient) | REFACTOR_QUERY (needs verification)
//! REFACTOR_QUERY -> SEARCH
//! SEARCH -> SUMMARIZE (>=1 result) | DONE_WITH_DIRECT (0 results or error)
//! SUMMARIZE -> COMPOSE_FINAL
//! COMPOSE_FINAL -> DONE
//! ```
//!
//! Only a DIRECT_ANSWER failure aborts a run. Every later failure is
//! absorbed as a [`Degradation`] and the run still finishes with an answer.

use crate::config::BehaviorConfig;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::llm_gateway::{GatewayError, GatewaySet, LlmGateway};
use crate::ports::progress::{NoProgress, PipelineProgressNotifier};
use crate::ports::search_gateway::{SearchError, SearchGateway};
use oracle_domain::search::entities::FALLBACK_SUMMARY_BYTES;
use oracle_domain::util::{truncate_str, truncate_with_ellipsis};
use oracle_domain::{
    ConfigError, ConversationHistory, Degradation, DomainError, Message, Model, OracleConfig,
    PipelineOutcome, PipelineState, Prompt, ProviderKind, SearchEngine, SearchResult, StageRequest,
    clean_search_query, format_evidence, parse_sufficiency,
};
use serde_json::json;
use std::fmt::Display;
use std::future::Future;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors returned to the caller of [`Oracle::ask`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("Invalid prompt: {0}")]
    InvalidPrompt(#[from] DomainError),

    #[error("Another request is already running in this session")]
    Busy,

    #[error("Model call failed: {0}")]
    Provider(#[from] GatewayError),
}

/// The configuration a run executes against, with its resolved gateway.
struct ActiveProfile {
    config: OracleConfig,
    gateway: Arc<dyn LlmGateway>,
}

/// A conversational session with a local model.
///
/// Owns its configuration and conversation history. Separate instances
/// share no mutable state.
pub struct Oracle {
    gateways: GatewaySet,
    search: Arc<dyn SearchGateway>,
    behavior: BehaviorConfig,
    profile: RwLock<Arc<ActiveProfile>>,
    history: Mutex<ConversationHistory>,
    run_guard: tokio::sync::Mutex<()>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl Oracle {
    /// Create an Oracle with the given gateways and initial configuration.
    ///
    /// Fails when `config` is invalid or no gateway speaks its provider.
    pub fn new(
        gateways: GatewaySet,
        search: Arc<dyn SearchGateway>,
        config: OracleConfig,
    ) -> Result<Self, ConfigError> {
        let profile = Self::resolve_profile(&gateways, config)?;
        Ok(Self {
            gateways,
            search,
            behavior: BehaviorConfig::default(),
            profile: RwLock::new(Arc::new(profile)),
            history: Mutex::new(ConversationHistory::new()),
            run_guard: tokio::sync::Mutex::new(()),
            conversation_logger: Arc::new(NoConversationLogger),
        })
    }

    pub fn with_behavior(mut self, behavior: BehaviorConfig) -> Self {
        self.behavior = behavior;
        self
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    fn resolve_profile(
        gateways: &GatewaySet,
        config: OracleConfig,
    ) -> Result<ActiveProfile, ConfigError> {
        config.validate()?;
        let gateway = gateways
            .resolve(config.provider)
            .ok_or(ConfigError::ProviderUnavailable(config.provider))?;
        Ok(ActiveProfile { config, gateway })
    }

    /// Replace the active configuration.
    ///
    /// Takes effect for the next run. A run already in flight keeps the
    /// profile it started with.
    pub fn configure(&self, config: OracleConfig) -> Result<(), ConfigError> {
        let profile = Self::resolve_profile(&self.gateways, config)?;
        info!(
            "Configured model {} via {} (search: {})",
            profile.config.model,
            profile.config.provider,
            profile
                .config
                .active_search_engine()
                .map(|e| e.as_str())
                .unwrap_or("off")
        );
        *self.profile.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(profile);
        Ok(())
    }

    /// Current configuration.
    pub fn config(&self) -> OracleConfig {
        self.current_profile().config.clone()
    }

    fn current_profile(&self) -> Arc<ActiveProfile> {
        self.profile
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Empty the conversation history. Idempotent.
    pub fn clear_history(&self) {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        debug!("Conversation history cleared");
    }

    pub fn history_len(&self) -> usize {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// A copy of the conversation so far.
    pub fn history(&self) -> Vec<Message> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
    }

    /// Models served by the active provider.
    ///
    /// Bounded and retried like a pipeline model call.
    pub async fn available_models(&self) -> Result<Vec<Model>, GatewayError> {
        let profile = self.current_profile();
        let gateway = profile.gateway.as_ref();
        call_with_retry(
            "available_models",
            self.behavior.attempts(),
            self.behavior.model_timeout,
            GatewayError::Timeout,
            move || gateway.available_models(),
        )
        .await
    }

    /// Providers this Oracle can be configured to use.
    pub fn providers(&self) -> Vec<ProviderKind> {
        self.gateways.providers()
    }

    /// Answer `prompt` without progress reporting.
    pub async fn ask(&self, prompt: &str) -> Result<PipelineOutcome, OracleError> {
        self.ask_with_progress(prompt, &NoProgress).await
    }

    /// Answer `prompt`, reporting each stage to `progress`.
    ///
    /// On success the prompt and the final answer are appended to the
    /// history as one exchange. On failure the history is untouched.
    pub async fn ask_with_progress(
        &self,
        prompt: &str,
        progress: &dyn PipelineProgressNotifier,
    ) -> Result<PipelineOutcome, OracleError> {
        let prompt = Prompt::from_str(prompt)?;
        let _run = self.run_guard.try_lock().map_err(|_| OracleError::Busy)?;

        let profile = self.current_profile();
        let history = self.history();

        info!("Starting ask: {}", truncate_str(prompt.content(), 100));
        self.conversation_logger.log(ConversationEvent::new(
            "user_prompt",
            json!({
                "prompt": prompt.content(),
                "model": profile.config.model.as_str(),
                "provider": profile.config.provider.as_str(),
                "search_engine": profile.config.active_search_engine().map(|e| e.as_str()),
            }),
        ));

        let outcome = PipelineRun::new(self, &profile, prompt.content(), progress)
            .execute(&history)
            .await?;

        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .append_exchange(
                Message::user(prompt.content()),
                Message::assistant(&outcome.final_answer),
            );

        info!(
            "Ask finished in {} (used_search: {}, degradations: {})",
            outcome
                .terminal_state()
                .map(|s| s.as_str())
                .unwrap_or("unknown"),
            outcome.used_search,
            outcome.degradations.len()
        );
        self.conversation_logger.log(ConversationEvent::new(
            "outcome",
            json!({
                "final_answer": outcome.final_answer,
                "used_search": outcome.used_search,
                "search_query": outcome.search_query,
                "degradations": outcome.degradations,
                "path": outcome.path,
            }),
        ));

        Ok(outcome)
    }
}

/// State of a single pipeline run.
struct PipelineRun<'a> {
    oracle: &'a Oracle,
    profile: &'a ActiveProfile,
    prompt: &'a str,
    progress: &'a dyn PipelineProgressNotifier,
    path: Vec<PipelineState>,
    degradations: Vec<Degradation>,
    candidate: String,
    query: Option<String>,
    evidence: String,
    summary: String,
    final_answer: Option<String>,
}

impl<'a> PipelineRun<'a> {
    fn new(
        oracle: &'a Oracle,
        profile: &'a ActiveProfile,
        prompt: &'a str,
        progress: &'a dyn PipelineProgressNotifier,
    ) -> Self {
        Self {
            oracle,
            profile,
            prompt,
            progress,
            path: Vec::new(),
            degradations: Vec::new(),
            candidate: String::new(),
            query: None,
            evidence: String::new(),
            summary: String::new(),
            final_answer: None,
        }
    }

    async fn execute(mut self, history: &[Message]) -> Result<PipelineOutcome, GatewayError> {
        let mut state = PipelineState::Init;
        loop {
            self.path.push(state);
            debug!("Pipeline state: {}", state);

            let next = match state {
                PipelineState::Init => PipelineState::DirectAnswer,
                PipelineState::DirectAnswer => self.direct_answer(history).await?,
                PipelineState::Evaluate => self.evaluate().await,
                PipelineState::RefactorQuery => self.refactor_query().await,
                PipelineState::Search => self.search().await,
                PipelineState::Summarize => self.summarize().await,
                PipelineState::ComposeFinal => self.compose_final().await,
                PipelineState::Done | PipelineState::DoneWithDirect => break,
            };
            state = next;
        }

        // Reached only through a terminal state; the direct answer stands
        // unless composition replaced it.
        let used_search = self.final_answer.is_some();
        Ok(PipelineOutcome {
            final_answer: self.final_answer.unwrap_or(self.candidate),
            used_search,
            search_query: self.query,
            degradations: self.degradations,
            path: self.path,
        })
    }

    async fn direct_answer(&mut self, history: &[Message]) -> Result<PipelineState, GatewayError> {
        self.candidate = self
            .complete(StageRequest::DirectAnswer {
                history,
                prompt: self.prompt,
            })
            .await?;

        Ok(if self.profile.config.active_search_engine().is_some() {
            PipelineState::Evaluate
        } else {
            PipelineState::Done
        })
    }

    async fn evaluate(&mut self) -> PipelineState {
        let request = StageRequest::Evaluate {
            prompt: self.prompt,
            candidate: &self.candidate,
        };
        let sufficiency = match self.complete(request).await {
            Ok(verdict) => parse_sufficiency(&verdict),
            Err(e) => {
                self.degrade(PipelineState::Evaluate, format!("evaluation failed: {}", e));
                return PipelineState::RefactorQuery;
            }
        };

        debug!("Evaluation verdict: {:?}", sufficiency);
        if sufficiency.is_sufficient() {
            PipelineState::Done
        } else {
            PipelineState::RefactorQuery
        }
    }

    async fn refactor_query(&mut self) -> PipelineState {
        let request = StageRequest::RefactorQuery {
            prompt: self.prompt,
        };
        let query = match self.complete(request).await {
            Ok(reply) => match clean_search_query(&reply) {
                Some(query) => query,
                None => {
                    self.degrade(PipelineState::RefactorQuery, "rewritten query was empty");
                    self.prompt.to_string()
                }
            },
            Err(e) => {
                self.degrade(
                    PipelineState::RefactorQuery,
                    format!("query rewrite failed: {}", e),
                );
                self.prompt.to_string()
            }
        };

        debug!("Search query: {}", query);
        self.query = Some(query);
        PipelineState::Search
    }

    async fn search(&mut self) -> PipelineState {
        let Some(engine) = self.profile.config.active_search_engine() else {
            return PipelineState::DoneWithDirect;
        };
        let query = self.query.clone().unwrap_or_else(|| self.prompt.to_string());

        match self.run_search(&query, engine).await {
            Ok(results) if results.is_empty() => {
                info!("{} returned no results for '{}'", engine, query);
                PipelineState::DoneWithDirect
            }
            Ok(results) => {
                self.evidence = format_evidence(&results);
                PipelineState::Summarize
            }
            Err(e) => {
                self.degrade(PipelineState::Search, format!("search failed: {}", e));
                PipelineState::DoneWithDirect
            }
        }
    }

    async fn summarize(&mut self) -> PipelineState {
        let request = StageRequest::Summarize {
            prompt: self.prompt,
            evidence: &self.evidence,
        };
        self.summary = match self.complete(request).await {
            Ok(summary) => summary,
            Err(e) => {
                self.degrade(
                    PipelineState::Summarize,
                    format!("summary failed, using raw evidence: {}", e),
                );
                truncate_with_ellipsis(&self.evidence, FALLBACK_SUMMARY_BYTES)
            }
        };
        PipelineState::ComposeFinal
    }

    async fn compose_final(&mut self) -> PipelineState {
        let request = StageRequest::ComposeFinal {
            prompt: self.prompt,
            summary: &self.summary,
        };
        match self.complete(request).await {
            Ok(answer) => self.final_answer = Some(answer),
            Err(e) => self.degrade(
                PipelineState::ComposeFinal,
                format!("composition failed, keeping direct answer: {}", e),
            ),
        }
        PipelineState::Done
    }

    fn degrade(&mut self, state: PipelineState, reason: impl Into<String>) {
        let degradation = Degradation::new(state, reason);
        warn!("Degraded in {}: {}", state, degradation.reason);
        self.degradations.push(degradation);
    }

    /// Issue one stage's model call with the run's profile.
    async fn complete(&self, request: StageRequest<'_>) -> Result<String, GatewayError> {
        let stage = request.stage();
        let messages = request.messages();
        let gateway = self.profile.gateway.as_ref();
        let model = &self.profile.config.model;
        let behavior = &self.oracle.behavior;

        self.progress.on_stage_start(stage);
        let messages_ref = &messages[..];
        let result = call_with_retry(
            stage.as_str(),
            behavior.attempts(),
            behavior.model_timeout,
            GatewayError::Timeout,
            move || async move {
                let text = gateway.complete(messages_ref, model).await?;
                if text.trim().is_empty() {
                    Err(GatewayError::EmptyResponse)
                } else {
                    Ok(text)
                }
            },
        )
        .await;
        self.progress.on_stage_complete(stage, result.is_ok());

        self.oracle.conversation_logger.log(ConversationEvent::new(
            "stage_response",
            json!({
                "stage": stage.as_str(),
                "model": model.as_str(),
                "ok": result.is_ok(),
                "text": result.as_ref().map(String::as_str).unwrap_or_default(),
                "error": result.as_ref().err().map(|e| e.to_string()),
            }),
        ));

        result
    }

    async fn run_search(
        &self,
        query: &str,
        engine: SearchEngine,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let search = self.oracle.search.as_ref();
        let behavior = &self.oracle.behavior;

        self.progress.on_search_start(engine, query);
        let result = call_with_retry(
            "search",
            behavior.attempts(),
            behavior.search_timeout,
            SearchError::Timeout,
            move || search.search(query, engine),
        )
        .await;
        self.progress
            .on_search_complete(result.as_ref().ok().map(Vec::len));

        self.oracle.conversation_logger.log(ConversationEvent::new(
            "search_results",
            json!({
                "engine": engine.as_str(),
                "query": query,
                "results": result.as_ref().map(|r| r.as_slice()).unwrap_or_default(),
                "error": result.as_ref().err().map(|e| e.to_string()),
            }),
        ));

        result
    }
}

/// Run `call` up to `attempts` times, each bounded by `limit`.
async fn call_with_retry<T, E, F, Fut>(
    label: &str,
    attempts: u32,
    limit: Option<Duration>,
    timeout_error: E,
    mut call: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Clone + Display,
{
    let attempts = attempts.max(1);
    let mut last_error = timeout_error.clone();

    for attempt in 1..=attempts {
        let result = match limit {
            Some(limit) => tokio::time::timeout(limit, call())
                .await
                .unwrap_or_else(|_| Err(timeout_error.clone())),
            None => call().await,
        };

        match result {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt < attempts {
                    warn!(
                        "{} failed (attempt {}/{}), retrying: {}",
                        label, attempt, attempts, e
                    );
                } else {
                    debug!("{} failed (attempt {}/{}): {}", label, attempt, attempts, e);
                }
                last_error = e;
            }
        }
    }

    Err(last_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use oracle_domain::{Role, Stage};
    use std::collections::VecDeque;
    use tokio::sync::Notify;

    const TOKYO: &str = "What is the current population of Tokyo?";

    // ==================== Mock Implementations ====================

    struct Pause {
        started: Arc<Notify>,
        release: Arc<Notify>,
    }

    struct ScriptedGateway {
        kind: ProviderKind,
        replies: Mutex<VecDeque<Result<String, GatewayError>>>,
        calls: Mutex<Vec<(Model, Vec<Message>)>>,
        pause_first_call: Mutex<Option<Pause>>,
        hang: bool,
    }

    impl ScriptedGateway {
        fn new(replies: Vec<Result<&str, GatewayError>>) -> Self {
            Self {
                kind: ProviderKind::Ollama,
                replies: Mutex::new(
                    replies
                        .into_iter()
                        .map(|r| r.map(str::to_string))
                        .collect(),
                ),
                calls: Mutex::new(Vec::new()),
                pause_first_call: Mutex::new(None),
                hang: false,
            }
        }

        fn ok(replies: &[&str]) -> Self {
            Self::new(replies.iter().map(|r| Ok(*r)).collect())
        }

        fn with_kind(mut self, kind: ProviderKind) -> Self {
            self.kind = kind;
            self
        }

        fn with_pause(self, started: Arc<Notify>, release: Arc<Notify>) -> Self {
            *self.pause_first_call.lock().unwrap() = Some(Pause { started, release });
            self
        }

        fn hanging() -> Self {
            let mut gateway = Self::ok(&[]);
            gateway.hang = true;
            gateway
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn models(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(m, _)| m.as_str().to_string())
                .collect()
        }

        fn messages(&self, call: usize) -> Vec<Message> {
            self.calls.lock().unwrap()[call].1.clone()
        }

        /// The system instruction of each call, empty for DirectAnswer.
        fn instructions(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(_, msgs)| {
                    msgs.iter()
                        .find(|m| m.role == Role::System)
                        .map(|m| m.content.clone())
                        .unwrap_or_default()
                })
                .collect()
        }
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        fn provider(&self) -> ProviderKind {
            self.kind
        }

        async fn complete(
            &self,
            messages: &[Message],
            model: &Model,
        ) -> Result<String, GatewayError> {
            self.calls
                .lock()
                .unwrap()
                .push((model.clone(), messages.to_vec()));

            let pause = self.pause_first_call.lock().unwrap().take();
            if let Some(pause) = pause {
                pause.started.notify_one();
                pause.release.notified().await;
            }
            if self.hang {
                std::future::pending::<()>().await;
            }

            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GatewayError::RequestFailed("no scripted reply".into())))
        }

        async fn available_models(&self) -> Result<Vec<Model>, GatewayError> {
            if self.hang {
                std::future::pending::<()>().await;
            }
            Ok(vec![Model::default(), Model::try_new("qwen2.5").unwrap()])
        }
    }

    struct ScriptedSearch {
        replies: Mutex<VecDeque<Result<Vec<SearchResult>, SearchError>>>,
        queries: Mutex<Vec<(String, SearchEngine)>>,
        hang: bool,
    }

    impl ScriptedSearch {
        fn new(replies: Vec<Result<Vec<SearchResult>, SearchError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                queries: Mutex::new(Vec::new()),
                hang: false,
            }
        }

        fn empty() -> Self {
            Self::new(vec![])
        }

        fn hanging() -> Self {
            let mut search = Self::empty();
            search.hang = true;
            search
        }

        fn queries(&self) -> Vec<(String, SearchEngine)> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchGateway for ScriptedSearch {
        async fn search(
            &self,
            query: &str,
            engine: SearchEngine,
        ) -> Result<Vec<SearchResult>, SearchError> {
            self.queries
                .lock()
                .unwrap()
                .push((query.to_string(), engine));
            if self.hang {
                std::future::pending::<()>().await;
            }
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl PipelineProgressNotifier for RecordingProgress {
        fn on_stage_start(&self, stage: Stage) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start:{}", stage.as_str()));
        }

        fn on_stage_complete(&self, stage: Stage, success: bool) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done:{}:{}", stage.as_str(), success));
        }

        fn on_search_complete(&self, results: Option<usize>) {
            self.events
                .lock()
                .unwrap()
                .push(format!("search:{:?}", results));
        }
    }

    #[derive(Default)]
    struct RecordingLogger {
        events: Mutex<Vec<&'static str>>,
    }

    impl ConversationLogger for RecordingLogger {
        fn log(&self, event: ConversationEvent) {
            self.events.lock().unwrap().push(event.event_type);
        }
    }

    // ==================== Helpers ====================

    fn tokyo_results() -> Vec<SearchResult> {
        vec![
            SearchResult::new(
                "Tokyo population 2024",
                "https://example.org/tokyo",
                "Tokyo metropolis had about 14.1 million residents in 2024.",
            ),
            SearchResult::new(
                "Tokyo - Wikipedia",
                "https://en.wikipedia.org/wiki/Tokyo",
                "The Greater Tokyo Area is the most populous metropolitan area.",
            ),
            SearchResult::new(
                "Tokyo statistics",
                "https://www.metro.tokyo.lg.jp/",
                "Population estimates are published monthly.",
            ),
        ]
    }

    fn search_config() -> OracleConfig {
        OracleConfig::default().with_search(SearchEngine::DuckDuckGo)
    }

    fn fast_behavior() -> BehaviorConfig {
        BehaviorConfig {
            model_timeout: Some(Duration::from_millis(50)),
            search_timeout: Some(Duration::from_millis(50)),
            max_retries: 1,
        }
    }

    fn oracle(
        gateway: &Arc<ScriptedGateway>,
        search: &Arc<ScriptedSearch>,
        config: OracleConfig,
    ) -> Oracle {
        Oracle::new(
            GatewaySet::default().with(gateway.clone()),
            search.clone(),
            config,
        )
        .unwrap()
        .with_behavior(BehaviorConfig::default().with_max_retries(0))
    }

    // ==================== Scenarios ====================

    #[tokio::test]
    async fn test_golden_path_grounds_answer_in_search() {
        let gateway = Arc::new(ScriptedGateway::ok(&[
            "Tokyo has about 13.9 million people.",
            "[Evaluation] - No",
            "Tokyo population 2024 statistics",
            "Tokyo had about 14.1 million residents in 2024.",
            "According to 2024 figures, Tokyo has about 14.1 million residents.",
        ]));
        let search = Arc::new(ScriptedSearch::new(vec![Ok(tokyo_results())]));
        let oracle = oracle(&gateway, &search, search_config());

        let outcome = oracle.ask(TOKYO).await.unwrap();

        assert!(outcome.used_search);
        assert_eq!(
            outcome.search_query.as_deref(),
            Some("Tokyo population 2024 statistics")
        );
        assert_eq!(
            outcome.final_answer,
            "According to 2024 figures, Tokyo has about 14.1 million residents."
        );
        assert!(!outcome.is_degraded());
        assert_eq!(
            outcome.path,
            vec![
                PipelineState::Init,
                PipelineState::DirectAnswer,
                PipelineState::Evaluate,
                PipelineState::RefactorQuery,
                PipelineState::Search,
                PipelineState::Summarize,
                PipelineState::ComposeFinal,
                PipelineState::Done,
            ]
        );
        assert_eq!(gateway.call_count(), 5);
        assert_eq!(
            search.queries(),
            vec![(
                "Tokyo population 2024 statistics".to_string(),
                SearchEngine::DuckDuckGo
            )]
        );

        // Summarizer sees the formatted evidence
        let summarize = gateway.messages(3);
        assert!(summarize[1].content.contains("Source 1:"));
        assert!(summarize[1].content.contains("14.1 million"));

        let history = oracle.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], Message::user(TOKYO));
        assert_eq!(history[1], Message::assistant(&outcome.final_answer));
    }

    #[tokio::test]
    async fn test_search_disabled_returns_direct_answer() {
        let gateway = Arc::new(ScriptedGateway::ok(&["About 14 million."]));
        let search = Arc::new(ScriptedSearch::empty());
        let oracle = oracle(&gateway, &search, OracleConfig::default());

        let outcome = oracle.ask(TOKYO).await.unwrap();

        assert!(!outcome.used_search);
        assert_eq!(outcome.final_answer, "About 14 million.");
        assert_eq!(outcome.search_query, None);
        assert_eq!(gateway.call_count(), 1);
        assert!(search.queries().is_empty());
        assert!(!outcome.visited(PipelineState::Evaluate));
        assert_eq!(oracle.history_len(), 2);
    }

    #[tokio::test]
    async fn test_search_failure_keeps_direct_answer() {
        let gateway = Arc::new(ScriptedGateway::ok(&[
            "About 14 million.",
            "[Evaluation] - No",
            "Tokyo population",
        ]));
        let search = Arc::new(ScriptedSearch::new(vec![Err(SearchError::RateLimited(
            SearchEngine::Google,
        ))]));
        let oracle = oracle(&gateway, &search, search_config());

        let outcome = oracle.ask(TOKYO).await.unwrap();

        assert!(!outcome.used_search);
        assert_eq!(outcome.final_answer, "About 14 million.");
        assert_eq!(outcome.terminal_state(), Some(PipelineState::DoneWithDirect));
        assert_eq!(outcome.degradations.len(), 1);
        assert_eq!(outcome.degradations[0].state, PipelineState::Search);
        assert!(!outcome.visited(PipelineState::Summarize));
        assert_eq!(gateway.call_count(), 3);
        assert_eq!(oracle.history_len(), 2);
    }

    #[tokio::test]
    async fn test_empty_search_results_keep_direct_answer() {
        let gateway = Arc::new(ScriptedGateway::ok(&[
            "About 14 million.",
            "[Evaluation] - No",
            "Tokyo population",
        ]));
        let search = Arc::new(ScriptedSearch::new(vec![Ok(vec![])]));
        let oracle = oracle(&gateway, &search, search_config());

        let outcome = oracle.ask(TOKYO).await.unwrap();

        assert!(!outcome.used_search);
        assert_eq!(outcome.final_answer, "About 14 million.");
        assert_eq!(outcome.search_query.as_deref(), Some("Tokyo population"));
        assert_eq!(outcome.terminal_state(), Some(PipelineState::DoneWithDirect));
        assert!(!outcome.is_degraded());
        assert_eq!(gateway.call_count(), 3);
    }

    #[tokio::test]
    async fn test_sufficient_answer_skips_search() {
        let gateway = Arc::new(ScriptedGateway::ok(&["Paris.", "[Evaluation] - Yes"]));
        let search = Arc::new(ScriptedSearch::empty());
        let oracle = oracle(&gateway, &search, search_config());

        let outcome = oracle.ask("What is the capital of France?").await.unwrap();

        assert_eq!(outcome.final_answer, "Paris.");
        assert!(!outcome.used_search);
        assert_eq!(outcome.search_query, None);
        assert_eq!(gateway.call_count(), 2);
        assert!(search.queries().is_empty());
        assert_eq!(outcome.terminal_state(), Some(PipelineState::Done));
    }

    #[tokio::test]
    async fn test_malformed_verdict_triggers_search() {
        let gateway = Arc::new(ScriptedGateway::ok(&[
            "About 14 million.",
            "I think the answer looks fine.",
            "Tokyo population",
            "summary",
            "Composed answer",
        ]));
        let search = Arc::new(ScriptedSearch::new(vec![Ok(tokyo_results())]));
        let oracle = oracle(&gateway, &search, search_config());

        let outcome = oracle.ask(TOKYO).await.unwrap();

        assert!(outcome.used_search);
        assert_eq!(outcome.final_answer, "Composed answer");
        assert_eq!(search.queries().len(), 1);
    }

    #[tokio::test]
    async fn test_evaluation_failure_triggers_search() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Ok("About 14 million."),
            Err(GatewayError::ConnectionError("refused".into())),
            Ok("Tokyo population"),
            Ok("summary"),
            Ok("Composed answer"),
        ]));
        let search = Arc::new(ScriptedSearch::new(vec![Ok(tokyo_results())]));
        let oracle = oracle(&gateway, &search, search_config());

        let outcome = oracle.ask(TOKYO).await.unwrap();

        assert!(outcome.used_search);
        assert_eq!(outcome.degradations[0].state, PipelineState::Evaluate);
    }

    #[tokio::test]
    async fn test_refactor_failure_searches_with_prompt() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Ok("About 14 million."),
            Ok("[Evaluation] - No"),
            Err(GatewayError::HttpStatus {
                status: 500,
                body: "oops".into(),
            }),
        ]));
        let search = Arc::new(ScriptedSearch::empty());
        let oracle = oracle(&gateway, &search, search_config());

        let outcome = oracle.ask(TOKYO).await.unwrap();

        assert_eq!(search.queries()[0].0, TOKYO);
        assert_eq!(outcome.search_query.as_deref(), Some(TOKYO));
        assert_eq!(outcome.degradations[0].state, PipelineState::RefactorQuery);
    }

    #[tokio::test]
    async fn test_refactor_reply_is_cleaned() {
        let gateway = Arc::new(ScriptedGateway::ok(&[
            "About 14 million.",
            "[Evaluation] - No",
            "Search query: \"Tokyo population 2024\"\nThis query targets recent data.",
        ]));
        let search = Arc::new(ScriptedSearch::empty());
        let oracle = oracle(&gateway, &search, search_config());

        oracle.ask(TOKYO).await.unwrap();

        assert_eq!(search.queries()[0].0, "Tokyo population 2024");
    }

    #[tokio::test]
    async fn test_summarize_failure_uses_raw_evidence() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Ok("About 14 million."),
            Ok("[Evaluation] - No"),
            Ok("Tokyo population"),
            Err(GatewayError::EmptyResponse),
            Ok("Composed from evidence"),
        ]));
        let search = Arc::new(ScriptedSearch::new(vec![Ok(tokyo_results())]));
        let oracle = oracle(&gateway, &search, search_config());

        let outcome = oracle.ask(TOKYO).await.unwrap();

        assert!(outcome.used_search);
        assert_eq!(outcome.final_answer, "Composed from evidence");
        assert_eq!(outcome.degradations[0].state, PipelineState::Summarize);

        let compose = gateway.messages(4);
        assert!(compose[1].content.contains("Source 1:"));
    }

    #[tokio::test]
    async fn test_compose_failure_keeps_candidate() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Ok("About 14 million."),
            Ok("[Evaluation] - No"),
            Ok("Tokyo population"),
            Ok("summary"),
            Err(GatewayError::Timeout),
        ]));
        let search = Arc::new(ScriptedSearch::new(vec![Ok(tokyo_results())]));
        let oracle = oracle(&gateway, &search, search_config());

        let outcome = oracle.ask(TOKYO).await.unwrap();

        assert!(!outcome.used_search);
        assert_eq!(outcome.final_answer, "About 14 million.");
        assert_eq!(outcome.search_query.as_deref(), Some("Tokyo population"));
        assert_eq!(outcome.degradations[0].state, PipelineState::ComposeFinal);
        assert_eq!(outcome.terminal_state(), Some(PipelineState::Done));
        assert_eq!(
            oracle.history()[1],
            Message::assistant("About 14 million.")
        );
    }

    #[tokio::test]
    async fn test_side_calls_do_not_see_history() {
        let gateway = Arc::new(ScriptedGateway::ok(&[
            "Hello!",
            "Paris.",
            "[Evaluation] - Yes",
        ]));
        let search = Arc::new(ScriptedSearch::empty());
        let oracle = oracle(&gateway, &search, OracleConfig::default());

        oracle.ask("Hi").await.unwrap();
        oracle.configure(search_config()).unwrap();
        oracle.ask("Capital of France?").await.unwrap();

        // Direct answer carries the first exchange plus the new prompt
        let direct = gateway.messages(1);
        assert_eq!(direct.len(), 3);
        assert_eq!(direct[0], Message::user("Hi"));
        assert_eq!(direct[1], Message::assistant("Hello!"));

        // Evaluation is a side call with only its own inputs
        let evaluate = gateway.messages(2);
        assert_eq!(evaluate.len(), 2);
        assert_eq!(evaluate[0].role, Role::System);
        assert!(!evaluate.iter().any(|m| m.content == "Hi"));
        assert!(gateway.instructions()[2].contains("[Evaluation]"));
        assert_eq!(oracle.history_len(), 4);
    }

    // ==================== Failure handling ====================

    #[tokio::test]
    async fn test_direct_answer_failure_leaves_history_unchanged() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Ok("Hello!"),
            Err(GatewayError::ConnectionError("refused".into())),
        ]));
        let search = Arc::new(ScriptedSearch::empty());
        let oracle = oracle(&gateway, &search, OracleConfig::default());

        oracle.ask("Hi").await.unwrap();
        let result = oracle.ask("Still there?").await;

        assert!(matches!(
            result,
            Err(OracleError::Provider(GatewayError::ConnectionError(_)))
        ));
        assert_eq!(oracle.history_len(), 2);
    }

    #[tokio::test]
    async fn test_empty_direct_answer_is_an_error() {
        let gateway = Arc::new(ScriptedGateway::ok(&["   "]));
        let search = Arc::new(ScriptedSearch::empty());
        let oracle = oracle(&gateway, &search, OracleConfig::default());

        let result = oracle.ask("Hi").await;

        assert_eq!(
            result,
            Err(OracleError::Provider(GatewayError::EmptyResponse))
        );
        assert_eq!(oracle.history_len(), 0);
    }

    #[tokio::test]
    async fn test_blank_prompt_is_rejected_without_model_call() {
        let gateway = Arc::new(ScriptedGateway::ok(&["unused"]));
        let search = Arc::new(ScriptedSearch::empty());
        let oracle = oracle(&gateway, &search, OracleConfig::default());

        let result = oracle.ask("   \n").await;

        assert_eq!(
            result,
            Err(OracleError::InvalidPrompt(DomainError::EmptyPrompt))
        );
        assert_eq!(gateway.call_count(), 0);
        assert_eq!(oracle.history_len(), 0);
    }

    #[tokio::test]
    async fn test_retry_recovers_transient_failure() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Err(GatewayError::ConnectionError("reset".into())),
            Ok("Recovered."),
        ]));
        let search = Arc::new(ScriptedSearch::empty());
        let oracle = Oracle::new(
            GatewaySet::default().with(gateway.clone()),
            search,
            OracleConfig::default(),
        )
        .unwrap();

        let outcome = oracle.ask("Hi").await.unwrap();

        assert_eq!(outcome.final_answer, "Recovered.");
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn test_retry_is_bounded() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Err(GatewayError::ConnectionError("down".into())),
            Err(GatewayError::ConnectionError("down".into())),
            Ok("never reached"),
        ]));
        let search = Arc::new(ScriptedSearch::empty());
        let oracle = Oracle::new(
            GatewaySet::default().with(gateway.clone()),
            search,
            OracleConfig::default(),
        )
        .unwrap();

        assert!(oracle.ask("Hi").await.is_err());
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn test_model_timeout_becomes_transport_failure() {
        let gateway = Arc::new(ScriptedGateway::hanging());
        let search = Arc::new(ScriptedSearch::empty());
        let oracle = Oracle::new(
            GatewaySet::default().with(gateway.clone()),
            search,
            OracleConfig::default(),
        )
        .unwrap()
        .with_behavior(fast_behavior());

        let result = oracle.ask("Hi").await;

        assert_eq!(result, Err(OracleError::Provider(GatewayError::Timeout)));
        assert_eq!(gateway.call_count(), 2);
        assert_eq!(oracle.history_len(), 0);
    }

    #[tokio::test]
    async fn test_search_timeout_keeps_direct_answer() {
        let gateway = Arc::new(ScriptedGateway::ok(&[
            "About 14 million.",
            "[Evaluation] - No",
            "Tokyo population",
        ]));
        let search = Arc::new(ScriptedSearch::hanging());
        let oracle = Oracle::new(
            GatewaySet::default().with(gateway.clone()),
            search.clone(),
            search_config(),
        )
        .unwrap()
        .with_behavior(fast_behavior().with_max_retries(0));

        let outcome = tokio::time::timeout(Duration::from_secs(1), oracle.ask(TOKYO))
            .await
            .expect("search timeout should bound the run")
            .unwrap();

        assert_eq!(outcome.final_answer, "About 14 million.");
        assert!(!outcome.used_search);
        assert_eq!(outcome.terminal_state(), Some(PipelineState::DoneWithDirect));
        assert_eq!(outcome.degradations.len(), 1);
        assert_eq!(outcome.degradations[0].state, PipelineState::Search);
        assert!(outcome.degradations[0].reason.contains("Timeout"));
        assert_eq!(search.queries().len(), 1);
        assert_eq!(oracle.history_len(), 2);
    }

    // ==================== Session operations ====================

    #[tokio::test]
    async fn test_each_success_appends_two_turns() {
        let gateway = Arc::new(ScriptedGateway::ok(&["one", "two", "three"]));
        let search = Arc::new(ScriptedSearch::empty());
        let oracle = oracle(&gateway, &search, OracleConfig::default());

        for (i, prompt) in ["a", "b", "c"].iter().enumerate() {
            oracle.ask(prompt).await.unwrap();
            assert_eq!(oracle.history_len(), 2 * (i + 1));
        }
        let roles: Vec<Role> = oracle.history().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant
            ]
        );
    }

    #[tokio::test]
    async fn test_clear_history_is_idempotent() {
        let gateway = Arc::new(ScriptedGateway::ok(&["Hello!", "Fresh start."]));
        let search = Arc::new(ScriptedSearch::empty());
        let oracle = oracle(&gateway, &search, OracleConfig::default());

        oracle.ask("Hi").await.unwrap();
        oracle.clear_history();
        oracle.clear_history();
        assert_eq!(oracle.history_len(), 0);

        oracle.ask("Again").await.unwrap();
        assert_eq!(gateway.messages(1), vec![Message::user("Again")]);
    }

    #[tokio::test]
    async fn test_configure_rejects_invalid_config() {
        let gateway = Arc::new(ScriptedGateway::ok(&[]));
        let search = Arc::new(ScriptedSearch::empty());
        let oracle = oracle(&gateway, &search, OracleConfig::default());

        let mut missing_engine = OracleConfig::default();
        missing_engine.search_enabled = true;
        assert_eq!(
            oracle.configure(missing_engine),
            Err(ConfigError::MissingSearchEngine)
        );
        assert_eq!(
            oracle.configure(OracleConfig::default().with_provider(ProviderKind::LmStudio)),
            Err(ConfigError::ProviderUnavailable(ProviderKind::LmStudio))
        );
        assert_eq!(oracle.config(), OracleConfig::default());
    }

    #[tokio::test]
    async fn test_configure_switches_provider() {
        let native = Arc::new(ScriptedGateway::ok(&["from native"]));
        let compat =
            Arc::new(ScriptedGateway::ok(&["from lm studio"]).with_kind(ProviderKind::LmStudio));
        let oracle = Oracle::new(
            GatewaySet::default().with(native.clone()).with(compat.clone()),
            Arc::new(ScriptedSearch::empty()),
            OracleConfig::default(),
        )
        .unwrap();

        oracle
            .configure(
                OracleConfig::default()
                    .with_provider(ProviderKind::LmStudio)
                    .with_model(Model::try_new("qwen2.5").unwrap()),
            )
            .unwrap();
        let outcome = oracle.ask("Hi").await.unwrap();

        assert_eq!(outcome.final_answer, "from lm studio");
        assert_eq!(native.call_count(), 0);
        assert_eq!(compat.models(), vec!["qwen2.5"]);
    }

    #[tokio::test]
    async fn test_configure_during_run_keeps_issued_model() {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let gateway = Arc::new(
            ScriptedGateway::ok(&["first", "second"]).with_pause(started.clone(), release.clone()),
        );
        let search = Arc::new(ScriptedSearch::empty());
        let oracle = oracle(&gateway, &search, OracleConfig::default());

        let (first, _) = tokio::join!(oracle.ask("one"), async {
            started.notified().await;
            oracle
                .configure(OracleConfig::default().with_model(Model::try_new("qwen2.5").unwrap()))
                .unwrap();
            release.notify_one();
        });
        first.unwrap();
        oracle.ask("two").await.unwrap();

        assert_eq!(gateway.models(), vec!["llama3.2", "qwen2.5"]);
    }

    #[tokio::test]
    async fn test_concurrent_ask_is_rejected() {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let gateway = Arc::new(
            ScriptedGateway::ok(&["first"]).with_pause(started.clone(), release.clone()),
        );
        let search = Arc::new(ScriptedSearch::empty());
        let oracle = oracle(&gateway, &search, OracleConfig::default());

        let (first, second) = tokio::join!(oracle.ask("one"), async {
            started.notified().await;
            let second = oracle.ask("two").await;
            release.notify_one();
            second
        });

        assert_eq!(first.unwrap().final_answer, "first");
        assert_eq!(second, Err(OracleError::Busy));
        assert_eq!(oracle.history_len(), 2);
    }

    #[tokio::test]
    async fn test_progress_and_conversation_log() {
        let gateway = Arc::new(ScriptedGateway::ok(&["Paris.", "[Evaluation] - Yes"]));
        let search = Arc::new(ScriptedSearch::empty());
        let logger = Arc::new(RecordingLogger::default());
        let oracle =
            oracle(&gateway, &search, search_config()).with_conversation_logger(logger.clone());
        let progress = RecordingProgress::default();

        oracle
            .ask_with_progress("Capital of France?", &progress)
            .await
            .unwrap();

        assert_eq!(
            *progress.events.lock().unwrap(),
            vec![
                "start:direct_answer",
                "done:direct_answer:true",
                "start:evaluate",
                "done:evaluate:true",
            ]
        );
        assert_eq!(
            *logger.events.lock().unwrap(),
            vec!["user_prompt", "stage_response", "stage_response", "outcome"]
        );
    }

    #[tokio::test]
    async fn test_available_models_uses_active_provider() {
        let gateway = Arc::new(ScriptedGateway::ok(&[]));
        let search = Arc::new(ScriptedSearch::empty());
        let oracle = oracle(&gateway, &search, OracleConfig::default());

        let models = oracle.available_models().await.unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(oracle.providers(), vec![ProviderKind::Ollama]);
    }

    #[tokio::test]
    async fn test_available_models_times_out() {
        let gateway = Arc::new(ScriptedGateway::hanging());
        let search = Arc::new(ScriptedSearch::empty());
        let oracle = Oracle::new(
            GatewaySet::default().with(gateway.clone()),
            search,
            OracleConfig::default(),
        )
        .unwrap()
        .with_behavior(fast_behavior());

        let result = tokio::time::timeout(Duration::from_secs(1), oracle.available_models())
            .await
            .expect("model timeout should bound the listing");

        assert_eq!(result, Err(GatewayError::Timeout));
    }
}
