//! CLI command definitions

use clap::{Parser, ValueEnum};
use oracle_domain::OutputFormat;
use std::path::PathBuf;

/// Output format for Oracle answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    /// Only the final answer
    Text,
    /// The answer plus the pipeline path, search query and degradations
    Full,
    /// The whole outcome as JSON
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Text => OutputFormat::Text,
            OutputFormatArg::Full => OutputFormat::Full,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

/// CLI arguments for local-oracle
#[derive(Parser, Debug)]
#[command(name = "local-oracle")]
#[command(author, version, about = "Ask a local LLM, verified against web search when needed")]
#[command(long_about = r#"
Local Oracle answers prompts with a model served on your machine
(Ollama or an OpenAI-compatible server such as LM Studio).

When a search engine is enabled, each answer goes through a short pipeline:
1. Direct answer: the model answers with the conversation as context
2. Evaluation:    the model judges whether its answer may be stale
3. Search:        if so, the prompt is rewritten into a query and searched
4. Composition:   the results are summarized and the answer rewritten from them

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./oracle.toml       Project-level config
3. ~/.config/local-oracle/config.toml   Global config

Example:
  local-oracle "What is the capital of France?"
  local-oracle -s duckduckgo "What is the population of Tokyo?"
  local-oracle --chat -p lm_studio -m qwen2.5-7b-instruct
"#)]
pub struct Cli {
    /// The prompt to answer (not required in chat mode)
    pub prompt: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Model to use
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Model provider (ollama or lm_studio)
    #[arg(short, long, value_name = "PROVIDER")]
    pub provider: Option<String>,

    /// Verify answers with this search engine (google, bing, yahoo, duckduckgo, brave)
    #[arg(short, long, value_name = "ENGINE")]
    pub search: Option<String>,

    /// Disable web search even if the config file enables it
    #[arg(long, conflicts_with = "search")]
    pub no_search: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormatArg>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// List the models offered by the provider and exit
    #[arg(long)]
    pub list_models: bool,

    /// Write diagnostic logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Append a JSONL transcript of each run to this file
    #[arg(long, value_name = "PATH")]
    pub conversation_log: Option<PathBuf>,
}
