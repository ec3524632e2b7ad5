//! REPL (Read-Eval-Print Loop) for interactive chat

use super::command::ReplCommand;
use crate::{ConsoleFormatter, ProgressReporter};
use colored::Colorize;
use oracle_application::{NoProgress, Oracle};
use oracle_domain::{Model, OracleConfig, OutputFormat, ProviderKind, SearchEngine};
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

const HISTORY_CAPACITY: usize = 1000;

/// Result of running a slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Keep reading input; print the message
    Continue(String),
    Quit,
}

/// Interactive chat REPL over one Oracle session
pub struct ChatRepl {
    oracle: Arc<Oracle>,
    show_progress: bool,
    history_file: Option<PathBuf>,
    format: OutputFormat,
}

impl ChatRepl {
    /// Create a new ChatRepl
    pub fn new(oracle: Arc<Oracle>) -> Self {
        Self {
            oracle,
            show_progress: true,
            history_file: None,
            format: OutputFormat::Text,
        }
    }

    /// Set whether to show progress
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Persist line history to this file
    pub fn with_history_file(mut self, path: Option<PathBuf>) -> Self {
        self.history_file = path;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Run the interactive REPL until `/quit` or Ctrl-D
    pub async fn run(&self) -> std::io::Result<()> {
        let mut line_editor = self.line_editor();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("oracle".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            match line_editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if let Some(command) = ReplCommand::parse(line) {
                        match self.execute(command).await {
                            CommandOutcome::Continue(message) => {
                                println!();
                                println!("{}", message);
                                println!();
                            }
                            CommandOutcome::Quit => {
                                println!("Bye!");
                                break;
                            }
                        }
                        continue;
                    }

                    self.process_prompt(line).await;
                }
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
                _ => {
                    println!("^C");
                }
            }
        }

        Ok(())
    }

    fn line_editor(&self) -> Reedline {
        let editor = Reedline::create();
        let Some(path) = &self.history_file else {
            return editor;
        };

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!("Cannot create history directory {}: {}", parent.display(), e);
        }
        match FileBackedHistory::with_file(HISTORY_CAPACITY, path.clone()) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(e) => {
                warn!("History file {} unavailable: {}", path.display(), e);
                editor
            }
        }
    }

    fn print_welcome(&self) {
        let config = self.oracle.config();
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│          Local Oracle - Chat Mode           │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        print!("{}", ConsoleFormatter::format_config(&config, self.oracle.history_len()));
        println!();
        println!("Type /help for commands.");
        println!();
    }

    /// Run a slash command against the session.
    pub async fn execute(&self, command: ReplCommand) -> CommandOutcome {
        let message = match command {
            ReplCommand::Quit => return CommandOutcome::Quit,
            ReplCommand::Help => ReplCommand::help_text().to_string(),
            ReplCommand::Clear => {
                self.oracle.clear_history();
                "Conversation cleared.".to_string()
            }
            ReplCommand::Config => {
                let message =
                    ConsoleFormatter::format_config(&self.oracle.config(), self.oracle.history_len());
                message.trim_end().to_string()
            }
            ReplCommand::Model(None) => format!("Model: {}", self.oracle.config().model),
            ReplCommand::Model(Some(name)) => match name.parse::<Model>() {
                Ok(model) => self.reconfigure(self.oracle.config().with_model(model)),
                Err(e) => Self::error_line(e),
            },
            ReplCommand::Provider(None) => {
                let available = self
                    .oracle
                    .providers()
                    .iter()
                    .map(|p| p.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "Provider: {} (available: {})",
                    self.oracle.config().provider,
                    available
                )
            }
            ReplCommand::Provider(Some(name)) => match name.parse::<ProviderKind>() {
                Ok(provider) => self.reconfigure(self.oracle.config().with_provider(provider)),
                Err(e) => Self::error_line(e),
            },
            ReplCommand::Search(None) => match self.oracle.config().active_search_engine() {
                Some(engine) => format!("Search: {}", engine),
                None => "Search: off".to_string(),
            },
            ReplCommand::Search(Some(arg)) if arg.eq_ignore_ascii_case("off") => {
                self.reconfigure(self.oracle.config().without_search())
            }
            ReplCommand::Search(Some(name)) => match name.parse::<SearchEngine>() {
                Ok(engine) => self.reconfigure(self.oracle.config().with_search(engine)),
                Err(e) => Self::error_line(e),
            },
            ReplCommand::Models => self.list_models().await,
            ReplCommand::Unknown(name) => format!(
                "Unknown command: {}\nType /help for available commands",
                name
            ),
        };
        CommandOutcome::Continue(message)
    }

    fn reconfigure(&self, config: OracleConfig) -> String {
        match self.oracle.configure(config) {
            Ok(()) => ConsoleFormatter::format_config(&self.oracle.config(), self.oracle.history_len())
                .trim_end()
                .to_string(),
            Err(e) => Self::error_line(e),
        }
    }

    async fn list_models(&self) -> String {
        let current = self.oracle.config();
        match self.oracle.available_models().await {
            Ok(models) if models.is_empty() => {
                format!("{} serves no models.", current.provider)
            }
            Ok(models) => {
                let mut lines = vec![format!("Models served by {}:", current.provider)];
                for model in models {
                    let marker = if model == current.model { "*" } else { "-" };
                    lines.push(format!("  {} {}", marker, model));
                }
                lines.join("\n")
            }
            Err(e) => Self::error_line(e),
        }
    }

    fn error_line(e: impl std::fmt::Display) -> String {
        format!("{} {}", "Error:".red().bold(), e)
    }

    async fn process_prompt(&self, prompt: &str) {
        println!();

        let result = if self.show_progress {
            let progress = ProgressReporter::new();
            let result = self.oracle.ask_with_progress(prompt, &progress).await;
            progress.clear();
            result
        } else {
            self.oracle.ask_with_progress(prompt, &NoProgress).await
        };

        match result {
            Ok(outcome) => {
                print!("{}", ConsoleFormatter::format(&outcome, self.format));
            }
            Err(e) => {
                eprintln!("{}", Self::error_line(e));
            }
        }
        println!();
    }
}
