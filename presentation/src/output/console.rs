//! Console output formatter for Oracle answers

use colored::Colorize;
use oracle_domain::{OracleConfig, OutputFormat, PipelineOutcome};

/// Formats pipeline outcomes for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format an outcome in the requested format
    pub fn format(outcome: &PipelineOutcome, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => Self::format_answer_only(outcome),
            OutputFormat::Full => Self::format_full(outcome),
            OutputFormat::Json => Self::format_json(outcome),
        }
    }

    /// The final answer and nothing else
    pub fn format_answer_only(outcome: &PipelineOutcome) -> String {
        let mut output = outcome.final_answer.trim_end().to_string();
        output.push('\n');
        output
    }

    /// The answer plus how it was reached
    pub fn format_full(outcome: &PipelineOutcome) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Oracle Answer"));
        output.push('\n');

        output.push_str(&format!("\n{}\n", outcome.final_answer.trim_end()));

        output.push_str(&Self::section_header("Pipeline"));
        let path = outcome
            .path
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" -> ");
        output.push_str(&format!("{} {}\n", "Path:".cyan().bold(), path));

        let verified = if outcome.used_search {
            "yes".green()
        } else {
            "no".dimmed()
        };
        output.push_str(&format!("{} {}\n", "Verified by search:".cyan().bold(), verified));

        if let Some(query) = &outcome.search_query {
            output.push_str(&format!("{} {}\n", "Search query:".cyan().bold(), query));
        }

        if outcome.is_degraded() {
            output.push_str(&format!("\n{}\n", "Degradations:".yellow().bold()));
            for degradation in &outcome.degradations {
                output.push_str(&format!(
                    "  * {}: {}\n",
                    degradation.state, degradation.reason
                ));
            }
        }

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(outcome: &PipelineOutcome) -> String {
        serde_json::to_string_pretty(outcome).unwrap_or_else(|_| "{}".to_string())
    }

    /// Active configuration, as shown by `/config`
    pub fn format_config(config: &OracleConfig, history_messages: usize) -> String {
        let search = match config.active_search_engine() {
            Some(engine) => engine.to_string().green().to_string(),
            None => "off".dimmed().to_string(),
        };
        format!(
            "{} {}\n{} {}\n{} {}\n{} {} messages\n",
            "Model:   ".cyan().bold(),
            config.model,
            "Provider:".cyan().bold(),
            config.provider,
            "Search:  ".cyan().bold(),
            search,
            "History: ".cyan().bold(),
            history_messages
        )
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_domain::{Degradation, PipelineState, SearchEngine};

    fn searched_outcome() -> PipelineOutcome {
        PipelineOutcome {
            final_answer: "About 14 million people live in Tokyo.\n".to_string(),
            used_search: true,
            search_query: Some("Tokyo population 2024".to_string()),
            degradations: vec![],
            path: vec![
                PipelineState::Init,
                PipelineState::DirectAnswer,
                PipelineState::Evaluate,
                PipelineState::RefactorQuery,
                PipelineState::Search,
                PipelineState::Summarize,
                PipelineState::ComposeFinal,
                PipelineState::Done,
            ],
        }
    }

    #[test]
    fn test_text_is_answer_only() {
        colored::control::set_override(false);
        let output = ConsoleFormatter::format(&searched_outcome(), OutputFormat::Text);
        assert_eq!(output, "About 14 million people live in Tokyo.\n");
    }

    #[test]
    fn test_full_shows_path_and_query() {
        colored::control::set_override(false);
        let output = ConsoleFormatter::format(&searched_outcome(), OutputFormat::Full);
        assert!(output.contains("About 14 million"));
        assert!(output.contains("init -> direct_answer -> evaluate"));
        assert!(output.contains("Search query: Tokyo population 2024"));
        assert!(!output.contains("Degradations"));
    }

    #[test]
    fn test_full_lists_degradations() {
        colored::control::set_override(false);
        let mut outcome = searched_outcome();
        outcome.degradations = vec![Degradation::new(
            PipelineState::Summarize,
            "request timed out",
        )];
        let output = ConsoleFormatter::format_full(&outcome);
        assert!(output.contains("Degradations:"));
        assert!(output.contains("request timed out"));
    }

    #[test]
    fn test_json_is_parseable() {
        let output = ConsoleFormatter::format(&searched_outcome(), OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["used_search"], true);
        assert_eq!(value["search_query"], "Tokyo population 2024");
    }

    #[test]
    fn test_config_shows_search_state() {
        colored::control::set_override(false);
        let config = OracleConfig::default().with_search(SearchEngine::Bing);
        let output = ConsoleFormatter::format_config(&config, 4);
        assert!(output.contains("llama3.2"));
        assert!(output.contains("bing"));
        assert!(output.contains("4 messages"));
    }
}
