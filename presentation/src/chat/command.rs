//! Slash commands understood by the chat REPL

/// A parsed `/command` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    /// Forget the conversation so far
    Clear,
    /// Show the active configuration
    Config,
    /// Switch model, or show it when no name is given
    Model(Option<String>),
    /// Switch provider, or show it when no name is given
    Provider(Option<String>),
    /// Switch search engine (`off` disables search), or show it
    Search(Option<String>),
    /// List the models the provider serves
    Models,
    Quit,
    Unknown(String),
}

impl ReplCommand {
    /// Parse a line. Returns `None` for lines that are not commands.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if !line.starts_with('/') {
            return None;
        }

        let mut parts = line.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default();
        let arg = parts
            .next()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);

        let command = match name {
            "/help" | "/h" | "/?" => ReplCommand::Help,
            "/clear" => ReplCommand::Clear,
            "/config" => ReplCommand::Config,
            "/model" => ReplCommand::Model(arg),
            "/provider" => ReplCommand::Provider(arg),
            "/search" => ReplCommand::Search(arg),
            "/models" => ReplCommand::Models,
            "/quit" | "/exit" | "/q" => ReplCommand::Quit,
            other => ReplCommand::Unknown(other.to_string()),
        };
        Some(command)
    }

    pub fn help_text() -> &'static str {
        "Commands:
  /help, /h, /?          - Show this help
  /clear                 - Forget the conversation so far
  /config                - Show model, provider and search engine
  /model <name>          - Switch model
  /provider <name>       - Switch provider (ollama, lm_studio)
  /search <engine|off>   - Verify answers with a search engine, or stop
  /models                - List models served by the provider
  /quit, /exit, /q       - Exit chat"
    }
}
