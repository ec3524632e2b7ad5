//! CLI entrypoint for Local Oracle
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, anyhow, bail};
use clap::Parser;
use oracle_application::Oracle;
use oracle_domain::{OracleConfig, OutputFormat};
use oracle_infrastructure::{
    ConfigLoader, FileConfig, JsonlConversationLogger, ScraperSearchGateway,
    gateways_from_config,
};
use oracle_presentation::{
    ChatRepl, Cli, ConsoleFormatter, OutputConfig, ProgressReporter, ReplConfig, SimpleProgress,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting Local Oracle");

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    // Load configuration from files
    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    file_config.validate()?;

    let output = OutputConfig {
        format: cli
            .output
            .map(OutputFormat::from)
            .or(file_config.output.format)
            .unwrap_or_default(),
        color: file_config.output.color,
    };
    if !output.color {
        colored::control::set_override(false);
    }

    let repl = ReplConfig {
        show_progress: file_config.repl.show_progress && !cli.quiet,
        history_file: file_config.repl.history_file.as_ref().map(PathBuf::from),
    };

    // === Dependency Injection ===
    let oracle = Arc::new(build_oracle(&cli, &file_config)?);

    if cli.list_models {
        let config = oracle.config();
        let models = oracle.available_models().await?;
        println!("Models served by {}:", config.provider);
        for model in models {
            println!("  {}", model);
        }
        return Ok(());
    }

    // Chat mode
    if cli.chat {
        ChatRepl::new(oracle)
            .with_progress(repl.show_progress)
            .with_history_file(repl.history_path())
            .with_format(output.format)
            .run()
            .await?;
        return Ok(());
    }

    // Single prompt mode - prompt is required
    let Some(prompt) = cli.prompt.as_deref() else {
        bail!("A prompt is required. Use --chat for interactive mode.");
    };

    let outcome = if cli.quiet {
        oracle.ask(prompt).await?
    } else if cli.verbose > 0 {
        // Log lines would tear through a spinner
        oracle.ask_with_progress(prompt, &SimpleProgress).await?
    } else {
        let progress = ProgressReporter::new();
        let outcome = oracle.ask_with_progress(prompt, &progress).await;
        progress.clear();
        outcome?
    };

    print!("{}", ConsoleFormatter::format(&outcome, output.format));

    Ok(())
}

/// Session configuration: the `[oracle]` section overridden by CLI flags.
fn session_config(cli: &Cli, file_config: &FileConfig) -> Result<OracleConfig> {
    let mut config = file_config.oracle.to_oracle_config()?;

    if let Some(model) = &cli.model {
        config = config.with_model(model.parse()?);
    }
    if let Some(provider) = &cli.provider {
        config = config.with_provider(provider.parse()?);
    }
    if let Some(engine) = &cli.search {
        config = config.with_search(engine.parse()?);
    }
    if cli.no_search {
        config = config.without_search();
    }

    Ok(config)
}

fn build_oracle(cli: &Cli, file_config: &FileConfig) -> Result<Oracle> {
    let gateways = gateways_from_config(&file_config.providers)?;
    let search = ScraperSearchGateway::from_config(&file_config.search)?;
    let behavior = file_config
        .behavior
        .to_behavior_config(file_config.search.timeout_seconds);

    let mut oracle = Oracle::new(gateways, Arc::new(search), session_config(cli, file_config)?)?
        .with_behavior(behavior);

    let conversation_log = cli.conversation_log.clone().or_else(|| {
        file_config
            .logging
            .conversation_log
            .as_ref()
            .map(PathBuf::from)
    });
    if let Some(path) = conversation_log {
        match JsonlConversationLogger::new(&path) {
            Some(logger) => {
                info!("Conversation log: {}", path.display());
                oracle = oracle.with_conversation_logger(Arc::new(logger));
            }
            None => warn!("Conversation log disabled: cannot open {}", path.display()),
        }
    }

    Ok(oracle)
}

/// Install the tracing subscriber.
///
/// `-v` picks the level (`RUST_LOG` wins when set). With `--log-file` the
/// same events are also written, without colors, to that file.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow!("Invalid log file path: {}", path.display()))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            std::fs::create_dir_all(dir)?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}
