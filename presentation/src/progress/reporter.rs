//! Progress reporting for Oracle runs

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use oracle_application::PipelineProgressNotifier;
use oracle_domain::{SearchEngine, Stage};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Reports pipeline progress with a spinner on stderr
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn start(&self, message: String) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_message(message);
        pb.enable_steady_tick(TICK_INTERVAL);

        let previous = self
            .spinner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(pb);
        if let Some(previous) = previous {
            previous.finish_and_clear();
        }
    }

    fn finish(&self, message: String) {
        if let Some(pb) = self
            .spinner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pb.finish_with_message(message);
        }
    }

    /// Remove any spinner still on screen
    pub fn clear(&self) {
        if let Some(pb) = self
            .spinner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pb.finish_and_clear();
        }
    }

    fn stage_line(stage: Stage, success: bool) -> String {
        if success {
            format!("{} {}", "v".green(), stage)
        } else {
            format!("{} {} (failed)", "x".red(), stage)
        }
    }

    fn search_line(results: Option<usize>) -> String {
        match results {
            Some(0) => format!("{} Search found nothing", "-".yellow()),
            Some(n) => format!("{} Search found {} results", "v".green(), n),
            None => format!("{} Search failed", "x".red()),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.clear();
    }
}

impl PipelineProgressNotifier for ProgressReporter {
    fn on_stage_start(&self, stage: Stage) {
        self.start(format!("{}...", stage.to_string().bold()));
    }

    fn on_stage_complete(&self, stage: Stage, success: bool) {
        self.finish(Self::stage_line(stage, success));
    }

    fn on_search_start(&self, engine: SearchEngine, query: &str) {
        self.start(format!("{} {}: {}", "Searching".bold(), engine, query));
    }

    fn on_search_complete(&self, results: Option<usize>) {
        self.finish(Self::search_line(results));
    }
}

/// Simple text-based progress (no spinner)
pub struct SimpleProgress;

impl PipelineProgressNotifier for SimpleProgress {
    fn on_stage_start(&self, stage: Stage) {
        eprintln!("{} {}", "->".cyan(), stage.to_string().bold());
    }

    fn on_stage_complete(&self, stage: Stage, success: bool) {
        eprintln!("  {}", ProgressReporter::stage_line(stage, success));
    }

    fn on_search_start(&self, engine: SearchEngine, query: &str) {
        eprintln!("{} {} ({})", "->".cyan(), "Searching".bold(), engine);
        eprintln!("  {}", query.dimmed());
    }

    fn on_search_complete(&self, results: Option<usize>) {
        eprintln!("  {}", ProgressReporter::search_line(results));
    }
}
