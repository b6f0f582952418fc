//! Replay output formatting

use crate::session::{Replay, StepReport};
use anyhow::Result;
use colored::*;

/// Output format for replay results
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Parse the configured default format name
    pub fn from_config(name: &str) -> Result<Self> {
        match name {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => anyhow::bail!("Unknown output format '{other}'"),
        }
    }
}

/// Text formatter for human-readable output
pub struct TextFormatter {
    use_color: bool,
}

impl TextFormatter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn colorize(&self, text: &str, color: fn(&str) -> ColoredString) -> String {
        if self.use_color {
            color(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_report(&self, report: &StepReport) -> String {
        let users: Vec<&str> = report.state.users.iter().map(|u| u.as_str()).collect();
        let active = report.state.active_user.to_string();
        let active = if active.is_empty() { "<none>" } else { &active };

        format!(
            "[{:>2}] {:<26} active={} users=[{}] searches={} probes={}\n",
            report.step,
            self.colorize(&report.action, |s| s.yellow()),
            self.colorize(active, |s| s.cyan()),
            users.join(", "),
            report.searches,
            report.probes,
        )
    }

    pub fn format(&self, replay: &Replay) -> String {
        let mut output = String::new();
        for report in &replay.reports {
            output.push_str(&self.format_report(report));
        }
        if let Some(failure) = &replay.failure {
            let line = format!(
                "[{:>2}] {} rejected: {}",
                failure.step, failure.action, failure.message
            );
            output.push_str(&self.colorize(&line, |s| s.red()));
            output.push('\n');
        }
        output
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn format(&self, replay: &Replay) -> Result<String> {
        Ok(serde_json::to_string_pretty(replay)?)
    }
}

/// Render a replay in the requested format
pub fn render(replay: &Replay, format: OutputFormat, use_color: bool) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(TextFormatter::new(use_color).format(replay)),
        OutputFormat::Json => JsonFormatter.format(replay),
    }
}
