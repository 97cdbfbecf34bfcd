//! CLI output formatting

use crate::core::{BuildStep, StepStatus};
use console::Emoji;
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");

/// Banner printed when the reporter starts
pub const TITLE: &str = "Creating an optimized production build ...";

/// Width used when the terminal size is unknown
const DEFAULT_WIDTH: usize = 80;

/// Current terminal width in columns
pub fn terminal_width() -> usize {
    term_size::dimensions_stdout()
        .map(|(w, _)| w)
        .unwrap_or(DEFAULT_WIDTH)
}

/// Status marker shown before a step message
pub fn status_marker(status: StepStatus) -> String {
    match status {
        StepStatus::Pending => " ".to_string(),
        StepStatus::Running => style("⟳").yellow().to_string(),
        StepStatus::Success => style("✓").green().to_string(),
        StepStatus::Error => style("✗").red().to_string(),
    }
}

/// Format a step as one display row, clamped to `width` columns
///
/// Every step must occupy exactly one row, otherwise erasing the previously
/// drawn block would remove the wrong number of lines.
pub fn format_step_line(step: &BuildStep, width: usize) -> String {
    let available = width.saturating_sub(3).max(1);
    let message = console::truncate_str(&step.message, available, "…");
    format!("{} {}", status_marker(step.status), message)
}

/// Format a duration for display
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{:.1}s", duration.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

/// An error followed by each error in its `source()` chain
pub fn error_chain(error: &dyn std::error::Error) -> Vec<String> {
    let mut chain = vec![error.to_string()];
    let mut source = error.source();
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    chain
}

/// Render an error with its `source()` chain, one cause per line
pub fn format_error_chain(error: &dyn std::error::Error) -> String {
    error_chain(error).join("\n  caused by: ")
}
