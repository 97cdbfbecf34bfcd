//! Live terminal status reporter
//!
//! Keeps the ordered list of build steps for one run and renders it as a
//! block of lines that is erased and redrawn in place whenever a step changes.
//! Every event is mirrored to the durable [`BuildLog`].
//!
//! # Display modes
//!
//! - Interactive (stdout is a terminal): the block is redrawn on every
//!   transition; messages are inserted above the block so it stays contiguous.
//! - Non-interactive: no cursor control at all. Each step prints a single plain
//!   line when it starts and messages are printed as they come.
//!
//! # Example
//!
//! ```no_run
//! use pwakit_build::cli::{BuildLog, TerminalReporter};
//! use pwakit_build::core::Verbosity;
//!
//! let log = BuildLog::create(".pwakit/.logs/build.log").unwrap();
//! let mut reporter = TerminalReporter::new(log, Verbosity::Quiet);
//! reporter.start_step("Installing PWAKit dependencies");
//! reporter.complete_step(true, None);
//! ```

use crate::cli::build_log::{BuildLog, LogLevel};
use crate::cli::output::{
    error_chain, format_duration, format_error_chain, format_step_line, style, terminal_width, TITLE,
};
use crate::core::{BuildStep, StepStatus, Verbosity};
use console::Term;
use std::path::Path;
use tracing::debug;

/// Step list plus its on-screen rendering for one pipeline run
#[derive(Debug)]
pub struct TerminalReporter {
    steps: Vec<BuildStep>,
    current: Option<usize>,
    /// Rows of the step block currently on screen
    drawn_lines: usize,
    term: Term,
    interactive: bool,
    verbosity: Verbosity,
    log: BuildLog,
}

impl TerminalReporter {
    /// Create a reporter drawing to stdout
    pub fn new(log: BuildLog, verbosity: Verbosity) -> Self {
        let term = Term::stdout();
        let interactive = term.is_term();
        Self::with_term(term, interactive, log, verbosity)
    }

    /// Create a reporter drawing to a specific terminal handle
    ///
    /// With `interactive` false no cursor control is ever attempted.
    pub fn with_term(term: Term, interactive: bool, log: BuildLog, verbosity: Verbosity) -> Self {
        Self {
            steps: Vec::new(),
            current: None,
            drawn_lines: 0,
            term,
            interactive,
            verbosity,
            log,
        }
    }

    /// Clear the screen (interactive only) and print the banner
    pub fn print_title(&self) {
        if self.interactive {
            let _ = self.term.clear_screen();
        }
        let _ = self
            .term
            .write_line(&format!("\n{}\n", style(TITLE).bold().white()));
    }

    /// Begin a new step and return its index
    ///
    /// A step left open by the caller is closed as successful first, so at
    /// most one step is ever running.
    pub fn start_step(&mut self, message: impl Into<String>) -> usize {
        let message = message.into();

        if let Some(index) = self.current {
            if !self.steps[index].status.is_terminal() {
                debug!("Auto-closing open step: {}", self.steps[index].message);
                self.steps[index].finish(true, None);
                self.log_line(
                    LogLevel::Info,
                    &format!("Completed: {}", self.steps[index].message),
                );
            }
        }

        let mut step = BuildStep::new(message.clone());
        step.start();
        self.steps.push(step);
        let index = self.steps.len() - 1;
        self.current = Some(index);

        if self.interactive {
            self.redraw();
        } else {
            let _ = self.term.write_line(&format!("  {}", message));
        }

        self.log_line(LogLevel::Info, &format!("Started: {}", message));
        index
    }

    /// Close the current step, optionally replacing its message
    pub fn complete_step(&mut self, success: bool, message: Option<String>) {
        let Some(index) = self.current else {
            debug!("complete_step called with no step started");
            return;
        };
        if self.steps[index].status.is_terminal() {
            debug!("Step already closed: {}", self.steps[index].message);
            return;
        }

        self.steps[index].finish(success, message);
        if self.interactive {
            self.redraw();
        }

        let step = &self.steps[index];
        if let Some(elapsed) = step.elapsed() {
            debug!("Step '{}' took {}", step.message, format_duration(elapsed));
        }
        if success {
            self.log_line(LogLevel::Info, &format!("Completed: {}", step.message));
        } else {
            self.log_line(LogLevel::Error, &format!("Failed: {}", step.message));
        }
    }

    /// Forget the drawn block before something else writes to the terminal
    ///
    /// The next redraw prints the block afresh below the foreign output
    /// instead of erasing lines it does not own.
    pub fn release_display(&mut self) {
        self.drawn_lines = 0;
    }

    /// Informational message; shown on screen only in verbose mode
    pub fn info(&self, message: &str) {
        self.log_line(LogLevel::Info, message);
        if self.verbosity.is_verbose() {
            self.print_above(&style(format!("info: {}", message)).green().to_string());
        }
    }

    /// Warning; always shown
    pub fn warn(&self, message: &str) {
        self.log_line(LogLevel::Warn, message);
        self.print_above(&style(format!("warn: {}", message)).yellow().to_string());
    }

    /// Error with optional cause; the cause chain goes to the log and, in
    /// verbose mode, to the screen
    pub fn error(&self, message: &str, cause: Option<&dyn std::error::Error>) {
        self.log_line(LogLevel::Error, message);
        if let Some(cause) = cause {
            // One timestamped line per link of the chain
            for (depth, link) in error_chain(cause).iter().enumerate() {
                if depth == 0 {
                    self.log_line(LogLevel::Error, link);
                } else {
                    self.log_line(LogLevel::Error, &format!("caused by: {}", link));
                }
            }
        }

        self.print_above(&style(format!("error: {}", message)).red().to_string());
        if let (Some(cause), true) = (cause, self.verbosity.is_verbose()) {
            self.print_above(&style(format_error_chain(cause)).red().to_string());
        }
    }

    /// Detail message; always logged, shown only in verbose mode
    pub fn verbose(&self, message: &str) {
        self.log_line(LogLevel::Verbose, message);
        if self.verbosity.is_verbose() {
            self.print_above(&style(format!("verbose: {}", message)).blue().to_string());
        }
    }

    /// All steps recorded in this run, oldest first
    pub fn steps(&self) -> &[BuildStep] {
        &self.steps
    }

    /// Index of the most recently started step
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Number of steps in `Running`; never more than one
    pub fn running_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Running)
            .count()
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn log_path(&self) -> &Path {
        self.log.path()
    }

    /// The block as it would be drawn at `width` columns
    pub fn render_lines(&self, width: usize) -> Vec<String> {
        self.steps
            .iter()
            .map(|step| format_step_line(step, width))
            .collect()
    }

    fn log_line(&self, level: LogLevel, message: &str) {
        if let Err(e) = self.log.write(level, message) {
            debug!("Failed to write build log {}: {}", self.log.path().display(), e);
        }
    }

    /// Erase the rows drawn last time and draw every step again
    ///
    /// Returns the number of rows erased.
    fn redraw(&mut self) -> usize {
        let erased = self.drawn_lines;
        let _ = self.term.clear_last_lines(erased);
        for line in self.render_lines(terminal_width()) {
            let _ = self.term.write_line(&line);
        }
        self.drawn_lines = self.steps.len();
        erased
    }

    /// Print a line without breaking the step block
    fn print_above(&self, line: &str) {
        if !self.interactive || self.drawn_lines == 0 {
            let _ = self.term.write_line(line);
            return;
        }

        // Same number of rows is redrawn, so `drawn_lines` is unchanged
        let _ = self.term.clear_last_lines(self.drawn_lines);
        let _ = self.term.write_line(line);
        for step_line in self.render_lines(terminal_width()) {
            let _ = self.term.write_line(&step_line);
        }
    }
}
