//! Command-line interface and terminal reporting

pub mod build_log;
pub mod output;
pub mod terminal_output;

pub use build_log::{open_diagnostics, BuildLog, LogLevel};
pub use terminal_output::TerminalReporter;

use crate::core::Verbosity;
use clap::Parser;
use std::ffi::OsString;
use std::fs::File;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Package a Next.js production build for the PWA Kit managed runtime
#[derive(Debug, Parser, Clone)]
#[command(name = "pwakit-build")]
#[command(version)]
#[command(about = "Package a Next.js production build for the PWA Kit managed runtime", long_about = None)]
pub struct Cli {
    /// Show subprocess output and progress details, and keep verbose lines in the build log
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flag(self.verbose)
    }
}

/// `tracing` subscriber that writes plain diagnostics to `file`
///
/// Nothing goes to the terminal: the reporter owns it while a step block is drawn.
pub fn diagnostics_subscriber(
    file: File,
    verbosity: Verbosity,
) -> impl tracing::Subscriber + Send + Sync + 'static {
    let level = if verbosity.is_verbose() {
        Level::DEBUG
    } else {
        Level::WARN
    };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .finish()
}
