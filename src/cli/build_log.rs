//! Durable per-run build log
//!
//! The file is truncated when the log is opened and every line is written
//! straight to the file handle, so a `process::exit` never loses buffered
//! output.

use chrono::Local;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Severity of a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Verbose,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Verbose => "verbose",
        };
        f.write_str(name)
    }
}

/// Plain-text log file, one `timestamp level: message` line per event
///
/// Every level is persisted; verbosity only decides what reaches the screen.
#[derive(Debug)]
pub struct BuildLog {
    file: File,
    path: PathBuf,
}

impl BuildLog {
    /// Create (or truncate) the log file, creating its directory if needed
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = create_truncated(&path)?;
        Ok(Self { file, path })
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line
    pub fn write(&self, level: LogLevel, message: &str) -> io::Result<()> {
        let line = format!(
            "{} {}: {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            level,
            message
        );
        // `&File` implements `Write`, so no exclusive borrow is needed
        (&self.file).write_all(line.as_bytes())
    }
}

/// Open the diagnostics file that receives `tracing` output for a run
///
/// Kept apart from the build log and off the terminal, where it would land
/// inside the live step block.
pub fn open_diagnostics(path: impl AsRef<Path>) -> io::Result<File> {
    create_truncated(path.as_ref())
}

fn create_truncated(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    File::create(path)
}
