//! Per-invocation subprocess options

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Where the child's stdout/stderr go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StdioMode {
    /// Pipe both streams back to the runner for buffering and streaming
    #[default]
    Capture,
    /// Let the child write straight to this process's terminal
    Inherit,
}

/// Options for a single command execution
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    /// Working directory for the child. `None` uses the current directory.
    pub cwd: Option<PathBuf>,

    /// Variables layered on top of the inherited environment
    pub env: HashMap<String, String>,

    /// Resolve with the result even when the exit code is non-zero
    pub ignore_exit_code: bool,

    /// Capture or inherit the child's output
    pub stdio: StdioMode,

    /// Watchdog: kill the child and fail once this elapses
    pub timeout: Option<Duration>,
}

impl ExecOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env.extend(env);
        self
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn ignoring_exit_code(mut self) -> Self {
        self.ignore_exit_code = true;
        self
    }

    pub fn inherit_stdio(mut self) -> Self {
        self.stdio = StdioMode::Inherit;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}
