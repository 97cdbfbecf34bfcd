//! Step state models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifecycle of a single build step
///
/// `Pending -> Running -> {Success | Error}`; both outcomes are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    /// Step is recorded but has not started
    Pending,
    /// Step is currently running
    Running,
    /// Step finished successfully
    Success,
    /// Step failed
    Error,
}

impl StepStatus {
    /// Check if step is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Success | StepStatus::Error)
    }
}

/// One line of the build progress display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildStep {
    /// Text shown next to the status marker
    pub message: String,

    /// Current status
    pub status: StepStatus,

    /// When the step entered `Running`
    pub started_at: Option<DateTime<Utc>>,

    /// When the step reached a terminal status
    pub finished_at: Option<DateTime<Utc>>,
}

impl BuildStep {
    /// Create a pending step
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: StepStatus::Pending,
            started_at: None,
            finished_at: None,
        }
    }

    /// Mark the step as running
    pub fn start(&mut self) {
        self.status = StepStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Move the step to its terminal status, optionally replacing the message
    pub fn finish(&mut self, success: bool, message: Option<String>) {
        self.status = if success {
            StepStatus::Success
        } else {
            StepStatus::Error
        };
        self.finished_at = Some(Utc::now());
        if let Some(message) = message {
            self.message = message;
        }
    }

    /// Wall-clock time between start and finish
    pub fn elapsed(&self) -> Option<Duration> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => end.signed_duration_since(start).to_std().ok(),
            _ => None,
        }
    }
}
