//! Output callback that feeds streamed chunks through the classifier

use crate::cli::TerminalReporter;
use crate::core::{classify, BuildStatusSnapshot};
use crate::process::{OutputCallback, StreamKind};
use std::sync::{Mutex, PoisonError};

#[derive(Default)]
struct TrackerState {
    accumulated: String,
    snapshot: BuildStatusSnapshot,
}

/// Accumulates a stage's output and reports newly recognised progress
///
/// Each chunk and each new progress entry goes to the reporter at verbose
/// level: always into the build log, onto the screen only in verbose mode.
pub struct OutputTracker<'a> {
    reporter: &'a TerminalReporter,
    state: Mutex<TrackerState>,
}

impl<'a> OutputTracker<'a> {
    pub fn new(reporter: &'a TerminalReporter) -> Self {
        Self {
            reporter,
            state: Mutex::new(TrackerState::default()),
        }
    }

    /// Latest classification of everything seen so far
    pub fn snapshot(&self) -> BuildStatusSnapshot {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot
            .clone()
    }
}

impl OutputCallback for OutputTracker<'_> {
    fn on_output(&self, _stream: StreamKind, chunk: &str) {
        let line = chunk.trim_end();
        if !line.is_empty() {
            self.reporter.verbose(line);
        }

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.accumulated.push_str(chunk);
        let snapshot = classify(&state.accumulated);

        for change in snapshot.changes_since(&state.snapshot) {
            self.reporter.verbose(&format!("progress: {}", change));
        }
        state.snapshot = snapshot;
    }
}
