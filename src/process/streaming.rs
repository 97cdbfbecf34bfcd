//! Streaming support for subprocess output
//!
//! While a captured command runs, each chunk read from its stdout or stderr is
//! handed to an [`OutputCallback`] before being appended to the buffered
//! result. Chunks are line-delimited: each is a whole line including its
//! trailing `\n`, except for a final unterminated line. A carriage return does
//! not end a chunk, so spinner frames redrawn with `\r` arrive together with
//! the next newline.
//!
//! # Example
//!
//! ```
//! use pwakit_build::process::{OutputCallback, StreamKind};
//!
//! struct Echo;
//!
//! impl OutputCallback for Echo {
//!     fn on_output(&self, stream: StreamKind, chunk: &str) {
//!         print!("[{}] {}", stream, chunk);
//!     }
//! }
//! ```

use std::fmt;

/// Which pipe a chunk came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => write!(f, "stdout"),
            StreamKind::Stderr => write!(f, "stderr"),
        }
    }
}

/// Callback for processing output as it arrives
///
/// This trait is object-safe and can be used as `&dyn OutputCallback`.
pub trait OutputCallback: Send + Sync {
    /// Called for each chunk read from the child
    fn on_output(&self, stream: StreamKind, chunk: &str);
}

impl<F> OutputCallback for F
where
    F: Fn(StreamKind, &str) + Send + Sync,
{
    fn on_output(&self, stream: StreamKind, chunk: &str) {
        self(stream, chunk)
    }
}
