//! Subprocess execution for build stages

pub mod options;
pub mod response;
pub mod shell;
pub mod streaming;

use async_trait::async_trait;
pub use options::{ExecOptions, StdioMode};
pub use response::{CommandResult, ProcessError};
pub use shell::ShellRunner;
pub use streaming::{OutputCallback, StreamKind};

/// Trait for running shell commands - allows for scripted implementations in tests
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` through the shell and wait for it to exit
    ///
    /// When `callback` is given it receives every chunk of captured output as
    /// it arrives. The full stdout/stderr are buffered in the result regardless.
    async fn execute(
        &self,
        command: &str,
        options: &ExecOptions,
        callback: Option<&dyn OutputCallback>,
    ) -> Result<CommandResult, ProcessError>;
}

#[async_trait]
impl<'a, R: CommandRunner + ?Sized> CommandRunner for &'a R {
    async fn execute(
        &self,
        command: &str,
        options: &ExecOptions,
        callback: Option<&dyn OutputCallback>,
    ) -> Result<CommandResult, ProcessError> {
        (**self).execute(command, options, callback).await
    }
}
