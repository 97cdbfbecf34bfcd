//! pwakit-build - Package a Next.js production build for the PWA Kit managed runtime

pub mod cli;
pub mod core;
pub mod error;
pub mod execution;
pub mod process;
pub mod staging;

// Re-export commonly used types
pub use cli::{BuildLog, TerminalReporter};
pub use core::{BuildConfig, PipelineRunContext, StagingPaths, Verbosity};
pub use error::{BuildError, StageFailure};
pub use execution::{Packager, Stage};
pub use process::{CommandRunner, ExecOptions, ProcessError, ShellRunner};
