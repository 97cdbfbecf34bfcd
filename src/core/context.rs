//! Per-run context passed to every stage

use crate::cli::{BuildLog, TerminalReporter};
use crate::core::{config::BuildConfig, paths::StagingPaths};
use crate::error::BuildError;
use std::path::Path;
use uuid::Uuid;

/// How chatty the terminal and log are
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    #[default]
    Quiet,
    Verbose,
}

impl Verbosity {
    pub fn from_flag(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Quiet
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Everything one pipeline invocation owns
///
/// A fresh context is created for each run, so step state never leaks from
/// one run into the next.
#[derive(Debug)]
pub struct PipelineRunContext {
    /// Unique id recorded at the top of the build log
    pub run_id: Uuid,

    /// Directory layout, fixed for the run
    pub paths: StagingPaths,

    pub verbosity: Verbosity,

    /// Step list, terminal display and durable log
    pub reporter: TerminalReporter,
}

impl PipelineRunContext {
    /// Open the build log under `root` and set up the terminal reporter
    pub fn create(
        root: impl AsRef<Path>,
        config: &BuildConfig,
        verbosity: Verbosity,
    ) -> Result<Self, BuildError> {
        let paths = StagingPaths::from_root(root, config);
        let log = BuildLog::create(&paths.log_file)
            .map_err(|e| BuildError::staging("create build log", &paths.log_file, e))?;
        let reporter = TerminalReporter::new(log, verbosity);
        Ok(Self::with_reporter(paths, verbosity, reporter))
    }

    /// Assemble a context from parts
    pub fn with_reporter(
        paths: StagingPaths,
        verbosity: Verbosity,
        reporter: TerminalReporter,
    ) -> Self {
        let ctx = Self {
            run_id: Uuid::new_v4(),
            paths,
            verbosity,
            reporter,
        };
        ctx.reporter.info(&format!(
            "Run {} started in {}",
            ctx.run_id,
            ctx.paths.root.display()
        ));
        ctx
    }
}
