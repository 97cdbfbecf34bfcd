//! Test utility functions for packaging scenarios

use async_trait::async_trait;
use console::Term;
use pwakit_build::cli::{BuildLog, TerminalReporter};
use pwakit_build::core::{BuildConfig, PipelineRunContext, StagingPaths, StepStatus, Verbosity};
use pwakit_build::error::StageFailure;
use pwakit_build::execution::Packager;
use pwakit_build::process::{
    CommandResult, CommandRunner, ExecOptions, OutputCallback, ProcessError, StdioMode, StreamKind,
};
use pwakit_build::staging::CONFIG_PLACEHOLDER;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Shim template seeded into every test project
pub const SHIM: &str = "const {createApp} = require('./next/standalone/ssr')\n\n/* -- INSERT NEXT CONFIG HERE -- */\n\nexports.get = createApp(nextConfig)\n";

/// What the scripted runner does for one command
#[derive(Debug, Clone, Default)]
pub struct Script {
    /// Chunks fed to the output callback, in order
    pub output: Vec<String>,
    pub exit_code: i32,
    /// Files created relative to the command's working directory
    pub files: Vec<(String, String)>,
}

impl Script {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn failing(exit_code: i32) -> Self {
        Self {
            exit_code,
            ..Self::default()
        }
    }

    pub fn with_output(mut self, chunk: &str) -> Self {
        self.output.push(chunk.to_string());
        self
    }

    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.push((path.to_string(), content.to_string()));
        self
    }
}

/// A command as the runner saw it
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub command: String,
    pub cwd: Option<PathBuf>,
    pub stdio: StdioMode,
    pub had_callback: bool,
}

/// Command runner that replays scripts instead of spawning processes
#[derive(Default)]
pub struct ScriptedRunner {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(mut self, command: &str, script: Script) -> Self {
        self.scripts.insert(command.to_string(), script);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.command).collect()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn execute(
        &self,
        command: &str,
        options: &ExecOptions,
        callback: Option<&dyn OutputCallback>,
    ) -> Result<CommandResult, ProcessError> {
        self.calls.lock().unwrap().push(RecordedCall {
            command: command.to_string(),
            cwd: options.cwd.clone(),
            stdio: options.stdio,
            had_callback: callback.is_some(),
        });

        let script = self.scripts.get(command).cloned().unwrap_or_default();

        let cwd = options.cwd.clone().unwrap_or_default();
        for (path, content) in &script.files {
            let path = cwd.join(path);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }

        let stdout = script.output.concat();
        if let Some(cb) = callback {
            for chunk in &script.output {
                cb.on_output(StreamKind::Stdout, chunk);
            }
        }

        if script.exit_code != 0 && !options.ignore_exit_code {
            return Err(ProcessError::CommandFailed {
                command: command.to_string(),
                exit_code: script.exit_code,
                stdout,
                stderr: String::new(),
            });
        }
        Ok(CommandResult::new(stdout, "", script.exit_code))
    }
}

/// A scratch project directory with the PWA Kit shim in place
pub struct TestProject {
    pub dir: TempDir,
    pub config: BuildConfig,
}

impl TestProject {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let project = Self {
            dir,
            config: BuildConfig::default(),
        };
        project.write(".pwakit/app/ssr-shim.js", SHIM);
        project
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path(relative)).unwrap()
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }

    /// Context with a non-interactive reporter and the log inside the project
    pub fn context(&self, verbosity: Verbosity) -> PipelineRunContext {
        let paths = StagingPaths::from_root(self.root(), &self.config);
        let log = BuildLog::create(&paths.log_file).unwrap();
        let reporter = TerminalReporter::with_term(Term::buffered_stdout(), false, log, verbosity);
        PipelineRunContext::with_reporter(paths, verbosity, reporter)
    }

    pub fn log(&self) -> String {
        self.read(".pwakit/.logs/build.log")
    }
}

/// Scripts that reproduce a typical successful build
pub fn happy_runner(config: &BuildConfig) -> ScriptedRunner {
    ScriptedRunner::new()
        .script(
            &config.install_command,
            Script::ok().with_output("added 42 packages in 3s\n"),
        )
        .script(
            &config.framework_build_command,
            Script::ok()
                .with_file(".next/BUILD_ID", "build-1")
                .with_file(".next/static/chunks/main.js", "console.log('main')")
                .with_file(".next/standalone/server.js", "require('next')")
                .with_file(
                    ".next/standalone/.next/required-server-files.json",
                    r#"{"version":1,"config":{"a":1}}"#,
                ),
        )
        .script(
            &config.packaging_build_command,
            Script::ok()
                .with_output(" ✓ Compiled successfully in 1.5s\n")
                .with_file("build/ssr.js", "module.exports = bundle"),
        )
}

pub async fn run_packager(
    runner: &ScriptedRunner,
    project: &TestProject,
    ctx: &mut PipelineRunContext,
) -> Result<(), StageFailure> {
    Packager::new(runner, project.config.clone()).run(ctx).await
}

pub fn statuses(ctx: &PipelineRunContext) -> Vec<StepStatus> {
    ctx.reporter.steps().iter().map(|s| s.status).collect()
}

pub fn messages(ctx: &PipelineRunContext) -> Vec<String> {
    ctx.reporter
        .steps()
        .iter()
        .map(|s| s.message.clone())
        .collect()
}

pub fn assert_placeholder_replaced(content: &str) {
    assert!(
        !content.contains(CONFIG_PLACEHOLDER),
        "placeholder still present in:\n{}",
        content
    );
}
