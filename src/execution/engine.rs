//! Packaging pipeline - runs every stage in order against one run context

use crate::{
    core::{BuildConfig, PipelineRunContext},
    error::{BuildError, StageFailure},
    execution::{OutputTracker, Stage},
    process::{CommandRunner, ExecOptions},
    staging::{self, CopyOutcome},
};
use std::path::Path;
use tracing::{debug, error, info};

/// Message of the step recorded after every stage succeeded
pub const COMPLETED_MESSAGE: &str = "Build completed successfully";

/// Sequential stage orchestrator
///
/// Stages run one at a time. The first fatal error aborts the run: its step is
/// marked failed, the error is logged with its cause chain, and a
/// [`StageFailure`] is returned. There are no retries.
pub struct Packager<R> {
    runner: R,
    config: BuildConfig,
}

impl<R: CommandRunner> Packager<R> {
    pub fn new(runner: R, config: BuildConfig) -> Self {
        Self { runner, config }
    }

    /// Run the whole pipeline
    pub async fn run(&self, ctx: &mut PipelineRunContext) -> Result<(), StageFailure> {
        info!("Starting packaging run {}", ctx.run_id);
        ctx.reporter.print_title();

        if let Err(error) = self.clean_previous_output(ctx).await {
            ctx.reporter.error("Build failed", Some(&error));
            return Err(StageFailure::new("Cleaning previous build", error));
        }

        for stage in Stage::ALL {
            self.run_stage(stage, ctx).await?;
        }

        ctx.reporter.start_step(COMPLETED_MESSAGE);
        ctx.reporter.complete_step(true, None);
        info!("Packaging run {} finished", ctx.run_id);
        Ok(())
    }

    /// Wrap one stage in its step record
    async fn run_stage(
        &self,
        stage: Stage,
        ctx: &mut PipelineRunContext,
    ) -> Result<(), StageFailure> {
        let description = stage.description();
        ctx.reporter.start_step(description);

        match self.execute_stage(stage, ctx).await {
            Ok(note) => {
                let message = note.map(|note| format!("{} ({})", description, note));
                ctx.reporter.complete_step(true, message);
                Ok(())
            }
            Err(err) => {
                error!("Stage '{}' failed: {}", description, err);
                ctx.reporter
                    .complete_step(false, Some(format!("{} - {}", description, err)));
                ctx.reporter.error("Build failed", Some(&err));
                Err(StageFailure::new(description, err))
            }
        }
    }

    /// Do the stage's work; `Some(note)` is appended to the step message
    async fn execute_stage(
        &self,
        stage: Stage,
        ctx: &mut PipelineRunContext,
    ) -> Result<Option<String>, BuildError> {
        match stage {
            Stage::InstallDependencies => {
                let cwd = ctx.paths.pwakit_dir.clone();
                self.run_captured(&self.config.install_command, &cwd, ctx)
                    .await
            }
            Stage::BuildFramework => self.build_framework(ctx).await.map(|_| None),
            Stage::ProcessArtifacts => self.process_artifacts(ctx).await.map(|_| None),
            Stage::CopyPublicAssets => self.copy_public_assets(ctx).await.map(|_| None),
            Stage::BuildPackaging => {
                let cwd = ctx.paths.pwakit_dir.clone();
                self.run_captured(&self.config.packaging_build_command, &cwd, ctx)
                    .await
            }
            Stage::PrepareStandalone => self.prepare_standalone(ctx).await.map(|_| None),
            Stage::FinalizeConfig => self.finalize_config(ctx).await.map(|_| None),
        }
    }

    fn exec_options(&self, cwd: &Path) -> ExecOptions {
        ExecOptions::new()
            .with_cwd(cwd)
            .with_env(self.config.env.clone())
            .with_timeout(self.config.command_timeout())
    }

    /// Run a command with captured output, returning the classifier summary
    async fn run_captured(
        &self,
        command: &str,
        cwd: &Path,
        ctx: &PipelineRunContext,
    ) -> Result<Option<String>, BuildError> {
        ctx.reporter.verbose(&format!("Executing: {}", command));

        let tracker = OutputTracker::new(&ctx.reporter);
        let options = self.exec_options(cwd);
        self.runner
            .execute(command, &options, Some(&tracker))
            .await?;

        Ok(tracker.snapshot().summary())
    }

    async fn clean_previous_output(&self, ctx: &PipelineRunContext) -> Result<(), BuildError> {
        let dir = &ctx.paths.framework_build_dir;
        if staging::remove_dir(dir).await? {
            ctx.reporter
                .verbose(&format!("Removed previous build output {}", dir.display()));
        }
        Ok(())
    }

    async fn build_framework(&self, ctx: &mut PipelineRunContext) -> Result<(), BuildError> {
        let command = &self.config.framework_build_command;
        ctx.reporter.verbose(&format!("Executing: {}", command));

        // The framework writes straight to the terminal from here on
        ctx.reporter.release_display();
        let options = self.exec_options(&ctx.paths.root).inherit_stdio();
        self.runner.execute(command, &options, None).await?;
        Ok(())
    }

    async fn process_artifacts(&self, ctx: &PipelineRunContext) -> Result<(), BuildError> {
        let paths = &ctx.paths;

        staging::remove_dir(&paths.app_next_dir).await?;
        staging::ensure_dir(&paths.app_dir()).await?;
        self.copy_optional(&paths.framework_build_dir, &paths.app_next_dir, ctx)
            .await?;

        let hidden = paths.staged_standalone_dir().join(".next");
        if staging::path_exists(&hidden).await? {
            let visible = paths.staged_standalone_dir().join("next");
            ctx.reporter.verbose(&format!(
                "  - Renaming {} to {} ...",
                hidden.display(),
                visible.display()
            ));
            staging::remove_dir(&visible).await?;
            staging::rename_path(&hidden, &visible).await?;
        }
        Ok(())
    }

    async fn copy_public_assets(&self, ctx: &PipelineRunContext) -> Result<(), BuildError> {
        let paths = &ctx.paths;
        let target = paths.staged_standalone_dir().join("public");
        self.copy_optional(&paths.public_dir, &target, ctx).await
    }

    async fn prepare_standalone(&self, ctx: &PipelineRunContext) -> Result<(), BuildError> {
        let paths = &ctx.paths;

        ctx.reporter
            .verbose("  - Copying standalone and static to build directory ...");
        staging::ensure_dir(&paths.pwakit_build_dir.join("next")).await?;
        staging::remove_dir(&paths.standalone_dir).await?;
        staging::remove_dir(&paths.static_dir).await?;
        self.copy_optional(&paths.staged_standalone_dir(), &paths.standalone_dir, ctx)
            .await?;
        self.copy_optional(&paths.staged_static_dir(), &paths.static_dir, ctx)
            .await?;

        if staging::path_exists(&paths.bundled_entry).await? {
            ctx.reporter.verbose(&format!(
                "  - Moving {} to {} ...",
                paths.bundled_entry.display(),
                paths.standalone_entry.display()
            ));
            staging::move_file(&paths.bundled_entry, &paths.standalone_entry).await?;
        } else {
            ctx.reporter.warn(&format!(
                "{} not found. Skipping move.",
                paths.bundled_entry.display()
            ));
        }

        ctx.reporter.verbose(&format!(
            "  - Creating shim in {} ...",
            paths.bundled_entry.display()
        ));
        staging::copy_file(&paths.entry_shim, &paths.bundled_entry).await
    }

    async fn finalize_config(&self, ctx: &PipelineRunContext) -> Result<(), BuildError> {
        let paths = &ctx.paths;
        ctx.reporter.verbose(&format!(
            "  - Reading config from {}",
            paths.server_files_manifest.display()
        ));

        let outcome =
            staging::inject_config(&paths.server_files_manifest, &paths.bundled_entry).await?;
        match outcome.warning() {
            Some(warning) => ctx.reporter.warn(&warning),
            None => debug!("Injected config into {}", paths.bundled_entry.display()),
        }
        Ok(())
    }

    /// Copy a directory that may legitimately be absent
    async fn copy_optional(
        &self,
        src: &Path,
        dst: &Path,
        ctx: &PipelineRunContext,
    ) -> Result<(), BuildError> {
        match staging::copy_dir(src, dst).await? {
            CopyOutcome::Copied { files } => {
                ctx.reporter.verbose(&format!(
                    "  - Copied {} files from {} to {}",
                    files,
                    src.display(),
                    dst.display()
                ));
            }
            CopyOutcome::SourceMissing => {
                ctx.reporter.warn(&format!(
                    "Source directory {} does not exist.",
                    src.display()
                ));
            }
        }
        Ok(())
    }
}
