use anyhow::{Context, Result};
use pwakit_build::cli::output::{format_duration, style, CHECK, CROSS, INFO};
use pwakit_build::cli::{diagnostics_subscriber, open_diagnostics, Cli};
use pwakit_build::core::{BuildConfig, PipelineRunContext, StagingPaths};
use pwakit_build::execution::Packager;
use pwakit_build::process::ShellRunner;
use std::time::Instant;
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();
    let verbosity = cli.verbosity();

    let root = std::env::current_dir().context("Failed to resolve the project directory")?;

    let config = match BuildConfig::load_or_default(&root) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", CROSS, style(e).red());
            std::process::exit(1);
        }
    };

    // Diagnostics go to a file so they never land inside the step block
    let paths = StagingPaths::from_root(&root, &config);
    let diagnostics = open_diagnostics(&paths.diagnostics_file).with_context(|| {
        format!(
            "Failed to open diagnostics log {}",
            paths.diagnostics_file.display()
        )
    })?;
    tracing::subscriber::set_global_default(diagnostics_subscriber(diagnostics, verbosity))
        .context("Failed to set logging subscriber")?;

    let mut ctx = match PipelineRunContext::create(&root, &config, verbosity) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{} {}", CROSS, style(e).red());
            std::process::exit(1);
        }
    };

    let started = Instant::now();
    let packager = Packager::new(ShellRunner::new(), config);

    match packager.run(&mut ctx).await {
        Ok(()) => {
            let elapsed = format_duration(started.elapsed());
            ctx.reporter.info(&format!("Build finished in {}", elapsed));
            println!(
                "\n{} Output ready in {} {}",
                CHECK,
                style(ctx.paths.pwakit_build_dir.display()).bold(),
                style(format!("({})", elapsed)).dim()
            );
            Ok(())
        }
        Err(failure) => {
            error!("Packaging run {} failed: {}", ctx.run_id, failure);
            eprintln!(
                "\n{} {}",
                CROSS,
                style(format!("{}: {}", failure.stage, failure.error)).red()
            );
            eprintln!(
                "{} See {} for details",
                INFO,
                style(ctx.reporter.log_path().display()).dim()
            );
            std::process::exit(failure.exit_code());
        }
    }
}
