//! Test: Success Chain - every stage runs in order and the layout is assembled

use crate::helpers::*;
use pwakit_build::core::{StepStatus, Verbosity};
use pwakit_build::execution::{Stage, COMPLETED_MESSAGE};
use pwakit_build::process::StdioMode;

/// Test that a clean run records one successful step per stage plus the final step
#[tokio::test]
async fn test_all_stages_succeed() {
    let project = TestProject::new();
    let runner = happy_runner(&project.config);
    let mut ctx = project.context(Verbosity::Quiet);

    run_packager(&runner, &project, &mut ctx).await.unwrap();

    let statuses = statuses(&ctx);
    assert_eq!(statuses.len(), Stage::ALL.len() + 1);
    assert!(statuses.iter().all(|s| *s == StepStatus::Success));
    assert_eq!(ctx.reporter.running_count(), 0);
    assert_eq!(messages(&ctx).last().unwrap(), COMPLETED_MESSAGE);
}

/// Test that commands run in stage order with the right directories and stdio
#[tokio::test]
async fn test_commands_run_in_order() {
    let project = TestProject::new();
    let runner = happy_runner(&project.config);
    let mut ctx = project.context(Verbosity::Quiet);

    run_packager(&runner, &project, &mut ctx).await.unwrap();

    assert_eq!(
        runner.commands(),
        vec!["npm install", "npm run build:next", "npm run build:pwakit"]
    );

    let calls = runner.calls();
    assert_eq!(calls[0].cwd.as_deref(), Some(project.path(".pwakit").as_path()));
    assert_eq!(calls[0].stdio, StdioMode::Capture);
    assert!(calls[0].had_callback);

    // The framework build owns the terminal
    assert_eq!(calls[1].cwd.as_deref(), Some(project.root()));
    assert_eq!(calls[1].stdio, StdioMode::Inherit);
    assert!(!calls[1].had_callback);

    assert_eq!(calls[2].cwd.as_deref(), Some(project.path(".pwakit").as_path()));
    assert_eq!(calls[2].stdio, StdioMode::Capture);
}

/// Test that recognised output is appended to the step message
#[tokio::test]
async fn test_step_messages_carry_output_summary() {
    let project = TestProject::new();
    let runner = happy_runner(&project.config);
    let mut ctx = project.context(Verbosity::Quiet);

    run_packager(&runner, &project, &mut ctx).await.unwrap();

    let messages = messages(&ctx);
    assert_eq!(messages[0], "Installing PWAKit dependencies (added 42 packages)");
    assert_eq!(messages[1], "Building Next.js app");
    assert_eq!(messages[4], "Building PWA Kit (compiled in 1.5s)");
}

/// Test the final managed-runtime layout
#[tokio::test]
async fn test_standalone_layout_is_assembled() {
    let project = TestProject::new();
    project.write("public/favicon.ico", "icon");
    let runner = happy_runner(&project.config);
    let mut ctx = project.context(Verbosity::Quiet);

    run_packager(&runner, &project, &mut ctx).await.unwrap();

    // Staged copy with the hidden directory renamed
    assert_eq!(project.read(".pwakit/app/next/BUILD_ID"), "build-1");
    assert!(project.exists(".pwakit/app/next/standalone/next/required-server-files.json"));
    assert!(!project.exists(".pwakit/app/next/standalone/.next"));
    assert_eq!(project.read(".pwakit/app/next/standalone/public/favicon.ico"), "icon");

    // Final layout
    assert_eq!(
        project.read(".pwakit/build/next/standalone/server.js"),
        "require('next')"
    );
    assert_eq!(
        project.read(".pwakit/build/next/static/chunks/main.js"),
        "console.log('main')"
    );
    assert_eq!(
        project.read(".pwakit/build/next/standalone/public/favicon.ico"),
        "icon"
    );
    assert_eq!(
        project.read(".pwakit/build/next/standalone/ssr.js"),
        "module.exports = bundle"
    );

    // Entry replaced by the shim, with the config injected
    let entry = project.read(".pwakit/build/ssr.js");
    assert_placeholder_replaced(&entry);
    assert!(entry.contains(r#"const nextConfig = {"a":1};"#));
    assert!(entry.ends_with("exports.get = createApp(nextConfig)\n"));
}

/// Test that a stale framework output is removed before the build
#[tokio::test]
async fn test_previous_framework_output_is_cleaned() {
    let project = TestProject::new();
    project.write(".next/stale.txt", "old");
    let runner = happy_runner(&project.config);
    let mut ctx = project.context(Verbosity::Quiet);

    run_packager(&runner, &project, &mut ctx).await.unwrap();

    assert!(!project.exists(".next/stale.txt"));
    assert!(!project.exists(".pwakit/app/next/stale.txt"));
}

/// Test that a missing public directory only warns
#[tokio::test]
async fn test_missing_public_dir_is_not_fatal() {
    let project = TestProject::new();
    let runner = happy_runner(&project.config);
    let mut ctx = project.context(Verbosity::Quiet);

    run_packager(&runner, &project, &mut ctx).await.unwrap();

    assert!(!project.exists(".pwakit/build/next/standalone/public"));
    assert!(project.log().contains("warn: Source directory"));
}

/// Test that the build log records every transition with timestamps
#[tokio::test]
async fn test_build_log_records_run() {
    let project = TestProject::new();
    let runner = happy_runner(&project.config);
    let mut ctx = project.context(Verbosity::Quiet);

    run_packager(&runner, &project, &mut ctx).await.unwrap();

    let log = project.log();
    assert!(log.contains(&ctx.run_id.to_string()));
    for stage in Stage::ALL {
        assert!(
            log.contains(&format!("info: Started: {}", stage.description())),
            "missing start of {}",
            stage
        );
    }
    assert!(log.contains(&format!("info: Completed: {}", COMPLETED_MESSAGE)));
    // Detail lines are kept even when the screen stays quiet
    assert!(log.contains("verbose: Executing: npm install"));
    assert!(log.contains("verbose: progress: added 42 packages"));

    let first = log.lines().next().unwrap();
    let stamp = &first[..19];
    assert!(chrono::NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S").is_ok());
}

/// Test that verbose mode keeps subprocess output and progress in the log
#[tokio::test]
async fn test_verbose_log_contains_output_and_progress() {
    let project = TestProject::new();
    let runner = happy_runner(&project.config);
    let mut ctx = project.context(Verbosity::Verbose);

    run_packager(&runner, &project, &mut ctx).await.unwrap();

    let log = project.log();
    assert!(log.contains("verbose: Executing: npm install"));
    assert!(log.contains("verbose: added 42 packages in 3s"));
    assert!(log.contains("verbose: progress: added 42 packages"));
    assert!(log.contains("verbose: progress: compiled in 1.5s"));
}
