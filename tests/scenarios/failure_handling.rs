//! Test: Failure Handling - the first fatal error stops the run

use crate::helpers::*;
use pwakit_build::core::{StepStatus, Verbosity};
use pwakit_build::error::BuildError;
use pwakit_build::process::ProcessError;

/// Test that a failing framework build stops the run after two steps
#[tokio::test]
async fn test_failure_in_second_stage_aborts() {
    let project = TestProject::new();
    let runner = happy_runner(&project.config).script("npm run build:next", Script::failing(1));
    let mut ctx = project.context(Verbosity::Quiet);

    let failure = run_packager(&runner, &project, &mut ctx).await.unwrap_err();

    assert_eq!(statuses(&ctx), vec![StepStatus::Success, StepStatus::Error]);
    assert_eq!(failure.stage, "Building Next.js app");
    assert_ne!(failure.exit_code(), 0);
    assert!(matches!(
        failure.error,
        BuildError::Process(ProcessError::CommandFailed { exit_code: 1, .. })
    ));

    // Nothing after the failed stage ran
    assert_eq!(runner.commands(), vec!["npm install", "npm run build:next"]);
    assert!(!project.exists(".pwakit/app/next"));
}

/// Test that the failed step message names the stage and the error
#[tokio::test]
async fn test_failed_step_message_includes_error() {
    let project = TestProject::new();
    let runner = happy_runner(&project.config).script("npm install", Script::failing(127));
    let mut ctx = project.context(Verbosity::Quiet);

    let failure = run_packager(&runner, &project, &mut ctx).await.unwrap_err();

    assert_eq!(ctx.reporter.steps().len(), 1);
    assert_eq!(
        messages(&ctx)[0],
        "Installing PWAKit dependencies - `npm install` failed with exit code 127"
    );
    assert_eq!(
        failure.to_string(),
        "Installing PWAKit dependencies: `npm install` failed with exit code 127"
    );
    assert_eq!(ctx.reporter.running_count(), 0);
}

/// Test that the failure and its cause are written to the build log
#[tokio::test]
async fn test_failure_is_logged() {
    let project = TestProject::new();
    let runner = happy_runner(&project.config).script("npm run build:pwakit", Script::failing(2));
    let mut ctx = project.context(Verbosity::Quiet);

    run_packager(&runner, &project, &mut ctx).await.unwrap_err();

    let log = project.log();
    assert!(log.contains("error: Failed: Building PWA Kit - `npm run build:pwakit` failed"));
    assert!(log.contains("error: Build failed"));
    assert!(!log.contains("Started: Preparing standalone build"));
}

/// Test that a missing shim template is fatal
#[tokio::test]
async fn test_missing_shim_fails_preparation() {
    let project = TestProject::new();
    std::fs::remove_file(project.path(".pwakit/app/ssr-shim.js")).unwrap();
    let runner = happy_runner(&project.config);
    let mut ctx = project.context(Verbosity::Quiet);

    let failure = run_packager(&runner, &project, &mut ctx).await.unwrap_err();

    assert_eq!(failure.stage, "Preparing standalone build");
    assert!(matches!(failure.error, BuildError::Staging { op: "copy", .. }));
    assert_eq!(statuses(&ctx).last(), Some(&StepStatus::Error));
    assert_eq!(statuses(&ctx).len(), 6);
}

/// Test that a malformed server-files manifest fails the last stage
#[tokio::test]
async fn test_malformed_manifest_fails_finalization() {
    let project = TestProject::new();
    let runner = happy_runner(&project.config).script(
        "npm run build:next",
        Script::ok().with_file(".next/standalone/.next/required-server-files.json", "{ nope"),
    );
    let mut ctx = project.context(Verbosity::Quiet);

    let failure = run_packager(&runner, &project, &mut ctx).await.unwrap_err();

    assert_eq!(failure.stage, "Finalizing configuration");
    assert!(matches!(failure.error, BuildError::Artifact { .. }));
    // The shim is left as it was
    assert_eq!(project.read(".pwakit/build/ssr.js"), SHIM);
}
