// tests/pipeline_fake_runner.rs

mod common;

use std::collections::HashSet;

use buildd::pipeline::PipelineOutcome;
use buildd::types::Stage;
use buildd_test_utils::{BuildRequestBuilder, FakeRunner, with_timeout};

use common::{init_tracing, leftover_entries, runtime};

#[tokio::test]
async fn test_steps_run_in_checkout_dir() {
    init_tracing();
    let workdir = tempfile::tempdir().unwrap();
    let runner = FakeRunner::new();
    let rt = runtime(runner.clone(), workdir.path(), true);

    let request = BuildRequestBuilder::new("acme/widget", "main")
        .build_step(&["make"])
        .publish_step(&["make", "publish"])
        .build();

    let report = rt.run(&request).await;
    assert_eq!(report.outcome, PipelineOutcome::Completed);

    let calls = runner.calls();
    assert_eq!(calls.len(), 4);

    let ws_root = calls[0].cwd.clone();
    assert_eq!(ws_root.parent(), Some(workdir.path()));
    let name = ws_root.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("acme+widget-"), "unexpected workspace name {name}");

    for call in &calls[1..] {
        assert_eq!(call.cwd, ws_root.join("acme/widget"));
    }
    assert!(leftover_entries(workdir.path()).is_empty());
}

#[tokio::test]
async fn test_concurrent_builds_get_distinct_workspaces() {
    init_tracing();
    let workdir = tempfile::tempdir().unwrap();
    let runner = FakeRunner::new();
    let rt = runtime(runner.clone(), workdir.path(), true);

    let a = BuildRequestBuilder::new("acme/widget", "main")
        .build_step(&["write", "out.zip", "a"])
        .artifacts("*.zip")
        .build();
    let b = BuildRequestBuilder::new("acme/widget", "main")
        .build_step(&["write", "out.zip", "b"])
        .artifacts("*.zip")
        .build();

    let (ra, rb) = with_timeout(async { tokio::join!(rt.run(&a), rt.run(&b)) }).await;

    assert_eq!(ra.outcome, PipelineOutcome::Completed);
    assert_eq!(rb.outcome, PipelineOutcome::Completed);
    assert_eq!(ra.result.artifacts.unwrap()["./out.zip"], "YQ==");
    assert_eq!(rb.result.artifacts.unwrap()["./out.zip"], "Yg==");

    let roots: HashSet<_> = runner
        .calls()
        .iter()
        .filter(|c| c.command[..2] == ["git", "clone"])
        .map(|c| c.cwd.clone())
        .collect();
    assert_eq!(roots.len(), 2);
    assert!(leftover_entries(workdir.path()).is_empty());
}

#[tokio::test]
async fn test_invalid_artifact_pattern_fails_collection() {
    init_tracing();
    let workdir = tempfile::tempdir().unwrap();
    let runner = FakeRunner::new();
    let rt = runtime(runner.clone(), workdir.path(), true);

    let request = BuildRequestBuilder::new("acme/widget", "main")
        .build_step(&["make"])
        .artifacts("[")
        .publish_step(&["make", "publish"])
        .build();

    let report = rt.run(&request).await;

    assert_eq!(report.outcome, PipelineOutcome::FailedAt(Stage::ArtifactCollection));
    let steps = &report.result.steps;
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[1].command, vec!["collect-artifacts", "["]);
    assert!(steps[1].failed());
    assert!(report.result.artifacts.is_none());
    assert!(!runner.commands().contains(&vec!["make".to_string(), "publish".to_string()]));
    assert!(leftover_entries(workdir.path()).is_empty());
}

#[tokio::test]
async fn test_no_matches_gives_empty_artifact_map() {
    init_tracing();
    let workdir = tempfile::tempdir().unwrap();
    let rt = runtime(FakeRunner::new(), workdir.path(), true);

    let request = BuildRequestBuilder::new("acme/widget", "main")
        .build_step(&["write", "readme.md", "x"])
        .artifacts("*.zip")
        .build();

    let report = rt.run(&request).await;

    assert_eq!(report.outcome, PipelineOutcome::Completed);
    assert_eq!(report.result.artifacts, Some(Default::default()));
}

#[tokio::test]
async fn test_unwritable_workspace_root_reports_clone_failure() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();

    let runner = FakeRunner::new();
    let rt = runtime(runner.clone(), &blocker, true);

    let request = BuildRequestBuilder::new("acme/widget", "main")
        .token("s3cr3t")
        .build_step(&["make"])
        .build();

    let report = rt.run(&request).await;

    assert_eq!(report.outcome, PipelineOutcome::FailedAt(Stage::Clone));
    let step = &report.result.steps[0];
    assert!(step.error.as_deref().unwrap().starts_with("failed to prepare workspace"));
    assert!(step.command.iter().all(|t| !t.contains("s3cr3t")));
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_env_overlay_reaches_every_step() {
    init_tracing();
    let workdir = tempfile::tempdir().unwrap();
    let runner = FakeRunner::new();
    let rt = runtime(runner.clone(), workdir.path(), true);

    let request = BuildRequestBuilder::new("acme/widget", "main")
        .env("GOPATH", "$WORKDIR")
        .build_step(&["printenv", "GOPATH"])
        .build();

    let report = rt.run(&request).await;

    let stdout = &report.result.steps[0].stdout;
    assert!(stdout.trim_end().ends_with("acme/widget"), "got {stdout:?}");
    assert!(runner.calls().iter().all(|c| c.env["GOPATH"] == "$WORKDIR"));
}
