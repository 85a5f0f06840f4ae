#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum_test::TestServer;
use buildd::config::ServiceConfig;
use buildd::fs::RealFileSystem;
use buildd::pipeline::PipelineRuntime;
use buildd::server::{AppState, router};
use buildd_test_utils::FakeRunner;

pub use buildd_test_utils::init_tracing;

/// Pipeline runtime over `runner` with workspaces under `workdir`.
pub fn runtime(runner: FakeRunner, workdir: &Path, report_checkout_failure: bool) -> PipelineRuntime {
    let config = ServiceConfig::default()
        .with_workspace_root(workdir)
        .with_report_checkout_failure(report_checkout_failure);
    PipelineRuntime::new(Arc::new(runner), Arc::new(RealFileSystem), &config)
}

/// Full router mounted in an in-process test server.
pub fn test_server(runner: FakeRunner, workdir: &Path) -> TestServer {
    test_server_with(runner, workdir, true)
}

pub fn test_server_with(
    runner: FakeRunner,
    workdir: &Path,
    report_checkout_failure: bool,
) -> TestServer {
    let app = router(AppState::new(runtime(runner, workdir, report_checkout_failure)));
    TestServer::new(app).expect("test server")
}

/// Everything left directly under `dir`.
pub fn leftover_entries(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .expect("read workdir")
        .map(|e| e.expect("dir entry").path())
        .collect()
}
