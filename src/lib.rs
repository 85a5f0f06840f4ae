// src/lib.rs

pub mod artifacts;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod server;
pub mod types;
pub mod workspace;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::ServiceConfig;
use crate::exec::TokioProcessRunner;
use crate::fs::{FileSystem, RealFileSystem};
use crate::pipeline::PipelineRuntime;
use crate::server::{AppState, router, serve_http, shutdown_signal};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config resolution (file + flags + env)
/// - the pipeline runtime over real processes and the real filesystem
/// - the HTTP router
/// - Ctrl-C / SIGTERM handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config = config::resolve(&args).context("loading configuration")?;

    if args.dry_run {
        print_dry_run(&config);
        return Ok(());
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    fs.create_dir_all(config.workspace_root())
        .context("creating workspace root")?;

    info!(
        bind = %config.bind(),
        workspace_root = %config.workspace_root().display(),
        git_host = config.git_host(),
        report_checkout_failure = config.report_checkout_failure(),
        "buildd starting"
    );

    let runtime = PipelineRuntime::new(Arc::new(TokioProcessRunner), fs, &config);
    let app = router(AppState::new(runtime));

    serve_http(app, config.bind(), shutdown_signal()).await?;
    Ok(())
}

/// Print the effective configuration.
fn print_dry_run(config: &ServiceConfig) {
    println!("buildd dry-run");
    println!("  server.bind = {}", config.bind());
    println!("  workspace.root = {}", config.workspace_root().display());
    println!("  git.host = {}", config.git_host());
    println!(
        "  pipeline.report_checkout_failure = {}",
        config.report_checkout_failure()
    );

    debug!("dry-run complete (server not started)");
}
