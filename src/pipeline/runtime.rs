// src/pipeline/runtime.rs

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::artifacts::collect_artifacts;
use crate::config::ServiceConfig;
use crate::exec::{Invocation, ProcessRunner};
use crate::fs::FileSystem;
use crate::types::{BuildRequest, BuildResult, Stage, StepResult};
use crate::workspace::{Workspace, WorkspaceManager, unix_timestamp};

use super::core::PipelineCore;
use super::plan::BuildPlan;
use super::{PipelineAction, PipelineEvent, PipelineOptions, PipelineOutcome, PipelineReport};

/// Runs builds end to end.
///
/// This is the IO shell around [`PipelineCore`]: it allocates the workspace,
/// hands `RunCommand` actions to the [`ProcessRunner`], runs the artifact
/// search on the blocking pool and feeds the results back into the core
/// until it says `Finish`. Builds share nothing but the runner, so one
/// `PipelineRuntime` serves any number of concurrent requests.
pub struct PipelineRuntime {
    runner: Arc<dyn ProcessRunner>,
    fs: Arc<dyn FileSystem>,
    workspaces: WorkspaceManager,
    git_host: String,
    options: PipelineOptions,
}

impl fmt::Debug for PipelineRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineRuntime")
            .field("workspaces", &self.workspaces)
            .field("git_host", &self.git_host)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl PipelineRuntime {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        fs: Arc<dyn FileSystem>,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            runner,
            workspaces: WorkspaceManager::new(config.workspace_root(), Arc::clone(&fs)),
            fs,
            git_host: config.git_host().to_string(),
            options: PipelineOptions {
                report_checkout_failure: config.report_checkout_failure(),
            },
        }
    }

    pub fn workspaces(&self) -> &WorkspaceManager {
        &self.workspaces
    }

    /// Execute one build. Never fails as such: every problem ends up as a
    /// failed step in the report. The workspace is removed before returning.
    pub async fn run(&self, request: &BuildRequest) -> PipelineReport {
        info!(repo = %request.repository, commit = %request.commit, "starting build");

        let workspace = match self.allocate(request).await {
            Ok(ws) => ws,
            Err(err) => return self.allocation_failed(request, err),
        };

        let plan = BuildPlan::new(
            request,
            &self.git_host,
            workspace.root(),
            workspace.checkout_dir(),
        );
        let mut core = PipelineCore::new(plan, self.options);
        let mut action = core.next_action();

        loop {
            let event = match action {
                PipelineAction::RunCommand {
                    stage,
                    command,
                    cwd,
                } => {
                    let invocation = Invocation {
                        command: &command,
                        cwd: &cwd,
                        env: &request.environment,
                        secret: core.plan().secret(),
                    };
                    debug!(%stage, command = %invocation.display(), "running command");
                    PipelineEvent::CommandFinished(self.runner.run(invocation).await)
                }
                PipelineAction::CollectArtifacts { pattern, root } => {
                    let fs = Arc::clone(&self.fs);
                    let search = tokio::task::spawn_blocking(move || {
                        collect_artifacts(fs.as_ref(), &root, &pattern)
                    })
                    .await;
                    match search {
                        Ok(Ok(map)) => PipelineEvent::ArtifactsCollected(map),
                        Ok(Err(err)) => PipelineEvent::ArtifactSearchFailed(format!("{err:#}")),
                        Err(err) => {
                            PipelineEvent::ArtifactSearchFailed(format!("artifact search aborted: {err}"))
                        }
                    }
                }
                PipelineAction::Finish => break,
            };

            action = core.step(event);
        }

        let report = core.finish();
        match report.outcome {
            PipelineOutcome::Completed => info!(
                repo = %request.repository,
                steps = report.result.steps.len(),
                "build succeeded"
            ),
            PipelineOutcome::FailedAt(stage) => warn!(
                repo = %request.repository,
                %stage,
                steps = report.result.steps.len(),
                "build failed"
            ),
        }

        release(workspace).await;
        report
    }

    async fn allocate(&self, request: &BuildRequest) -> anyhow::Result<Workspace> {
        let workspaces = self.workspaces.clone();
        let repository = request.repository.clone();
        tokio::task::spawn_blocking(move || workspaces.allocate(&repository, unix_timestamp()))
            .await?
    }

    /// Report for a build whose workspace could not be created: the clone
    /// never ran, so it is reported as the failed step.
    fn allocation_failed(&self, request: &BuildRequest, err: anyhow::Error) -> PipelineReport {
        warn!(
            repo = %request.repository,
            error = %format!("{err:#}"),
            "failed to prepare workspace"
        );

        let root = self.workspaces.root();
        let plan = BuildPlan::new(request, &self.git_host, root, &root.join(&request.repository));

        PipelineReport {
            outcome: PipelineOutcome::FailedAt(Stage::Clone),
            result: BuildResult {
                steps: vec![StepResult {
                    command: plan.redacted(&plan.clone_command()),
                    error: Some(format!("failed to prepare workspace: {err:#}")),
                    stdout: String::new(),
                    stderr: String::new(),
                }],
                artifacts: None,
            },
        }
    }
}

/// Remove the workspace on the blocking pool. If that task cannot run, the
/// guard is dropped on the spot, which removes it synchronously instead.
async fn release(workspace: Workspace) {
    if let Err(err) = tokio::task::spawn_blocking(move || workspace.release()).await {
        warn!(error = %err, "workspace cleanup task failed");
    }
}
