// src/pipeline/mod.rs

//! Build pipeline orchestration.
//!
//! One build is a strict sequence of stages:
//! clone → checkout → build steps → artifact collection → publish steps.
//! The first failure ends the build; everything attempted so far is
//! reported.
//!
//! The pure state machine lives in [`core`]; the async/IO shell that runs
//! processes, walks the filesystem and owns the workspace is implemented in
//! [`runtime`].

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::exec::CommandOutput;
use crate::types::{BuildResult, Stage};

pub mod core;
pub mod plan;
pub mod runtime;

pub use self::core::PipelineCore;
pub use plan::{BuildPlan, CloneSource};
pub use runtime::PipelineRuntime;

/// Where a build currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Cloning,
    CheckingOut,
    /// Running build step `n` (zero-based).
    Building(usize),
    CollectingArtifacts,
    /// Running publish step `n` (zero-based).
    Publishing(usize),
    Done,
    Failed(Stage),
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed(_))
    }
}

/// Options shared by every build.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Record a step result for a failed `git checkout`. When false, a
    /// checkout failure answers with an empty step list.
    pub report_checkout_failure: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            report_checkout_failure: true,
        }
    }
}

/// Events flowing into the core from the IO shell.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// The command requested by the last `RunCommand` action exited.
    CommandFinished(CommandOutput),
    /// The artifact search ran; per-file read errors are already folded into
    /// the map.
    ArtifactsCollected(BTreeMap<String, String>),
    /// The artifact search itself failed.
    ArtifactSearchFailed(String),
}

/// What the IO shell should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineAction {
    RunCommand {
        stage: Stage,
        command: Vec<String>,
        cwd: PathBuf,
    },
    CollectArtifacts {
        pattern: String,
        root: PathBuf,
    },
    /// The build reached a terminal state.
    Finish,
}

/// How a build ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    Completed,
    FailedAt(Stage),
}

/// Final result of one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub outcome: PipelineOutcome,
    pub result: BuildResult,
}
