// src/workspace/mod.rs

//! Per-build working directories.
//!
//! A [`Workspace`] is allocated under the configured root for exactly one
//! build and removed when the build finishes. Layout:
//!
//! ```text
//! <root>/<owner>+<name>-<unix seconds>-<seq>/   <- Workspace::root
//!     <owner>/<name>/                           <- Workspace::checkout_dir
//! ```
//!
//! The trailing sequence number is process-wide, so two builds of the same
//! repository started within the same second still get distinct directories.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::fs::FileSystem;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Seconds since the Unix epoch, `0` if the clock is before it.
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Directory name for a workspace: path separators in the repository are
/// replaced so the name is a single path component.
pub fn workspace_dir_name(repository: &str, timestamp: u64, seq: u64) -> String {
    let sanitized: String = repository
        .chars()
        .map(|c| match c {
            '/' => '+',
            '\\' => '+',
            c => c,
        })
        .collect();
    format!("{sanitized}-{timestamp}-{seq}")
}

/// Allocates workspaces under a fixed root directory.
#[derive(Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl fmt::Debug for WorkspaceManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkspaceManager")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl WorkspaceManager {
    pub fn new(root: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            root: root.into(),
            fs,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a fresh workspace for `repository` (`owner/name`, already
    /// validated).
    ///
    /// The parent of the checkout directory exists on return; the checkout
    /// directory itself is left for `git clone` to create.
    pub fn allocate(&self, repository: &str, timestamp: u64) -> Result<Workspace> {
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let root = self.root.join(workspace_dir_name(repository, timestamp, seq));
        let checkout_dir = root.join(repository);

        // Owned by the guard from here on, so a failure below still cleans up.
        let workspace = Workspace {
            root,
            checkout_dir,
            fs: Arc::clone(&self.fs),
            released: false,
        };

        let parent = workspace
            .checkout_dir
            .parent()
            .unwrap_or(&workspace.root)
            .to_path_buf();
        self.fs
            .create_dir_all(&parent)
            .with_context(|| format!("preparing workspace {:?}", workspace.root))?;

        debug!(path = %workspace.root.display(), "allocated workspace");
        Ok(workspace)
    }
}

/// A workspace exclusively owned by one build.
///
/// Removed by [`Workspace::release`], or on drop if it was never released
/// explicitly (early return, error or panic).
pub struct Workspace {
    root: PathBuf,
    checkout_dir: PathBuf,
    fs: Arc<dyn FileSystem>,
    released: bool,
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("root", &self.root)
            .field("checkout_dir", &self.checkout_dir)
            .field("released", &self.released)
            .finish()
    }
}

impl Workspace {
    /// Top-level directory of this workspace.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the repository is cloned and steps run.
    pub fn checkout_dir(&self) -> &Path {
        &self.checkout_dir
    }

    /// Recursively remove the workspace. Failures are logged, never returned.
    pub fn release(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        match self.fs.remove_dir_all(&self.root) {
            Ok(()) => debug!(path = %self.root.display(), "removed workspace"),
            Err(err) => warn!(
                path = %self.root.display(),
                error = %format!("{err:#}"),
                "failed to remove workspace"
            ),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.remove();
    }
}
