// src/pipeline/plan.rs

//! Everything the pipeline core needs to know about one build, resolved up
//! front: clone URL, paths, and the user's step lists.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::exec::redact;
use crate::types::{ANONYMOUS_TOKEN, BuildRequest};

/// How the repository is fetched.
#[derive(Clone, PartialEq, Eq)]
pub enum CloneSource {
    /// `https://<host>/<repo>.git`
    Anonymous,
    /// `https://<token>:x-oauth-basic@<host>/<repo>.git`
    Token(String),
    /// `git@<host>:<repo>.git`, using the service's own SSH identity.
    Ssh,
}

impl fmt::Debug for CloneSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloneSource::Anonymous => f.write_str("Anonymous"),
            CloneSource::Token(_) => f.write_str("Token(***)"),
            CloneSource::Ssh => f.write_str("Ssh"),
        }
    }
}

impl CloneSource {
    /// Pick the source from the request's `token` field.
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some(ANONYMOUS_TOKEN) => CloneSource::Anonymous,
            Some(token) if !token.is_empty() => CloneSource::Token(token.to_string()),
            _ => CloneSource::Ssh,
        }
    }

    pub fn url(&self, host: &str, repository: &str) -> String {
        match self {
            CloneSource::Anonymous => format!("https://{host}/{repository}.git"),
            CloneSource::Token(token) => {
                format!("https://{token}:x-oauth-basic@{host}/{repository}.git")
            }
            CloneSource::Ssh => format!("git@{host}:{repository}.git"),
        }
    }

    /// The credential embedded in the URL, if any.
    pub fn secret(&self) -> Option<&str> {
        match self {
            CloneSource::Token(token) => Some(token),
            _ => None,
        }
    }
}

/// Fully resolved description of one build.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub repository: String,
    pub commit: String,
    pub clone_source: CloneSource,
    pub git_host: String,
    /// Top-level workspace directory; `git clone` runs here.
    pub workspace_root: PathBuf,
    /// Where the repository lands; every later step runs here.
    pub checkout_dir: PathBuf,
    pub build_steps: Vec<Vec<String>>,
    pub artifact_pattern: Option<String>,
    pub publish_steps: Vec<Vec<String>>,
}

impl BuildPlan {
    pub fn new(
        request: &BuildRequest,
        git_host: &str,
        workspace_root: &Path,
        checkout_dir: &Path,
    ) -> Self {
        Self {
            repository: request.repository.clone(),
            commit: request.commit.clone(),
            clone_source: CloneSource::from_token(request.access_token()),
            git_host: git_host.to_string(),
            workspace_root: workspace_root.to_path_buf(),
            checkout_dir: checkout_dir.to_path_buf(),
            build_steps: request.build_steps.clone(),
            artifact_pattern: request.artifact_pattern().map(str::to_string),
            publish_steps: request.publish_steps.clone(),
        }
    }

    /// `git clone <url> <owner>/<name>`, run from the workspace root.
    pub fn clone_command(&self) -> Vec<String> {
        vec![
            "git".to_string(),
            "clone".to_string(),
            self.clone_source.url(&self.git_host, &self.repository),
            self.repository.clone(),
        ]
    }

    /// `git checkout <commit>`, run from the checkout directory.
    pub fn checkout_command(&self) -> Vec<String> {
        vec!["git".to_string(), "checkout".to_string(), self.commit.clone()]
    }

    /// Pseudo-command recorded when the artifact search fails.
    pub fn artifact_search_command(&self) -> Vec<String> {
        let mut cmd = vec!["collect-artifacts".to_string()];
        cmd.extend(self.artifact_pattern.clone());
        cmd
    }

    pub fn secret(&self) -> Option<&str> {
        self.clone_source.secret()
    }

    /// `command` with this plan's credential masked.
    pub fn redacted(&self, command: &[String]) -> Vec<String> {
        redact(command, self.secret())
    }
}
