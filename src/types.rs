// src/types.rs

//! Wire types for the `/build` endpoint.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{BuilddError, Result};

/// Token value that selects an anonymous HTTPS clone.
pub const ANONYMOUS_TOKEN: &str = "-";

static REPO_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("valid regex"));

/// A build request as posted to `/build`.
///
/// ```json
/// {
///   "repo": "acme/widget",
///   "commit": "main",
///   "artifacts": "widget-*.zip",
///   "build": [["make"], ["make", "dist"]],
///   "publish": [["make", "publish"]],
///   "token": "-",
///   "env": { "GOPATH": "$WORKDIR" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequest {
    /// Repository in `owner/name` form.
    #[serde(rename = "repo")]
    pub repository: String,

    /// Commit hash, branch or tag to check out.
    #[serde(default, deserialize_with = "null_as_default")]
    pub commit: String,

    /// Filename glob selecting artifacts; empty disables collection.
    #[serde(rename = "artifacts", default)]
    pub artifact_pattern: Option<String>,

    #[serde(rename = "build", default, deserialize_with = "null_as_default")]
    pub build_steps: Vec<Vec<String>>,

    #[serde(rename = "publish", default, deserialize_with = "null_as_default")]
    pub publish_steps: Vec<Vec<String>>,

    /// `"-"` for anonymous HTTPS, any other value for token HTTPS, absent for SSH.
    #[serde(rename = "token", default)]
    pub access_token: Option<String>,

    /// Extra environment for every step. `$WORKDIR` expands to the working
    /// directory, other `$VAR` references to the service's own environment.
    #[serde(rename = "env", default, deserialize_with = "null_as_default")]
    pub environment: BTreeMap<String, String>,
}

/// Treat an explicit `null` like a missing field. Clients that marshal
/// their zero values send `"publish": null` rather than omitting it.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl BuildRequest {
    /// The artifact pattern, if collection is enabled.
    pub fn artifact_pattern(&self) -> Option<&str> {
        self.artifact_pattern.as_deref().filter(|p| !p.is_empty())
    }

    /// The access token, if one was supplied.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }

    /// `(owner, name)` of the repository. Only meaningful after `validate`.
    pub fn repository_parts(&self) -> Option<(&str, &str)> {
        self.repository.split_once('/')
    }

    /// Reject requests that could escape the workspace root or inject
    /// options into git.
    pub fn validate(&self) -> Result<()> {
        let Some((owner, name)) = self.repository_parts() else {
            return Err(BuilddError::InvalidRequest(format!(
                "repo must be in owner/name form, got {:?}",
                self.repository
            )));
        };

        for segment in [owner, name] {
            if segment == "." || segment == ".." || !REPO_SEGMENT.is_match(segment) {
                return Err(BuilddError::InvalidRequest(format!(
                    "invalid repo segment {segment:?} in {:?}",
                    self.repository
                )));
            }
        }

        if self.commit.is_empty() {
            return Err(BuilddError::InvalidRequest("commit must not be empty".into()));
        }
        if self.commit.starts_with('-') {
            return Err(BuilddError::InvalidRequest(format!(
                "commit must not start with '-', got {:?}",
                self.commit
            )));
        }

        Ok(())
    }
}

/// Outcome of one executed step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    /// The command that ran (program + arguments).
    pub command: Vec<String>,

    /// Set when the step failed to start or exited unsuccessfully.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub stdout: String,
    pub stderr: String,
}

impl StepResult {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Response body of `/build`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildResult {
    /// Results of user steps, plus an internal step if one failed.
    pub steps: Vec<StepResult>,

    /// Matched artifact path (`./dir/file`) to base64 content, or an error
    /// message if the file could not be read. `None` when collection did not
    /// run.
    #[serde(default)]
    pub artifacts: Option<BTreeMap<String, String>>,
}

/// A phase of the build pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Clone,
    Checkout,
    Build,
    ArtifactCollection,
    Publish,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Clone => "clone",
            Stage::Checkout => "checkout",
            Stage::Build => "build",
            Stage::ArtifactCollection => "artifact-collection",
            Stage::Publish => "publish",
        };
        f.write_str(s)
    }
}
