// src/config/model.rs

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::CliArgs;

pub const DEFAULT_BIND: &str = ":5252";
pub const DEFAULT_WORKSPACE_ROOT: &str = "./workdir";
pub const DEFAULT_GIT_HOST: &str = "github.com";

/// Configuration file as read from TOML.
///
/// ```toml
/// [server]
/// bind = ":5252"
///
/// [workspace]
/// root = "./workdir"
///
/// [git]
/// host = "github.com"
///
/// [pipeline]
/// report_checkout_failure = true
/// ```
///
/// Every section and key is optional. Use [`ServiceConfig::try_from`] to
/// validate and fill in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub workspace: WorkspaceSection,

    #[serde(default)]
    pub git: GitSection,

    #[serde(default)]
    pub pipeline: PipelineSection,
}

/// `[server]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// `host:port`; a bare `:port` listens on all interfaces.
    #[serde(default)]
    pub bind: Option<String>,
}

/// `[workspace]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceSection {
    /// Directory that per-build workspaces are created in.
    #[serde(default)]
    pub root: Option<String>,
}

/// `[git]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitSection {
    /// Host used to build clone URLs, e.g. `github.com`.
    #[serde(default)]
    pub host: Option<String>,
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineSection {
    /// Whether a failed `git checkout` is reported as a step result.
    ///
    /// Defaults to `true`. `false` reproduces the older behaviour of
    /// answering with an empty step list.
    #[serde(default)]
    pub report_checkout_failure: Option<bool>,
}

impl RawConfigFile {
    /// Overlay values given on the command line (or their env vars).
    pub fn apply_cli(mut self, args: &CliArgs) -> Self {
        if let Some(bind) = &args.bind {
            self.server.bind = Some(bind.clone());
        }
        if let Some(root) = &args.workdir {
            self.workspace.root = Some(root.clone());
        }
        if let Some(host) = &args.git_host {
            self.git.host = Some(host.clone());
        }
        if args.legacy_checkout_reporting {
            self.pipeline.report_checkout_failure = Some(false);
        }
        self
    }
}

/// Validated, effective service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    bind: SocketAddr,
    workspace_root: PathBuf,
    git_host: String,
    report_checkout_failure: bool,
}

impl ServiceConfig {
    /// Construct without validation (used by `TryFrom<RawConfigFile>`).
    pub(crate) fn new_unchecked(
        bind: SocketAddr,
        workspace_root: PathBuf,
        git_host: String,
        report_checkout_failure: bool,
    ) -> Self {
        Self {
            bind,
            workspace_root,
            git_host,
            report_checkout_failure,
        }
    }

    pub fn bind(&self) -> SocketAddr {
        self.bind
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn git_host(&self) -> &str {
        &self.git_host
    }

    pub fn report_checkout_failure(&self) -> bool {
        self.report_checkout_failure
    }

    /// Same config with a different workspace root. Handy for tests that
    /// point the service at a temp dir.
    pub fn with_workspace_root(self, root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: root.into(),
            ..self
        }
    }

    pub fn with_report_checkout_failure(self, report: bool) -> Self {
        Self {
            report_checkout_failure: report,
            ..self
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 5252),
            workspace_root: PathBuf::from(DEFAULT_WORKSPACE_ROOT),
            git_host: DEFAULT_GIT_HOST.to_string(),
            report_checkout_failure: true,
        }
    }
}
