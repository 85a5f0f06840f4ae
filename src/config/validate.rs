// src/config/validate.rs

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::config::model::{
    DEFAULT_BIND, DEFAULT_GIT_HOST, DEFAULT_WORKSPACE_ROOT, RawConfigFile, ServiceConfig,
};
use crate::errors::{BuilddError, Result};

impl TryFrom<RawConfigFile> for ServiceConfig {
    type Error = crate::errors::BuilddError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let bind = parse_bind_addr(raw.server.bind.as_deref().unwrap_or(DEFAULT_BIND))?;
        let root = validate_workspace_root(raw.workspace.root.as_deref().unwrap_or(DEFAULT_WORKSPACE_ROOT))?;
        let host = validate_git_host(raw.git.host.as_deref().unwrap_or(DEFAULT_GIT_HOST))?;
        let report_checkout_failure = raw.pipeline.report_checkout_failure.unwrap_or(true);

        Ok(ServiceConfig::new_unchecked(
            bind,
            root,
            host.to_string(),
            report_checkout_failure,
        ))
    }
}

/// Parse a bind address. `:5252` means "all interfaces, port 5252".
pub fn parse_bind_addr(s: &str) -> Result<SocketAddr> {
    let s = s.trim();
    if let Some(port) = s.strip_prefix(':') {
        let port: u16 = port.parse().map_err(|_| {
            BuilddError::ConfigError(format!("invalid port in bind address {s:?}"))
        })?;
        return Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port));
    }

    s.parse::<SocketAddr>().map_err(|e| {
        BuilddError::ConfigError(format!("invalid bind address {s:?}: {e}"))
    })
}

fn validate_workspace_root(root: &str) -> Result<PathBuf> {
    if root.trim().is_empty() {
        return Err(BuilddError::ConfigError(
            "[workspace].root must not be empty".to_string(),
        ));
    }
    Ok(PathBuf::from(root))
}

fn validate_git_host(host: &str) -> Result<&str> {
    if host.is_empty() {
        return Err(BuilddError::ConfigError(
            "[git].host must not be empty".to_string(),
        ));
    }
    if host.contains("://") || host.contains('/') || host.contains('@') {
        return Err(BuilddError::ConfigError(format!(
            "[git].host must be a bare host name, got {host:?}"
        )));
    }
    Ok(host)
}
