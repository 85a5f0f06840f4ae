// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Every flag also reads a `BUILDD_*` environment variable so the service can
//! be configured from a container environment without a config file.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `buildd`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "buildd",
    version,
    about = "Check out a repository, run build and publish steps, return the results over HTTP.",
    long_about = None
)]
pub struct CliArgs {
    /// Optional config file (TOML).
    ///
    /// Values given on the command line take precedence over the file.
    #[arg(long, env = "BUILDD_CONFIG", value_name = "PATH")]
    pub config: Option<String>,

    /// Address the HTTP listener binds to, e.g. `:5252` or `127.0.0.1:8080`.
    #[arg(long, env = "BUILDD_BIND", value_name = "ADDR")]
    pub bind: Option<String>,

    /// Directory under which per-build workspaces are created.
    #[arg(long, env = "BUILDD_WORKDIR", value_name = "DIR")]
    pub workdir: Option<String>,

    /// Host repositories are cloned from.
    #[arg(long, env = "BUILDD_GIT_HOST", value_name = "HOST")]
    pub git_host: Option<String>,

    /// Do not add a step result for a failed `git checkout`.
    #[arg(long, env = "BUILDD_LEGACY_CHECKOUT_REPORTING")]
    pub legacy_checkout_reporting: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BUILDD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load + validate config, print it, but don't start the server.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
