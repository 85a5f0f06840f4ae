// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::cli::CliArgs;
use crate::config::model::{RawConfigFile, ServiceConfig};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ServiceConfig> {
    let raw_config = load_from_path(&path)?;
    ServiceConfig::try_from(raw_config)
}

/// Build the effective configuration for a process.
///
/// Reads the optional `--config` file, overlays CLI flags / `BUILDD_*`
/// variables, then validates the result.
pub fn resolve(args: &CliArgs) -> Result<ServiceConfig> {
    let raw = match &args.config {
        Some(path) => load_from_path(path)?,
        None => RawConfigFile::default(),
    };

    ServiceConfig::try_from(raw.apply_cli(args))
}
