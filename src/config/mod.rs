// src/config/mod.rs

//! Configuration loading and validation for buildd.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and merge CLI flags (`loader.rs`).
//! - Validate addresses, paths and hosts (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, resolve};
pub use model::{
    GitSection, PipelineSection, RawConfigFile, ServerSection, ServiceConfig, WorkspaceSection,
};
pub use validate::parse_bind_addr;
