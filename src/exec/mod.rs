// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running step commands, using
//! `tokio::process::Command`, and handing their captured output back to the
//! pipeline.
//!
//! - [`backend`] provides the `ProcessRunner` trait and the concrete
//!   `TokioProcessRunner` used in production, which tests can replace with a
//!   fake implementation.
//! - [`task_runner`] handles individual process execution.
//! - [`env`] resolves the per-request environment overlay.

pub mod backend;
pub mod env;
pub mod task_runner;

pub use backend::{CommandOutput, Invocation, ProcessRunner, TokioProcessRunner, redact};
