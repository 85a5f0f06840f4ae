// src/artifacts/mod.rs

//! Artifact discovery and encoding.
//!
//! - [`patterns`] compiles the filename glob and walks the checkout.
//! - [`collector`] reads each match and base64-encodes it for the response.

pub mod collector;
pub mod patterns;

pub use collector::collect_artifacts;
pub use patterns::{ArtifactPattern, artifact_key, collect_matching_files};
