// src/exec/env.rs

//! Environment overlay resolution for step processes.
//!
//! Each overlay value first has [`WORKDIR_PLACEHOLDER`] replaced by the
//! absolute working directory, then `$NAME` / `${NAME}` references are
//! expanded from the service's own environment. Unset variables expand to
//! the empty string.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Placeholder replaced with the absolute working directory of the step.
pub const WORKDIR_PLACEHOLDER: &str = "$WORKDIR";

static VAR_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))")
        .expect("valid regex")
});

/// Resolve an overlay against the process environment.
///
/// The returned pairs are meant to be layered on top of the inherited
/// environment, so an overlay key replaces an inherited one.
pub fn resolve_overlay(overlay: &BTreeMap<String, String>, workdir: &Path) -> Vec<(String, String)> {
    resolve_overlay_with(overlay, workdir, |name| std::env::var(name).ok())
}

/// Same as [`resolve_overlay`] with an explicit variable lookup.
pub fn resolve_overlay_with<F>(
    overlay: &BTreeMap<String, String>,
    workdir: &Path,
    lookup: F,
) -> Vec<(String, String)>
where
    F: Fn(&str) -> Option<String>,
{
    let abs = std::path::absolute(workdir).unwrap_or_else(|_| workdir.to_path_buf());
    let abs = abs.to_string_lossy();

    overlay
        .iter()
        .map(|(key, value)| {
            let value = value.replace(WORKDIR_PLACEHOLDER, &abs);
            (key.clone(), expand_vars(&value, &lookup).into_owned())
        })
        .collect()
}

/// Expand `$NAME` and `${NAME}` references using `lookup`.
pub fn expand_vars<'a, F>(value: &'a str, lookup: F) -> Cow<'a, str>
where
    F: Fn(&str) -> Option<String>,
{
    VAR_REF.replace_all(value, |caps: &Captures<'_>| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        lookup(name).unwrap_or_default()
    })
}
