use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use base64::prelude::*;
use tracing::{info, warn};

use super::patterns::{ArtifactPattern, artifact_key, collect_matching_files};
use crate::fs::FileSystem;

/// Find every file under `root` matching `pattern` and encode its contents.
///
/// Returns an error only if the search itself fails (bad pattern, unlistable
/// directory). A file that matches but cannot be read is recorded with an
/// `Error reading artifact: ...` message in place of its content.
pub fn collect_artifacts(
    fs: &dyn FileSystem,
    root: &Path,
    pattern: &str,
) -> Result<BTreeMap<String, String>> {
    let pattern = ArtifactPattern::new(pattern)?;
    let paths = collect_matching_files(fs, root, &pattern)?;

    info!(pattern = pattern.as_str(), count = paths.len(), "found artifacts");

    let mut artifacts = BTreeMap::new();
    for path in paths {
        let key = artifact_key(root, &path);
        match fs.read(&path) {
            Ok(bytes) => {
                info!(artifact = %key, bytes = bytes.len(), "added artifact");
                artifacts.insert(key, BASE64_STANDARD.encode(&bytes));
            }
            Err(err) => {
                warn!(artifact = %key, error = %format!("{err:#}"), "failed to read artifact");
                artifacts.insert(key, format!("Error reading artifact: {err:#}"));
            }
        }
    }

    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn encodes_exact_bytes() {
        let fs = MockFileSystem::new();
        let bytes: Vec<u8> = (0u8..=255).collect();
        fs.add_file("ws/out.zip", bytes.clone());

        let artifacts = collect_artifacts(&fs, Path::new("ws"), "*.zip").unwrap();

        let encoded = &artifacts["./out.zip"];
        assert_eq!(BASE64_STANDARD.decode(encoded).unwrap(), bytes);
    }

    #[test]
    fn unreadable_match_gets_placeholder() {
        let fs = MockFileSystem::new();
        fs.add_file("ws/good.zip", b"ok".to_vec());
        fs.add_unreadable_file("ws/bad.zip");

        let artifacts = collect_artifacts(&fs, Path::new("ws"), "*.zip").unwrap();

        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts["./good.zip"], BASE64_STANDARD.encode(b"ok"));
        assert!(artifacts["./bad.zip"].starts_with("Error reading artifact: "));
    }

    #[test]
    fn no_matches_is_an_empty_map() {
        let fs = MockFileSystem::new();
        fs.add_file("ws/readme.md", b"x".to_vec());

        let artifacts = collect_artifacts(&fs, Path::new("ws"), "*.zip").unwrap();
        assert!(artifacts.is_empty());
    }

    #[test]
    fn bad_pattern_fails_collection() {
        let fs = MockFileSystem::new();
        fs.add_file("ws/out.zip", b"x".to_vec());
        assert!(collect_artifacts(&fs, Path::new("ws"), "[").is_err());
    }
}
