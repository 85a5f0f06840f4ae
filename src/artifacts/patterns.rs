use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobMatcher};

use crate::fs::FileSystem;

/// Compiled artifact pattern.
///
/// Matches against the *file name* only (like `find -name`), never against
/// the directory part of a path: `*.zip` matches both `out.zip` and
/// `dist/nested/out.zip`.
#[derive(Clone)]
pub struct ArtifactPattern {
    raw: String,
    matcher: GlobMatcher,
}

impl fmt::Debug for ArtifactPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ArtifactPattern").field(&self.raw).finish()
    }
}

impl ArtifactPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let glob = Glob::new(pattern).with_context(|| format!("invalid artifact pattern: {pattern}"))?;
        Ok(Self {
            raw: pattern.to_string(),
            matcher: glob.compile_matcher(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches_file_name(&self, name: &str) -> bool {
        self.matcher.is_match(name)
    }
}

/// Collect all files under `root` whose file name matches `pattern`.
///
/// Returns full paths, sorted. Symlinked directories are not descended into.
/// Any directory that cannot be listed aborts the search.
pub fn collect_matching_files(
    fs: &dyn FileSystem,
    root: &Path,
    pattern: &ArtifactPattern,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                stack.push(path);
            } else if fs.is_file(&path) {
                let matched = path
                    .file_name()
                    .map(|n| pattern.matches_file_name(&n.to_string_lossy()))
                    .unwrap_or(false);
                if matched {
                    files.push(path);
                }
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Key used for an artifact in the response: `./` followed by the path
/// relative to `root`, with `/` separators.
pub fn artifact_key(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    format!("./{}", rel.to_string_lossy().replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn matches_file_name_not_path() {
        let p = ArtifactPattern::new("*.zip").unwrap();
        assert!(p.matches_file_name("out.zip"));
        assert!(!p.matches_file_name("out.tar.gz"));

        let p = ArtifactPattern::new("widget-?.zip").unwrap();
        assert!(p.matches_file_name("widget-1.zip"));
        assert!(!p.matches_file_name("widget-10.zip"));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let err = ArtifactPattern::new("[unclosed").unwrap_err();
        assert!(err.to_string().contains("invalid artifact pattern"));
    }

    #[test]
    fn walk_is_recursive_and_sorted() {
        let fs = MockFileSystem::new();
        fs.add_file("ws/out.zip", b"a".to_vec());
        fs.add_file("ws/dist/z.zip", b"b".to_vec());
        fs.add_file("ws/dist/deep/a.zip", b"c".to_vec());
        fs.add_file("ws/dist/readme.md", b"d".to_vec());

        let p = ArtifactPattern::new("*.zip").unwrap();
        let found = collect_matching_files(&fs, Path::new("ws"), &p).unwrap();

        assert_eq!(
            found,
            vec![
                PathBuf::from("ws/dist/deep/a.zip"),
                PathBuf::from("ws/dist/z.zip"),
                PathBuf::from("ws/out.zip"),
            ]
        );
    }

    #[test]
    fn directories_named_like_pattern_are_skipped() {
        let fs = MockFileSystem::new();
        fs.add_file("ws/bundle.zip/inner.txt", b"x".to_vec());

        let p = ArtifactPattern::new("*.zip").unwrap();
        assert!(collect_matching_files(&fs, Path::new("ws"), &p).unwrap().is_empty());
    }

    #[test]
    fn unreadable_dir_fails_search() {
        let fs = MockFileSystem::new();
        fs.add_file("ws/out.zip", b"a".to_vec());
        fs.add_unreadable_dir("ws/locked");

        let p = ArtifactPattern::new("*.zip").unwrap();
        assert!(collect_matching_files(&fs, Path::new("ws"), &p).is_err());
    }

    #[test]
    fn keys_are_dot_relative() {
        assert_eq!(
            artifact_key(Path::new("ws/acme/widget"), Path::new("ws/acme/widget/dist/out.zip")),
            "./dist/out.zip"
        );
    }
}
