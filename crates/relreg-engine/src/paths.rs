//! Safe path construction inside the registry tree.
//!
//! Every identifier that reaches the filesystem (collections, package names,
//! SDK keys, app ids, version aliases) comes from request input. Segments are
//! validated syntactically before they are joined; nothing is resolved
//! against the filesystem to decide whether a path is safe.
//!
//! Layout:
//! ```text
//! <root>/
//!   packages/<collection>/<item>[/<child>]/<version>.json
//!   sdks/<key>/latest.json
//!   apps/<id>/<version>.json
//!   aws-lambda-layers/<runtime>/latest.json
//!   misc/marketing-slugs.json
//! ```

use std::path::{Path, PathBuf};

use crate::error::{RegistryError, Result};

/// Top-level directory holding package collections.
pub const PACKAGES_DIR: &str = "packages";
/// Top-level directory holding SDK pointers.
pub const SDKS_DIR: &str = "sdks";
/// Top-level directory holding app records.
pub const APPS_DIR: &str = "apps";
/// Top-level directory holding AWS Lambda layer records.
pub const LAMBDA_LAYERS_DIR: &str = "aws-lambda-layers";
/// Top-level directory holding miscellaneous tables.
pub const MISC_DIR: &str = "misc";

/// Validate a single logical segment.
///
/// A segment may contain `/` (namespaced ids), but none of its components
/// may be empty, `.` or `..`.
pub fn validate_segment(segment: &str) -> Result<()> {
    if segment.is_empty() {
        return Err(RegistryError::InvalidPath {
            segment: segment.to_string(),
        });
    }
    for component in segment.split('/') {
        if component.is_empty() || component == "." || component == ".." {
            return Err(RegistryError::InvalidPath {
                segment: segment.to_string(),
            });
        }
    }
    Ok(())
}

/// Joins validated segments onto a fixed base directory.
#[derive(Debug, Clone)]
pub struct PathResolver {
    base: PathBuf,
}

impl PathResolver {
    /// Create a resolver rooted at `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        PathResolver { base: base.into() }
    }

    /// The base directory.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Validate every segment, then join them onto the base.
    ///
    /// Fails with [`RegistryError::InvalidPath`] before any I/O.
    pub fn resolve(&self, segments: &[&str]) -> Result<PathBuf> {
        for segment in segments {
            validate_segment(segment)?;
        }
        let mut path = self.base.clone();
        for segment in segments {
            for component in segment.split('/') {
                path.push(component);
            }
        }
        Ok(path)
    }

    /// Path to a `<version>.json` record under the given directory segments.
    pub fn record(&self, segments: &[&str], version: &str) -> Result<PathBuf> {
        validate_segment(version)?;
        let file = format!("{version}.json");
        let mut all: Vec<&str> = segments.to_vec();
        all.push(&file);
        self.resolve(&all)
    }
}

/// A directory child, as seen by the enumeration helpers.
#[derive(Debug, Clone)]
pub(crate) struct ChildEntry {
    pub name: String,
    pub path: PathBuf,
    /// Whether the child is a directory (symlinks are followed).
    pub is_dir: bool,
}

/// List the children of `dir`, sorted by name.
///
/// Names that are not valid UTF-8 are skipped; they cannot be addressed by
/// any identifier anyway.
pub(crate) fn list_dir(dir: &Path) -> Result<Vec<ChildEntry>> {
    let read = std::fs::read_dir(dir).map_err(|e| RegistryError::io(dir, e))?;
    let mut children = Vec::new();
    for entry in read {
        let entry = entry.map_err(|e| RegistryError::io(dir, e))?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        let path = entry.path();
        children.push(ChildEntry {
            is_dir: path.is_dir(),
            name,
            path,
        });
    }
    children.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(children)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_plain_segments() {
        let resolver = PathResolver::new("/srv/registry");
        let path = resolver.resolve(&["packages", "npm", "@sentry/browser"]).unwrap();
        assert_eq!(path, PathBuf::from("/srv/registry/packages/npm/@sentry/browser"));
    }

    #[test]
    fn rejects_traversal_components() {
        let resolver = PathResolver::new("/srv/registry");
        for bad in ["..", ".", "a/../b", "a/./b", "../etc", "a/..", ""] {
            let err = resolver.resolve(&["packages", bad]).unwrap_err();
            assert!(
                matches!(err, RegistryError::InvalidPath { .. }),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_empty_components() {
        assert!(validate_segment("a//b").is_err());
        assert!(validate_segment("/abs").is_err());
        assert!(validate_segment("trailing/").is_err());
    }

    #[test]
    fn rejects_before_touching_storage() {
        // The base does not exist; a valid path still resolves, an invalid one
        // fails syntactically.
        let resolver = PathResolver::new("/definitely/not/here");
        assert!(resolver.resolve(&["sdks", "sentry.python"]).is_ok());
        assert!(resolver.resolve(&["sdks", "../../etc"]).is_err());
    }

    #[test]
    fn list_dir_sorts_and_flags_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("b")).unwrap();
        std::fs::write(dir.path().join("a.json"), "{}").unwrap();
        let children = list_dir(dir.path()).unwrap();
        let names: Vec<_> = children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a.json", "b"]);
        assert!(!children[0].is_dir);
        assert!(children[1].is_dir);
    }

    #[test]
    fn list_dir_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_dir(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
    }

    #[test]
    fn record_appends_json_suffix() {
        let resolver = PathResolver::new("/r");
        let path = resolver.record(&["apps", "sentry-cli"], "latest").unwrap();
        assert_eq!(path, PathBuf::from("/r/apps/sentry-cli/latest.json"));
        assert!(resolver.record(&["apps", "sentry-cli"], "..").is_err());
    }
}
