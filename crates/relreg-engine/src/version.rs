//! Version enumeration and semantic-version ordering.
//!
//! Versions are not stored as a list anywhere; they are derived from the
//! records present in a package directory and ordered by semver precedence.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::{RegistryError, Result};
use crate::paths::list_dir;

/// The distinguished alias resolving to the current version.
pub const LATEST: &str = "latest";

/// A parsed semantic version.
pub type Version = semver::Version;

/// Parse a version string like "1.2.3".
pub fn parse_version(s: &str) -> std::result::Result<Version, semver::Error> {
    Version::parse(s)
}

/// Semver precedence: build metadata does not take part.
pub fn compare_precedence(a: &Version, b: &Version) -> Ordering {
    a.cmp_precedence(b)
}

/// Order a set of version strings ascending by semver precedence.
///
/// Any entry that does not parse fails the whole call; `path` is only used
/// for the error message. Entries with equal precedence keep their lexical
/// order.
pub fn sort_versions(versions: BTreeSet<String>, path: &Path) -> Result<Vec<String>> {
    let mut parsed = Vec::with_capacity(versions.len());
    for raw in versions {
        let version = parse_version(&raw).map_err(|source| RegistryError::InvalidVersion {
            path: path.to_path_buf(),
            version: raw.clone(),
            source,
        })?;
        parsed.push((version, raw));
    }
    parsed.sort_by(|(a, _), (b, _)| compare_precedence(a, b));
    Ok(parsed.into_iter().map(|(_, raw)| raw).collect())
}

#[derive(Deserialize)]
struct VersionField {
    version: String,
}

/// List every version recorded in a package directory, ascending.
///
/// Reads the `version` field of each `*.json` record (the `latest` alias
/// collapses into the concrete version it duplicates).
pub fn list_versions(dir: &Path) -> Result<Vec<String>> {
    let mut versions = BTreeSet::new();
    for child in list_dir(dir)? {
        if child.is_dir || !child.name.ends_with(".json") {
            continue;
        }
        let data =
            std::fs::read_to_string(&child.path).map_err(|e| RegistryError::io(&child.path, e))?;
        let record: VersionField =
            serde_json::from_str(&data).map_err(|source| RegistryError::Json {
                path: child.path.clone(),
                source,
            })?;
        versions.insert(record.version);
    }
    sort_versions(versions, dir)
}
