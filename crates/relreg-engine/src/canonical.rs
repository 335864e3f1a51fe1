//! Canonical package identifiers and their enumeration.
//!
//! A canonical id looks like `collection:item[/child]`, e.g. `pypi:sentry-sdk`,
//! `npm:@sentry/browser` or `maven:io.sentry:sentry`. Everything after the
//! first `:` is a path below the collection directory; further `:` separators
//! are read as `/`.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{RegistryError, Result};
use crate::paths::{list_dir, PathResolver, PACKAGES_DIR};

/// Separates the collection from the rest of a canonical id.
pub const COLLECTION_SEPARATOR: char = ':';

/// Sentinel file marking a directory as a namespace of sub-packages.
pub const NAMESPACE_MARKER: &str = "__NAMESPACE__";

/// Prefix of scoped package directories (`@scope/name`).
pub const SCOPE_SIGIL: char = '@';

/// A parsed canonical package id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalId {
    pub collection: String,
    pub item: String,
    pub sub_item: Option<String>,
}

impl CanonicalId {
    /// Parse a raw canonical string.
    ///
    /// Returns `None` when the collection separator is missing. Safety of the
    /// segments is checked later, when the id is turned into a path.
    pub fn parse(raw: &str) -> Option<CanonicalId> {
        let (collection, rest) = raw.split_once(COLLECTION_SEPARATOR)?;
        let rest = rest.replace(COLLECTION_SEPARATOR, "/");
        let (item, sub_item) = match rest.split_once('/') {
            Some((item, sub)) => (item.to_string(), Some(sub.to_string())),
            None => (rest, None),
        };
        Some(CanonicalId {
            collection: collection.to_string(),
            item,
            sub_item,
        })
    }

    /// Parse, turning a missing separator into an error.
    pub fn parse_strict(raw: &str) -> Result<CanonicalId> {
        CanonicalId::parse(raw).ok_or_else(|| RegistryError::InvalidCanonical {
            raw: raw.to_string(),
        })
    }

    /// The item path below the collection (`item` or `item/child`).
    pub fn item_path(&self) -> String {
        match &self.sub_item {
            Some(sub) => format!("{}/{sub}", self.item),
            None => self.item.clone(),
        }
    }

    /// Directory holding this package's version records.
    pub fn dir(&self, resolver: &PathResolver) -> Result<PathBuf> {
        resolver.resolve(&[PACKAGES_DIR, &self.collection, &self.item_path()])
    }

    /// Path of one version record.
    pub fn record_path(&self, resolver: &PathResolver, version: &str) -> Result<PathBuf> {
        resolver.record(&[PACKAGES_DIR, &self.collection, &self.item_path()], version)
    }
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{COLLECTION_SEPARATOR}{}", self.collection, self.item_path())
    }
}

/// Whether `dir` groups sub-packages rather than holding versions itself.
///
/// The `__NAMESPACE__` sentinel is authoritative. A directory named with the
/// scope sigil counts as a namespace too when it holds no version records of
/// its own but does hold subdirectories.
pub fn is_namespace(dir: &Path) -> bool {
    if dir.join(NAMESPACE_MARKER).is_file() {
        return true;
    }
    let scoped = dir
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(SCOPE_SIGIL));
    if !scoped {
        return false;
    }
    let Ok(children) = list_dir(dir) else {
        return false;
    };
    let has_records = children
        .iter()
        .any(|c| !c.is_dir && c.name.ends_with(".json"));
    let has_children = children.iter().any(|c| c.is_dir);
    !has_records && has_children
}

/// Enumerate every canonical id under `packages_dir`.
///
/// Ordered by collection, item, then child. Namespaces are flattened into
/// `collection:item/child`; the namespace itself and its sentinel are never
/// emitted.
pub fn iter_canonical_ids(packages_dir: &Path) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    for collection in list_dir(packages_dir)? {
        if !collection.is_dir {
            continue;
        }
        for item in list_dir(&collection.path)? {
            if !item.is_dir {
                continue;
            }
            if is_namespace(&item.path) {
                for child in list_dir(&item.path)? {
                    if !child.is_dir || child.name == NAMESPACE_MARKER {
                        continue;
                    }
                    ids.push(format!(
                        "{}{COLLECTION_SEPARATOR}{}/{}",
                        collection.name, item.name, child.name
                    ));
                }
            } else {
                ids.push(format!(
                    "{}{COLLECTION_SEPARATOR}{}",
                    collection.name, item.name
                ));
            }
        }
    }
    Ok(ids)
}
