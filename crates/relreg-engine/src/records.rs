//! Records read from the registry tree.
//!
//! Records keep every field they were stored with; only the fields the
//! resolvers need are typed.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One version of one package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub canonical: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk_id: Option<String>,
    /// Remaining metadata (name, urls, files, features, ...).
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// Response body of the `versions` endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionsView {
    pub latest: PackageRecord,
    pub versions: Vec<String>,
}

/// A downloadable file of an app release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppFile {
    pub url: String,
    /// Keyed by `<algorithm>-hex` or `<algorithm>-base64`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksums: Option<IndexMap<String, String>>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// One version of one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppRecord {
    #[serde(default)]
    pub file_urls: IndexMap<String, String>,
    #[serde(default)]
    pub files: IndexMap<String, AppFile>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// Pointer file of an SDK, `sdks/<key>/latest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdkRecord {
    /// Directory name; not part of the stored document.
    #[serde(skip)]
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Canonical id of the package the SDK currently points to.
    pub canonical: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_package: Option<String>,
    /// Canonical id to requested version.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub packages: BTreeMap<String, String>,
}

/// An SDK with every package reference resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterializedSdk {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub packages: BTreeMap<String, PackageRecord>,
    pub main_package: Option<PackageRecord>,
}

/// What a marketing slug points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugKind {
    Sdk,
    Package,
    Integration,
    Unknown,
}

impl SlugKind {
    /// Classify the stored `type` string.
    pub fn from_type(raw: &str) -> SlugKind {
        match raw {
            "sdk" => SlugKind::Sdk,
            "package" => SlugKind::Package,
            "integration" => SlugKind::Integration,
            _ => SlugKind::Unknown,
        }
    }
}

/// One entry of `misc/marketing-slugs.json`.
///
/// The stored `type` string is kept verbatim so the definition is echoed
/// back unchanged; [`SlugDefinition::kind`] classifies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlugDefinition {
    #[serde(rename = "type")]
    pub slug_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SlugDefinition {
    pub fn kind(&self) -> SlugKind {
        SlugKind::from_type(&self.slug_type)
    }
}

/// Resolved target of a slug.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SlugTarget {
    Package(PackageRecord),
    Integration {
        package: Option<PackageRecord>,
        integration: Option<String>,
    },
}

/// Response body of `GET /marketing-slugs/{slug}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSlug {
    pub definition: SlugDefinition,
    pub target: Option<SlugTarget>,
}
