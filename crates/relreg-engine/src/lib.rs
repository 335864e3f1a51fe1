//! Resolution engine for a filesystem-backed release registry.
//!
//! Answers queries about packages, SDKs, apps, AWS Lambda layers and
//! marketing slugs by reading JSON records from a directory tree. Every
//! identifier that reaches the filesystem is validated as a path segment
//! first, and single-record lookups collapse failures to "not found".
//!
//! # Architecture
//!
//! - **Packages** live under `packages/<collection>/<item>[/<child>]`, one
//!   record per version plus a `latest` alias
//! - **SDKs** are pointers from an SDK key to a package canonical id
//! - **Apps** carry per-platform download URLs and checksums
//!
//! Versions are never stored as a list; they are enumerated from the
//! records present and ordered by semver precedence.

pub mod canonical;
pub mod download;
pub mod error;
pub mod marketing;
pub mod observe;
pub mod paths;
pub mod records;
pub mod registry;
pub mod sdk;
pub mod version;

// Re-exports for convenience.
pub use canonical::{iter_canonical_ids, CanonicalId};
pub use download::{find_download_url, make_digest, url_checksums};
pub use error::{RegistryError, Result};
pub use observe::{ErrorSink, TracingErrorSink};
pub use paths::PathResolver;
pub use records::{
    AppFile, AppRecord, MaterializedSdk, PackageRecord, ResolvedSlug, SdkRecord, SlugDefinition,
    SlugKind, SlugTarget, VersionsView,
};
pub use registry::Registry;
pub use version::{compare_precedence, parse_version, sort_versions, Version, LATEST};
