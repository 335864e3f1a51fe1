//! Registry error types.

use std::path::PathBuf;

/// Errors that can occur while resolving against the registry tree.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A path segment was empty or tried to escape the registry root.
    #[error("invalid path segment: {segment:?}")]
    InvalidPath { segment: String },

    /// A canonical id without the collection separator.
    #[error("invalid canonical id: {raw:?}")]
    InvalidCanonical { raw: String },

    /// A file or directory that does not exist in the tree.
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// A version string that is not valid semver.
    #[error("invalid version {version:?} in {}: {source}", path.display())]
    InvalidVersion {
        path: PathBuf,
        version: String,
        #[source]
        source: semver::Error,
    },

    /// A strict listing hit a member that does not resolve.
    #[error("integrity check failed for {kind} '{key}': {detail}")]
    Integrity {
        kind: &'static str,
        key: String,
        detail: String,
    },

    /// Malformed JSON content.
    #[error("JSON error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// I/O error.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RegistryError {
    /// Whether this error means "no such record" rather than broken data.
    ///
    /// Lookups against typos and unknown ids land here; these are expected
    /// traffic and are reported at a lower level than corrupt content.
    pub fn is_not_found(&self) -> bool {
        match self {
            RegistryError::InvalidPath { .. }
            | RegistryError::InvalidCanonical { .. }
            | RegistryError::NotFound { .. } => true,
            RegistryError::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            RegistryError::NotFound { path }
        } else {
            RegistryError::Io { path, source }
        }
    }
}

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
