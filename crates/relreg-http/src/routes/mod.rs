//! Route handlers, one module per resource.

pub mod apps;
pub mod marketing;
pub mod meta;
pub mod packages;
pub mod sdks;

use relreg_engine::{PackageRecord, Registry, VersionsView};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::state::AppState;

/// Run an engine call on the blocking pool.
pub(crate) async fn blocking<T, F>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&Registry) -> T + Send + 'static,
    T: Send + 'static,
{
    let registry = state.registry.clone();
    Ok(tokio::task::spawn_blocking(move || f(&registry)).await?)
}

/// Last path segment selecting a version listing instead of one version.
pub(crate) const VERSIONS: &str = "versions";

/// Either one record or a version listing.
#[derive(Serialize)]
#[serde(untagged)]
pub(crate) enum RecordBody {
    Record(PackageRecord),
    Versions(VersionsView),
}

/// `?strict=` on listing routes.
#[derive(Debug, Default, Deserialize)]
pub struct StrictQuery {
    pub strict: Option<String>,
}

impl StrictQuery {
    pub fn is_strict(&self) -> bool {
        self.strict.as_deref().is_some_and(|v| {
            let v = v.trim().to_ascii_lowercase();
            matches!(v.as_str(), "1" | "true" | "yes")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_flag_values() {
        let q = |v: Option<&str>| StrictQuery {
            strict: v.map(str::to_string),
        };
        assert!(q(Some("1")).is_strict());
        assert!(q(Some("TRUE")).is_strict());
        assert!(q(Some("yes")).is_strict());
        assert!(!q(Some("0")).is_strict());
        assert!(!q(Some("")).is_strict());
        assert!(!q(None).is_strict());
    }
}
