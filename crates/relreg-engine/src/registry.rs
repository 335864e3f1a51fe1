//! Entity resolvers over a registry tree on the local filesystem.
//!
//! The [`Registry`] owns nothing but its root and an error sink. Every call
//! does its own reads, so calls can run concurrently without coordination.
//! The tree is expected to stay put while a process serves from it.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::canonical::{iter_canonical_ids, CanonicalId};
use crate::error::{RegistryError, Result};
use crate::observe::{ErrorSink, TracingErrorSink};
use crate::paths::{list_dir, PathResolver, APPS_DIR, LAMBDA_LAYERS_DIR, PACKAGES_DIR, SDKS_DIR};
use crate::records::{AppRecord, PackageRecord, SdkRecord, VersionsView};
use crate::version::{list_versions, LATEST};

/// Read and decode one JSON document.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = std::fs::read_to_string(path).map_err(|e| RegistryError::io(path, e))?;
    serde_json::from_str(&data).map_err(|source| RegistryError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves packages, SDKs, apps and Lambda layers from a registry tree.
#[derive(Clone)]
pub struct Registry {
    paths: PathResolver,
    errors: Arc<dyn ErrorSink>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("root", &self.paths.base())
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// Create a registry rooted at the given directory.
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Registry {
            paths: PathResolver::new(root),
            errors: Arc::new(TracingErrorSink),
        }
    }

    /// Replace the sink that receives swallowed lookup failures.
    pub fn with_error_sink(mut self, errors: Arc<dyn ErrorSink>) -> Self {
        self.errors = errors;
        self
    }

    /// Get the root directory.
    pub fn root(&self) -> &Path {
        self.paths.base()
    }

    pub fn paths(&self) -> &PathResolver {
        &self.paths
    }

    /// Collapse a failed lookup to `None`, reporting it once.
    pub(crate) fn report<T>(&self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.errors.capture(&e);
                None
            }
        }
    }

    // Packages

    /// Look up one package version, keeping the failure reason.
    pub fn try_get_package(&self, canonical: &str, version: &str) -> Result<PackageRecord> {
        let id = CanonicalId::parse_strict(canonical)?;
        let path = id.record_path(&self.paths, version)?;
        read_json(&path)
    }

    /// Look up one package version.
    ///
    /// Every failure (malformed id, unsafe segment, missing or broken record)
    /// comes back as `None` and is handed to the error sink.
    pub fn get_package(&self, canonical: &str, version: &str) -> Option<PackageRecord> {
        self.report(self.try_get_package(canonical, version))
    }

    /// All versions of a package, ascending by semver precedence.
    pub fn list_versions(&self, id: &CanonicalId) -> Result<Vec<String>> {
        list_versions(&id.dir(&self.paths)?)
    }

    /// `{latest, versions}` for a package, or `None` if it has no `latest`.
    pub fn package_versions(&self, canonical: &str) -> Result<Option<VersionsView>> {
        let Some(latest) = self.get_package(canonical, LATEST) else {
            return Ok(None);
        };
        let id = CanonicalId::parse_strict(canonical)?;
        let versions = self.list_versions(&id)?;
        Ok(Some(VersionsView { latest, versions }))
    }

    /// Every canonical id in the tree.
    pub fn canonical_ids(&self) -> Result<Vec<String>> {
        iter_canonical_ids(&self.paths.resolve(&[PACKAGES_DIR])?)
    }

    /// The `latest` record of every package, keyed by its canonical id.
    ///
    /// With `strict` the first package that does not resolve fails the whole
    /// listing with [`RegistryError::Integrity`]; otherwise it is skipped.
    pub fn list_packages(&self, strict: bool) -> Result<BTreeMap<String, PackageRecord>> {
        let mut packages = BTreeMap::new();
        for id in self.canonical_ids()? {
            match self.try_get_package(&id, LATEST) {
                Ok(record) => {
                    packages.insert(record.canonical.clone(), record);
                }
                Err(e) if strict => {
                    return Err(RegistryError::Integrity {
                        kind: "package",
                        key: id,
                        detail: e.to_string(),
                    });
                }
                Err(e) => self.errors.capture(&e),
            }
        }
        Ok(packages)
    }

    // SDKs

    /// Read the pointer file of an SDK.
    pub fn try_sdk_record(&self, sdk_id: &str) -> Result<SdkRecord> {
        let path = self.paths.record(&[SDKS_DIR, sdk_id], LATEST)?;
        let mut record: SdkRecord = read_json(&path)?;
        record.key = sdk_id.to_string();
        Ok(record)
    }

    pub fn get_sdk_record(&self, sdk_id: &str) -> Option<SdkRecord> {
        self.report(self.try_sdk_record(sdk_id))
    }

    /// Resolve an SDK to a package record at `version`.
    ///
    /// The SDK's *current* `latest` pointer picks the package; only the
    /// package version follows the request. Asking for an old SDK version
    /// therefore still goes through today's SDK-to-package binding.
    pub fn get_sdk(&self, sdk_id: &str, version: &str) -> Option<PackageRecord> {
        let result = self
            .try_sdk_record(sdk_id)
            .and_then(|sdk| self.try_get_package(&sdk.canonical, version));
        self.report(result)
    }

    /// `{latest, versions}` of the package an SDK points to.
    pub fn sdk_versions(&self, sdk_id: &str) -> Result<Option<VersionsView>> {
        let Some(latest) = self.get_sdk(sdk_id, LATEST) else {
            return Ok(None);
        };
        let id = CanonicalId::parse_strict(&latest.canonical)?;
        let versions = self.list_versions(&id)?;
        Ok(Some(VersionsView { latest, versions }))
    }

    /// The current package of every SDK, keyed by SDK key.
    ///
    /// Same strict/non-strict contract as [`Registry::list_packages`].
    pub fn list_sdks(&self, strict: bool) -> Result<BTreeMap<String, PackageRecord>> {
        let mut sdks = BTreeMap::new();
        for entry in list_dir(&self.paths.resolve(&[SDKS_DIR])?)? {
            if !entry.is_dir {
                continue;
            }
            let resolved = self.try_sdk_record(&entry.name).and_then(|sdk| {
                self.try_get_package(&sdk.canonical, LATEST)
                    .map_err(|e| RegistryError::Integrity {
                        kind: "sdk",
                        key: entry.name.clone(),
                        detail: format!("canonical cannot be resolved: {}: {e}", sdk.canonical),
                    })
            });
            match resolved {
                Ok(record) => {
                    sdks.insert(entry.name, record);
                }
                Err(e @ RegistryError::Integrity { .. }) if strict => return Err(e),
                Err(e) if strict => {
                    return Err(RegistryError::Integrity {
                        kind: "sdk",
                        key: entry.name,
                        detail: e.to_string(),
                    });
                }
                Err(e) => self.errors.capture(&e),
            }
        }
        Ok(sdks)
    }

    // Apps

    pub fn try_get_app(&self, app_id: &str, version: &str) -> Result<AppRecord> {
        read_json(&self.paths.record(&[APPS_DIR, app_id], version)?)
    }

    /// Look up one app version; failures collapse to `None`.
    pub fn get_app(&self, app_id: &str, version: &str) -> Option<AppRecord> {
        self.report(self.try_get_app(app_id, version))
    }

    /// The `latest` record of every app, keyed by app id.
    pub fn list_apps(&self) -> Result<BTreeMap<String, AppRecord>> {
        let mut apps = BTreeMap::new();
        for entry in list_dir(&self.paths.resolve(&[APPS_DIR])?)? {
            if !entry.is_dir {
                continue;
            }
            if let Some(app) = self.get_app(&entry.name, LATEST) {
                apps.insert(entry.name, app);
            }
        }
        Ok(apps)
    }

    // AWS Lambda layers

    /// The `latest` layer of every runtime, keyed by the layer's canonical id.
    pub fn list_aws_lambda_layers(&self) -> Result<BTreeMap<String, Value>> {
        let mut layers = BTreeMap::new();
        for entry in list_dir(&self.paths.resolve(&[LAMBDA_LAYERS_DIR])?)? {
            if !entry.is_dir {
                continue;
            }
            let path = entry.path.join(format!("{LATEST}.json"));
            let Some(layer) = self.report(read_json::<Value>(&path)) else {
                continue;
            };
            let Some(canonical) = layer
                .get("canonical")
                .and_then(Value::as_str)
                .map(str::to_string)
            else {
                tracing::warn!(
                    runtime = %entry.name,
                    "lambda layer record has no canonical id"
                );
                continue;
            };
            layers.insert(canonical, layer);
        }
        Ok(layers)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::observe::RecordingErrorSink;
    use serde_json::json;

    fn registry(dir: &tempfile::TempDir) -> (Registry, Arc<RecordingErrorSink>) {
        let sink = Arc::new(RecordingErrorSink::new());
        let registry = Registry::new(dir.path()).with_error_sink(sink.clone());
        (registry, sink)
    }

    #[test]
    fn get_package_latest_and_version() {
        let dir = registry_tree();
        let (registry, _) = registry(&dir);

        let latest = registry.get_package("pypi:sentry-sdk", LATEST).unwrap();
        assert_eq!(latest.version, "1.2.0");
        let old = registry.get_package("pypi:sentry-sdk", "1.0.0").unwrap();
        assert_eq!(old.version, "1.0.0");
        let scoped = registry.get_package("npm:@sentry/browser", LATEST).unwrap();
        assert_eq!(scoped.canonical, "npm:@sentry/browser");
    }

    #[test]
    fn get_package_without_separator_is_none_and_reported() {
        let dir = registry_tree();
        let (registry, sink) = registry(&dir);

        assert!(registry.get_package("sentry-sdk", LATEST).is_none());
        assert_eq!(sink.captured().len(), 1);
    }

    #[test]
    fn get_package_traversal_is_none() {
        let dir = registry_tree();
        let (registry, sink) = registry(&dir);

        assert!(registry.get_package("pypi:../../sdks/sentry.python", LATEST).is_none());
        assert!(registry.get_package("pypi:sentry-sdk", "../latest").is_none());
        assert!(sink.captured().iter().all(|m| m.contains("invalid path")));
    }

    #[test]
    fn get_package_malformed_record_is_none() {
        let dir = registry_tree();
        std::fs::write(dir.path().join("packages/pypi/sentry-sdk/9.9.9.json"), "{not json").unwrap();
        let (registry, sink) = registry(&dir);

        assert!(registry.get_package("pypi:sentry-sdk", "9.9.9").is_none());
        assert!(sink.captured()[0].contains("JSON error"));
    }

    #[test]
    fn get_package_is_idempotent() {
        let dir = registry_tree();
        let (registry, _) = registry(&dir);

        let first = registry.get_package("pypi:sentry-sdk", LATEST);
        let second = registry.get_package("pypi:sentry-sdk", LATEST);
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn package_versions_ordered() {
        let dir = registry_tree();
        let (registry, _) = registry(&dir);

        let view = registry.package_versions("pypi:sentry-sdk").unwrap().unwrap();
        assert_eq!(view.latest.version, "1.2.0");
        assert_eq!(view.versions, ["1.0.0-alpha", "1.0.0", "1.2.0"]);
        assert!(registry.package_versions("pypi:nope").unwrap().is_none());
    }

    #[test]
    fn package_versions_fail_loud_on_bad_version() {
        let dir = registry_tree();
        write(
            dir.path(),
            "packages/pypi/sentry-sdk/weird.json",
            &serde_json::json!({"canonical": "pypi:sentry-sdk", "version": "weird"}),
        );
        let (registry, _) = registry(&dir);

        assert!(matches!(
            registry.package_versions("pypi:sentry-sdk"),
            Err(RegistryError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn list_packages_flattens_namespaces() {
        let dir = registry_tree();
        let (registry, _) = registry(&dir);

        let packages = registry.list_packages(false).unwrap();
        let keys: Vec<_> = packages.keys().cloned().collect();
        assert_eq!(
            keys,
            ["npm:@sentry/browser", "npm:@sentry/node", "pypi:sentry-sdk"]
        );
    }

    #[test]
    fn strict_package_listing_fails_non_strict_omits() {
        let dir = registry_tree();
        add_broken_package(dir.path());
        let (registry, sink) = registry(&dir);

        let packages = registry.list_packages(false).unwrap();
        assert!(!packages.contains_key("pypi:half-published"));
        assert_eq!(packages.len(), 3);
        assert_eq!(sink.captured().len(), 1);

        match registry.list_packages(true) {
            Err(RegistryError::Integrity { kind, key, .. }) => {
                assert_eq!(kind, "package");
                assert_eq!(key, "pypi:half-published");
            }
            other => panic!("expected integrity error, got {other:?}"),
        }
    }

    #[test]
    fn get_sdk_follows_current_pointer() {
        let dir = registry_tree();
        let (registry, _) = registry(&dir);

        let latest = registry.get_sdk("sentry.python", LATEST).unwrap();
        assert_eq!(latest.canonical, "pypi:sentry-sdk");
        assert_eq!(latest.version, "1.2.0");

        let old = registry.get_sdk("sentry.python", "1.0.0").unwrap();
        assert_eq!(old.canonical, "pypi:sentry-sdk");
        assert_eq!(old.version, "1.0.0");

        assert!(registry.get_sdk("sentry.nope", LATEST).is_none());
        assert!(registry.get_sdk("..", LATEST).is_none());
    }

    #[test]
    fn sdk_versions_uses_package_versions() {
        let dir = registry_tree();
        let (registry, _) = registry(&dir);

        let view = registry.sdk_versions("sentry.javascript.browser").unwrap().unwrap();
        assert_eq!(view.versions, ["7.0.0", "7.1.0"]);
        assert!(registry.sdk_versions("sentry.nope").unwrap().is_none());
    }

    #[test]
    fn strict_sdk_listing_fails_non_strict_omits() {
        let dir = registry_tree();
        add_broken_sdk(dir.path());
        std::fs::write(dir.path().join("sdks/README"), "not an sdk").unwrap();
        let (registry, _) = registry(&dir);

        let sdks = registry.list_sdks(false).unwrap();
        assert_eq!(sdks.len(), 2);
        assert_eq!(sdks["sentry.python"].canonical, "pypi:sentry-sdk");

        match registry.list_sdks(true) {
            Err(RegistryError::Integrity { kind, key, detail }) => {
                assert_eq!(kind, "sdk");
                assert_eq!(key, "sentry.broken");
                assert!(detail.contains("pypi:missing"));
            }
            other => panic!("expected integrity error, got {other:?}"),
        }
    }

    #[test]
    fn apps_and_layers() {
        let dir = registry_tree();
        let (registry, _) = registry(&dir);

        let apps = registry.list_apps().unwrap();
        assert!(apps.contains_key("sentry-cli"));
        assert!(registry.get_app("sentry-cli", "9.9.9").is_none());

        let layers = registry.list_aws_lambda_layers().unwrap();
        assert_eq!(layers["aws-layer:python"]["sdk_version"], "1.2.0");
    }

    #[test]
    fn layer_without_canonical_is_skipped() {
        let dir = registry_tree();
        write(
            dir.path(),
            "aws-lambda-layers/node/latest.json",
            &json!({"sdk_version": "7.1.0"}),
        );
        let (registry, _) = registry(&dir);

        let layers = registry.list_aws_lambda_layers().unwrap();
        assert_eq!(layers.len(), 1);
        assert_eq!(
            layers["aws-layer:python"],
            json!({"canonical": "aws-layer:python", "sdk_version": "1.2.0"})
        );
    }
}
