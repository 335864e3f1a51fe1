//! Marketing slugs: short public names mapped to SDKs, packages or
//! integrations via `misc/marketing-slugs.json`.

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{RegistryError, Result};
use crate::paths::MISC_DIR;
use crate::records::{ResolvedSlug, SlugDefinition, SlugKind, SlugTarget};
use crate::registry::{read_json, Registry};
use crate::version::LATEST;

/// File name of the slug table inside `misc/`.
pub const MARKETING_SLUGS_FILE: &str = "marketing-slugs.json";

impl Registry {
    /// The raw slug table. Entries stay unparsed until one is resolved.
    fn slug_table(&self) -> Result<IndexMap<String, Value>> {
        read_json(&self.paths().resolve(&[MISC_DIR, MARKETING_SLUGS_FILE])?)
    }

    /// All slug names, sorted.
    pub fn marketing_slugs(&self) -> Result<Vec<String>> {
        let mut slugs: Vec<String> = self.slug_table()?.into_keys().collect();
        slugs.sort();
        Ok(slugs)
    }

    /// Resolve one slug to its definition and target.
    ///
    /// Returns `Ok(None)` for an unknown slug. A target that does not
    /// resolve is reported as a `null` target, not an error.
    pub fn resolve_slug(&self, slug: &str) -> Result<Option<ResolvedSlug>> {
        let Some(raw) = self.slug_table()?.shift_remove(slug) else {
            return Ok(None);
        };
        let definition: SlugDefinition =
            serde_json::from_value(raw).map_err(|source| RegistryError::Json {
                path: self.root().join(MISC_DIR).join(MARKETING_SLUGS_FILE),
                source,
            })?;
        let target = self.slug_target(&definition);
        Ok(Some(ResolvedSlug { definition, target }))
    }

    fn slug_target(&self, definition: &SlugDefinition) -> Option<SlugTarget> {
        match definition.kind() {
            SlugKind::Sdk => {
                let sdk = definition.target.as_deref()?;
                self.get_sdk(sdk, LATEST).map(SlugTarget::Package)
            }
            SlugKind::Package => {
                let canonical = definition.target.as_deref()?;
                self.get_package(canonical, LATEST).map(SlugTarget::Package)
            }
            SlugKind::Integration => {
                let package = if let Some(sdk) = &definition.sdk {
                    Some(self.get_sdk(sdk, LATEST)?)
                } else if let Some(canonical) = &definition.package {
                    Some(self.get_package(canonical, LATEST)?)
                } else {
                    None
                };
                Some(SlugTarget::Integration {
                    package,
                    integration: definition.integration.clone(),
                })
            }
            SlugKind::Unknown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::registry::fixtures::registry_tree;

    #[test]
    fn lists_slugs_sorted() {
        let dir = registry_tree();
        let registry = Registry::new(dir.path());
        let slugs = registry.marketing_slugs().unwrap();
        assert_eq!(
            slugs,
            ["bare", "browser", "dangling", "django", "express", "gone", "python"]
        );
    }

    #[test]
    fn sdk_slug_resolves_to_package() {
        let dir = registry_tree();
        let registry = Registry::new(dir.path());
        let resolved = registry.resolve_slug("python").unwrap().unwrap();
        assert_eq!(resolved.definition.slug_type, "sdk");
        match resolved.target {
            Some(SlugTarget::Package(record)) => assert_eq!(record.canonical, "pypi:sentry-sdk"),
            other => panic!("unexpected target {other:?}"),
        }
    }

    #[test]
    fn integration_slug_via_sdk_and_package() {
        let dir = registry_tree();
        let registry = Registry::new(dir.path());

        let django = registry.resolve_slug("django").unwrap().unwrap();
        let body = serde_json::to_value(&django).unwrap();
        assert_eq!(body["target"]["package"]["canonical"], "pypi:sentry-sdk");
        assert_eq!(body["target"]["integration"], "django");

        let express = registry.resolve_slug("express").unwrap().unwrap();
        let body = serde_json::to_value(&express).unwrap();
        assert_eq!(body["target"]["package"]["canonical"], "npm:@sentry/node");
    }

    #[test]
    fn integration_without_reference_has_null_package() {
        let dir = registry_tree();
        let registry = Registry::new(dir.path());
        let bare = registry.resolve_slug("bare").unwrap().unwrap();
        assert_eq!(
            serde_json::to_value(&bare.target).unwrap(),
            json!({"package": null, "integration": "bare"})
        );
    }

    #[test]
    fn unresolvable_targets_are_null() {
        let dir = registry_tree();
        let registry = Registry::new(dir.path());
        assert!(registry.resolve_slug("dangling").unwrap().unwrap().target.is_none());
        assert!(registry.resolve_slug("gone").unwrap().unwrap().target.is_none());
    }

    #[test]
    fn unknown_slug_is_none() {
        let dir = registry_tree();
        let registry = Registry::new(dir.path());
        assert!(registry.resolve_slug("nope").unwrap().is_none());
    }

    #[test]
    fn missing_table_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Registry::new(dir.path());
        assert!(registry.marketing_slugs().unwrap_err().is_not_found());
    }
}
