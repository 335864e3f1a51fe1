//! Read-only inspection commands: `versions`, `slug`, `sdk`.

use std::path::Path;

use anyhow::{Context, Result};
use relreg_engine::Registry;

/// Run `relreg versions <canonical>`.
pub fn versions(root: &Path, canonical: &str) -> Result<()> {
    let registry = Registry::new(root);
    let view = registry
        .package_versions(canonical)
        .with_context(|| format!("listing versions of {canonical}"))?
        .with_context(|| format!("package {canonical} has no latest record"))?;

    for version in &view.versions {
        if *version == view.latest.version {
            println!("{version} (latest)");
        } else {
            println!("{version}");
        }
    }
    Ok(())
}

/// Run `relreg slug <slug>`.
pub fn slug(root: &Path, slug: &str) -> Result<()> {
    let registry = Registry::new(root);
    let resolved = registry
        .resolve_slug(slug)
        .context("reading marketing slugs")?
        .with_context(|| format!("unknown slug: {slug}"))?;
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}

/// Run `relreg sdk <id>`.
pub fn sdk(root: &Path, id: &str) -> Result<()> {
    let registry = Registry::new(root);
    let record = registry
        .try_sdk_record(id)
        .with_context(|| format!("reading sdk {id}"))?;
    let materialized = registry.materialize_sdk(&record);
    if materialized.main_package.is_none() {
        tracing::warn!(sdk = id, "main package does not resolve");
    }
    println!("{}", serde_json::to_string_pretty(&materialized)?);
    Ok(())
}
