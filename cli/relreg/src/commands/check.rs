//! `relreg check`: strict integrity pass over a registry tree.
//!
//! Every package must have a `latest` record and every SDK must point at a
//! package that resolves. The first failure aborts the check.

use std::path::Path;

use anyhow::{Context, Result};
use relreg_engine::Registry;

/// One resolved SDK.
#[derive(Debug, Clone, PartialEq)]
pub struct SdkEntry {
    pub key: String,
    pub canonical: String,
    pub version: String,
}

/// Outcome of a successful check.
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub packages: usize,
    pub sdks: Vec<SdkEntry>,
}

/// Run both strict listings.
pub fn check(registry: &Registry) -> Result<CheckReport> {
    let packages = registry
        .list_packages(true)
        .context("checking packages")?;
    let sdks = registry.list_sdks(true).context("checking sdks")?;

    Ok(CheckReport {
        packages: packages.len(),
        sdks: sdks
            .into_iter()
            .map(|(key, record)| SdkEntry {
                key,
                canonical: record.canonical,
                version: record.version,
            })
            .collect(),
    })
}

/// Format a report as human-readable text.
pub fn format_report(report: &CheckReport) -> String {
    let mut out = String::new();

    for sdk in &report.sdks {
        out.push_str(&format!(
            "  {} -> {} v{}\n",
            sdk.key, sdk.canonical, sdk.version
        ));
    }

    out.push('\n');
    out.push_str(&format!(
        "Summary: {} packages, {} sdks\n",
        report.packages,
        report.sdks.len()
    ));
    out.push_str("Check: PASSED\n");
    out
}

/// Run `relreg check`.
pub fn run(root: &Path) -> Result<()> {
    let registry = Registry::new(root);
    let report = check(&registry)?;
    print!("{}", format_report(&report));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "packages/pypi/sentry-sdk/latest.json",
            r#"{"canonical": "pypi:sentry-sdk", "version": "1.2.0"}"#,
        );
        write(
            dir.path(),
            "sdks/sentry.python/latest.json",
            r#"{"canonical": "pypi:sentry-sdk"}"#,
        );
        dir
    }

    #[test]
    fn healthy_tree_passes() {
        let dir = tree();
        let report = check(&Registry::new(dir.path())).unwrap();
        assert_eq!(report.packages, 1);
        assert_eq!(
            report.sdks,
            [SdkEntry {
                key: "sentry.python".into(),
                canonical: "pypi:sentry-sdk".into(),
                version: "1.2.0".into(),
            }]
        );

        let output = format_report(&report);
        assert!(output.contains("sentry.python -> pypi:sentry-sdk v1.2.0"));
        assert!(output.contains("Summary: 1 packages, 1 sdks"));
        assert!(output.contains("PASSED"));
    }

    #[test]
    fn dangling_sdk_fails() {
        let dir = tree();
        write(
            dir.path(),
            "sdks/sentry.ghost/latest.json",
            r#"{"canonical": "pypi:ghost"}"#,
        );
        let err = check(&Registry::new(dir.path())).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("checking sdks"));
        assert!(message.contains("sentry.ghost"));
    }

    #[test]
    fn package_without_latest_fails() {
        let dir = tree();
        write(
            dir.path(),
            "packages/pypi/half/1.0.0.json",
            r#"{"canonical": "pypi:half", "version": "1.0.0"}"#,
        );
        let err = check(&Registry::new(dir.path())).unwrap_err();
        assert!(format!("{err:#}").contains("pypi:half"));
    }
}
