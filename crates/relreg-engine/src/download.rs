//! Matching app release files to a package/platform/arch triple and
//! rendering their checksums as a `Digest` header value.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use indexmap::IndexMap;

use crate::records::AppRecord;

const EXE_SUFFIX: &str = ".exe";

/// Find the release URL built for `package` on `platform`/`arch`.
///
/// File names follow `<package>-<platform>-<arch>[.exe]`. Matching is
/// case-insensitive and treats `_` and `-` alike in package and arch.
/// The first URL in table order wins.
pub fn find_download_url(
    app: &AppRecord,
    package: &str,
    arch: &str,
    platform: &str,
) -> Option<String> {
    let package = package.replace('_', "-").to_lowercase();
    let arch = arch.to_lowercase().replace('_', "-");
    let platform = platform.to_lowercase();

    app.file_urls
        .values()
        .find(|url| {
            let lower = url.to_lowercase();
            let lower = lower.strip_suffix(EXE_SUFFIX).unwrap_or(&lower);
            let file = lower.rsplit('/').next().unwrap_or(lower);
            let parts: Vec<&str> = file.split('-').collect();
            let n = parts.len();
            n > 2
                && parts[..n - 2].join("-") == package
                && parts[n - 2] == platform
                && parts[n - 1].replace('_', "-") == arch
        })
        .cloned()
}

/// Checksums stored for the file at `url`, if any.
pub fn url_checksums<'a>(app: &'a AppRecord, url: &str) -> Option<&'a IndexMap<String, String>> {
    app.files
        .values()
        .find(|file| file.url == url)
        .and_then(|file| file.checksums.as_ref())
}

/// Render checksums as `algo=<base64>` pairs joined by `,`.
///
/// Keys ending in `-hex` are re-encoded to base64, keys ending in `-base64`
/// are copied. Other keys, and hex values that do not decode, are skipped.
pub fn make_digest(checksums: Option<&IndexMap<String, String>>) -> String {
    let Some(checksums) = checksums else {
        return String::new();
    };
    let mut parts = Vec::with_capacity(checksums.len());
    for (key, value) in checksums {
        if let Some(algo) = key.strip_suffix("-hex") {
            match hex::decode(value) {
                Ok(bytes) => parts.push(format!("{algo}={}", STANDARD.encode(bytes))),
                Err(e) => tracing::debug!(algo, error = %e, "skipping undecodable hex checksum"),
            }
        } else if let Some(algo) = key.strip_suffix("-base64") {
            parts.push(format!("{algo}={value}"));
        }
    }
    parts.join(",")
}
