//! `relreg serve`.

use anyhow::{Context, Result};
use relreg_http::ServerConfig;

/// Run the HTTP server until interrupted.
pub fn run(config: ServerConfig) -> Result<()> {
    if !config.root.is_dir() {
        anyhow::bail!("registry root {} is not a directory", config.root.display());
    }
    let port = config.port;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    runtime
        .block_on(relreg_http::serve(config))
        .with_context(|| format!("serving on port {port}"))
}
