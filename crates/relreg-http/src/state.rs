//! Shared state for the registry API handlers.

use std::sync::Arc;

use axum::body::Bytes;
use relreg_engine::Registry;

use crate::cache::ResponseCache;
use crate::metrics::record_prewarm_failure;

const EMPTY_MAPPING: &[u8] = b"{}";

/// Shared state for registry API handlers.
#[derive(Clone)]
pub struct AppState {
    /// The resolution engine.
    pub registry: Arc<Registry>,
    /// The response cache for lazily cached routes.
    pub cache: Arc<ResponseCache>,
    /// Body of `/aws-lambda-layers`, materialized once.
    lambda_layers: Bytes,
}

impl AppState {
    /// Creates state with caching disabled.
    ///
    /// Pre-warms the eager routes, which reads the registry tree; call it
    /// before the listener is bound.
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self::with_cache(registry, ResponseCache::disabled())
    }

    /// Creates state with an explicit response cache.
    #[must_use]
    pub fn with_cache(registry: Registry, cache: ResponseCache) -> Self {
        let lambda_layers = prewarm_lambda_layers(&registry);
        Self {
            registry: Arc::new(registry),
            cache: Arc::new(cache),
            lambda_layers,
        }
    }

    pub fn lambda_layers(&self) -> Bytes {
        self.lambda_layers.clone()
    }
}

/// Materialize the Lambda layer mapping, or an empty mapping on failure.
fn prewarm_lambda_layers(registry: &Registry) -> Bytes {
    let layers = registry
        .list_aws_lambda_layers()
        .map_err(|e| e.to_string())
        .and_then(|layers| serde_json::to_vec(&layers).map_err(|e| e.to_string()));
    match layers {
        Ok(body) => {
            tracing::info!(bytes = body.len(), "pre-warmed aws lambda layers");
            Bytes::from(body)
        }
        Err(error) => {
            tracing::warn!(%error, "aws lambda layer pre-warm failed, serving an empty mapping");
            record_prewarm_failure("/aws-lambda-layers");
            Bytes::from_static(EMPTY_MAPPING)
        }
    }
}
