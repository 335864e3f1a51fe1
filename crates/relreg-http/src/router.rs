//! Registry API router setup.

use axum::middleware;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::cache::cache_layer;
use crate::error::ApiError;
use crate::routes;
use crate::state::AppState;

/// Creates the registry API router.
///
/// The cache sits inside the CORS and trace layers so replayed responses
/// get the same headers and spans as fresh ones.
pub fn registry_router(state: AppState) -> Router {
    let cache = state.cache.clone();

    Router::new()
        .merge(routes::packages::routes())
        .merge(routes::sdks::routes())
        .merge(routes::apps::routes())
        .merge(routes::marketing::routes())
        .merge(routes::meta::routes())
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(cache, cache_layer))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}
