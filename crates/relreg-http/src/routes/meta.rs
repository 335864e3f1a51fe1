//! Health check and eagerly materialized routes.

use axum::extract::State;
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::cache::FROM_CACHE_HEADER;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/aws-lambda-layers", get(aws_lambda_layers))
}

async fn healthz() -> &'static str {
    "ok\n"
}

/// Served from the startup snapshot; always reported as a cache hit.
async fn aws_lambda_layers(State(state): State<AppState>) -> Response {
    (
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            ),
            (FROM_CACHE_HEADER, HeaderValue::from_static("1")),
        ],
        state.lambda_layers(),
    )
        .into_response()
}
