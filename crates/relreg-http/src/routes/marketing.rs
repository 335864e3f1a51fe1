//! `/marketing-slugs` routes.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use relreg_engine::ResolvedSlug;
use serde::Serialize;

use super::blocking;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Marketing slug routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/marketing-slugs", get(list_slugs))
        .route("/marketing-slugs/:slug", get(resolve_slug))
}

#[derive(Debug, Serialize)]
pub struct SlugList {
    pub slugs: Vec<String>,
}

async fn list_slugs(State(state): State<AppState>) -> ApiResult<Json<SlugList>> {
    let slugs = blocking(&state, |r| r.marketing_slugs()).await??;
    Ok(Json(SlugList { slugs }))
}

async fn resolve_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ResolvedSlug>> {
    blocking(&state, move |r| r.resolve_slug(&slug))
        .await??
        .map(Json)
        .ok_or(ApiError::NotFound)
}
