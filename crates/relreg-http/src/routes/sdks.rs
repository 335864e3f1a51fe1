//! `/sdks` routes.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use relreg_engine::PackageRecord;

use super::{blocking, RecordBody, StrictQuery, VERSIONS};
use crate::error::{ApiError, ApiResult};
use crate::observability::resolve_span;
use crate::state::AppState;

/// SDK routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sdks", get(list_sdks))
        .route("/sdks/:sdk_id/:version", get(get_sdk))
}

async fn list_sdks(
    State(state): State<AppState>,
    Query(query): Query<StrictQuery>,
) -> ApiResult<Json<BTreeMap<String, PackageRecord>>> {
    let strict = query.is_strict();
    let sdks = blocking(&state, move |r| r.list_sdks(strict)).await??;
    Ok(Json(sdks))
}

async fn get_sdk(
    State(state): State<AppState>,
    Path((sdk_id, version)): Path<(String, String)>,
) -> ApiResult<Json<RecordBody>> {
    let span = resolve_span("sdk", &sdk_id);
    let body = blocking(&state, move |r| {
        let _guard = span.enter();
        if version == VERSIONS {
            r.sdk_versions(&sdk_id)
                .map(|view| view.map(RecordBody::Versions))
        } else {
            Ok(r.get_sdk(&sdk_id, &version).map(RecordBody::Record))
        }
    })
    .await??;
    body.map(Json).ok_or(ApiError::NotFound)
}
