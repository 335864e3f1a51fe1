//! `/packages` routes.
//!
//! Canonical ids may contain `/` (`npm:@sentry/browser`), so single-package
//! routes take the whole tail and split off the last segment as the version
//! or the literal `versions`.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use relreg_engine::PackageRecord;

use super::{blocking, RecordBody, StrictQuery, VERSIONS};
use crate::error::{ApiError, ApiResult};
use crate::observability::resolve_span;
use crate::state::AppState;

/// Package routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/packages", get(list_packages))
        .route("/packages/*rest", get(get_package))
}

async fn list_packages(
    State(state): State<AppState>,
    Query(query): Query<StrictQuery>,
) -> ApiResult<Json<BTreeMap<String, PackageRecord>>> {
    let strict = query.is_strict();
    let packages = blocking(&state, move |r| r.list_packages(strict)).await??;
    Ok(Json(packages))
}

async fn get_package(
    State(state): State<AppState>,
    Path(rest): Path<String>,
) -> ApiResult<Json<RecordBody>> {
    let Some((canonical, tail)) = rest.rsplit_once('/') else {
        return Err(ApiError::NotFound);
    };
    let (canonical, tail) = (canonical.to_string(), tail.to_string());
    let span = resolve_span("package", &canonical);

    let body = blocking(&state, move |r| {
        let _guard = span.enter();
        if tail == VERSIONS {
            r.package_versions(&canonical)
                .map(|view| view.map(RecordBody::Versions))
        } else {
            Ok(r.get_package(&canonical, &tail).map(RecordBody::Record))
        }
    })
    .await??;
    body.map(Json).ok_or(ApiError::NotFound)
}
