//! `/apps` routes, including download redirects.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use relreg_engine::{find_download_url, make_digest, url_checksums, AppRecord};
use serde::Deserialize;

use super::blocking;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// App routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/apps", get(list_apps))
        .route("/apps/:app_id/:version", get(get_app))
}

/// Query of `/apps/{id}/{version}`.
#[derive(Debug, Default, Deserialize)]
pub struct AppQuery {
    /// `download` (or `download_url`) asks for a redirect.
    pub response: Option<String>,
    pub arch: Option<String>,
    pub platform: Option<String>,
    pub package: Option<String>,
}

impl AppQuery {
    fn wants_download(&self) -> bool {
        matches!(self.response.as_deref(), Some("download" | "download_url"))
    }
}

async fn list_apps(State(state): State<AppState>) -> ApiResult<Json<BTreeMap<String, AppRecord>>> {
    let apps = blocking(&state, |r| r.list_apps()).await??;
    Ok(Json(apps))
}

async fn get_app(
    State(state): State<AppState>,
    Path((app_id, version)): Path<(String, String)>,
    Query(query): Query<AppQuery>,
) -> ApiResult<Response> {
    let app = blocking(&state, move |r| r.get_app(&app_id, &version))
        .await?
        .ok_or(ApiError::NotFound)?;

    if !query.wants_download() {
        return Ok(Json(app).into_response());
    }
    download_redirect(&app, &query)
}

/// 302 to the release file matching the query, with a `Digest` header.
fn download_redirect(app: &AppRecord, query: &AppQuery) -> ApiResult<Response> {
    let arch = query.arch.as_deref().ok_or(ApiError::MissingParam("arch"))?;
    let platform = query
        .platform
        .as_deref()
        .ok_or(ApiError::MissingParam("platform"))?;
    let package = query
        .package
        .as_deref()
        .ok_or(ApiError::MissingParam("package"))?;

    let url = find_download_url(app, package, arch, platform).ok_or(ApiError::NotFound)?;
    let location = HeaderValue::from_str(&url).map_err(|_| ApiError::NotFound)?;
    let digest = make_digest(url_checksums(app, &url));

    let mut response = (StatusCode::FOUND, [(header::LOCATION, location)]).into_response();
    if !digest.is_empty() {
        if let Ok(value) = HeaderValue::from_str(&digest) {
            response
                .headers_mut()
                .insert(axum::http::HeaderName::from_static("digest"), value);
        }
    }
    Ok(response)
}
