//! HTTP error type.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use relreg_engine::RegistryError;

/// Errors a handler can answer with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Nothing resolves at this path.
    #[error("not found")]
    NotFound,

    /// A required query parameter is missing.
    #[error("missing query parameter: {0}")]
    MissingParam(&'static str),

    /// The engine failed in a way that is not a plain miss.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A blocking engine task panicked or was cancelled.
    #[error("resolver task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MissingParam(_) => StatusCode::BAD_REQUEST,
            ApiError::Registry(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            ApiError::Registry(_) | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match status {
            StatusCode::NOT_FOUND => (status, "Not Found").into_response(),
            StatusCode::BAD_REQUEST => (status, "Bad Request").into_response(),
            _ => {
                tracing::error!(error = %self, "request failed");
                (status, "Internal Server Error").into_response()
            }
        }
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
