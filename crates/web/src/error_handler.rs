use axum::{
    extract::rejection::{FormRejection, JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kbquery_core::{AppError, ProviderErrorKind};
use kbquery_query::{QueryFailure, Timing};
use serde::Serialize;
use thiserror::Error;

/// HTTP-facing error.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body could not be read as a query
    #[error("Invalid request body: {0}")]
    BadRequest(String),

    /// The query was rejected or failed; carries the captured timing
    #[error(transparent)]
    Query(#[from] QueryFailure),

    #[error(transparent)]
    App(#[from] AppError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Query(failure) => status_for(&failure.error),
            ApiError::App(err) => status_for(err),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Query(failure) => code_for(&failure.error),
            ApiError::App(err) => code_for(err),
        }
    }

    fn timing(&self) -> Option<Timing> {
        match self {
            ApiError::Query(failure) => Some(failure.timing),
            _ => None,
        }
    }
}

/// Status code for a failure reaching the HTTP layer.
pub(crate) fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::Validation(_) => StatusCode::BAD_REQUEST,
        AppError::Provider {
            kind: ProviderErrorKind::Timeout,
            ..
        } => StatusCode::GATEWAY_TIMEOUT,
        AppError::Provider { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn code_for(err: &AppError) -> &'static str {
    match err {
        AppError::Validation(_) => "VALIDATION_ERROR",
        AppError::Provider {
            kind: ProviderErrorKind::Timeout,
            ..
        } => "PROVIDER_TIMEOUT",
        AppError::Provider {
            kind: ProviderErrorKind::Authentication,
            ..
        } => "PROVIDER_AUTHENTICATION",
        AppError::Provider { .. } => "PROVIDER_ERROR",
        AppError::Render(_) => "RENDER_ERROR",
        _ => "INTERNAL_ERROR",
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    timing: Option<Timing>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed ({}): {}", status, self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self);
        }

        let body = ErrorBody {
            error: self.error_code(),
            detail: self.to_string(),
            timing: self.timing(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(err: FormRejection) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&AppError::Validation("empty".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&AppError::provider(ProviderErrorKind::Timeout, "slow")),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_for(&AppError::provider(ProviderErrorKind::Authentication, "key")),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&AppError::Render("bad".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_query_failure_carries_timing() {
        let failure = QueryFailure::new(
            AppError::provider(ProviderErrorKind::Network, "refused"),
            Timing::from_phases(0.01, 0.5, 0.0),
        );
        let err = ApiError::from(failure);

        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.error_code(), "PROVIDER_ERROR");
        assert_eq!(err.timing().map(|t| t.kb_retrieval), Some(0.5));
    }
}
