//! Application error taxonomy and its HTTP mapping.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error kinds surfaced by services and handlers.
///
/// Everything except `Fatal` is operational: the message is meant for the
/// caller and passes through unchanged.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Unsupported vehicle type: {0}")]
    UnsupportedVehicle(String),

    #[error("{0}")]
    UnsupportedCategory(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Provider(String),

    #[error("Internal server error: {0}")]
    Fatal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl AppError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        AppError::InvalidInput(msg.into())
    }

    pub fn is_operational(&self) -> bool {
        !matches!(self, AppError::Fatal(_))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_)
            | AppError::UnsupportedVehicle(_)
            | AppError::UnsupportedCategory(_)
            | AppError::Provider(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Fatal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::UnsupportedVehicle(_) => "unsupported_vehicle",
            AppError::UnsupportedCategory(_) => "unsupported_category",
            AppError::NotFound(_) => "not_found",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Conflict(_) => "conflict",
            AppError::Provider(_) => "provider_error",
            AppError::Fatal(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if self.is_operational() {
            tracing::warn!(%status, error = %self, "request rejected");
            self.to_string()
        } else {
            tracing::error!(error = ?self, "unexpected failure");
            "Internal server error".to_string()
        };

        let body = ErrorResponse {
            error: self.code(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidInput(format!("Invalid path: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidInput(format!("Invalid query string: {}", rejection.body_text()))
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
