use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Same as the HTTP status code.
    pub code: u16,
}

/// Error returned by every handler.
///
/// Domain errors are mapped onto status codes here; store and hashing
/// failures are logged and reach the client only as a generic 500.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] Error),

    /// A request the handler could not accept, such as a malformed body or id.
    #[error("{error}")]
    BadRequest {
        error: &'static str,
        message: Option<String>,
    },

    #[error("File too large")]
    PayloadTooLarge { message: String },
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn bad_request(error: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            error,
            message: Some(message.into()),
        }
    }

    fn parts(&self) -> (StatusCode, String, Option<String>) {
        match self {
            AppError::BadRequest { error, message } => {
                (StatusCode::BAD_REQUEST, error.to_string(), message.clone())
            }
            AppError::PayloadTooLarge { message } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "File too large".to_string(),
                Some(message.clone()),
            ),
            AppError::Domain(err) => match err {
                Error::NotFound { entity, .. } => (
                    StatusCode::NOT_FOUND,
                    format!("{entity} not found"),
                    Some(err.to_string()),
                ),
                Error::Validation(msg) => (
                    StatusCode::BAD_REQUEST,
                    "Invalid request".to_string(),
                    Some(msg.clone()),
                ),
                Error::Unauthorized => (
                    StatusCode::UNAUTHORIZED,
                    "Invalid credentials".to_string(),
                    None,
                ),
                Error::Csv { .. } => (
                    StatusCode::BAD_REQUEST,
                    "Error reading CSV".to_string(),
                    Some(err.to_string()),
                ),
                Error::Sqlite(_) | Error::PasswordHash(_) | Error::Io(_) => {
                    tracing::error!(error = %err, "Internal error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                        None,
                    )
                }
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = self.parts();
        if status.is_client_error() {
            tracing::debug!(status = status.as_u16(), %error, "Request rejected");
        }
        let body = ErrorResponse {
            error,
            message,
            code: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Domain(Error::Validation(errors.to_string()))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("Invalid request", rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request("Invalid ID", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request("Invalid query", rejection.body_text())
    }
}
