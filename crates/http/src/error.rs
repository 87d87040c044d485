//! Error handling for the HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use uuid::Uuid;

use crate::response::{Envelope, Status};

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {message}")]
    Validation { code: String, message: String },

    #[error("not found: {message}")]
    NotFound { code: String, message: String },

    #[error("bad request: {message}")]
    BadRequest { code: String, message: String },

    /// Server-side failure whose message is safe to show to clients
    #[error("server failure: {message}")]
    Server { code: String, message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            code: "validation_error".to_string(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            code: "not_found".to_string(),
            message: message.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: "bad_request".to_string(),
            message: message.into(),
        }
    }

    /// Create a server failure that keeps its message in every build
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            code: "server_error".to_string(),
            message: message.into(),
        }
    }

    /// HTTP status this error renders with
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Server { .. } | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let status = self.status_code();

        let (envelope_status, error_code, message) = match self {
            AppError::Validation { code, message }
            | AppError::NotFound { code, message }
            | AppError::BadRequest { code, message } => (Status::Fail, code, message),
            AppError::Server { code, message } => (Status::Error, code, message),
            AppError::Internal(e) => {
                let message = if cfg!(debug_assertions) {
                    e.to_string()
                } else {
                    "An internal server error occurred".to_string()
                };
                (Status::Error, "internal_error".to_string(), message)
            }
        };

        if status.is_server_error() {
            tracing::error!(
                error_id = %error_id,
                error_code = %error_code,
                status_code = %status.as_u16(),
                "Request error"
            );
        } else {
            tracing::warn!(
                error_id = %error_id,
                error_code = %error_code,
                status_code = %status.as_u16(),
                message = %message,
                "Request rejected"
            );
        }

        let body: Envelope<()> = Envelope {
            status: envelope_status,
            message: Some(message),
            data: None,
        };

        (status, Json(body)).into_response()
    }
}
