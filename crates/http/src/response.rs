//! JSON envelope shared by every endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Outcome reported in the `status` field of the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The request was handled.
    Success,
    /// The client sent something the service rejected.
    Fail,
    /// The service itself failed.
    Error,
}

/// `{status, message?, data?}` body.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Successful response: status code plus a `success` envelope.
#[derive(Debug)]
pub struct ApiResponse<T> {
    status_code: StatusCode,
    body: Envelope<T>,
}

impl<T> ApiResponse<T> {
    fn new(status_code: StatusCode, message: Option<String>, data: Option<T>) -> Self {
        Self {
            status_code,
            body: Envelope {
                status: Status::Success,
                message,
                data,
            },
        }
    }

    /// 201 with a message and data
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::CREATED, Some(message.into()), Some(data))
    }

    /// 200 with data only
    pub fn ok(data: T) -> Self {
        Self::new(StatusCode::OK, None, Some(data))
    }
}

impl ApiResponse<()> {
    /// 200 with a message only
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, Some(message.into()), None)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status_code, Json(self.body)).into_response()
    }
}
