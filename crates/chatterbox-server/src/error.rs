//! API error responses
//!
//! Every failure leaves the server as `{"error": "<message>"}`. Internal
//! failures keep their cause for logging but only ever render the generic
//! message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use chatterbox_core::ChatterboxError;

/// A request payload that is missing required fields
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// Fixed client-facing message
    pub message: &'static str,
    /// Names of the fields that were absent
    pub missing: Vec<&'static str>,
}

/// Errors returned by HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Required fields absent from the payload
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Body is not JSON or a field has the wrong type
    #[error("Invalid JSON payload")]
    InvalidJson(String),

    /// Body exceeds the request size limit
    #[error("Payload too large")]
    PayloadTooLarge,

    /// No message with the requested ID
    #[error("Message not found")]
    MessageNotFound,

    /// No route matches the request path
    #[error("Endpoint not found")]
    EndpointNotFound,

    /// The path exists but not for this method
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Storage or other unexpected failure
    #[error("Internal server error")]
    Internal(#[source] ChatterboxError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::MessageNotFound | ApiError::EndpointNotFound => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log a storage failure with its operation context and wrap it
    pub fn internal(context: &'static str) -> impl FnOnce(ChatterboxError) -> ApiError {
        move |err| {
            tracing::error!("{}: {}", context, err);
            ApiError::Internal(err)
        }
    }
}

/// Body shared by every error response
pub fn error_body(message: &str) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "error": message }))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Validation(err) => tracing::debug!("Missing fields: {:?}", err.missing),
            ApiError::InvalidJson(detail) => tracing::debug!("Rejected payload: {}", detail),
            _ => {}
        }
        (self.status(), error_body(&self.to_string())).into_response()
    }
}
