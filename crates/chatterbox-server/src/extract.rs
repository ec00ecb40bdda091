//! Request payload extraction

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// JSON request body decoded into a typed payload
///
/// Unlike `axum::Json` this does not insist on a `Content-Type` header, and
/// every rejection renders as a JSON error body. A JSON value that is not an
/// object decodes as if it were `{}`, so the payload's own validation reports
/// the missing fields.
#[derive(Debug)]
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| match e.status() {
                StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge,
                _ => ApiError::InvalidJson(e.body_text()),
            })?;

        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| ApiError::InvalidJson(e.to_string()))?;
        let value = match value {
            Value::Object(_) => value,
            _ => Value::Object(Default::default()),
        };

        serde_json::from_value(value)
            .map(Payload)
            .map_err(|e| ApiError::InvalidJson(e.to_string()))
    }
}
