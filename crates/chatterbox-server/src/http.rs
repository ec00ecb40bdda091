//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use chatterbox_core::{Message, MessageId, NewMessage};

use crate::error::{ApiError, ValidationError};
use crate::extract::Payload;
use crate::AppState;

// ============================================================================
// Wire Types
// ============================================================================

/// JSON representation of a message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageResponse {
    pub id: MessageId,
    pub body: String,
    pub username: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            body: message.body.clone(),
            username: message.username.clone(),
            created_at: message.created_at.to_rfc3339(),
            updated_at: message.updated_at.map(|ts| ts.to_rfc3339()),
        }
    }
}

/// Request to create a message
#[derive(Debug, Default, Deserialize)]
pub struct CreateMessageRequest {
    pub body: Option<String>,
    pub username: Option<String>,
}

impl CreateMessageRequest {
    /// Both fields must be present, non-null, and not blank
    pub fn validate(self) -> Result<NewMessage, ValidationError> {
        let body = self.body.filter(|b| !b.trim().is_empty());
        let username = self.username.filter(|u| !u.trim().is_empty());

        match (body, username) {
            (Some(body), Some(username)) => Ok(NewMessage { body, username }),
            (body, username) => {
                let mut missing = Vec::new();
                if body.is_none() {
                    missing.push("body");
                }
                if username.is_none() {
                    missing.push("username");
                }
                Err(ValidationError {
                    message: "Missing required fields",
                    missing,
                })
            }
        }
    }
}

/// Request to edit a message
///
/// Only the body is mutable; other keys in the payload are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMessageRequest {
    pub body: Option<String>,
}

impl UpdateMessageRequest {
    pub fn validate(self) -> Result<String, ValidationError> {
        self.body.ok_or(ValidationError {
            message: "Missing body field",
            missing: vec!["body"],
        })
    }
}

// ============================================================================
// Informational Endpoints
// ============================================================================

/// Describe the service and its endpoints
pub async fn service_info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "running",
        "message": "Chatterbox API is ready",
        "endpoints": {
            "messages": "/messages",
            "health": "/health"
        }
    }))
}

/// Liveness check
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ============================================================================
// Message Endpoints
// ============================================================================

/// List every message, oldest first
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MessageResponse>>, ApiError> {
    let messages = state
        .repository
        .list_messages()
        .map_err(ApiError::internal("Error fetching messages"))?;

    Ok(Json(messages.iter().map(MessageResponse::from).collect()))
}

/// Create a message
pub async fn create_message(
    State(state): State<Arc<AppState>>,
    Payload(request): Payload<CreateMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let new_message = request.validate()?;

    let message = state
        .repository
        .create_message(&new_message)
        .map_err(ApiError::internal("Error creating message"))?;
    tracing::debug!("Created {}", message);

    Ok((StatusCode::CREATED, Json(MessageResponse::from(&message))))
}

/// Replace the body of a message
///
/// An unknown ID is reported as 404 even when the payload is also invalid.
pub async fn update_message(
    State(state): State<Arc<AppState>>,
    id: Result<Path<MessageId>, PathRejection>,
    payload: Result<Payload<UpdateMessageRequest>, ApiError>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::EndpointNotFound)?;

    let body = match payload.and_then(|Payload(request)| Ok(request.validate()?)) {
        Ok(body) => body,
        Err(err) => {
            let existing = state
                .repository
                .get_message(id)
                .map_err(ApiError::internal("Error updating message"))?;
            return Err(match existing {
                Some(_) => err,
                None => ApiError::MessageNotFound,
            });
        }
    };

    let message = state
        .repository
        .update_message_body(id, &body)
        .map_err(ApiError::internal("Error updating message"))?
        .ok_or(ApiError::MessageNotFound)?;

    Ok(Json(MessageResponse::from(&message)))
}

/// Permanently delete a message
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    id: Result<Path<MessageId>, PathRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::EndpointNotFound)?;

    let deleted = state
        .repository
        .delete_message(id)
        .map_err(ApiError::internal("Error deleting message"))?;
    if !deleted {
        return Err(ApiError::MessageNotFound);
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Message deleted"
    })))
}

// ============================================================================
// Fallbacks
// ============================================================================

/// Any path without a route
pub async fn not_found() -> ApiError {
    ApiError::EndpointNotFound
}

/// A routed path hit with an unsupported method
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_message_response_mapping() {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let message = Message {
            id: 1,
            body: "hello".to_string(),
            username: "alice".to_string(),
            created_at,
            updated_at: None,
        };

        let json = serde_json::to_value(MessageResponse::from(&message)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "body": "hello",
                "username": "alice",
                "created_at": "2024-01-01T00:00:00+00:00",
                "updated_at": null
            })
        );
    }

    #[test]
    fn test_message_response_includes_update_time() {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let message = Message {
            id: 2,
            body: "edited".to_string(),
            username: "bob".to_string(),
            created_at,
            updated_at: Some(created_at + chrono::Duration::minutes(5)),
        };

        let response = MessageResponse::from(&message);
        assert_eq!(
            response.updated_at.as_deref(),
            Some("2024-01-01T00:05:00+00:00")
        );
    }

    #[test]
    fn test_create_request_validation() {
        let request = CreateMessageRequest {
            body: Some("hi".to_string()),
            username: Some("alice".to_string()),
        };
        assert_eq!(request.validate().unwrap(), NewMessage::new("hi", "alice"));

        let err = CreateMessageRequest {
            body: None,
            username: Some("alice".to_string()),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.message, "Missing required fields");
        assert_eq!(err.missing, vec!["body"]);

        let err = CreateMessageRequest::default().validate().unwrap_err();
        assert_eq!(err.missing, vec!["body", "username"]);

        let err = CreateMessageRequest {
            body: Some("hi".to_string()),
            username: Some("   ".to_string()),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.missing, vec!["username"]);
    }

    #[test]
    fn test_update_request_validation() {
        let request: UpdateMessageRequest =
            serde_json::from_str(r#"{"body": "new", "username": "mallory"}"#).unwrap();
        assert_eq!(request.validate().unwrap(), "new");

        let err = UpdateMessageRequest::default().validate().unwrap_err();
        assert_eq!(err.message, "Missing body field");
    }
}
