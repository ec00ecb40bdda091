//! The message entity
//!
//! A message is a short text body attributed to a username. The database
//! assigns `id` and `created_at`; `updated_at` stays `None` until the body is
//! first changed.

use std::fmt;

use chrono::{DateTime, Utc};

/// Maximum number of characters stored in a message body
pub const MAX_BODY_LEN: usize = 255;

/// Maximum number of characters stored in a username
pub const MAX_USERNAME_LEN: usize = 50;

/// Row identifier assigned by the database
pub type MessageId = i64;

/// A persisted message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub body: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self.body.chars().take(20).collect();
        write!(
            f,
            "<Message id={}, username={}, body={}...>",
            self.id, self.username, preview
        )
    }
}

/// Fields required to create a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub body: String,
    pub username: String,
}

impl NewMessage {
    pub fn new(body: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            username: username.into(),
        }
    }
}
