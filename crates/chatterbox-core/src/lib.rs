//! Chatterbox Core - Message storage for the chatterbox REST backend
//!
//! This crate provides everything below the HTTP layer:
//!
//! - **Message**: The single persisted entity, a username-attributed text body
//!   with creation and update timestamps
//! - **Persistence**: SQLite-backed repository with per-call transactions
//! - **Config**: Listen address, database location, and trusted CORS origins
//! - **Error**: Error taxonomy shared with the server crate

pub mod config;
pub mod error;
pub mod message;
pub mod persistence;

pub use config::{ChatterboxConfig, CorsConfig, DatabaseConfig, ServerConfig};
pub use error::{ChatterboxError, ConfigError, PersistenceError, Result};
pub use message::{Message, MessageId, NewMessage, MAX_BODY_LEN, MAX_USERNAME_LEN};
pub use persistence::{Repository, Schema};

/// Returns the version of chatterbox-core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
