//! Persistence layer for chatterbox
//!
//! Provides SQLite-backed storage for messages.

mod repository;
mod schema;

pub use repository::Repository;
pub use schema::Schema;
