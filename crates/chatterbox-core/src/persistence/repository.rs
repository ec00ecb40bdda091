//! Repository for CRUD operations on messages

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::schema::{Schema, SCHEMA_VERSION};
use crate::error::{PersistenceError, Result};
use crate::message::{Message, MessageId, NewMessage};

const MESSAGE_COLUMNS: &str = "id, body, username, created_at, updated_at";

/// Repository for persisting messages
///
/// The connection sits behind a mutex; each operation holds the guard for
/// exactly one call, and every write runs in its own transaction that is
/// rolled back when dropped without a commit.
pub struct Repository {
    conn: Mutex<Connection>,
}

impl Repository {
    /// Open (or create) a database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(PersistenceError::from)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        Self::with_connection(conn)
    }

    /// Create an in-memory repository (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        Self::initialize(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Initialize the database schema
    fn initialize(conn: &Connection) -> Result<()> {
        conn.execute_batch(Schema::create_tables())?;

        let recorded: Option<u32> = conn
            .query_row(
                "SELECT version FROM schema_version ORDER BY applied_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        if recorded.is_none() {
            conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                [SCHEMA_VERSION],
            )?;
        }

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| PersistenceError::LockPoisoned.into())
    }

    /// Get all messages, oldest first
    ///
    /// Rows sharing a `created_at` value keep insertion order.
    pub fn list_messages(&self) -> Result<Vec<Message>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages ORDER BY created_at ASC, id ASC"
        ))?;

        let messages = stmt
            .query_map([], Self::row_to_message)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(messages)
    }

    /// Insert a message; the database assigns `id` and `created_at`
    pub fn create_message(&self, new: &NewMessage) -> Result<Message> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        let message = tx.query_row(
            &format!(
                "INSERT INTO messages (body, username) VALUES (?1, ?2) RETURNING {MESSAGE_COLUMNS}"
            ),
            params![new.body, new.username],
            Self::row_to_message,
        )?;

        tx.commit()?;
        Ok(message)
    }

    /// Get a message by ID
    pub fn get_message(&self, id: MessageId) -> Result<Option<Message>> {
        let conn = self.lock()?;
        let message = conn
            .query_row(
                &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
                [id],
                Self::row_to_message,
            )
            .optional()?;

        Ok(message)
    }

    /// Replace the body of a message and stamp `updated_at`
    ///
    /// Returns `None` when no message has the given ID.
    pub fn update_message_body(&self, id: MessageId, body: &str) -> Result<Option<Message>> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        let message = tx
            .query_row(
                &format!(
                    "UPDATE messages SET body = ?1, updated_at = {} WHERE id = ?2 RETURNING {MESSAGE_COLUMNS}",
                    Schema::now_expr()
                ),
                params![body, id],
                Self::row_to_message,
            )
            .optional()?;

        tx.commit()?;
        Ok(message)
    }

    /// Permanently remove a message
    ///
    /// Returns `false` when no message has the given ID.
    pub fn delete_message(&self, id: MessageId) -> Result<bool> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        let deleted = tx.execute("DELETE FROM messages WHERE id = ?1", [id])?;

        tx.commit()?;
        Ok(deleted > 0)
    }

    fn row_to_message(row: &rusqlite::Row) -> rusqlite::Result<Message> {
        let created_at: String = row.get(3)?;
        let updated_at: Option<String> = row.get(4)?;

        Ok(Message {
            id: row.get(0)?,
            body: row.get(1)?,
            username: row.get(2)?,
            created_at: parse_timestamp(3, &created_at)?,
            updated_at: updated_at
                .map(|raw| parse_timestamp(4, &raw))
                .transpose()?,
        })
    }
}

fn parse_timestamp(column: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{MAX_BODY_LEN, MAX_USERNAME_LEN};

    #[test]
    fn test_repository_creation() {
        let repo = Repository::in_memory().unwrap();
        assert!(repo.list_messages().unwrap().is_empty());
    }

    #[test]
    fn test_message_crud() {
        let repo = Repository::in_memory().unwrap();

        // Create
        let created = repo
            .create_message(&NewMessage::new("hello", "alice"))
            .unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.body, "hello");
        assert_eq!(created.username, "alice");
        assert!(created.updated_at.is_none());

        // Get
        let loaded = repo.get_message(created.id).unwrap().unwrap();
        assert_eq!(loaded, created);

        // Update
        let updated = repo
            .update_message_body(created.id, "hello there")
            .unwrap()
            .unwrap();
        assert_eq!(updated.body, "hello there");
        assert_eq!(updated.username, "alice");
        assert_eq!(updated.created_at, created.created_at);
        let updated_at = updated.updated_at.unwrap();
        assert!(updated_at >= updated.created_at);

        // Delete
        assert!(repo.delete_message(created.id).unwrap());
        assert!(repo.get_message(created.id).unwrap().is_none());
        assert!(repo.list_messages().unwrap().is_empty());
    }

    #[test]
    fn test_missing_ids() {
        let repo = Repository::in_memory().unwrap();

        assert!(repo.get_message(999).unwrap().is_none());
        assert!(repo.update_message_body(999, "nope").unwrap().is_none());
        assert!(!repo.delete_message(999).unwrap());
    }

    #[test]
    fn test_delete_twice() {
        let repo = Repository::in_memory().unwrap();
        let message = repo.create_message(&NewMessage::new("hi", "bob")).unwrap();

        assert!(repo.delete_message(message.id).unwrap());
        assert!(!repo.delete_message(message.id).unwrap());
    }

    #[test]
    fn test_list_is_ordered_by_creation() {
        let repo = Repository::in_memory().unwrap();

        for i in 0..5 {
            repo.create_message(&NewMessage::new(format!("message {i}"), "carol"))
                .unwrap();
        }

        let messages = repo.list_messages().unwrap();
        assert_eq!(messages.len(), 5);
        for pair in messages.windows(2) {
            assert!(pair[0].created_at <= pair[1].created_at);
            assert!(pair[0].id < pair[1].id);
        }
        assert_eq!(messages[0].body, "message 0");
        assert_eq!(messages[4].body, "message 4");
    }

    #[test]
    fn test_ids_are_not_reused() {
        let repo = Repository::in_memory().unwrap();

        let first = repo.create_message(&NewMessage::new("one", "dave")).unwrap();
        repo.delete_message(first.id).unwrap();
        let second = repo.create_message(&NewMessage::new("two", "dave")).unwrap();

        assert!(second.id > first.id);
    }

    #[test]
    fn test_length_bounds() {
        let repo = Repository::in_memory().unwrap();

        let max_body = "b".repeat(MAX_BODY_LEN);
        let max_username = "u".repeat(MAX_USERNAME_LEN);
        let stored = repo
            .create_message(&NewMessage::new(max_body.clone(), max_username.clone()))
            .unwrap();
        assert_eq!(stored.body, max_body);
        assert_eq!(stored.username, max_username);

        let err = repo
            .create_message(&NewMessage::new("b".repeat(MAX_BODY_LEN + 1), "erin"))
            .unwrap_err();
        assert!(err.is_constraint_violation());

        let err = repo
            .create_message(&NewMessage::new("hi", "u".repeat(MAX_USERNAME_LEN + 1)))
            .unwrap_err();
        assert!(err.is_constraint_violation());

        let err = repo
            .update_message_body(stored.id, &"b".repeat(MAX_BODY_LEN + 1))
            .unwrap_err();
        assert!(err.is_constraint_violation());

        // Rejected writes leave nothing behind
        let messages = repo.list_messages().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].body, max_body);
        assert!(messages[0].updated_at.is_none());
    }

    #[test]
    fn test_length_counts_characters() {
        let repo = Repository::in_memory().unwrap();
        let body = "é".repeat(MAX_BODY_LEN);

        let stored = repo
            .create_message(&NewMessage::new(body.clone(), "frank"))
            .unwrap();
        assert_eq!(stored.body, body);
    }

    #[test]
    fn test_file_backed_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("app.db");

        let id = {
            let repo = Repository::open(&path).unwrap();
            repo.create_message(&NewMessage::new("persisted", "grace"))
                .unwrap()
                .id
        };

        let reopened = Repository::open(&path).unwrap();
        let message = reopened.get_message(id).unwrap().unwrap();
        assert_eq!(message.body, "persisted");
        assert_eq!(message.username, "grace");
    }

    #[test]
    fn test_timestamps_use_utc_offset() {
        let repo = Repository::in_memory().unwrap();
        let message = repo.create_message(&NewMessage::new("hi", "heidi")).unwrap();

        assert!(message.created_at.to_rfc3339().ends_with("+00:00"));
    }
}
