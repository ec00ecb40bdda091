//! SQLite schema for message storage

/// Schema version recorded on first start
pub const SCHEMA_VERSION: u32 = 1;

/// SQLite schema definition
pub struct Schema;

impl Schema {
    /// Get the complete schema SQL
    ///
    /// Length bounds are enforced with CHECK constraints because SQLite does
    /// not enforce `VARCHAR(n)`; an oversize value fails the write instead of
    /// being stored or truncated.
    pub fn create_tables() -> &'static str {
        r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Messages table
CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    body VARCHAR(255) NOT NULL CHECK (length(body) <= 255),
    username VARCHAR(50) NOT NULL CHECK (length(username) <= 50),
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%f+00:00', 'now')),
    updated_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_messages_created_at ON messages(created_at);
"#
    }

    /// Server-clock timestamp expression, same format as the `created_at` default
    pub fn now_expr() -> &'static str {
        "strftime('%Y-%m-%dT%H:%M:%f+00:00', 'now')"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_bounds_match_constants() {
        let sql = Schema::create_tables();
        assert!(sql.contains(&format!("length(body) <= {}", crate::MAX_BODY_LEN)));
        assert!(sql.contains(&format!(
            "length(username) <= {}",
            crate::MAX_USERNAME_LEN
        )));
        assert!(sql.contains(Schema::now_expr()));
    }
}
