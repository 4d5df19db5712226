//! Database schema definitions for the session store.

/// Current schema version.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// SQL schema for initial database setup.
pub const SCHEMA_SQL: &str = r"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_info (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Session values, JSON encoded
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);
";

/// SQL to check if schema is initialized.
pub const CHECK_SCHEMA_SQL: &str = r"
SELECT COUNT(*) FROM sqlite_master
WHERE type='table' AND name='schema_info';
";

/// SQL to get schema version.
pub const GET_VERSION_SQL: &str = r"
SELECT value FROM schema_info WHERE key = 'version';
";

/// SQL to set schema version.
pub const SET_VERSION_SQL: &str = r"
INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?);
";

/// SQL to read one value.
pub const GET_VALUE_SQL: &str = "SELECT value FROM kv WHERE key = ?";

/// SQL to upsert one value.
pub const PUT_VALUE_SQL: &str = r"
INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at;
";

/// SQL to delete one value.
pub const DELETE_VALUE_SQL: &str = "DELETE FROM kv WHERE key = ?";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_creates_both_tables() {
        assert!(SCHEMA_SQL.contains("CREATE TABLE IF NOT EXISTS schema_info"));
        assert!(SCHEMA_SQL.contains("CREATE TABLE IF NOT EXISTS kv"));
    }

    #[test]
    fn test_schema_applies() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
        let count: i64 = conn.query_row(CHECK_SCHEMA_SQL, [], |row| row.get(0)).unwrap();
        assert_eq!(count, 1);
    }
}
