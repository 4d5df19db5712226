//! `SQLite` key-value store.
//!
//! Every batch runs in a single transaction, so a saved session is never
//! half-written.

use crate::error::SessionError;
use crate::session::schema::{
    CHECK_SCHEMA_SQL, CURRENT_SCHEMA_VERSION, DELETE_VALUE_SQL, GET_VALUE_SQL, GET_VERSION_SQL,
    PUT_VALUE_SQL, SCHEMA_SQL, SET_VERSION_SQL,
};
use crate::session::traits::{KeyValueStore, StoreResult, WriteBatch, WriteOp};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// SQLite-backed [`KeyValueStore`].
///
/// # Examples
///
/// ```no_run
/// use cluekit::session::SqliteKeyValueStore;
///
/// let mut store = SqliteKeyValueStore::open(".cluekit/session.db").unwrap();
/// store.init().unwrap();
/// ```
pub struct SqliteKeyValueStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteKeyValueStore {
    /// Opens or creates a database at `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or database cannot be created.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| SessionError::Database(e.to_string()))?;
        }

        let conn = Connection::open(&path)?;
        let _: String = conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
        debug!(path = %path.display(), "opened session database");

        Ok(Self {
            conn,
            path: Some(path),
        })
    }

    /// Creates an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn, path: None })
    }

    /// Returns the database path (None for in-memory).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Creates the schema if needed. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if schema creation fails or the database carries a
    /// newer schema version than this build understands.
    pub fn init(&mut self) -> StoreResult<()> {
        if self.is_initialized()? {
            if let Some(version) = self.schema_version()?
                && version > CURRENT_SCHEMA_VERSION
            {
                return Err(SessionError::Migration(format!(
                    "database schema v{version} is newer than supported v{CURRENT_SCHEMA_VERSION}"
                )));
            }
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        tx.execute_batch(SCHEMA_SQL)?;
        tx.execute(SET_VERSION_SQL, params![CURRENT_SCHEMA_VERSION.to_string()])?;
        tx.commit()?;
        debug!(version = CURRENT_SCHEMA_VERSION, "created session schema");
        Ok(())
    }

    /// Checks whether the schema exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the check cannot be performed.
    pub fn is_initialized(&self) -> StoreResult<bool> {
        let count: i64 = self.conn.query_row(CHECK_SCHEMA_SQL, [], |row| row.get(0))?;
        Ok(count > 0)
    }

    fn schema_version(&self) -> StoreResult<Option<u32>> {
        let version: Option<String> = self
            .conn
            .query_row(GET_VERSION_SQL, [], |row| row.get(0))
            .optional()?;
        Ok(version.and_then(|v| v.parse().ok()))
    }

    fn ensure_initialized(&self) -> StoreResult<()> {
        if self.is_initialized()? {
            Ok(())
        } else {
            Err(SessionError::NotInitialized)
        }
    }

    #[allow(clippy::cast_possible_wrap)]
    fn now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, keys: &[&str]) -> StoreResult<HashMap<String, serde_json::Value>> {
        self.ensure_initialized()?;
        let mut stmt = self.conn.prepare_cached(GET_VALUE_SQL)?;
        let mut out = HashMap::with_capacity(keys.len());
        for key in keys {
            let raw: Option<String> = stmt.query_row(params![key], |row| row.get(0)).optional()?;
            if let Some(raw) = raw {
                out.insert((*key).to_string(), serde_json::from_str(&raw)?);
            }
        }
        Ok(out)
    }

    fn write_batch(&mut self, batch: &WriteBatch) -> StoreResult<()> {
        self.ensure_initialized()?;
        if batch.is_empty() {
            return Ok(());
        }

        let now = Self::now();
        let tx = self.conn.transaction()?;
        {
            let mut put = tx.prepare_cached(PUT_VALUE_SQL)?;
            let mut delete = tx.prepare_cached(DELETE_VALUE_SQL)?;
            for op in batch.ops() {
                match op {
                    WriteOp::Put(key, value) => {
                        put.execute(params![key, serde_json::to_string(value)?, now])?;
                    }
                    WriteOp::Delete(key) => {
                        delete.execute(params![key])?;
                    }
                }
            }
        }
        tx.commit()?;
        debug!(ops = batch.ops().len(), "committed session batch");
        Ok(())
    }
}
