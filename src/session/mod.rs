//! Session persistence.
//!
//! The last problem, its raw hint and the selected level survive between
//! invocations through a [`KeyValueStore`], `SQLite`-backed by default.

pub mod schema;
pub mod sqlite;
pub mod store;
pub mod traits;

pub use sqlite::SqliteKeyValueStore;
pub use store::{KEY_HINT, KEY_LEVEL, KEY_PROBLEM, SessionState, SessionStore};
pub use traits::{KeyValueStore, MemoryKeyValueStore, StoreResult, WriteBatch, WriteOp};
