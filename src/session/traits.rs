//! Key-value persistence interface.
//!
//! The session layer only needs string keys mapping to JSON values, so the
//! backend contract is a small get/set/remove surface plus atomic batches.

use crate::error::SessionError;
use std::collections::HashMap;

/// Result alias for store operations.
pub type StoreResult<T> = std::result::Result<T, SessionError>;

/// One write in a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Insert or replace a value.
    Put(String, serde_json::Value),
    /// Delete a key; deleting a missing key is not an error.
    Delete(String),
}

/// Ordered set of writes applied atomically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Creates an empty batch.
    #[must_use]
    pub const fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Adds a put.
    #[must_use]
    pub fn put(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.ops.push(WriteOp::Put(key.into(), value));
        self
    }

    /// Adds a delete.
    #[must_use]
    pub fn delete(mut self, key: impl Into<String>) -> Self {
        self.ops.push(WriteOp::Delete(key.into()));
        self
    }

    /// Returns the queued operations in order.
    #[must_use]
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    /// Returns whether the batch has no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Trait for key-value persistence backends.
///
/// Implementations must apply each [`WriteBatch`] all-or-nothing.
pub trait KeyValueStore {
    /// Fetches the given keys. Missing keys are absent from the map.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or a value cannot be
    /// decoded.
    fn get(&self, keys: &[&str]) -> StoreResult<HashMap<String, serde_json::Value>>;

    /// Applies a batch atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails; no operation of the batch is
    /// then visible.
    fn write_batch(&mut self, batch: &WriteBatch) -> StoreResult<()>;

    /// Stores every entry of `items` in one batch.
    ///
    /// # Errors
    ///
    /// See [`KeyValueStore::write_batch`].
    fn set(&mut self, items: HashMap<String, serde_json::Value>) -> StoreResult<()> {
        let batch = items
            .into_iter()
            .fold(WriteBatch::new(), |batch, (k, v)| batch.put(k, v));
        self.write_batch(&batch)
    }

    /// Removes the given keys in one batch.
    ///
    /// # Errors
    ///
    /// See [`KeyValueStore::write_batch`].
    fn remove(&mut self, keys: &[&str]) -> StoreResult<()> {
        let batch = keys
            .iter()
            .fold(WriteBatch::new(), |batch, k| batch.delete(*k));
        self.write_batch(&batch)
    }
}

/// In-memory store, used in tests and as a scratch backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: HashMap<String, serde_json::Value>,
}

impl MemoryKeyValueStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, keys: &[&str]) -> StoreResult<HashMap<String, serde_json::Value>> {
        Ok(keys
            .iter()
            .filter_map(|k| self.entries.get(*k).map(|v| ((*k).to_string(), v.clone())))
            .collect())
    }

    fn write_batch(&mut self, batch: &WriteBatch) -> StoreResult<()> {
        for op in batch.ops() {
            match op {
                WriteOp::Put(k, v) => {
                    self.entries.insert(k.clone(), v.clone());
                }
                WriteOp::Delete(k) => {
                    self.entries.remove(k);
                }
            }
        }
        Ok(())
    }
}
