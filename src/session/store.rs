//! Session persistence on top of a [`KeyValueStore`].

use crate::error::SessionError;
use crate::hint::ClueLevel;
use crate::session::traits::{KeyValueStore, StoreResult, WriteBatch};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Key holding the problem text.
pub const KEY_PROBLEM: &str = "savedProblem";
/// Key holding the raw (unrendered) hint text.
pub const KEY_HINT: &str = "savedClue";
/// Key holding the selected level.
pub const KEY_LEVEL: &str = "savedClueLevel";

const ALL_KEYS: [&str; 3] = [KEY_PROBLEM, KEY_HINT, KEY_LEVEL];

/// The persisted triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    /// Problem text.
    pub problem: String,
    /// Raw hint text, if one was received for this problem.
    pub hint: Option<String>,
    /// Selected level.
    pub level: ClueLevel,
}

/// Reads and writes the session triple.
#[derive(Debug)]
pub struct SessionStore<S> {
    backend: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Wraps a backend.
    pub const fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Returns the backend.
    pub const fn backend(&self) -> &S {
        &self.backend
    }

    /// Persists the triple in one batch. A `None` hint deletes any stored
    /// hint in the same batch, so a hint never outlives its problem.
    ///
    /// # Errors
    ///
    /// - [`SessionError::HintWithoutProblem`] for a hint with a blank problem
    /// - any backend error if the write fails
    pub fn save(&mut self, problem: &str, hint: Option<&str>, level: ClueLevel) -> StoreResult<()> {
        if hint.is_some() && problem.trim().is_empty() {
            return Err(SessionError::HintWithoutProblem);
        }
        let batch = WriteBatch::new()
            .put(KEY_PROBLEM, Value::from(problem))
            .put(KEY_LEVEL, Value::from(level.as_str()));
        let batch = match hint {
            Some(hint) => batch.put(KEY_HINT, Value::from(hint)),
            None => batch.delete(KEY_HINT),
        };
        self.backend.write_batch(&batch)?;
        debug!(has_hint = hint.is_some(), %level, "saved session");
        Ok(())
    }

    /// Loads the saved session.
    ///
    /// Returns `None` when no problem is stored or the stored problem is
    /// blank. A hint stored without a problem is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or holds values of the
    /// wrong type.
    pub fn load(&self) -> StoreResult<Option<SessionState>> {
        let values = self.backend.get(&ALL_KEYS)?;

        let level = level_from(values.get(KEY_LEVEL))?;
        let hint = string_from(KEY_HINT, values.get(KEY_HINT))?;
        let problem =
            string_from(KEY_PROBLEM, values.get(KEY_PROBLEM))?.filter(|p| !p.trim().is_empty());
        let Some(problem) = problem else {
            if hint.is_some() {
                warn!("ignoring saved hint without a saved problem");
            }
            return Ok(None);
        };

        Ok(Some(SessionState {
            problem,
            hint,
            level,
        }))
    }

    /// Returns the saved level, or the default when none is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn saved_level(&self) -> StoreResult<ClueLevel> {
        Ok(self.stored_level()?.unwrap_or_default())
    }

    /// Returns the stored level, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn stored_level(&self) -> StoreResult<Option<ClueLevel>> {
        let values = self.backend.get(&[KEY_LEVEL])?;
        Ok(string_from(KEY_LEVEL, values.get(KEY_LEVEL))?.map(|s| ClueLevel::parse(&s)))
    }

    /// Persists only the level, leaving problem and hint untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save_level(&mut self, level: ClueLevel) -> StoreResult<()> {
        self.backend
            .write_batch(&WriteBatch::new().put(KEY_LEVEL, Value::from(level.as_str())))
    }

    /// Removes all three keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn clear(&mut self) -> StoreResult<()> {
        self.backend.remove(&ALL_KEYS)?;
        debug!("cleared session");
        Ok(())
    }
}

fn string_from(key: &str, value: Option<&Value>) -> StoreResult<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(SessionError::Serialization(format!(
            "{key}: expected a string, found {other}"
        ))),
    }
}

fn level_from(value: Option<&Value>) -> StoreResult<ClueLevel> {
    Ok(string_from(KEY_LEVEL, value)?
        .map(|s| ClueLevel::parse(&s))
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryKeyValueStore;
    use serde_json::json;

    fn store() -> SessionStore<MemoryKeyValueStore> {
        SessionStore::new(MemoryKeyValueStore::new())
    }

    #[test]
    fn test_empty_store_loads_none() {
        let store = store();
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(store.saved_level().unwrap(), ClueLevel::HighLevel);
        assert_eq!(store.stored_level().unwrap(), None);
    }

    #[test]
    fn test_save_and_load() {
        let mut store = store();
        store
            .save("Two Sum", Some("Use a **hash map**."), ClueLevel::AlgorithmFocus)
            .unwrap();
        assert_eq!(
            store.load().unwrap(),
            Some(SessionState {
                problem: "Two Sum".to_string(),
                hint: Some("Use a **hash map**.".to_string()),
                level: ClueLevel::AlgorithmFocus,
            })
        );
    }

    #[test]
    fn test_save_without_hint_drops_stale_hint() {
        let mut store = store();
        store.save("old", Some("old hint"), ClueLevel::Generic).unwrap();
        store.save("new", None, ClueLevel::Generic).unwrap();
        let state = store.load().unwrap().unwrap();
        assert_eq!(state.problem, "new");
        assert_eq!(state.hint, None);
    }

    #[test]
    fn test_orphan_hint_is_ignored() {
        let mut backend = MemoryKeyValueStore::new();
        backend
            .write_batch(&WriteBatch::new().put(KEY_HINT, json!("dangling")))
            .unwrap();
        let store = SessionStore::new(backend);
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_hint_with_blank_problem_is_rejected() {
        let mut store = store();
        for problem in ["", "   ", "\n\t"] {
            assert_eq!(
                store.save(problem, Some("hint"), ClueLevel::Generic),
                Err(SessionError::HintWithoutProblem)
            );
        }
        assert!(store.backend().is_empty());
    }

    #[test]
    fn test_blank_problem_loads_none() {
        let mut backend = MemoryKeyValueStore::new();
        backend
            .write_batch(
                &WriteBatch::new()
                    .put(KEY_PROBLEM, json!("   "))
                    .put(KEY_HINT, json!("hint")),
            )
            .unwrap();
        let store = SessionStore::new(backend);
        assert_eq!(store.load().unwrap(), None);

        let mut store = self::store();
        store.save("", None, ClueLevel::Generic).unwrap();
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(store.stored_level().unwrap(), Some(ClueLevel::Generic));
    }

    #[test]
    fn test_unknown_level_maps_to_generic() {
        let mut backend = MemoryKeyValueStore::new();
        backend
            .write_batch(
                &WriteBatch::new()
                    .put(KEY_PROBLEM, json!("p"))
                    .put(KEY_LEVEL, json!("something-else")),
            )
            .unwrap();
        let store = SessionStore::new(backend);
        assert_eq!(store.load().unwrap().unwrap().level, ClueLevel::Generic);
    }

    #[test]
    fn test_wrong_type_is_serialization_error() {
        let mut backend = MemoryKeyValueStore::new();
        backend
            .write_batch(&WriteBatch::new().put(KEY_PROBLEM, json!(42)))
            .unwrap();
        let store = SessionStore::new(backend);
        assert!(matches!(store.load(), Err(SessionError::Serialization(_))));
    }

    #[test]
    fn test_save_level_alone() {
        let mut store = store();
        store.save_level(ClueLevel::DetailedInsight).unwrap();
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(store.saved_level().unwrap(), ClueLevel::DetailedInsight);
    }

    #[test]
    fn test_clear() {
        let mut store = store();
        store.save("p", Some("h"), ClueLevel::DetailedInsight).unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        assert!(store.backend().is_empty());
    }
}
