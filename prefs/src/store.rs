//! Device-local fallback storage for preference values.
//!
//! Local storage is a write-behind fallback only: it is written when the
//! server cannot take a value and read back solely by migration. There is no
//! TTL, no versioning and no cross-tab lock; the last writer wins.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::{Preference, PreferenceKind};

/// Error returned by a [`KeyValueStore`] write or removal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("local storage is unavailable")]
    Unavailable,
    #[error("local storage rejected {key}: {reason}")]
    Rejected { key: String, reason: String },
}

/// String key-value backend (browser `localStorage` or memory).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend refuses the write.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend refuses the removal.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Process-local backend, used when the browser denies `localStorage` and in
/// tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Typed adapter over the two fixed preference keys.
#[derive(Clone)]
pub struct PreferenceStore {
    backend: Rc<dyn KeyValueStore>,
}

impl PreferenceStore {
    #[must_use]
    pub fn new(backend: Rc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Stored value for `kind`. Unparseable leftovers read as absent and are
    /// left in place.
    #[must_use]
    pub fn read(&self, kind: PreferenceKind) -> Option<Preference> {
        let raw = self.backend.get(kind.storage_key())?;
        match Preference::parse(kind, &raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::debug!("ignoring stored {kind} preference: {e}");
                None
            }
        }
    }

    /// Every stored value, palette first.
    #[must_use]
    pub fn read_all(&self) -> Vec<Preference> {
        PreferenceKind::ALL.into_iter().filter_map(|kind| self.read(kind)).collect()
    }

    /// # Errors
    ///
    /// Propagates the backend's [`StoreError`].
    pub fn write(&self, value: Preference) -> Result<(), StoreError> {
        self.backend.set(value.kind().storage_key(), value.as_str())
    }

    /// # Errors
    ///
    /// Propagates the backend's [`StoreError`].
    pub fn clear(&self, kind: PreferenceKind) -> Result<(), StoreError> {
        self.backend.remove(kind.storage_key())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
