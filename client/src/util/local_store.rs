//! Browser `localStorage` backend for the preference fallback copy.
//!
//! SYSTEM CONTEXT
//! ==============
//! Private browsing and embedded contexts can deny `localStorage`. In that
//! case preferences fall back to a process-local store, so an anonymous
//! change survives until the tab navigates instead of failing outright.

use std::rc::Rc;

use prefs::{KeyValueStore, MemoryStore};
#[cfg(feature = "hydrate")]
use prefs::StoreError;

/// `KeyValueStore` over `window.localStorage`.
#[cfg(feature = "hydrate")]
pub struct LocalStorageStore {
    storage: web_sys::Storage,
}

#[cfg(feature = "hydrate")]
impl LocalStorageStore {
    /// Open the window's local storage, if the browser grants it.
    pub fn open() -> Option<Self> {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten())?;
        Some(Self { storage })
    }
}

#[cfg(feature = "hydrate")]
fn rejected(key: &str, err: &wasm_bindgen::JsValue) -> StoreError {
    StoreError::Rejected { key: key.to_owned(), reason: format!("{err:?}") }
}

#[cfg(feature = "hydrate")]
impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage.set_item(key, value).map_err(|e| rejected(key, &e))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.storage.remove_item(key).map_err(|e| rejected(key, &e))
    }
}

/// The device-local store preferences fall back to.
pub fn device_store() -> Rc<dyn KeyValueStore> {
    #[cfg(feature = "hydrate")]
    {
        if let Some(store) = LocalStorageStore::open() {
            return Rc::new(store);
        }
        log::warn!("localStorage unavailable, preferences will not outlive this page");
    }
    Rc::new(MemoryStore::new())
}

#[cfg(test)]
#[path = "local_store_test.rs"]
mod tests;
