//! Browser `localStorage` store

use crate::error::{Result, StoreError};
use crate::store::KeyValueStore;
use wasm_bindgen::JsValue;
use web_sys::Storage;

/// [`KeyValueStore`] backed by `window.localStorage`
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    storage: Storage,
}

impl LocalStorageStore {
    /// Open the window's local storage
    pub fn open() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| StoreError::Backend("no window".into()))?;
        let storage = window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| StoreError::Backend("localStorage unavailable".into()))?;
        Ok(Self { storage })
    }
}

fn js_error(value: JsValue) -> StoreError {
    StoreError::Backend(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage.get_item(key).map_err(js_error)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.storage.set_item(key, value).map_err(js_error)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.storage.remove_item(key).map_err(js_error)
    }
}
