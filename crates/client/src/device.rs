//! Pseudonymous device identity.
//!
//! A device id is generated once per browser/device and sent with every
//! comment and like request so the server can answer "has this device
//! already liked X" without accounts. It is weak and trivially spoofable;
//! treat it as a convenience scope, never as a security boundary.

use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

const DEVICE_ID_KEY: &str = "comment_device_id";

/// Scoped key-value persistence for the generate-once-reuse pattern.
/// Embedders back this with whatever local storage they have.
pub trait DeviceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// Returns the stored device id, creating and persisting one on first use.
pub fn device_id(store: &dyn DeviceStore) -> String {
    if let Some(existing) = store.get(DEVICE_ID_KEY) {
        if !existing.is_empty() {
            return existing;
        }
    }
    let fresh = Uuid::new_v4().to_string();
    store.set(DEVICE_ID_KEY, &fresh);
    fresh
}

/// In-memory store for tests and non-persistent embedders.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeviceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_once_then_reused() {
        let store = MemoryStore::new();
        let first = device_id(&store);
        let second = device_id(&store);
        assert_eq!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
    }

    #[test]
    fn distinct_stores_get_distinct_ids() {
        let a = device_id(&MemoryStore::new());
        let b = device_id(&MemoryStore::new());
        assert_ne!(a, b);
    }
}
