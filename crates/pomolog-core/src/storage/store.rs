//! Key-value persistence seam.
//!
//! The tracker keeps two JSON records in a [`Store`]: the timer state and
//! the session log. Reads of damaged records fall back to defaults and
//! writes are best-effort, so callers never see an error from here.

use std::cell::RefCell;
use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::StoreError;

pub const TIMER_STATE_KEY: &str = "timer_state";
pub const SESSION_LOG_KEY: &str = "session_log";

/// Durable string key-value storage.
pub trait Store {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn clear(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: Store + ?Sized> Store for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn clear(&self, key: &str) -> Result<(), StoreError> {
        (**self).clear(key)
    }
}

/// In-process store. Nothing survives the process; used by tests and as a
/// fallback when no database can be opened.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Read and decode a record. Missing, unreadable or undecodable records
/// yield `None`.
pub fn load_record<T: DeserializeOwned>(store: &impl Store, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!(key, error = %err, "failed to read record; using defaults");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, error = %err, "discarding unreadable record; using defaults");
            None
        }
    }
}

/// Encode and write a record.
pub fn save_record<T: Serialize>(store: &impl Store, key: &str, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &json)
}

/// [`save_record`], logging and dropping any failure. The in-memory value
/// stays authoritative; the next successful write supersedes a lost one.
pub fn persist<T: Serialize>(store: &impl Store, key: &str, value: &T) {
    if let Err(err) = save_record(store, key, value) {
        warn!(key, error = %err, "persisting record failed");
    }
}
