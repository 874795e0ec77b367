//! Session-scoped key/value storage for popup state.
//!
//! The popup only needs string flags that live as long as the visitor's
//! browsing session. Production uses the `tower-sessions` session; tests use
//! [`MemoryStorage`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use thiserror::Error;
use tower_sessions::Session;

/// Errors from a session storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The session store rejected the operation.
    #[error("session store error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// The in-memory store lock was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Key/value storage scoped to one browsing session.
pub trait SessionStorage: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Remove a value. Removing a missing key is not an error and leaves the
    /// session unmodified.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

impl SessionStorage for Session {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(Self::get::<String>(self, key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.insert(key, value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        // `remove_value` marks the session modified even for absent keys.
        if self.get_value(key).await?.is_some() {
            self.remove_value(key).await?;
        }
        Ok(())
    }
}

/// In-process storage, one instance per simulated session.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the stored keys, sorted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Poisoned` if the lock was poisoned.
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        let values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        let mut keys: Vec<String> = values.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

impl SessionStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.remove(key);
        Ok(())
    }
}
