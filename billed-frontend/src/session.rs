//! Session accessor over an injected key-value storage.
//!
//! Controllers never read ambient storage; they receive a [`Session`] at
//! construction and ask it for the signed-in user.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;

use crate::models::SessionUser;

/// Storage key holding the JSON-encoded [`SessionUser`].
pub const USER_KEY: &str = "user";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No user is signed in")]
    NotSignedIn,

    #[error("Stored user is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Signed-in user has no email")]
    MissingEmail,
}

/// String key-value persistence, shaped like the browser's `localStorage`.
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: String);
    fn remove_item(&self, key: &str);
    fn clear(&self);
}

/// Process-local storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: String) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    fn remove_item(&self, key: &str) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    fn clear(&self) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[derive(Clone)]
pub struct Session {
    storage: Arc<dyn KeyValueStorage>,
}

impl Session {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    pub fn user(&self) -> Result<SessionUser, SessionError> {
        let raw = self
            .storage
            .get_item(USER_KEY)
            .ok_or(SessionError::NotSignedIn)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Email of the signed-in user.
    pub fn email(&self) -> Result<String, SessionError> {
        self.user()?.email.ok_or(SessionError::MissingEmail)
    }

    pub fn sign_in(&self, user: &SessionUser) -> Result<(), SessionError> {
        let raw = serde_json::to_string(user)?;
        self.storage.set_item(USER_KEY, raw);
        Ok(())
    }

    /// Drops everything the front-end persisted for this user.
    pub fn sign_out(&self) {
        self.storage.clear();
    }
}
