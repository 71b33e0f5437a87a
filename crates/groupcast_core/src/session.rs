use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Storage key holding the session identifier.
pub const SESSION_KEY: &str = "wpp_auth_uuid";

/// Durable per-profile identifier correlating this client with backend session state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form for log lines; the full id doubles as a credential.
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(8).collect();
        format!("{prefix}…")
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("local storage unavailable: {0}")]
    Unavailable(String),
    #[error("local storage corrupted: {0}")]
    Corrupted(String),
}

/// String key-value capability backing the identity store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Volatile store; contents vanish with the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// Obtains or creates the session identifier in an injected store.
pub struct IdentityStore<S> {
    storage: S,
}

impl<S: KeyValueStore> IdentityStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Returns the stored id, generating and persisting one on first use.
    /// An empty stored value is treated as absent.
    pub fn get_or_create_session_id(&mut self) -> Result<SessionId, StorageError> {
        if let Some(existing) = self.storage.get(SESSION_KEY)? {
            if !existing.is_empty() {
                return Ok(SessionId(existing));
            }
        }
        let fresh = SessionId::generate();
        self.storage.set(SESSION_KEY, fresh.as_str())?;
        Ok(fresh)
    }

    pub fn into_inner(self) -> S {
        self.storage
    }
}
