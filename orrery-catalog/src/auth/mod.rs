//! Credential storage for provider API keys.
//!
//! The catalog only ever reads credentials, through the [`CredentialStore`]
//! trait, so live sources can be handed an in-memory fake in tests and the
//! system keyring in production.
//!
//! # Example
//!
//! ```ignore
//! use orrery_catalog::auth::{CredentialStore, KeyringCredentialStore};
//!
//! let store = KeyringCredentialStore::new("orrery").with_env_fallback();
//!
//! // Store a key in the system keyring
//! store.set("openai", "sk-...")?;
//!
//! // Retrieve it (checks keyring first, then env vars)
//! let key = store.get("openai");
//! ```

mod keyring_store;

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};

pub use keyring_store::{CredentialSource, KeyringCredentialStore};
use crate::{Error, Result};

/// Provider API key. Zeroized on drop and never printed by `Debug`.
#[derive(Clone)]
pub struct ApiKey(SecretString);

impl ApiKey {
    /// Create a new API key from a string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(SecretString::from(key.into()))
    }

    /// The raw key, for attaching to an outgoing request.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }

    /// Whether the key is empty or only whitespace.
    pub fn is_blank(&self) -> bool {
        self.expose_secret().trim().is_empty()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey([REDACTED])")
    }
}

impl From<String> for ApiKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ApiKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Key-value store for API keys, keyed by provider id.
///
/// Implementations must tolerate concurrent reads.
pub trait CredentialStore: Send + Sync {
    /// Look up a credential. Absent keys return `None`.
    fn get(&self, key: &str) -> Option<ApiKey>;

    /// Store a credential.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Whether a non-blank credential is stored under `key`.
    fn has_usable(&self, key: &str) -> bool {
        self.get(key).is_some_and(|k| !k.is_blank())
    }
}

/// In-process store, mainly for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    keys: RwLock<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a single credential.
    pub fn with_key(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .keys
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        store
    }

    /// Remove a credential.
    pub fn remove(&self, key: &str) {
        self.keys
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Option<ApiKey> {
        self.keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map(|v| ApiKey::new(v.as_str()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(Error::InvalidApiKey);
        }
        self.keys
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Environment variable names for each provider.
const ENV_VARS: &[(&str, &str)] = &[
    ("openai", "OPENAI_API_KEY"),
    ("anthropic", "ANTHROPIC_API_KEY"),
    ("gemini", "GEMINI_API_KEY"),
];

/// Get the environment variable name for a provider.
pub fn env_var_for_provider(provider: &str) -> Option<&'static str> {
    ENV_VARS
        .iter()
        .find(|(p, _)| *p == provider)
        .map(|(_, v)| *v)
}
