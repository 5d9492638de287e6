//! System keyring backend.

use std::env;

use tracing::debug;

use super::{ApiKey, CredentialStore, ENV_VARS, env_var_for_provider};
use crate::{Error, Result};

/// Where a credential was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Keyring,
    Environment,
}

/// Credentials in the OS keyring, one entry per provider under a shared
/// service name.
///
/// With [`with_env_fallback`](Self::with_env_fallback), lookups that miss
/// the keyring fall back to `<PROVIDER>_API_KEY` variables. Writes always go
/// to the keyring.
#[derive(Debug, Clone)]
pub struct KeyringCredentialStore {
    service: String,
    env_fallback: bool,
}

impl KeyringCredentialStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            env_fallback: false,
        }
    }

    /// Also read provider keys from the environment.
    pub fn with_env_fallback(mut self) -> Self {
        self.env_fallback = true;
        self
    }

    /// Remove a provider's keyring entry.
    ///
    /// Fails with `Error::CredentialsNotFound` when there is nothing to
    /// delete.
    pub fn delete(&self, provider: &str) -> Result<()> {
        self.entry(provider)?
            .delete_credential()
            .map_err(|e| match e {
                keyring::Error::NoEntry => Error::CredentialsNotFound(provider.to_string()),
                other => Error::Keyring(other.to_string()),
            })?;
        debug!(provider, "deleted API key from keyring");
        Ok(())
    }

    /// Known providers that currently have a credential, sorted.
    pub fn list_providers(&self) -> Vec<String> {
        let mut providers: Vec<String> = ENV_VARS
            .iter()
            .map(|(provider, _)| *provider)
            .filter(|provider| self.credential_source(provider).is_some())
            .map(str::to_string)
            .collect();
        providers.sort();
        providers
    }

    /// Where `provider`'s credential would be read from, if anywhere.
    pub fn credential_source(&self, provider: &str) -> Option<CredentialSource> {
        if self.from_keyring(provider).is_some() {
            Some(CredentialSource::Keyring)
        } else if self.from_env(provider).is_some() {
            Some(CredentialSource::Environment)
        } else {
            None
        }
    }

    fn entry(&self, provider: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(&self.service, provider).map_err(|e| Error::Keyring(e.to_string()))
    }

    fn from_keyring(&self, provider: &str) -> Option<ApiKey> {
        self.entry(provider)
            .ok()?
            .get_password()
            .ok()
            .map(ApiKey::new)
    }

    fn from_env(&self, provider: &str) -> Option<ApiKey> {
        if !self.env_fallback {
            return None;
        }
        env::var(env_var_for_provider(provider)?)
            .ok()
            .map(ApiKey::new)
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn get(&self, provider: &str) -> Option<ApiKey> {
        if let Some(key) = self.from_keyring(provider) {
            debug!(provider, "retrieved API key from keyring");
            return Some(key);
        }
        let key = self.from_env(provider)?;
        debug!(provider, "retrieved API key from environment");
        Some(key)
    }

    fn set(&self, provider: &str, key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::InvalidApiKey);
        }
        self.entry(provider)?
            .set_password(key)
            .map_err(|e| Error::Keyring(e.to_string()))?;
        debug!(provider, "stored API key in keyring");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const SERVICE: &str = "orrery-test-nonexistent";

    #[test]
    #[serial]
    fn without_fallback_ignores_environment() {
        unsafe {
            env::set_var("GEMINI_API_KEY", "from-env");
        }
        let store = KeyringCredentialStore::new(SERVICE);
        assert!(store.get("gemini").is_none());
        assert_eq!(store.credential_source("gemini"), None);
        unsafe {
            env::remove_var("GEMINI_API_KEY");
        }
    }

    #[test]
    #[serial]
    fn env_fallback_supplies_key() {
        unsafe {
            env::set_var("GEMINI_API_KEY", "from-env");
        }
        let store = KeyringCredentialStore::new(SERVICE).with_env_fallback();
        assert_eq!(store.get("gemini").unwrap().expose_secret(), "from-env");
        assert_eq!(
            store.credential_source("gemini"),
            Some(CredentialSource::Environment)
        );
        assert!(store.list_providers().contains(&"gemini".to_string()));
        unsafe {
            env::remove_var("GEMINI_API_KEY");
        }
    }

    #[test]
    fn unknown_provider_has_no_credential() {
        let store = KeyringCredentialStore::new(SERVICE).with_env_fallback();
        assert!(store.get("unknown-provider").is_none());
    }

    #[test]
    fn rejects_blank_set() {
        let store = KeyringCredentialStore::new(SERVICE);
        assert!(matches!(store.set("openai", "  "), Err(Error::InvalidApiKey)));
    }
}
