//! HTTP source backed by a provider's list endpoint.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use orrery_catalog::auth::KeyringCredentialStore;
//! use orrery_catalog::registry::OPENAI;
//! use orrery_catalog::sources::LiveSource;
//!
//! let store = Arc::new(KeyringCredentialStore::new("orrery").with_env_fallback());
//! let source = LiveSource::new(OPENAI, store).with_base_url("http://localhost:8000/v1");
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use super::CatalogSource;
use crate::auth::{ApiKey, CredentialStore};
use crate::error::SourceError;
use crate::registry::ProviderProfile;
use crate::types::RawModel;

/// Fetches a provider's model list with a stored credential.
///
/// The credential is read from the injected store on every fetch, so keys
/// saved after construction are picked up.
pub struct LiveSource {
    id: String,
    profile: ProviderProfile,
    base_url: String,
    client: reqwest::Client,
    credentials: Arc<dyn CredentialStore>,
}

impl LiveSource {
    /// Create a live source for a provider, registered under the provider id.
    pub fn new(profile: ProviderProfile, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            id: profile.id.to_string(),
            base_url: profile.base_url.to_string(),
            profile,
            client: reqwest::Client::new(),
            credentials,
        }
    }

    /// Point at a different server speaking the same schema.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Register under a different source id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Get the base URL for this source.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of the list endpoint.
    pub fn list_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.profile.list_path
        )
    }

    /// Key under which the credential is stored.
    pub fn credential_key(&self) -> &str {
        self.profile.id
    }

    fn credential(&self) -> Option<ApiKey> {
        self.credentials
            .get(self.credential_key())
            .filter(|key| !key.is_blank())
    }
}

impl std::fmt::Debug for LiveSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveSource")
            .field("id", &self.id)
            .field("provider", &self.profile.id)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CatalogSource for LiveSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn provider_id(&self) -> &str {
        self.profile.id
    }

    fn requires_credential(&self) -> bool {
        true
    }

    fn credential_ready(&self) -> bool {
        self.credential().is_some()
    }

    async fn fetch(&self) -> Result<Vec<RawModel>, SourceError> {
        let Some(key) = self.credential() else {
            debug!(source = %self.id, "no usable credential, skipping request");
            return Err(SourceError::MissingCredential);
        };

        let url = self.list_url();
        debug!(source = %self.id, %url, "fetching model list");

        let mut request = self.profile.auth.apply(self.client.get(&url), key.expose_secret().trim());
        for (name, value) in self.profile.extra_headers {
            request = request.header(*name, *value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            debug!(source = %self.id, %status, "credential rejected");
            return Err(SourceError::MissingCredential);
        }
        if !status.is_success() {
            return Err(SourceError::RequestFailed(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let models = self
            .profile
            .schema
            .decode(&body)
            .map_err(|e| SourceError::Decoding(e.to_string()))?;

        debug!(source = %self.id, count = models.len(), "model list fetched");
        Ok(models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryCredentialStore;
    use crate::registry::{GEMINI, OPENAI};

    #[test]
    fn new_uses_profile_defaults() {
        let source = LiveSource::new(OPENAI, Arc::new(MemoryCredentialStore::new()));
        assert_eq!(source.id(), "openai");
        assert_eq!(source.provider_id(), "openai");
        assert_eq!(source.list_url(), "https://api.openai.com/v1/models");
        assert!(source.requires_credential());
    }

    #[test]
    fn with_base_url_trims_trailing_slash() {
        let source = LiveSource::new(GEMINI, Arc::new(MemoryCredentialStore::new()))
            .with_base_url("http://127.0.0.1:9000/");
        assert_eq!(source.list_url(), "http://127.0.0.1:9000/v1beta/models");
    }

    #[test]
    fn credential_ready_requires_non_blank_key() {
        let store = Arc::new(MemoryCredentialStore::with_key("openai", " \t "));
        let source = LiveSource::new(OPENAI, store.clone());
        assert!(!source.credential_ready());

        store.set("openai", "sk-live").unwrap();
        assert!(source.credential_ready());
    }

    #[test]
    fn debug_does_not_leak_credentials() {
        let store = Arc::new(MemoryCredentialStore::with_key("openai", "sk-very-secret"));
        let source = LiveSource::new(OPENAI, store);
        assert!(!format!("{source:?}").contains("sk-very-secret"));
    }

    #[tokio::test]
    async fn fetch_without_credential_fails_fast() {
        let source = LiveSource::new(OPENAI, Arc::new(MemoryCredentialStore::new()))
            .with_base_url("http://127.0.0.1:9");
        assert_eq!(source.fetch().await, Err(SourceError::MissingCredential));
    }
}
