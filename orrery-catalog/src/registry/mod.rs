//! Provider registry.
//!
//! Maps a provider id to everything needed to talk to it and to make sense
//! of its answers: list endpoint, auth scheme, wire schema, category rules
//! and the provider's normalize function.
//!
//! # Example
//!
//! ```
//! use orrery_catalog::registry::ProviderRegistry;
//! use orrery_catalog::{Category, RawModel};
//!
//! let registry = ProviderRegistry::builtin();
//! let record = registry.normalize(&RawModel::new("imagen-3.0-generate-002"), "gemini", 0);
//! assert_eq!(record.category(), Category::Vision);
//! ```

mod normalize;
mod wire;

use std::collections::HashMap;

use reqwest::RequestBuilder;
use tracing::warn;

pub use normalize::{
    NormalizeFn, normalize_anthropic, normalize_gemini, normalize_generic, normalize_openai,
};
pub use wire::ListSchema;

use crate::rules::CategoryRules;
use crate::types::{ModelRecord, RawModel};
use crate::{Error, Result};

/// How a provider expects the API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// The raw key in a named header.
    Header(&'static str),
}

impl AuthScheme {
    /// Attach the credential to a request.
    pub fn apply(&self, request: RequestBuilder, key: &str) -> RequestBuilder {
        match self {
            AuthScheme::Bearer => request.bearer_auth(key),
            AuthScheme::Header(name) => request.header(*name, key),
        }
    }
}

/// Static description of one model provider.
#[derive(Debug, Clone, Copy)]
pub struct ProviderProfile {
    /// Registry key; also the credential key and the records' `provider_id`.
    pub id: &'static str,
    /// Human-readable provider name.
    pub name: &'static str,
    pub base_url: &'static str,
    /// Path of the list endpoint, appended to the base URL.
    pub list_path: &'static str,
    pub auth: AuthScheme,
    /// Headers sent with every request besides the credential.
    pub extra_headers: &'static [(&'static str, &'static str)],
    pub schema: ListSchema,
    pub rules: CategoryRules,
    pub normalize: NormalizeFn,
}

const GEMINI_RULES: CategoryRules = CategoryRules {
    featured: &["gemini-2.5-pro", "gemini-2.5-flash", "gemini-2.0-flash"],
    vision: &["imagen", "veo"],
    chat: &["gemini", "gemma"],
};

/// OpenAI's public API.
pub const OPENAI: ProviderProfile = ProviderProfile {
    id: "openai",
    name: "OpenAI",
    base_url: "https://api.openai.com/v1",
    list_path: "/models",
    auth: AuthScheme::Bearer,
    extra_headers: &[],
    schema: ListSchema::OpenAi,
    rules: CategoryRules {
        featured: &["gpt-4o", "gpt-4.1", "o3"],
        vision: &["dall-e", "sora", "gpt-image"],
        chat: &["gpt", "o1", "o3", "o4"],
    },
    normalize: normalize_openai,
};

/// Anthropic's public API.
pub const ANTHROPIC: ProviderProfile = ProviderProfile {
    id: "anthropic",
    name: "Anthropic",
    base_url: "https://api.anthropic.com",
    list_path: "/v1/models",
    auth: AuthScheme::Header("x-api-key"),
    extra_headers: &[("anthropic-version", "2023-06-01")],
    schema: ListSchema::Anthropic,
    rules: CategoryRules {
        // `/v1/models` lists dated snapshot ids, never the aliases.
        featured: &["claude-opus-4-1-20250805", "claude-sonnet-4-5-20250929"],
        vision: &[],
        chat: &["claude"],
    },
    normalize: normalize_anthropic,
};

/// Google's Gemini API.
pub const GEMINI: ProviderProfile = ProviderProfile {
    id: "gemini",
    name: "Google Gemini",
    base_url: "https://generativelanguage.googleapis.com",
    list_path: "/v1beta/models",
    auth: AuthScheme::Header("x-goog-api-key"),
    extra_headers: &[],
    schema: ListSchema::Gemini,
    rules: GEMINI_RULES,
    normalize: normalize_gemini,
};

/// Offline fixtures. Never fetched over HTTP; shares Gemini's rules.
pub const MOCK: ProviderProfile = ProviderProfile {
    id: "mock",
    name: "Mock",
    base_url: "http://localhost",
    list_path: "/models",
    auth: AuthScheme::Bearer,
    extra_headers: &[],
    schema: ListSchema::OpenAi,
    rules: GEMINI_RULES,
    normalize: normalize_gemini,
};

/// Lookup map from provider id to profile.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    profiles: HashMap<String, ProviderProfile>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in provider.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for profile in [OPENAI, ANTHROPIC, GEMINI, MOCK] {
            registry.register(profile);
        }
        registry
    }

    /// Add or replace a provider profile.
    pub fn register(&mut self, profile: ProviderProfile) {
        self.profiles.insert(profile.id.to_string(), profile);
    }

    /// Get a provider profile by id.
    pub fn get(&self, provider_id: &str) -> Option<&ProviderProfile> {
        self.profiles.get(provider_id)
    }

    /// Get a provider profile, or `Error::ProviderNotFound`.
    pub fn require(&self, provider_id: &str) -> Result<&ProviderProfile> {
        self.get(provider_id)
            .ok_or_else(|| Error::ProviderNotFound(provider_id.to_string()))
    }

    /// Registered provider ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Normalize one raw model with the provider's registered function.
    ///
    /// Unknown providers fall back to schema-only mapping with generic rules.
    pub fn normalize(&self, raw: &RawModel, provider_id: &str, fetched_at: i64) -> ModelRecord {
        match self.get(provider_id) {
            Some(profile) => (profile.normalize)(raw, provider_id, &profile.rules, fetched_at),
            None => normalize_generic(raw, provider_id, &CategoryRules::GENERIC, fetched_at),
        }
    }

    /// Normalize a whole fetch result.
    ///
    /// Duplicate ids are a data error in the source. Each one is logged and
    /// the last-seen record wins, taking the slot of the first occurrence.
    pub fn normalize_all(
        &self,
        raws: &[RawModel],
        provider_id: &str,
        fetched_at: i64,
    ) -> Vec<ModelRecord> {
        let mut slots: HashMap<String, usize> = HashMap::with_capacity(raws.len());
        let mut records: Vec<ModelRecord> = Vec::with_capacity(raws.len());

        for raw in raws {
            let record = self.normalize(raw, provider_id, fetched_at);
            match slots.get(&record.id) {
                Some(&slot) => {
                    warn!(
                        provider = provider_id,
                        id = %record.id,
                        "duplicate model id in fetch result, keeping last"
                    );
                    records[slot] = record;
                }
                None => {
                    slots.insert(record.id.clone(), records.len());
                    records.push(record);
                }
            }
        }

        records
    }
}
