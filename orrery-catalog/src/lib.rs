//! Multi-provider AI model catalog.
//!
//! This crate provides:
//! - A canonical [`ModelRecord`] with derived category, flags and icon
//! - Pluggable catalog sources (mock fixtures and live provider APIs)
//! - Per-provider normalization from raw list payloads
//! - Pure filter, sort and group helpers over record lists
//! - A load state machine with credential gating and stale-fetch suppression
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 CatalogController                    │
//! │     Idle → Loading → Ready | Failed                  │
//! │     CredentialRequired (gated sources)               │
//! └─────────────────────────────────────────────────────┘
//!          │ fetch()                      │ normalize_all()
//!          ▼                              ▼
//! ┌──────────────────────┐   ┌──────────────────────────┐
//! │    CatalogSource     │   │     ProviderRegistry     │
//! │ ┌──────┐ ┌────────┐  │   │  openai  anthropic       │
//! │ │ Mock │ │  Live  │  │   │  gemini  mock            │
//! │ └──────┘ └────────┘  │   └──────────────────────────┘
//! └──────────────────────┘
//!              │
//!              ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                  CredentialStore                     │
//! │         (System Keyring + Env Fallback)             │
//! └─────────────────────────────────────────────────────┘
//! ```

mod error;
mod types;

pub mod auth;
pub mod controller;
pub mod query;
pub mod registry;
pub mod rules;
pub mod sources;

pub use controller::{
    CatalogController, CatalogSnapshot, CredentialEntry, CredentialPrompt, LoadOutcome,
    LoadStatus,
};
pub use error::{Error, Result, SourceError};
pub use query::{CatalogQuery, SortKey, filter_by_text, group_by_category, sort_by};
pub use registry::ProviderRegistry;
pub use sources::CatalogSource;
pub use types::{
    Category, DEFAULT_DESCRIPTION, DEFAULT_SHORT_DESCRIPTION, Icon, ModelFlags, ModelRecord,
    ModelRecordBuilder, RawModel,
};
