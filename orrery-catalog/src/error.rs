//! Error types for the model catalog.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur outside a single fetch attempt.
#[derive(Debug, Error)]
pub enum Error {
    /// Source not registered with the controller.
    #[error("source not found: {0}")]
    SourceNotFound(String),

    /// Provider not found in registry.
    #[error("provider not found: {0}")]
    ProviderNotFound(String),

    /// Credentials not found for provider.
    #[error("credentials not found for provider: {0}")]
    CredentialsNotFound(String),

    /// Failed to access system keyring.
    #[error("keyring error: {0}")]
    Keyring(String),

    /// Blank or otherwise unusable API key.
    #[error("invalid API key format")]
    InvalidApiKey,

    /// Operation not permitted in the controller's current state.
    #[error("invalid state: expected {expected}, was {actual}")]
    InvalidState { expected: String, actual: String },

    /// A fetch attempt failed.
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Why a single `fetch()` attempt failed.
///
/// Every variant is terminal for the attempt but never for the controller:
/// it moves to `Failed` and keeps the error around as `last_error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// No usable credential, or the provider rejected it (401/403).
    #[error("missing or rejected credential")]
    MissingCredential,

    /// Provider answered with a non-success status.
    #[error("request failed with status {0}")]
    RequestFailed(u16),

    /// Transport-level failure before a response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// Response body did not match the provider's list schema.
    #[error("decoding error: {0}")]
    Decoding(String),

    /// Simulated failure from the mock source.
    #[error("simulated fetch failure")]
    FetchFailed,
}

impl SourceError {
    /// Message suitable for showing to an end user.
    ///
    /// Never includes raw transport text.
    pub fn user_message(&self) -> String {
        match self {
            SourceError::MissingCredential => {
                "Credential required: add an API key for this source.".to_string()
            }
            SourceError::RequestFailed(status) => {
                format!("Request failed with HTTP status {status}.")
            }
            SourceError::Network(_) => {
                "Network error: could not reach the model provider.".to_string()
            }
            SourceError::Decoding(_) => "Unexpected response from the model provider.".to_string(),
            SourceError::FetchFailed => "Simulated fetch failure.".to_string(),
        }
    }

    /// Whether retrying with the same credential could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SourceError::MissingCredential)
    }
}
