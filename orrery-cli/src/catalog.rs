//! Wires configuration, credentials and sources into a controller.

use std::sync::Arc;

use anyhow::{Result, bail};
use orrery_catalog::auth::{CredentialStore, KeyringCredentialStore};
use orrery_catalog::registry::{ANTHROPIC, GEMINI, OPENAI, ProviderProfile};
use orrery_catalog::sources::{LiveSource, MockSource};
use orrery_catalog::{CatalogController, CredentialPrompt, LoadOutcome, ProviderRegistry};
use std::time::Duration;
use tracing::debug;

use crate::config::{MockConfig, OrreryConfig};

/// Keyring service name credentials are stored under.
pub const KEYRING_SERVICE: &str = "orrery";

/// Providers reachable over HTTP, in the order they are registered.
pub const LIVE_PROVIDERS: [ProviderProfile; 3] = [OPENAI, ANTHROPIC, GEMINI];

/// Keyring-backed store that also reads `<PROVIDER>_API_KEY` variables.
pub fn credential_store() -> Arc<KeyringCredentialStore> {
    Arc::new(KeyringCredentialStore::new(KEYRING_SERVICE).with_env_fallback())
}

/// Controller with the mock source active and every live provider registered.
pub fn build_controller(
    config: &OrreryConfig,
    credentials: Arc<dyn CredentialStore>,
) -> CatalogController {
    let registry = Arc::new(ProviderRegistry::builtin());
    let controller = CatalogController::new(registry, Arc::new(mock_source(&config.mock)));

    LIVE_PROVIDERS.into_iter().fold(controller, |controller, profile| {
        let source = live_source(profile, config, Arc::clone(&credentials));
        controller.with_source(Arc::new(source))
    })
}

fn mock_source(config: &MockConfig) -> MockSource {
    let mut source = MockSource::new();
    if let Some(ms) = config.delay_ms {
        source = source.with_delay(Duration::from_millis(ms));
    }
    if config.fail {
        source = source.failing();
    }
    source
}

fn live_source(
    profile: ProviderProfile,
    config: &OrreryConfig,
    credentials: Arc<dyn CredentialStore>,
) -> LiveSource {
    let source = LiveSource::new(profile, credentials);
    match config.base_url(profile.id) {
        Some(url) => {
            debug!(provider = profile.id, url, "using configured base URL");
            source.with_base_url(url)
        }
        None => source,
    }
}

/// Make `source_id` active and load it.
///
/// When the source needs a credential and `prompt` is given, runs the prompt
/// once. Fails with the controller's status message on anything but a
/// successful load.
pub async fn load_source(
    controller: &CatalogController,
    source_id: &str,
    prompt: Option<&dyn CredentialPrompt>,
) -> Result<()> {
    let mut outcome = controller.switch_source(source_id).await?;

    if outcome == LoadOutcome::CredentialRequired
        && let Some(prompt) = prompt
    {
        outcome = controller.request_credential(prompt).await?;
        if controller.active_source_id() != source_id {
            bail!("Credential entry cancelled for '{source_id}'.");
        }
    }

    match outcome {
        LoadOutcome::Loaded { .. } | LoadOutcome::AlreadyLoaded => Ok(()),
        _ => {
            let message = controller
                .snapshot()
                .status_message()
                .unwrap_or_else(|| format!("Could not load '{source_id}'."));
            bail!(message)
        }
    }
}
