//! API credential management.

use std::sync::Arc;

use anyhow::{Result, bail};
use async_trait::async_trait;
use clap::Args;
use dialoguer::{Password, theme::ColorfulTheme};
use orrery_catalog::auth::{
    CredentialSource, CredentialStore, KeyringCredentialStore, env_var_for_provider,
};
use orrery_catalog::{CredentialEntry, CredentialPrompt};
use tracing::warn;

use crate::catalog::{LIVE_PROVIDERS, credential_store};

#[derive(Args, Debug)]
pub struct AuthArgs {
    /// Provider to configure (openai, anthropic, gemini)
    pub provider: Option<String>,

    /// List configured providers
    #[arg(long)]
    pub list: bool,

    /// Delete stored credentials
    #[arg(long)]
    pub delete: bool,
}

pub async fn run(args: AuthArgs) -> Result<()> {
    let store = credential_store();

    if args.list {
        list_providers(&store);
        return Ok(());
    }

    let Some(provider) = args.provider else {
        bail!("Provider required. Use --list to see configured providers.");
    };
    require_live_provider(&provider)?;

    if args.delete {
        match store.delete(&provider) {
            Ok(()) => println!("Credentials for '{provider}' deleted."),
            Err(orrery_catalog::Error::CredentialsNotFound(_)) => {
                println!("No credentials found for '{provider}'.")
            }
            Err(e) => bail!("Failed to delete credentials: {e}"),
        }
        return Ok(());
    }

    let key = tokio::task::spawn_blocking({
        let provider = provider.clone();
        move || prompt_for_key(&provider)
    })
    .await??;
    store.set(&provider, &key)?;
    println!("Credentials for '{provider}' saved to keyring.");
    Ok(())
}

fn list_providers(store: &KeyringCredentialStore) {
    let providers = store.list_providers();
    if providers.is_empty() {
        println!("No API credentials configured.");
        println!();
        println!("Configure credentials with: orrery auth <provider>");
        return;
    }

    println!("Configured providers:");
    println!();
    for provider in providers {
        let origin = match store.credential_source(&provider) {
            Some(CredentialSource::Keyring) => "(keyring)",
            Some(CredentialSource::Environment) => "(environment)",
            None => "",
        };
        println!("  {provider} {origin}");
    }
}

fn require_live_provider(provider: &str) -> Result<()> {
    if LIVE_PROVIDERS.iter().any(|p| p.id == provider) {
        return Ok(());
    }
    let known: Vec<&str> = LIVE_PROVIDERS.iter().map(|p| p.id).collect();
    bail!(
        "Unknown provider '{provider}'. Valid: {}",
        known.join(", ")
    )
}

/// Blocking password prompt for one provider's key.
fn prompt_for_key(provider: &str) -> Result<String> {
    println!("Enter API key for {provider}{}", env_hint(provider));

    let key = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("API key")
        .interact()?;

    if key.trim().is_empty() {
        bail!("API key cannot be empty");
    }
    Ok(key)
}

fn env_hint(provider: &str) -> String {
    env_var_for_provider(provider)
        .map(|var| format!(" (or set {var})"))
        .unwrap_or_default()
}

/// Terminal credential prompt used when a listed source has no key.
pub struct KeyringPrompt {
    store: Arc<KeyringCredentialStore>,
}

impl KeyringPrompt {
    pub fn new(store: Arc<KeyringCredentialStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CredentialPrompt for KeyringPrompt {
    async fn request(&self, source_id: &str) -> CredentialEntry {
        let provider = source_id.to_string();
        let key = match tokio::task::spawn_blocking(move || prompt_for_key(&provider)).await {
            Ok(Ok(key)) => key,
            Ok(Err(e)) => {
                warn!(source = source_id, error = %e, "credential prompt aborted");
                return CredentialEntry::Cancelled;
            }
            Err(e) => {
                warn!(source = source_id, error = %e, "credential prompt task failed");
                return CredentialEntry::Cancelled;
            }
        };

        match self.store.set(source_id, &key) {
            Ok(()) => CredentialEntry::Saved,
            Err(e) => {
                warn!(source = source_id, error = %e, "failed to save credential");
                CredentialEntry::Cancelled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_hints_for_known_providers() {
        assert_eq!(env_hint("openai"), " (or set OPENAI_API_KEY)");
        assert_eq!(env_hint("gemini"), " (or set GEMINI_API_KEY)");
        assert_eq!(env_hint("mock"), "");
    }

    #[test]
    fn only_live_providers_take_credentials() {
        assert!(require_live_provider("anthropic").is_ok());
        let err = require_live_provider("mock").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown provider 'mock'. Valid: openai, anthropic, gemini"
        );
    }
}
