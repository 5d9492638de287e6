use std::collections::BTreeMap;

use orrery_catalog::SortKey;
use serde::{Deserialize, Serialize};

/// Source selected when neither the command line nor config names one.
pub const DEFAULT_SOURCE: &str = "mock";

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawOrreryConfig {
    #[serde(default)]
    pub catalog: RawCatalogConfig,

    #[serde(default)]
    pub mock: RawMockConfig,

    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawCatalogConfig {
    pub default_source: Option<String>,
    pub sort: Option<SortKey>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawMockConfig {
    pub delay_ms: Option<u64>,
    pub fail: Option<bool>,
}

/// Per-provider overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Alternative server speaking the provider's list schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Default)]
pub struct OrreryConfig {
    pub catalog: CatalogConfig,
    pub mock: MockConfig,
    pub providers: BTreeMap<String, ProviderConfig>,
}

impl OrreryConfig {
    /// Base URL override for a provider, if configured.
    pub fn base_url(&self, provider_id: &str) -> Option<&str> {
        self.providers
            .get(provider_id)
            .and_then(|p| p.base_url.as_deref())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogConfig {
    /// Source loaded by `models list` without `--source`
    pub default_source: String,

    /// Ordering applied when `--sort` is absent
    pub sort: SortKey,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_source: DEFAULT_SOURCE.to_string(),
            sort: SortKey::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct MockConfig {
    /// Fixed latency; random jitter when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,

    /// Fail every fetch
    pub fail: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = OrreryConfig::default();
        assert_eq!(config.catalog.default_source, "mock");
        assert_eq!(config.catalog.sort, SortKey::NameAscending);
        assert!(config.mock.delay_ms.is_none());
        assert!(!config.mock.fail);
        assert!(config.providers.is_empty());
    }

    #[test]
    fn test_raw_config_partial_parsing() {
        let toml_str = r#"
[catalog]
sort = "newest"

[providers.openai]
base_url = "http://localhost:8080/v1"
"#;
        let raw: RawOrreryConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(raw.catalog.sort, Some(SortKey::DateNewest));
        assert!(raw.catalog.default_source.is_none());
        assert!(raw.mock.delay_ms.is_none());
        assert_eq!(
            raw.providers["openai"].base_url.as_deref(),
            Some("http://localhost:8080/v1")
        );
    }

    #[test]
    fn test_raw_config_empty_uses_none() {
        let raw: RawOrreryConfig = toml::from_str("").unwrap();
        assert!(raw.catalog.default_source.is_none());
        assert!(raw.catalog.sort.is_none());
        assert!(raw.mock.fail.is_none());
    }

    #[test]
    fn test_unknown_sort_key_is_rejected() {
        let result: Result<RawOrreryConfig, _> = toml::from_str("[catalog]\nsort = \"sideways\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result: Result<RawOrreryConfig, _> = toml::from_str("[mock]\ndelay = 5\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_serializes_to_toml() {
        let mut config = OrreryConfig::default();
        config.providers.insert(
            "gemini".to_string(),
            ProviderConfig {
                base_url: Some("http://127.0.0.1:9000".to_string()),
            },
        );

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("default_source = \"mock\""));
        assert!(toml_str.contains("sort = \"name\""));
        assert!(toml_str.contains("[providers.gemini]"));
        assert_eq!(config.base_url("gemini"), Some("http://127.0.0.1:9000"));
        assert_eq!(config.base_url("openai"), None);
    }
}
