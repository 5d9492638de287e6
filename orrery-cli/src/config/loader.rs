use super::types::{
    CatalogConfig, MockConfig, OrreryConfig, RawCatalogConfig, RawMockConfig, RawOrreryConfig,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<OrreryConfig> {
        Self::load_layers(&[Self::user_config_path(), Self::project_config_path()])
    }

    /// Merge config files in order; later files override earlier ones.
    /// Missing files are skipped.
    pub fn load_layers(paths: &[PathBuf]) -> Result<OrreryConfig> {
        let mut raw = RawOrreryConfig::default();
        for path in paths {
            if let Some(layer) = Self::read_layer(path)? {
                raw = Self::merge_raw(raw, layer);
            }
        }
        Ok(Self::finalize(raw))
    }

    /// Get user config path (`$XDG_CONFIG_HOME/orrery/config.toml`)
    pub fn user_config_path() -> PathBuf {
        orrery_paths::user_config_file()
    }

    /// Get project config path
    /// Can be overridden with ORRERY_PROJECT_CONFIG_DIR env var (useful for isolated e2e tests)
    pub fn project_config_path() -> PathBuf {
        match std::env::var_os("ORRERY_PROJECT_CONFIG_DIR") {
            Some(dir) => PathBuf::from(dir).join(orrery_paths::CONFIG_FILE_NAME),
            None => orrery_paths::project_config_file(Path::new("")),
        }
    }

    fn read_layer(path: &Path) -> Result<Option<RawOrreryConfig>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let layer = toml::from_str(&contents)
            .with_context(|| format!("invalid config in {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config layer");
        Ok(Some(layer))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawOrreryConfig, overlay: RawOrreryConfig) -> RawOrreryConfig {
        let mut providers = base.providers;
        for (id, provider) in overlay.providers {
            let entry = providers.entry(id).or_default();
            if provider.base_url.is_some() {
                entry.base_url = provider.base_url;
            }
        }

        RawOrreryConfig {
            catalog: RawCatalogConfig {
                default_source: overlay
                    .catalog
                    .default_source
                    .or(base.catalog.default_source),
                sort: overlay.catalog.sort.or(base.catalog.sort),
            },
            mock: RawMockConfig {
                delay_ms: overlay.mock.delay_ms.or(base.mock.delay_ms),
                fail: overlay.mock.fail.or(base.mock.fail),
            },
            providers,
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawOrreryConfig) -> OrreryConfig {
        let defaults = CatalogConfig::default();
        OrreryConfig {
            catalog: CatalogConfig {
                default_source: raw
                    .catalog
                    .default_source
                    .unwrap_or(defaults.default_source),
                sort: raw.catalog.sort.unwrap_or(defaults.sort),
            },
            mock: MockConfig {
                delay_ms: raw.mock.delay_ms,
                fail: raw.mock.fail.unwrap_or(false),
            },
            providers: raw.providers,
        }
    }
}
