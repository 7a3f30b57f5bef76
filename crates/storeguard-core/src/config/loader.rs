//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. Config file (~/.storeguard/storeguard.yaml)
//! 3. Environment variables (STOREGUARD_* prefix)

use crate::error::{Error, Result};
use crate::types::{MaxRetries, StoreConfig, StoreguardConfig};
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde::Deserialize;
use std::env;
use std::fs;

/// Name of the config file inside the config directory
pub const CONFIG_FILE_NAME: &str = "storeguard.yaml";

/// Environment variable overriding the default retry bound
pub const MAX_RETRIES_ENV: &str = "STOREGUARD_MAX_RETRIES";

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

/// Config file layer; absent keys leave the lower layer untouched
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ConfigLayer {
    #[serde(default)]
    default_max_retries: Option<MaxRetries>,
    #[serde(default)]
    stores: Vec<StoreConfig>,
}

/// Configuration hierarchy loader
pub struct ConfigLoader {
    /// Base directory for configuration files
    config_dir: Utf8PathBuf,
}

impl ConfigLoader {
    /// Create a loader rooted at ~/.storeguard
    pub fn new() -> Result<Self> {
        let config_dir = Self::default_config_dir()?;
        Ok(Self { config_dir })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self { config_dir }
    }

    fn default_config_dir() -> Result<Utf8PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::invalid_config("Could not determine home directory"))?;
        let home = Utf8PathBuf::from_path_buf(home)
            .map_err(|p| Error::invalid_config(format!("Non UTF-8 home directory: {}", p.display())))?;
        Ok(home.join(".storeguard"))
    }

    /// Load configuration with hierarchical precedence
    pub fn load(&self) -> Result<StoreguardConfig> {
        let mut config = Self::load_embedded_defaults()?;

        let path = self.config_file();
        if path.exists() {
            let layer = Self::read_layer(&path)?;
            config = Self::merge(config, layer);
        }

        config = Self::apply_env_overrides(config)?;
        config.validate()?;

        tracing::debug!(
            config_dir = %self.config_dir,
            stores = config.stores.len(),
            default_max_retries = %config.default_max_retries,
            "loaded storeguard configuration"
        );

        Ok(config)
    }

    /// Load a single config file on top of the embedded defaults
    ///
    /// Unlike [`load`](Self::load), a missing file is an error and the
    /// environment is not consulted.
    pub fn load_file(path: &Utf8Path) -> Result<StoreguardConfig> {
        if !path.exists() {
            return Err(Error::config_not_found(path.as_str()));
        }
        let config = Self::merge(Self::load_embedded_defaults()?, Self::read_layer(path)?);
        config.validate()?;
        Ok(config)
    }

    fn load_embedded_defaults() -> Result<StoreguardConfig> {
        let filename = "storeguard-defaults.yaml";
        let embedded_file = EmbeddedConfigs::get(filename).ok_or_else(|| {
            Error::config_not_found(format!("Embedded config not found: {}", filename))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!("Invalid UTF-8 in embedded config: {}", filename))
        })?;

        Ok(serde_yaml_ng::from_str(content)?)
    }

    fn read_layer(path: &Utf8Path) -> Result<ConfigLayer> {
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(ConfigLayer::default());
        }
        serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))
    }

    /// Overlay stores replace same-named base stores; new ones are appended
    fn merge(mut base: StoreguardConfig, overlay: ConfigLayer) -> StoreguardConfig {
        if let Some(max_retries) = overlay.default_max_retries {
            base.default_max_retries = max_retries;
        }
        for store in overlay.stores {
            match base.stores.iter_mut().find(|s| s.name == store.name) {
                Some(existing) => *existing = store,
                None => base.stores.push(store),
            }
        }
        base
    }

    fn apply_env_overrides(mut config: StoreguardConfig) -> Result<StoreguardConfig> {
        if let Ok(val) = env::var(MAX_RETRIES_ENV) {
            config.default_max_retries = val.parse().map_err(|_| {
                Error::invalid_config(format!(
                    "{} must be a non-negative integer or 'unbounded'",
                    MAX_RETRIES_ENV
                ))
            })?;
        }
        Ok(config)
    }

    /// Path of the config file this loader reads
    pub fn config_file(&self) -> Utf8PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}
