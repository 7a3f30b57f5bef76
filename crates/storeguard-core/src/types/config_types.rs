//! Configuration file types (storeguard.yaml)

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::types::{MaxRetries, StoreIdentity};

/// Complete storeguard configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StoreguardConfig {
    /// Retry bound for stores that do not set their own
    #[serde(default)]
    pub default_max_retries: MaxRetries,

    /// Declared stores
    #[serde(default)]
    pub stores: Vec<StoreConfig>,
}

/// A single declared store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StoreConfig {
    /// Store name (required)
    pub name: String,

    /// Optional scope within the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Retry bound override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<MaxRetries>,
}

impl StoreguardConfig {
    /// Check store declarations: names non-empty and unique
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for store in &self.stores {
            if store.name.is_empty() {
                return Err(Error::EmptyStoreName);
            }
            if !seen.insert(store.name.as_str()) {
                return Err(Error::duplicate_store(&store.name));
            }
        }
        Ok(())
    }

    /// Look up a declared store
    pub fn store(&self, name: &str) -> Option<&StoreConfig> {
        self.stores.iter().find(|s| s.name == name)
    }

    /// Resolve a declared store into a facade identity
    pub fn identity(&self, name: &str) -> Result<StoreIdentity> {
        let store = self.store(name).ok_or_else(|| Error::unknown_store(name))?;
        store.identity(self.default_max_retries)
    }
}

impl StoreConfig {
    /// Build the identity, using `default_max_retries` when no override is set
    pub fn identity(&self, default_max_retries: MaxRetries) -> Result<StoreIdentity> {
        let mut identity = StoreIdentity::new(&self.name)?
            .with_max_retries(self.max_retries.unwrap_or(default_max_retries));
        if let Some(scope) = &self.scope {
            identity = identity.with_scope(scope);
        }
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
default-max-retries: 3
stores:
  - name: PlayerData
  - name: Leaderboard
    scope: weekly
    max-retries: unbounded
"#;

    #[test]
    fn test_parse_sample() {
        let config: StoreguardConfig = serde_yaml_ng::from_str(SAMPLE).unwrap();
        assert_eq!(config.default_max_retries, MaxRetries::Bounded(3));
        assert_eq!(config.stores.len(), 2);
        config.validate().unwrap();
    }

    #[test]
    fn test_identity_falls_back_to_default() {
        let config: StoreguardConfig = serde_yaml_ng::from_str(SAMPLE).unwrap();

        let player = config.identity("PlayerData").unwrap();
        assert_eq!(player.max_retries(), MaxRetries::Bounded(3));
        assert_eq!(player.store().scope(), None);

        let board = config.identity("Leaderboard").unwrap();
        assert_eq!(board.max_retries(), MaxRetries::Unbounded);
        assert_eq!(board.store().scope(), Some("weekly"));
    }

    #[test]
    fn test_unknown_store() {
        let config = StoreguardConfig::default();
        assert!(matches!(
            config.identity("Missing"),
            Err(Error::UnknownStore { .. })
        ));
    }

    #[test]
    fn test_duplicate_store_rejected() {
        let config: StoreguardConfig = serde_yaml_ng::from_str(
            "stores:\n  - name: A\n  - name: A\n",
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(Error::DuplicateStore { .. })
        ));
    }

    #[test]
    fn test_empty_store_name_rejected() {
        let config: StoreguardConfig =
            serde_yaml_ng::from_str("stores:\n  - name: \"\"\n").unwrap();
        assert!(matches!(config.validate(), Err(Error::EmptyStoreName)));
    }
}
