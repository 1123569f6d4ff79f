//! CLI config file: engine settings plus one snapshot file per network.
//!
//! ```toml
//! default_network = 84532
//! per_network_timeout_ms = 5000
//!
//! [[networks]]
//! id = 84532
//! name = "base-sepolia"
//! snapshot = "snapshots/base-sepolia.json"
//! ```
//!
//! Relative snapshot paths resolve against the config file's directory.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use chainscout_core::{load_snapshot, DiscoveryConfig, NetworkId, StaticRegistry};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    #[serde(flatten)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub networks: Vec<NetworkEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NetworkEntry {
    pub id: NetworkId,
    #[serde(default)]
    pub name: Option<String>,
    pub snapshot: PathBuf,
}

impl CliConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).context("Invalid config file")?;
        config.discovery.validate()?;

        let mut seen = BTreeSet::new();
        for entry in &config.networks {
            if !seen.insert(entry.id) {
                bail!("network {} is configured more than once", entry.id);
            }
        }
        Ok(config)
    }

    /// Read `path`, resolve snapshot paths and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut config = Self::from_toml_str(&raw)?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for entry in &mut config.networks {
            if entry.snapshot.is_relative() {
                entry.snapshot = base.join(&entry.snapshot);
            }
        }

        config.discovery = config.discovery.from_env_overrides()?;
        Ok(config)
    }

    /// Load every snapshot into a registry.
    pub fn build_registry(&self) -> Result<StaticRegistry> {
        let mut registry = StaticRegistry::new();
        for entry in &self.networks {
            let backend = load_snapshot(entry.id, &entry.snapshot).with_context(|| {
                format!(
                    "Failed to load snapshot for network {} from {}",
                    entry.id,
                    entry.snapshot.display()
                )
            })?;
            registry.register(entry.id, Arc::new(backend));
        }
        Ok(registry)
    }
}
