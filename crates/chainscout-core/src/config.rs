//! Engine configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config.
//! Environment overrides are applied on top of whatever was loaded.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{DiscoveryError, NetworkId, Result};
use crate::merge::DedupPolicy;

/// Overrides [`DiscoveryConfig::default_network`].
pub const DEFAULT_NETWORK_ENV: &str = "CHAINSCOUT_DEFAULT_NETWORK";
/// Overrides [`DiscoveryConfig::per_network_timeout_ms`].
pub const TIMEOUT_MS_ENV: &str = "CHAINSCOUT_TIMEOUT_MS";

/// Tunables for the search orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Network searched when the caller names none (Sepolia).
    pub default_network: NetworkId,

    /// Upper bound on one network's fetch before it is reported as timed out.
    pub per_network_timeout_ms: u64,

    /// Page size used by callers that do not pick one.
    pub default_page_size: usize,

    /// Largest page size accepted; larger requests are rejected.
    pub max_page_size: usize,

    /// Multi-network searches fetch `overfetch_factor * page_size` records
    /// per network at offset 0 before merging. Pages past that window can
    /// miss records from a network that alone holds more matches.
    pub overfetch_factor: usize,

    /// Page size for each feedback fetch in a reputation join. The join keeps
    /// paging until a short page comes back or `max_feedback_records` is hit.
    pub feedback_fetch_limit: usize,

    /// Most feedback records one network contributes to a reputation join.
    /// Past this, averages are computed from a prefix and a warning is logged.
    pub max_feedback_records: usize,

    /// Most agents one network contributes to an unfiltered reputation join.
    /// Agents past this are left out and a warning is logged.
    pub reputation_entity_limit: usize,

    /// Cross-network duplicate handling.
    pub dedupe: DedupPolicy,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            default_network: NetworkId(11155111),
            per_network_timeout_ms: 30_000,
            default_page_size: 50,
            max_page_size: 500,
            overfetch_factor: 3,
            feedback_fetch_limit: 1000,
            max_feedback_records: 100_000,
            reputation_entity_limit: 10_000,
            dedupe: DedupPolicy::None,
        }
    }
}

impl DiscoveryConfig {
    pub fn with_default_network(mut self, network: NetworkId) -> Self {
        self.default_network = network;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.per_network_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_page_sizes(mut self, default: usize, max: usize) -> Self {
        self.default_page_size = default;
        self.max_page_size = max;
        self
    }

    pub fn with_overfetch_factor(mut self, factor: usize) -> Self {
        self.overfetch_factor = factor.max(1);
        self
    }

    pub fn with_feedback_fetch_limit(mut self, limit: usize) -> Self {
        self.feedback_fetch_limit = limit;
        self
    }

    pub fn with_max_feedback_records(mut self, max: usize) -> Self {
        self.max_feedback_records = max;
        self
    }

    pub fn with_reputation_entity_limit(mut self, limit: usize) -> Self {
        self.reputation_entity_limit = limit;
        self
    }

    pub fn with_dedupe(mut self, dedupe: DedupPolicy) -> Self {
        self.dedupe = dedupe;
        self
    }

    pub fn per_network_timeout(&self) -> Duration {
        Duration::from_millis(self.per_network_timeout_ms)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| DiscoveryError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DiscoveryError::Config(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "loading discovery config");
        Self::from_toml_str(&raw)
    }

    /// Apply [`DEFAULT_NETWORK_ENV`] and [`TIMEOUT_MS_ENV`] from the process
    /// environment.
    pub fn from_env_overrides(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(DEFAULT_NETWORK_ENV) {
            self.default_network = raw
                .parse()
                .map_err(|_| DiscoveryError::Config(format!("{DEFAULT_NETWORK_ENV}={raw} is not a network id")))?;
        }
        if let Some(raw) = lookup(TIMEOUT_MS_ENV) {
            self.per_network_timeout_ms = raw
                .trim()
                .parse()
                .map_err(|_| DiscoveryError::Config(format!("{TIMEOUT_MS_ENV}={raw} is not a millisecond count")))?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject page and overfetch settings the orchestrator cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.max_page_size == 0 {
            return Err(DiscoveryError::Config("max_page_size must be at least 1".into()));
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(DiscoveryError::Config(format!(
                "default_page_size {} must be between 1 and max_page_size {}",
                self.default_page_size, self.max_page_size
            )));
        }
        if self.overfetch_factor == 0 {
            return Err(DiscoveryError::Config("overfetch_factor must be at least 1".into()));
        }
        if self.feedback_fetch_limit == 0 || self.reputation_entity_limit == 0 {
            return Err(DiscoveryError::Config(
                "feedback_fetch_limit and reputation_entity_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
