//! Agent records as produced by network backends.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DiscoveryError;

/// Identifier of one independently queryable network (an EVM chain id).
///
/// `NetworkId(0)` is the zero value used when a record carries no network.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NetworkId(pub u64);

impl NetworkId {
    pub const fn new(id: u64) -> Self {
        NetworkId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for NetworkId {
    fn from(id: u64) -> Self {
        NetworkId(id)
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NetworkId {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(NetworkId)
            .map_err(|_| DiscoveryError::InvalidNetworkId(s.to_string()))
    }
}

/// Global agent identifier in `"<networkId>:<localId>"` form, e.g. `11155111:42`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgentId {
    pub network_id: NetworkId,
    pub local_id: String,
}

impl AgentId {
    pub fn new(network_id: NetworkId, local_id: impl Into<String>) -> Self {
        Self {
            network_id,
            local_id: local_id.into(),
        }
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.network_id, self.local_id)
    }
}

impl FromStr for AgentId {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (network, local) = s
            .split_once(':')
            .ok_or_else(|| DiscoveryError::InvalidAgentId(s.to_string()))?;
        if local.is_empty() {
            return Err(DiscoveryError::InvalidAgentId(s.to_string()));
        }
        let network_id = network
            .parse::<NetworkId>()
            .map_err(|_| DiscoveryError::InvalidAgentId(s.to_string()))?;
        Ok(AgentId::new(network_id, local))
    }
}

impl Serialize for AgentId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AgentId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Protocol endpoints an agent advertises.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub mcp: bool,
    pub a2a: bool,
}

/// Tag sets matched with "contains all" semantics by the merger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TagSets {
    pub a2a_skills: Vec<String>,
    pub mcp_tools: Vec<String>,
    pub mcp_prompts: Vec<String>,
    pub mcp_resources: Vec<String>,
    pub supported_trusts: Vec<String>,
}

/// One discovered agent.
///
/// Produced by a backend adapter and treated as immutable by the engine; the
/// reputation path only adds `averageScore` and `feedbackCount` to `extras`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRecord {
    pub network_id: NetworkId,
    pub local_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub owners: Vec<String>,
    #[serde(default)]
    pub operators: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ens: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub did: Option<String>,
    #[serde(default)]
    pub capabilities: Capabilities,
    #[serde(default)]
    pub tags: TagSets,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub x402_support: bool,
    /// Registration time in unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
    #[serde(default)]
    pub extras: serde_json::Map<String, serde_json::Value>,
}

impl EntityRecord {
    /// Minimal record with every optional attribute empty.
    pub fn new(network_id: NetworkId, local_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            network_id,
            local_id: local_id.into(),
            name: name.into(),
            description: String::new(),
            image: None,
            owners: Vec::new(),
            operators: Vec::new(),
            wallet_address: None,
            ens: None,
            did: None,
            capabilities: Capabilities::default(),
            tags: TagSets::default(),
            active: false,
            x402_support: false,
            created_at: None,
            extras: serde_json::Map::new(),
        }
    }

    pub fn agent_id(&self) -> AgentId {
        AgentId::new(self.network_id, self.local_id.clone())
    }

    /// `extras.averageScore`, present only on reputation results.
    pub fn average_score(&self) -> Option<f64> {
        self.extras.get("averageScore").and_then(|v| v.as_f64())
    }
}
