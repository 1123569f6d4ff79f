//! JSON snapshot files as backends.
//!
//! A snapshot is one network's registry dump:
//! `{ "agents": [EntityRecord...], "feedback": [FeedbackRecord...] }`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::backend::MemoryBackend;
use crate::domain::{EntityRecord, FeedbackRecord, NetworkId, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub agents: Vec<EntityRecord>,
    pub feedback: Vec<FeedbackRecord>,
}

impl Snapshot {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Convert into a backend serving `network_id`. Agents are stamped with
    /// that network so a snapshot file can be reused across networks.
    pub fn into_backend(self, network_id: NetworkId) -> MemoryBackend {
        let agents = self
            .agents
            .into_iter()
            .map(|mut a| {
                a.network_id = network_id;
                a
            })
            .collect();
        MemoryBackend::new()
            .with_agents(agents)
            .with_feedback(self.feedback)
    }
}

/// Read a snapshot file and build the backend for `network_id`.
pub fn load_snapshot(network_id: NetworkId, path: &Path) -> Result<MemoryBackend> {
    let raw = std::fs::read_to_string(path)?;
    let snapshot = Snapshot::from_json_str(&raw)?;
    info!(
        network = %network_id,
        path = %path.display(),
        agents = snapshot.agents.len(),
        feedback = snapshot.feedback.len(),
        "loaded backend snapshot"
    );
    Ok(snapshot.into_backend(network_id))
}
