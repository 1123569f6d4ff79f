//! Fixed network → adapter registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::backend::{BackendAdapter, BackendRegistry};
use crate::domain::NetworkId;

/// Registry built once at startup and owned by the application.
#[derive(Default, Clone)]
pub struct StaticRegistry {
    backends: BTreeMap<NetworkId, Arc<dyn BackendAdapter>>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the adapter for `network_id`.
    pub fn register(&mut self, network_id: NetworkId, adapter: Arc<dyn BackendAdapter>) {
        debug!(network = %network_id, "registering backend");
        self.backends.insert(network_id, adapter);
    }

    pub fn with_backend(mut self, network_id: NetworkId, adapter: Arc<dyn BackendAdapter>) -> Self {
        self.register(network_id, adapter);
        self
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl std::fmt::Debug for StaticRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticRegistry")
            .field("networks", &self.backends.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl BackendRegistry for StaticRegistry {
    fn resolve(&self, network_id: NetworkId) -> Option<Arc<dyn BackendAdapter>> {
        self.backends.get(&network_id).cloned()
    }

    fn all_configured_networks(&self) -> Vec<NetworkId> {
        self.backends.keys().copied().collect()
    }
}
