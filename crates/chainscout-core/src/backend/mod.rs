//! Backend adapter and registry traits.
//!
//! A backend adapter answers read-only queries for one network; the registry
//! maps network ids to adapters. Both are injected into the
//! [`SearchOrchestrator`](crate::search::SearchOrchestrator):
//! - [`memory::MemoryBackend`]: in-memory adapter with fault injection (tests, demos)
//! - [`snapshot::load_snapshot`]: JSON snapshot file loaded into a `MemoryBackend`
//! - [`registry::StaticRegistry`]: fixed network → adapter map

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{BackendResult, EntityRecord, FeedbackFilters, FeedbackRecord, NetworkId, SearchParams};
use crate::sort::SortSpec;

pub mod memory;
pub mod registry;
pub mod snapshot;

pub use memory::MemoryBackend;
pub use registry::StaticRegistry;
pub use snapshot::{load_snapshot, Snapshot};

/// One page request against a single network.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityQuery {
    /// Filters the adapter may push down. The engine re-applies all of them
    /// after the fetch, so partial support is fine.
    pub params: SearchParams,
    pub limit: usize,
    pub offset: usize,
    /// Requested order. Adapters should honor it so that `offset` addresses
    /// the same sequence across calls.
    pub sort: SortSpec,
}

/// Read-only query backend for one network.
///
/// Implementations must be reentrant: the engine calls the same adapter from
/// several concurrent searches and never mutates it.
#[async_trait]
pub trait BackendAdapter: Send + Sync {
    /// Up to `query.limit` matching agents starting at `query.offset`.
    async fn fetch_entities(&self, query: &EntityQuery) -> BackendResult<Vec<EntityRecord>>;

    /// Up to `limit` feedback records matching `filters` starting at `offset`.
    async fn fetch_feedback(
        &self,
        filters: &FeedbackFilters,
        limit: usize,
        offset: usize,
    ) -> BackendResult<Vec<FeedbackRecord>>;
}

/// Resolves network ids to configured adapters.
pub trait BackendRegistry: Send + Sync {
    fn resolve(&self, network_id: NetworkId) -> Option<Arc<dyn BackendAdapter>>;

    /// Every network with an adapter, ascending.
    fn all_configured_networks(&self) -> Vec<NetworkId>;
}
