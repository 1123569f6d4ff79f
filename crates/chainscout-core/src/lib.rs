//! ChainScout Core Library
//!
//! Discovers agents registered on several independent networks. Each network
//! is served by its own read-only [`BackendAdapter`]; a search fans out to
//! every target network in parallel, tolerates any subset being slow, failing
//! or unconfigured, and returns one merged, sorted, paginated result set with
//! per-network diagnostics.

pub mod backend;
pub mod config;
pub mod cursor;
pub mod domain;
pub mod merge;
pub mod metrics;
pub mod obs;
pub mod reputation;
pub mod scatter;
pub mod search;
pub mod sort;
pub mod telemetry;

pub use backend::{
    load_snapshot, BackendAdapter, BackendRegistry, EntityQuery, MemoryBackend, Snapshot,
    StaticRegistry,
};
pub use config::DiscoveryConfig;
pub use cursor::{Cursor, Page};
pub use domain::{
    AgentId, BackendError, BackendResult, Capabilities, ChainQueryOutcome, DiscoveryError,
    EntityRecord, FeedbackFilters, FeedbackRecord, NetworkFailure, NetworkId, NetworkScope,
    QueryStatus, ReputationScore, Result, SearchParams, SearchResultMeta, TagSets,
};
pub use merge::DedupPolicy;
pub use reputation::ReputationQuery;
pub use scatter::ScatterGather;
pub use search::{SearchOrchestrator, SearchResponse};
pub use sort::{SortDirection, SortKey, SortSpec};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
