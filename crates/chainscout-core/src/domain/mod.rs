//! Domain models for chainscout.
//!
//! Canonical definitions for the discovery pipeline:
//! - `EntityRecord`: one registered agent as returned by a network backend
//! - `SearchParams`: the filter/scope contract of a search
//! - `FeedbackRecord` / `ReputationScore`: inputs and outputs of the reputation join
//! - `ChainQueryOutcome` / `SearchResultMeta`: per-network and per-call diagnostics

pub mod entity;
pub mod error;
pub mod feedback;
pub mod outcome;
pub mod params;

// Re-export main types and errors
pub use entity::{AgentId, Capabilities, EntityRecord, NetworkId, TagSets};
pub use error::{BackendError, BackendResult, DiscoveryError, Result};
pub use feedback::{FeedbackFilters, FeedbackRecord, ReputationScore};
pub use outcome::{ChainQueryOutcome, NetworkFailure, QueryStatus, SearchResultMeta};
pub use params::{NetworkScope, SearchParams};
