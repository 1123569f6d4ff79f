//! Structured observability hooks for search lifecycle events.
//!
//! This module provides:
//! - A search-scoped span, attached to async work with `tracing::Instrument`
//! - Emission functions for key lifecycle events: start, per-network outcome, finish
//!
//! Events are emitted at `info!` level except per-network outcomes, which log
//! at `debug!` on success and `warn!` otherwise.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{NetworkId, QueryStatus};

/// Span tagging every event of one search with its id.
pub fn search_span(search_id: &Uuid) -> tracing::Span {
    tracing::info_span!("chainscout.search", search_id = %search_id)
}

/// Emit event: search started.
pub fn emit_search_started(kind: &str, networks: &[NetworkId], page_size: usize, offset: usize) {
    info!(
        event = "search.started",
        kind = %kind,
        networks = ?networks,
        page_size = page_size,
        offset = offset,
    );
}

/// Emit event: one network resolved.
pub fn emit_network_outcome(
    network_id: NetworkId,
    status: QueryStatus,
    records: usize,
    elapsed_ms: u64,
    detail: Option<&str>,
) {
    match status {
        QueryStatus::Success => debug!(
            event = "network.outcome",
            network = %network_id,
            status = %status,
            records = records,
            elapsed_ms = elapsed_ms,
        ),
        _ => warn!(
            event = "network.outcome",
            network = %network_id,
            status = %status,
            elapsed_ms = elapsed_ms,
            detail = detail.unwrap_or(""),
        ),
    }
}

/// Emit event: search finished.
pub fn emit_search_finished(returned: usize, total: usize, failed_networks: usize, total_ms: u64) {
    info!(
        event = "search.finished",
        returned = returned,
        total = total,
        failed_networks = failed_networks,
        total_ms = total_ms,
    );
}
