//! Per-network outcomes and per-call diagnostic metadata.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::NetworkId;

/// Classification of one network's part in a scatter-gather call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    Success,
    Error,
    Timeout,
    /// No adapter is configured for the network.
    Unavailable,
}

impl QueryStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, QueryStatus::Success)
    }
}

impl std::fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            QueryStatus::Success => "success",
            QueryStatus::Error => "error",
            QueryStatus::Timeout => "timeout",
            QueryStatus::Unavailable => "unavailable",
        };
        f.write_str(s)
    }
}

/// Result of querying one network. Created once per call and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainQueryOutcome<T> {
    pub network_id: NetworkId,
    pub status: QueryStatus,
    pub records: Vec<T>,
    pub error_detail: Option<String>,
    /// Time from dispatch to resolution; 0 for unavailable networks.
    pub elapsed_ms: u64,
}

impl<T> ChainQueryOutcome<T> {
    pub fn success(network_id: NetworkId, records: Vec<T>, elapsed_ms: u64) -> Self {
        Self {
            network_id,
            status: QueryStatus::Success,
            records,
            error_detail: None,
            elapsed_ms,
        }
    }

    pub fn error(network_id: NetworkId, detail: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            network_id,
            status: QueryStatus::Error,
            records: Vec::new(),
            error_detail: Some(detail.into()),
            elapsed_ms,
        }
    }

    pub fn timeout(network_id: NetworkId, elapsed_ms: u64) -> Self {
        Self {
            network_id,
            status: QueryStatus::Timeout,
            records: Vec::new(),
            error_detail: Some(format!("no response within {elapsed_ms}ms")),
            elapsed_ms,
        }
    }

    pub fn unavailable(network_id: NetworkId) -> Self {
        Self {
            network_id,
            status: QueryStatus::Unavailable,
            records: Vec::new(),
            error_detail: Some(format!("no backend configured for network {network_id}")),
            elapsed_ms: 0,
        }
    }
}

/// Why a requested network contributed no records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkFailure {
    pub network_id: NetworkId,
    pub status: QueryStatus,
    pub detail: Option<String>,
}

/// Diagnostic summary of one orchestrated search.
///
/// `successful_networks` and `failed_networks` partition `requested_networks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultMeta {
    pub requested_networks: Vec<NetworkId>,
    pub successful_networks: Vec<NetworkId>,
    pub failed_networks: Vec<NetworkId>,
    pub failures: Vec<NetworkFailure>,
    /// Size of the merged result set before pagination.
    pub total_results: usize,
    pub total_ms: u64,
    pub average_per_network_ms: Option<u64>,
    pub completed_at: DateTime<Utc>,
}

impl SearchResultMeta {
    /// Metadata for a call that targeted no networks at all.
    pub fn empty() -> Self {
        Self {
            requested_networks: Vec::new(),
            successful_networks: Vec::new(),
            failed_networks: Vec::new(),
            failures: Vec::new(),
            total_results: 0,
            total_ms: 0,
            average_per_network_ms: None,
            completed_at: Utc::now(),
        }
    }

    /// Build metadata from scatter outcomes.
    ///
    /// A requested network without an outcome is reported as failed, so the
    /// partition invariant holds even for an incomplete outcome list.
    pub fn from_outcomes<T>(
        requested: &[NetworkId],
        outcomes: &[ChainQueryOutcome<T>],
        total_results: usize,
        total_ms: u64,
    ) -> Self {
        let requested_set: BTreeSet<NetworkId> = requested.iter().copied().collect();

        let successful: BTreeSet<NetworkId> = outcomes
            .iter()
            .filter(|o| o.status.is_success() && requested_set.contains(&o.network_id))
            .map(|o| o.network_id)
            .collect();

        let failed: Vec<NetworkId> = requested_set
            .iter()
            .filter(|id| !successful.contains(id))
            .copied()
            .collect();

        let failures = outcomes
            .iter()
            .filter(|o| !o.status.is_success())
            .map(|o| NetworkFailure {
                network_id: o.network_id,
                status: o.status,
                detail: o.error_detail.clone(),
            })
            .collect();

        let dispatched: Vec<u64> = outcomes
            .iter()
            .filter(|o| o.status != QueryStatus::Unavailable)
            .map(|o| o.elapsed_ms)
            .collect();
        let average_per_network_ms = if dispatched.is_empty() {
            None
        } else {
            Some(dispatched.iter().sum::<u64>() / dispatched.len() as u64)
        };

        Self {
            requested_networks: requested_set.into_iter().collect(),
            successful_networks: successful.into_iter().collect(),
            failed_networks: failed,
            failures,
            total_results,
            total_ms,
            average_per_network_ms,
            completed_at: Utc::now(),
        }
    }

    /// Every requested network failed; distinguishes "nobody answered" from
    /// "no matches".
    pub fn is_total_failure(&self) -> bool {
        !self.requested_networks.is_empty() && self.successful_networks.is_empty()
    }

    pub fn failure_for(&self, network_id: NetworkId) -> Option<&NetworkFailure> {
        self.failures.iter().find(|f| f.network_id == network_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_partitions_requested_networks() {
        let requested = [NetworkId(1), NetworkId(2), NetworkId(3)];
        let outcomes: Vec<ChainQueryOutcome<()>> = vec![
            ChainQueryOutcome::success(NetworkId(1), vec![(), ()], 10),
            ChainQueryOutcome::unavailable(NetworkId(2)),
            ChainQueryOutcome::timeout(NetworkId(3), 30),
        ];
        let meta = SearchResultMeta::from_outcomes(&requested, &outcomes, 2, 31);
        assert_eq!(meta.successful_networks, vec![NetworkId(1)]);
        assert_eq!(meta.failed_networks, vec![NetworkId(2), NetworkId(3)]);
        assert_eq!(meta.average_per_network_ms, Some(20));
        assert_eq!(
            meta.failure_for(NetworkId(3)).map(|f| f.status),
            Some(QueryStatus::Timeout)
        );
        assert!(!meta.is_total_failure());
    }

    #[test]
    fn test_missing_outcome_counts_as_failed() {
        let requested = [NetworkId(5)];
        let outcomes: Vec<ChainQueryOutcome<()>> = vec![];
        let meta = SearchResultMeta::from_outcomes(&requested, &outcomes, 0, 0);
        assert_eq!(meta.failed_networks, vec![NetworkId(5)]);
        assert!(meta.is_total_failure());
        assert_eq!(meta.average_per_network_ms, None);
    }
}
