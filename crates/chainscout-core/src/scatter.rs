//! Scatter-gather execution across network backends.
//!
//! [`ScatterGather::scatter`] issues one fetch per network concurrently and
//! waits until every network has resolved to a [`ChainQueryOutcome`]:
//!
//! - no adapter registered → `Unavailable`, without spawning anything
//! - adapter returned an error (or its task panicked) → `Error`
//! - per-network timer fired first → `Timeout`
//! - otherwise → `Success`
//!
//! A timeout drops the in-flight fetch future, cancelling the adapter call
//! rather than leaving it running. Dropping the scatter future itself aborts
//! every task still in the `JoinSet`. One network's failure never reaches its
//! siblings.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::{self, JoinError, JoinSet};
use tokio::time::Instant;
use tracing::warn;

use crate::backend::{BackendAdapter, BackendRegistry};
use crate::domain::{BackendResult, ChainQueryOutcome, NetworkId};
use crate::metrics::METRICS;
use crate::obs::emit_network_outcome;

/// Parallel per-network dispatcher bound to a backend registry.
#[derive(Clone)]
pub struct ScatterGather {
    registry: Arc<dyn BackendRegistry>,
}

impl ScatterGather {
    pub fn new(registry: Arc<dyn BackendRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<dyn BackendRegistry> {
        &self.registry
    }

    /// Run `fetch` once per network, each bounded by `per_network_timeout`.
    ///
    /// Duplicate ids in `networks` are queried once. Outcomes come back sorted
    /// by network id, one per distinct requested network.
    pub async fn scatter<T, F, Fut>(
        &self,
        networks: &[NetworkId],
        per_network_timeout: Duration,
        fetch: F,
    ) -> Vec<ChainQueryOutcome<T>>
    where
        T: Send + 'static,
        F: Fn(NetworkId, Arc<dyn BackendAdapter>) -> Fut,
        Fut: Future<Output = BackendResult<Vec<T>>> + Send + 'static,
    {
        let targets: BTreeSet<NetworkId> = networks.iter().copied().collect();
        let mut outcomes: BTreeMap<NetworkId, ChainQueryOutcome<T>> = BTreeMap::new();
        let mut join_set = JoinSet::new();
        let mut dispatched: HashMap<task::Id, NetworkId> = HashMap::new();

        for network_id in targets {
            let Some(adapter) = self.registry.resolve(network_id) else {
                outcomes.insert(network_id, ChainQueryOutcome::unavailable(network_id));
                continue;
            };

            let request = fetch(network_id, adapter);
            let handle = join_set.spawn(race_against_timer(network_id, per_network_timeout, request));
            dispatched.insert(handle.id(), network_id);
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(outcome) => {
                    outcomes.insert(outcome.network_id, outcome);
                }
                Err(e) => match dispatched.get(&e.id()).copied() {
                    Some(network_id) => {
                        warn!(network = %network_id, error = %e, "network fetch task did not complete");
                        let detail = join_failure_detail(e);
                        outcomes.insert(network_id, ChainQueryOutcome::error(network_id, detail, 0));
                    }
                    None => warn!(error = %e, "unknown fetch task did not complete"),
                },
            }
        }

        for &network_id in dispatched.values() {
            outcomes.entry(network_id).or_insert_with(|| {
                ChainQueryOutcome::error(network_id, "fetch task failed", 0)
            });
        }

        for outcome in outcomes.values() {
            METRICS.record_outcome(outcome.status);
            emit_network_outcome(
                outcome.network_id,
                outcome.status,
                outcome.records.len(),
                outcome.elapsed_ms,
                outcome.error_detail.as_deref(),
            );
        }

        outcomes.into_values().collect()
    }
}

/// Error detail for a task that never produced an outcome.
fn join_failure_detail(e: JoinError) -> String {
    if !e.is_panic() {
        return format!("fetch task failed: {e}");
    }
    let payload = e.into_panic();
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    format!("fetch task failed: panicked: {message}")
}

/// Resolve one network: the fetch wins or the timer does, and the loser is
/// dropped.
async fn race_against_timer<T, Fut>(
    network_id: NetworkId,
    timeout: Duration,
    request: Fut,
) -> ChainQueryOutcome<T>
where
    Fut: Future<Output = BackendResult<Vec<T>>>,
{
    let started = Instant::now();
    tokio::select! {
        biased;
        result = request => {
            let elapsed_ms = started.elapsed().as_millis() as u64;
            match result {
                Ok(records) => ChainQueryOutcome::success(network_id, records, elapsed_ms),
                Err(e) => ChainQueryOutcome::error(network_id, e.to_string(), elapsed_ms),
            }
        }
        _ = tokio::time::sleep(timeout) => {
            ChainQueryOutcome::timeout(network_id, started.elapsed().as_millis() as u64)
        }
    }
}
