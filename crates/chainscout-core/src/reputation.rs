//! Reputation join: scoring agents from feedback records.
//!
//! Per network, [`reputation_join`] pulls agents and feedback from the same
//! adapter and annotates each agent with `extras.averageScore` and
//! `extras.feedbackCount`. When the query carries feedback-shaped filters the
//! matching feedback selects the candidate agents; agents without matching
//! feedback are left out entirely rather than scored as zero.
//!
//! Averages count only feedback that is not revoked and has a positive score.
//! Feedback is fetched page by page so no qualifying record is skipped.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::{BackendAdapter, EntityQuery};
use crate::config::DiscoveryConfig;
use crate::domain::{
    AgentId, BackendResult, EntityRecord, FeedbackFilters, FeedbackRecord, NetworkId,
    NetworkScope, ReputationScore, SearchParams,
};
use crate::sort::SortSpec;

/// A reputation-ranked search request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReputationQuery {
    pub networks: NetworkScope,
    /// Restrict to these agents; entries for networks outside the scope are ignored.
    pub agents: Vec<AgentId>,
    /// Feedback-shaped filters. `filters.agents` is derived per network from
    /// `agents` and any value set by the caller is replaced.
    pub filters: FeedbackFilters,
    /// Keep only agents whose average score is known and at least this value.
    pub min_average_score: Option<f64>,
}

impl ReputationQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_networks(mut self, networks: NetworkScope) -> Self {
        self.networks = networks;
        self
    }

    pub fn with_filters(mut self, filters: FeedbackFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_min_average_score(mut self, min: f64) -> Self {
        self.min_average_score = Some(min);
        self
    }

    fn local_ids_on(&self, network_id: NetworkId) -> Vec<String> {
        self.agents
            .iter()
            .filter(|a| a.network_id == network_id)
            .map(|a| a.local_id.clone())
            .collect()
    }
}

/// Score every entity from the feedback about it.
///
/// Entities without qualifying feedback get `count = 0` and no average.
pub fn aggregate(
    entities: &[EntityRecord],
    feedback: &[FeedbackRecord],
) -> BTreeMap<String, ReputationScore> {
    let mut sums: BTreeMap<&str, (u64, usize)> = BTreeMap::new();
    for f in feedback.iter().filter(|f| f.qualifies()) {
        let entry = sums.entry(f.entity_id.as_str()).or_insert((0, 0));
        entry.0 += u64::from(f.score.unwrap_or(0));
        entry.1 += 1;
    }

    entities
        .iter()
        .map(|e| {
            let (sum, count) = sums.get(e.local_id.as_str()).copied().unwrap_or((0, 0));
            let average_score = (count > 0).then(|| sum as f64 / count as f64);
            (
                e.local_id.clone(),
                ReputationScore {
                    entity_id: e.local_id.clone(),
                    count,
                    average_score,
                },
            )
        })
        .collect()
}

/// Copy each entity's score into its `extras`.
pub fn annotate(
    entities: Vec<EntityRecord>,
    scores: &BTreeMap<String, ReputationScore>,
) -> Vec<EntityRecord> {
    entities
        .into_iter()
        .map(|mut e| {
            let (average, count) = scores
                .get(&e.local_id)
                .map(|s| (s.average_score, s.count))
                .unwrap_or((None, 0));
            let average = average
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null);
            e.extras.insert("averageScore".to_string(), average);
            e.extras
                .insert("feedbackCount".to_string(), Value::from(count as u64));
            e
        })
        .collect()
}

/// Keep records whose average is known and at least `min`.
pub fn meets_threshold(record: &EntityRecord, min: Option<f64>) -> bool {
    match min {
        None => true,
        Some(min) => record.average_score().is_some_and(|avg| avg >= min),
    }
}

/// Per-network fetch bounds for [`reputation_join`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinLimits {
    /// Agents fetched when no feedback filter selects them.
    pub entity_limit: usize,
    /// Records requested per feedback page.
    pub feedback_page_size: usize,
    /// Feedback records kept across all pages.
    pub max_feedback: usize,
}

impl JoinLimits {
    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self {
            entity_limit: config.reputation_entity_limit,
            feedback_page_size: config.feedback_fetch_limit,
            max_feedback: config.max_feedback_records,
        }
    }
}

/// Join agents and feedback on one network.
///
/// Feedback is paged until the backend returns a short page, so averages
/// cover every qualifying record up to `limits.max_feedback`.
pub async fn reputation_join(
    adapter: Arc<dyn BackendAdapter>,
    network_id: NetworkId,
    query: &ReputationQuery,
    limits: JoinLimits,
) -> BackendResult<Vec<EntityRecord>> {
    let wanted = query.local_ids_on(network_id);
    if !query.agents.is_empty() && wanted.is_empty() {
        return Ok(Vec::new());
    }

    let mut filters = query.filters.clone();
    filters.agents = wanted.clone();

    let (entities, feedback) = if filters.has_feedback_filters() {
        let feedback = fetch_all_feedback(adapter.as_ref(), network_id, &filters, limits).await?;
        let candidates: BTreeSet<String> = feedback.iter().map(|f| f.entity_id.clone()).collect();
        if candidates.is_empty() {
            debug!(network = %network_id, "no feedback matched, network contributes nothing");
            return Ok(Vec::new());
        }

        let entity_query = EntityQuery {
            params: SearchParams::new().with_ids(candidates.iter().cloned()),
            limit: candidates.len(),
            offset: 0,
            sort: SortSpec::default(),
        };
        let entities = adapter.fetch_entities(&entity_query).await?;
        (entities, feedback)
    } else {
        let entity_query = EntityQuery {
            params: SearchParams::new().with_ids(wanted),
            limit: limits.entity_limit.saturating_add(1),
            offset: 0,
            sort: SortSpec::default(),
        };
        let mut entities = adapter.fetch_entities(&entity_query).await?;
        if entities.is_empty() {
            return Ok(Vec::new());
        }
        if entities.len() > limits.entity_limit {
            warn!(
                network = %network_id,
                limit = limits.entity_limit,
                "agent count exceeds reputation_entity_limit, newest agents kept"
            );
            entities.truncate(limits.entity_limit);
        }

        filters.agents = entities.iter().map(|e| e.local_id.clone()).collect();
        let feedback = fetch_all_feedback(adapter.as_ref(), network_id, &filters, limits).await?;
        (entities, feedback)
    };

    let scores = aggregate(&entities, &feedback);
    debug!(
        network = %network_id,
        entities = entities.len(),
        feedback = feedback.len(),
        "reputation join complete"
    );
    Ok(annotate(entities, &scores))
}

/// Page through `fetch_feedback` until a short page or `limits.max_feedback`.
async fn fetch_all_feedback(
    adapter: &dyn BackendAdapter,
    network_id: NetworkId,
    filters: &FeedbackFilters,
    limits: JoinLimits,
) -> BackendResult<Vec<FeedbackRecord>> {
    let page_size = limits.feedback_page_size.max(1);
    let mut feedback: Vec<FeedbackRecord> = Vec::new();

    loop {
        let remaining = limits.max_feedback - feedback.len();
        if remaining == 0 {
            let more = adapter.fetch_feedback(filters, 1, feedback.len()).await?;
            if !more.is_empty() {
                warn!(
                    network = %network_id,
                    max = limits.max_feedback,
                    "feedback exceeds max_feedback_records, averages use a truncated set"
                );
            }
            break;
        }

        let want = page_size.min(remaining);
        let page = adapter.fetch_feedback(filters, want, feedback.len()).await?;
        let short = page.len() < want;
        feedback.extend(page);
        if short {
            break;
        }
    }

    Ok(feedback)
}
