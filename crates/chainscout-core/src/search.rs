//! Search orchestration.
//!
//! [`SearchOrchestrator`] is the public entry point. It resolves the target
//! networks, fans out through [`ScatterGather`], then merges, sorts and
//! pages the results after fan-in.
//!
//! Two fetch strategies:
//! - one target network: fetch `page_size + 1` at the cursor offset and
//!   use the extra record to detect a next page
//! - several: fetch `overfetch_factor * page_size` per network at offset 0,
//!   merge, sort, then slice `[offset, offset + page_size)`
//!
//! Per-network failures never fail the call. They show up in
//! [`SearchResultMeta`]; an all-failed search returns no items and full
//! metadata.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{warn, Instrument};
use uuid::Uuid;

use crate::backend::{BackendRegistry, EntityQuery};
use crate::config::DiscoveryConfig;
use crate::cursor::{page_from_overfetch, paginate, Cursor, Page};
use crate::domain::{
    ChainQueryOutcome, DiscoveryError, EntityRecord, NetworkId, NetworkScope, Result,
    SearchParams, SearchResultMeta,
};
use crate::merge::merge;
use crate::metrics::METRICS;
use crate::obs::{emit_search_finished, emit_search_started, search_span};
use crate::reputation::{meets_threshold, reputation_join, JoinLimits, ReputationQuery};
use crate::scatter::ScatterGather;
use crate::sort::{sort_records, SortSpec};

/// One page of results plus diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub items: Vec<EntityRecord>,
    pub next_cursor: Option<String>,
    pub meta: Option<SearchResultMeta>,
}

impl SearchResponse {
    /// Response for a search that resolved to no networks.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
            meta: Some(SearchResultMeta::empty()),
        }
    }
}

/// Multi-network discovery engine.
#[derive(Clone)]
pub struct SearchOrchestrator {
    scatter: ScatterGather,
    config: DiscoveryConfig,
}

impl SearchOrchestrator {
    pub fn new(registry: Arc<dyn BackendRegistry>, config: DiscoveryConfig) -> Self {
        Self {
            scatter: ScatterGather::new(registry),
            config,
        }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Search agents matching `params`.
    ///
    /// `cursor` is a value previously returned as `next_cursor`; anything
    /// unreadable restarts at the first page. `sort` is `"<field>[:<dir>]"`
    /// and defaults to `createdAt:desc`.
    ///
    /// Fails only for a page size outside `1..=max_page_size`.
    pub async fn search(
        &self,
        params: SearchParams,
        page_size: usize,
        cursor: Option<&str>,
        sort: Option<&str>,
    ) -> Result<SearchResponse> {
        self.check_page_size(page_size)?;
        let search_id = Uuid::new_v4();
        self.run_search(params, page_size, cursor, sort)
            .instrument(search_span(&search_id))
            .await
    }

    /// Search agents ranked by feedback reputation.
    ///
    /// Each network runs its own reputation join; results are merged and
    /// paged like [`search`](Self::search). `sort` defaults to
    /// `averageScore:desc`.
    ///
    /// Fails for a page size outside `1..=max_page_size` or a non-finite
    /// `min_average_score`.
    pub async fn search_by_reputation(
        &self,
        query: ReputationQuery,
        page_size: usize,
        cursor: Option<&str>,
        sort: Option<&str>,
    ) -> Result<SearchResponse> {
        self.check_page_size(page_size)?;
        if let Some(min) = query.min_average_score {
            if !min.is_finite() {
                return Err(DiscoveryError::InvalidThreshold(min));
            }
        }
        let search_id = Uuid::new_v4();
        self.run_reputation(query, page_size, cursor, sort)
            .instrument(search_span(&search_id))
            .await
    }

    async fn run_search(
        &self,
        params: SearchParams,
        page_size: usize,
        cursor: Option<&str>,
        sort: Option<&str>,
    ) -> Result<SearchResponse> {
        let started = Instant::now();
        METRICS.inc_searches();

        let targets = self.resolve_targets(&params.networks);
        let offset = Cursor::decode(cursor);
        let sort = SortSpec::parse_or(sort, SortSpec::default());
        emit_search_started("search", &targets, page_size, offset);

        if targets.is_empty() {
            warn!("no networks to search");
            return Ok(SearchResponse::empty());
        }

        let single = targets.len() == 1;
        let query = if single {
            EntityQuery {
                params: params.clone(),
                limit: page_size.saturating_add(1),
                offset,
                sort,
            }
        } else {
            EntityQuery {
                params: params.clone(),
                limit: page_size.saturating_mul(self.config.overfetch_factor),
                offset: 0,
                sort,
            }
        };

        let query = Arc::new(query);
        let outcomes = self
            .scatter
            .scatter(&targets, self.config.per_network_timeout(), move |_, adapter| {
                let query = Arc::clone(&query);
                async move { adapter.fetch_entities(&query).await }
            })
            .await;

        let fetched: usize = outcomes
            .iter()
            .filter(|o| o.status.is_success())
            .map(|o| o.records.len())
            .sum();
        let mut meta = SearchResultMeta::from_outcomes(&targets, &outcomes, 0, 0);

        let mut merged = merge(outcomes, &params, &targets, self.config.dedupe);
        sort_records(&mut merged, &sort);
        meta.total_results = merged.len();

        let page = if single {
            page_from_overfetch(merged, page_size, offset, fetched)
        } else {
            paginate(merged, page_size, offset)
        };
        Ok(finish(page, meta, started))
    }

    async fn run_reputation(
        &self,
        query: ReputationQuery,
        page_size: usize,
        cursor: Option<&str>,
        sort: Option<&str>,
    ) -> Result<SearchResponse> {
        let started = Instant::now();
        METRICS.inc_searches();

        let targets = self.resolve_targets(&query.networks);
        let offset = Cursor::decode(cursor);
        let sort = SortSpec::parse_or(sort, SortSpec::by_reputation());
        emit_search_started("reputation", &targets, page_size, offset);

        if targets.is_empty() {
            warn!("no networks to search");
            return Ok(SearchResponse::empty());
        }

        let min_average_score = query.min_average_score;
        let limits = JoinLimits::from_config(&self.config);
        let query = Arc::new(query);
        let outcomes: Vec<ChainQueryOutcome<EntityRecord>> = self
            .scatter
            .scatter(&targets, self.config.per_network_timeout(), move |network, adapter| {
                let query = Arc::clone(&query);
                async move { reputation_join(adapter, network, &query, limits).await }
            })
            .await;

        let mut meta = SearchResultMeta::from_outcomes(&targets, &outcomes, 0, 0);

        let mut merged: Vec<EntityRecord> =
            merge(outcomes, &SearchParams::new(), &targets, self.config.dedupe)
                .into_iter()
                .filter(|r| meets_threshold(r, min_average_score))
                .collect();
        sort_records(&mut merged, &sort);
        meta.total_results = merged.len();

        Ok(finish(paginate(merged, page_size, offset), meta, started))
    }

    fn check_page_size(&self, page_size: usize) -> Result<()> {
        if page_size == 0 || page_size > self.config.max_page_size {
            return Err(DiscoveryError::InvalidPageSize {
                page_size,
                max: self.config.max_page_size,
            });
        }
        Ok(())
    }

    /// Concrete, ascending, duplicate-free network list for `scope`.
    pub fn resolve_targets(&self, scope: &NetworkScope) -> Vec<NetworkId> {
        let targets: BTreeSet<NetworkId> = match scope {
            NetworkScope::Default => BTreeSet::from([self.config.default_network]),
            NetworkScope::Explicit(ids) => ids.iter().copied().collect(),
            NetworkScope::All => self
                .scatter
                .registry()
                .all_configured_networks()
                .into_iter()
                .collect(),
        };
        targets.into_iter().collect()
    }
}

fn finish(page: Page, mut meta: SearchResultMeta, started: Instant) -> SearchResponse {
    meta.total_ms = started.elapsed().as_millis() as u64;
    if meta.is_total_failure() {
        warn!(failed = ?meta.failed_networks, "no network answered");
    }
    emit_search_finished(
        page.items.len(),
        meta.total_results,
        meta.failed_networks.len(),
        meta.total_ms,
    );
    SearchResponse {
        items: page.items,
        next_cursor: page.next_cursor,
        meta: Some(meta),
    }
}
