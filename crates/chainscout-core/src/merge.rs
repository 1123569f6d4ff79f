//! Cross-network result merging.
//!
//! Concatenates the records of every successful outcome, re-applies the
//! entity filters (adapters may push down only part of them), enforces the
//! resolved network scope and optionally collapses duplicates.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{ChainQueryOutcome, EntityRecord, NetworkId, SearchParams};

/// How records describing the same logical agent on different networks are
/// treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// One row per network registration.
    #[default]
    None,
    /// Collapse records with equal case-folded name and description, keeping
    /// the one with the lowest `(network_id, local_id)`.
    NameAndDescription,
}

/// Merge per-network outcomes into one filtered record set.
///
/// Non-success outcomes contribute nothing. Records whose network is not in
/// `targets` are dropped. The result is unordered; sorting happens next.
pub fn merge(
    outcomes: Vec<ChainQueryOutcome<EntityRecord>>,
    params: &SearchParams,
    targets: &[NetworkId],
    dedupe: DedupPolicy,
) -> Vec<EntityRecord> {
    let scope: BTreeSet<NetworkId> = targets.iter().copied().collect();

    let mut raw = 0usize;
    let merged: Vec<EntityRecord> = outcomes
        .into_iter()
        .filter(|o| o.status.is_success())
        .flat_map(|o| o.records)
        .inspect(|_| raw += 1)
        .filter(|r| scope.contains(&r.network_id))
        .filter(|r| matches_params(params, r))
        .collect();

    let kept = dedupe_records(merged, dedupe);
    debug!(raw, kept = kept.len(), ?dedupe, "merged network results");
    kept
}

/// Whether `record` satisfies every attribute filter in `params`.
///
/// The network scope is not checked here; it is resolved by the orchestrator
/// and enforced in [`merge`].
pub fn matches_params(params: &SearchParams, record: &EntityRecord) -> bool {
    if let Some(name) = &params.name {
        if !record.name.to_lowercase().contains(&name.to_lowercase()) {
            return false;
        }
    }
    if !params.ids.is_empty() && !params.ids.iter().any(|id| id == &record.local_id) {
        return false;
    }
    if params.mcp.is_some_and(|v| v != record.capabilities.mcp)
        || params.a2a.is_some_and(|v| v != record.capabilities.a2a)
        || params.active.is_some_and(|v| v != record.active)
        || params.x402_support.is_some_and(|v| v != record.x402_support)
    {
        return false;
    }
    if !exact_ci(params.ens.as_deref(), record.ens.as_deref())
        || !exact_ci(params.did.as_deref(), record.did.as_deref())
        || !exact_ci(
            params.wallet_address.as_deref(),
            record.wallet_address.as_deref(),
        )
    {
        return false;
    }

    let tags = &record.tags;
    contains_all(&tags.supported_trusts, &params.supported_trusts)
        && contains_all(&tags.a2a_skills, &params.a2a_skills)
        && contains_all(&tags.mcp_tools, &params.mcp_tools)
        && contains_all(&tags.mcp_prompts, &params.mcp_prompts)
        && contains_all(&tags.mcp_resources, &params.mcp_resources)
        && any_address(&record.owners, &params.owners)
        && any_address(&record.operators, &params.operators)
}

fn exact_ci(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(w) => actual.is_some_and(|a| a.eq_ignore_ascii_case(w)),
    }
}

/// Every requested value must be present, not just one of them.
fn contains_all(have: &[String], wanted: &[String]) -> bool {
    wanted.iter().all(|w| have.contains(w))
}

fn any_address(have: &[String], wanted: &[String]) -> bool {
    wanted.is_empty()
        || wanted
            .iter()
            .any(|w| have.iter().any(|h| h.eq_ignore_ascii_case(w)))
}

fn dedupe_records(records: Vec<EntityRecord>, policy: DedupPolicy) -> Vec<EntityRecord> {
    match policy {
        DedupPolicy::None => records,
        DedupPolicy::NameAndDescription => {
            let mut by_key: BTreeMap<(String, String), EntityRecord> = BTreeMap::new();
            for record in records {
                let key = (record.name.to_lowercase(), record.description.to_lowercase());
                let replace = by_key.get(&key).map_or(true, |existing| {
                    (record.network_id, &record.local_id) < (existing.network_id, &existing.local_id)
                });
                if replace {
                    by_key.insert(key, record);
                }
            }
            by_key.into_values().collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(network: u64, id: &str, name: &str) -> EntityRecord {
        EntityRecord::new(NetworkId(network), id, name)
    }

    #[test]
    fn test_merge_skips_failed_outcomes_and_out_of_scope_records() {
        let outcomes = vec![
            ChainQueryOutcome::success(NetworkId(1), vec![record(1, "a", "one")], 5),
            ChainQueryOutcome::error(NetworkId(2), "boom", 5),
            ChainQueryOutcome::success(NetworkId(3), vec![record(3, "b", "three"), record(9, "c", "stray")], 5),
        ];
        let merged = merge(
            outcomes,
            &SearchParams::new(),
            &[NetworkId(1), NetworkId(2), NetworkId(3)],
            DedupPolicy::None,
        );
        let ids: Vec<_> = merged.iter().map(|r| r.agent_id().to_string()).collect();
        assert_eq!(ids, vec!["1:a", "3:b"]);
    }

    #[test]
    fn test_name_filter_is_case_insensitive_substring() {
        let params = SearchParams::new().with_name("TRAD");
        assert!(matches_params(&params, &record(1, "1", "Crypto Trader")));
        assert!(!matches_params(&params, &record(1, "2", "Oracle")));
    }

    #[test]
    fn test_skill_filter_requires_all_values() {
        let mut r = record(1, "1", "multi");
        r.tags.a2a_skills = vec!["search".into(), "summarize".into()];

        let both = SearchParams::new().with_a2a_skills(["search", "summarize"]);
        let one_missing = SearchParams::new().with_a2a_skills(["search", "translate"]);
        assert!(matches_params(&both, &r));
        assert!(!matches_params(&one_missing, &r));
    }

    #[test]
    fn test_exact_identity_fields_ignore_case() {
        let mut r = record(1, "1", "named");
        r.ens = Some("Scout.eth".into());
        r.wallet_address = Some("0xAbC".into());

        let params = SearchParams {
            ens: Some("scout.ETH".into()),
            wallet_address: Some("0xabc".into()),
            ..Default::default()
        };
        assert!(matches_params(&params, &r));

        let wrong = SearchParams {
            did: Some("did:web:scout".into()),
            ..Default::default()
        };
        assert!(!matches_params(&wrong, &r));
    }

    #[test]
    fn test_owner_filter_matches_any_listed_address() {
        let mut r = record(1, "1", "owned");
        r.owners = vec!["0xOWNER".into()];
        let params = SearchParams {
            owners: vec!["0xother".into(), "0xowner".into()],
            ..Default::default()
        };
        assert!(matches_params(&params, &r));
    }

    #[test]
    fn test_boolean_filters() {
        let mut r = record(1, "1", "flags");
        r.capabilities.mcp = true;
        r.active = true;
        assert!(matches_params(&SearchParams { mcp: Some(true), ..Default::default() }, &r));
        assert!(!matches_params(&SearchParams { a2a: Some(true), ..Default::default() }, &r));
        assert!(!matches_params(&SearchParams::new().with_active(false), &r));
    }

    #[test]
    fn test_default_policy_keeps_cross_network_duplicates() {
        let outcomes = vec![
            ChainQueryOutcome::success(NetworkId(1), vec![record(1, "7", "Twin")], 1),
            ChainQueryOutcome::success(NetworkId(2), vec![record(2, "7", "Twin")], 1),
        ];
        let targets = [NetworkId(1), NetworkId(2)];
        let kept = merge(outcomes.clone(), &SearchParams::new(), &targets, DedupPolicy::None);
        assert_eq!(kept.len(), 2);

        let collapsed = merge(outcomes, &SearchParams::new(), &targets, DedupPolicy::NameAndDescription);
        assert_eq!(collapsed.len(), 1);
        assert_eq!(collapsed[0].network_id, NetworkId(1));
    }
}
