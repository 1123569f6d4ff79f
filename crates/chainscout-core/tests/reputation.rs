//! Reputation-ranked search across networks.

use std::sync::Arc;
use std::time::Duration;

use chainscout_core::{
    BackendError, Cursor, DiscoveryConfig, EntityRecord, FeedbackFilters, FeedbackRecord,
    MemoryBackend, NetworkId, NetworkScope, QueryStatus, ReputationQuery, SearchOrchestrator,
    SearchResponse, StaticRegistry,
};

fn agent(network: u64, id: &str) -> EntityRecord {
    EntityRecord::new(NetworkId(network), id, format!("agent-{network}-{id}"))
}

fn scored(network: u64, id: &str, score: u8) -> (EntityRecord, FeedbackRecord) {
    (agent(network, id), FeedbackRecord::new(id, "0xreviewer", Some(score)))
}

fn backend(rows: Vec<(EntityRecord, FeedbackRecord)>) -> Arc<MemoryBackend> {
    let (agents, feedback): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
    Arc::new(MemoryBackend::new().with_agents(agents).with_feedback(feedback))
}

fn scores(response: &SearchResponse) -> Vec<(String, Option<f64>)> {
    response
        .items
        .iter()
        .map(|r| (r.agent_id().to_string(), r.average_score()))
        .collect()
}

fn all() -> ReputationQuery {
    ReputationQuery::new().with_networks(NetworkScope::All)
}

#[tokio::test]
async fn test_revoked_feedback_excluded_from_average() {
    let registry = StaticRegistry::new().with_backend(
        NetworkId(1),
        Arc::new(
            MemoryBackend::new()
                .with_agents(vec![agent(1, "x"), agent(1, "y")])
                .with_feedback(vec![
                    FeedbackRecord::new("x", "r1", Some(10)).with_tags(Some("spam"), None),
                    FeedbackRecord::new("x", "r2", Some(90))
                        .with_tags(Some("spam"), None)
                        .revoked(),
                    FeedbackRecord::new("y", "r1", Some(80)).with_tags(Some("helpful"), None),
                ]),
        ),
    );
    let orch = SearchOrchestrator::new(Arc::new(registry), DiscoveryConfig::default());

    let query = all().with_filters(FeedbackFilters::new().with_tags(["spam"]));
    let response = orch.search_by_reputation(query, 10, None, None).await.unwrap();

    assert_eq!(scores(&response), vec![("1:x".to_string(), Some(10.0))]);
    assert_eq!(
        response.items[0].extras["feedbackCount"],
        serde_json::Value::from(1u64)
    );
}

#[tokio::test]
async fn test_threshold_keeps_only_scored_agents_at_or_above() {
    let mut rows = vec![
        scored(1, "a", 95),
        scored(1, "b", 40),
        scored(2, "c", 70),
        scored(2, "d", 69),
    ];
    rows.push((agent(2, "silent"), FeedbackRecord::new("silent", "r", Some(0))));
    let (net1, net2): (Vec<_>, Vec<_>) = rows.into_iter().partition(|(a, _)| a.network_id == NetworkId(1));
    let registry = StaticRegistry::new()
        .with_backend(NetworkId(1), backend(net1))
        .with_backend(NetworkId(2), backend(net2));
    let orch = SearchOrchestrator::new(Arc::new(registry), DiscoveryConfig::default());

    let response = orch
        .search_by_reputation(all().with_min_average_score(70.0), 10, None, None)
        .await
        .unwrap();

    for (id, avg) in scores(&response) {
        let avg = avg.unwrap_or_else(|| panic!("{id} has no average"));
        assert!(avg >= 70.0, "{id} scored {avg}");
    }
    assert_eq!(
        scores(&response),
        vec![
            ("1:a".to_string(), Some(95.0)),
            ("2:c".to_string(), Some(70.0)),
        ]
    );
}

#[tokio::test]
async fn test_without_threshold_unscored_agents_sort_last() {
    let registry = StaticRegistry::new().with_backend(
        NetworkId(1),
        Arc::new(
            MemoryBackend::new()
                .with_agents(vec![agent(1, "new"), agent(1, "old")])
                .with_feedback(vec![FeedbackRecord::new("old", "r", Some(20))]),
        ),
    );
    let orch = SearchOrchestrator::new(Arc::new(registry), DiscoveryConfig::default());

    let response = orch.search_by_reputation(all(), 10, None, None).await.unwrap();
    assert_eq!(
        scores(&response),
        vec![("1:old".to_string(), Some(20.0)), ("1:new".to_string(), None)]
    );
}

#[tokio::test]
async fn test_tag_filter_matches_either_tag_slot() {
    let registry = StaticRegistry::new().with_backend(
        NetworkId(1),
        Arc::new(
            MemoryBackend::new()
                .with_agents(vec![agent(1, "first"), agent(1, "second"), agent(1, "neither")])
                .with_feedback(vec![
                    FeedbackRecord::new("first", "r", Some(50)).with_tags(Some("defi"), None),
                    FeedbackRecord::new("second", "r", Some(60)).with_tags(Some("nft"), Some("defi")),
                    FeedbackRecord::new("neither", "r", Some(99)).with_tags(Some("nft"), None),
                ]),
        ),
    );
    let orch = SearchOrchestrator::new(Arc::new(registry), DiscoveryConfig::default());

    let query = all().with_filters(FeedbackFilters::new().with_tags(["defi"]));
    let response = orch.search_by_reputation(query, 10, None, None).await.unwrap();
    assert_eq!(
        scores(&response),
        vec![
            ("1:second".to_string(), Some(60.0)),
            ("1:first".to_string(), Some(50.0)),
        ]
    );
}

#[tokio::test]
async fn test_reputation_pages_and_cursor() {
    let rows: Vec<_> = (0..12u8)
        .map(|i| scored(1, &format!("{i:02}"), 10 + i))
        .collect();
    let registry = StaticRegistry::new().with_backend(NetworkId(1), backend(rows));
    let orch = SearchOrchestrator::new(Arc::new(registry), DiscoveryConfig::default());

    let first = orch.search_by_reputation(all(), 5, None, None).await.unwrap();
    assert_eq!(first.items.len(), 5);
    assert_eq!(first.items[0].average_score(), Some(21.0));
    let cursor = first.next_cursor.unwrap();
    assert_eq!(Cursor::decode(Some(&cursor)), 5);

    let last = orch
        .search_by_reputation(all(), 5, Some(&Cursor::encode(10)), None)
        .await
        .unwrap();
    assert_eq!(last.items.len(), 2);
    assert!(last.next_cursor.is_none());
    assert_eq!(last.meta.unwrap().total_results, 12);
}

#[tokio::test]
async fn test_explicit_sort_overrides_score_order() {
    let registry = StaticRegistry::new().with_backend(
        NetworkId(1),
        backend(vec![scored(1, "b", 90), scored(1, "a", 10)]),
    );
    let orch = SearchOrchestrator::new(Arc::new(registry), DiscoveryConfig::default());

    let response = orch
        .search_by_reputation(all(), 10, None, Some("name:asc"))
        .await
        .unwrap();
    let ids: Vec<_> = response.items.iter().map(|r| r.local_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test(start_paused = true)]
async fn test_reputation_join_shares_network_failure_handling() {
    let registry = StaticRegistry::new()
        .with_backend(NetworkId(1), backend(vec![scored(1, "ok", 80)]))
        .with_backend(
            NetworkId(2),
            Arc::new(MemoryBackend::new().with_delay(Duration::from_secs(60))),
        )
        .with_backend(
            NetworkId(3),
            Arc::new(MemoryBackend::new().failing_with(BackendError::Decode("bad json".into()))),
        );
    let orch = SearchOrchestrator::new(
        Arc::new(registry),
        DiscoveryConfig::default().with_timeout(Duration::from_secs(1)),
    );

    let response = orch.search_by_reputation(all(), 10, None, None).await.unwrap();
    assert_eq!(scores(&response), vec![("1:ok".to_string(), Some(80.0))]);

    let meta = response.meta.unwrap();
    assert_eq!(meta.successful_networks, vec![NetworkId(1)]);
    assert_eq!(meta.failure_for(NetworkId(2)).unwrap().status, QueryStatus::Timeout);
    assert_eq!(meta.failure_for(NetworkId(3)).unwrap().status, QueryStatus::Error);
}

#[tokio::test]
async fn test_agent_restriction_spans_networks() {
    let registry = StaticRegistry::new()
        .with_backend(NetworkId(1), backend(vec![scored(1, "7", 30), scored(1, "8", 40)]))
        .with_backend(NetworkId(2), backend(vec![scored(2, "7", 90)]));
    let orch = SearchOrchestrator::new(Arc::new(registry), DiscoveryConfig::default());

    let query = ReputationQuery {
        agents: vec!["1:7".parse().unwrap(), "2:7".parse().unwrap()],
        ..all()
    };
    let response = orch.search_by_reputation(query, 10, None, None).await.unwrap();
    assert_eq!(
        scores(&response),
        vec![("2:7".to_string(), Some(90.0)), ("1:7".to_string(), Some(30.0))]
    );
}

#[tokio::test]
async fn test_average_covers_feedback_beyond_one_page() {
    let registry = StaticRegistry::new().with_backend(
        NetworkId(1),
        Arc::new(
            MemoryBackend::new()
                .with_agents(vec![agent(1, "0"), agent(1, "1"), agent(1, "2")])
                .with_feedback(vec![
                    FeedbackRecord::new("0", "r1", Some(10)),
                    FeedbackRecord::new("0", "r2", Some(10)),
                    FeedbackRecord::new("1", "r1", Some(90)),
                    FeedbackRecord::new("2", "r1", Some(90)),
                    FeedbackRecord::new("0", "r3", Some(100)),
                ]),
        ),
    );
    let orch = SearchOrchestrator::new(
        Arc::new(registry),
        DiscoveryConfig::default().with_feedback_fetch_limit(3),
    );

    let response = orch
        .search_by_reputation(ReputationQuery::new().with_networks(NetworkScope::All), 10, None, None)
        .await
        .unwrap();
    assert_eq!(
        scores(&response),
        vec![
            ("1:1".to_string(), Some(90.0)),
            ("1:2".to_string(), Some(90.0)),
            ("1:0".to_string(), Some(40.0)),
        ]
    );

    let filtered = orch
        .search_by_reputation(all().with_min_average_score(50.0), 10, None, None)
        .await
        .unwrap();
    assert_eq!(filtered.items.len(), 2);
}
