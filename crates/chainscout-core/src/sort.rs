//! Single-key ordering of merged records.
//!
//! Absent values sort as their key's zero value (timestamp 0, empty name,
//! network 0, score 0). Equal keys fall back to network id ascending, then
//! local id, regardless of direction, so identical inputs always produce the
//! same order.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::EntityRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    CreatedAt,
    Name,
    Network,
    AverageScore,
}

impl SortKey {
    fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "createdat" => Some(SortKey::CreatedAt),
            "name" => Some(SortKey::Name),
            "chainid" | "network" | "networkid" => Some(SortKey::Network),
            "averagescore" => Some(SortKey::AverageScore),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            SortKey::CreatedAt => "createdAt",
            SortKey::Name => "name",
            SortKey::Network => "chainId",
            SortKey::AverageScore => "averageScore",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One sort key and its direction, written `"<field>:<asc|desc>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    /// Newest first.
    fn default() -> Self {
        Self::new(SortKey::CreatedAt, SortDirection::Desc)
    }
}

impl SortSpec {
    pub const fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Highest average score first; the reputation search default.
    pub const fn by_reputation() -> Self {
        Self::new(SortKey::AverageScore, SortDirection::Desc)
    }

    /// Parse `"<field>[:<asc|desc>]"`. A missing direction means descending.
    pub fn parse(raw: &str) -> Option<Self> {
        let (field, direction) = match raw.split_once(':') {
            Some((field, dir)) => (field, Some(dir)),
            None => (raw, None),
        };
        let key = SortKey::parse(field)?;
        let direction = match direction.map(|d| d.trim().to_ascii_lowercase()) {
            None => SortDirection::Desc,
            Some(d) if d == "asc" => SortDirection::Asc,
            Some(d) if d == "desc" => SortDirection::Desc,
            Some(_) => return None,
        };
        Some(Self::new(key, direction))
    }

    /// Parse caller input, falling back to `default` when it is absent or
    /// not understood.
    pub fn parse_or(raw: Option<&str>, default: SortSpec) -> Self {
        match raw {
            None => default,
            Some(r) if r.trim().is_empty() => default,
            Some(r) => Self::parse(r).unwrap_or_else(|| {
                warn!(sort = %r, fallback = %default, "unrecognized sort, using default");
                default
            }),
        }
    }

    pub fn compare(&self, a: &EntityRecord, b: &EntityRecord) -> Ordering {
        let primary = match self.key {
            SortKey::CreatedAt => a.created_at.unwrap_or(0).cmp(&b.created_at.unwrap_or(0)),
            SortKey::Name => cmp_case_folded(&a.name, &b.name),
            SortKey::Network => a.network_id.cmp(&b.network_id),
            SortKey::AverageScore => a
                .average_score()
                .unwrap_or(0.0)
                .total_cmp(&b.average_score().unwrap_or(0.0)),
        };
        let primary = match self.direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        primary
            .then_with(|| a.network_id.cmp(&b.network_id))
            .then_with(|| a.local_id.cmp(&b.local_id))
    }
}

/// Compare lowercased chars lazily, without building lowercase copies.
fn cmp_case_folded(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{}:{}", self.key.as_str(), dir)
    }
}

/// Sort in place by `spec`. Stable, though the tie-break makes stability moot.
pub fn sort_records(records: &mut [EntityRecord], spec: &SortSpec) {
    records.sort_by(|a, b| spec.compare(a, b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NetworkId;

    fn record(network: u64, id: &str, name: &str, created_at: Option<u64>) -> EntityRecord {
        let mut r = EntityRecord::new(NetworkId(network), id, name);
        r.created_at = created_at;
        r
    }

    fn ids(records: &[EntityRecord]) -> Vec<String> {
        records.iter().map(|r| r.agent_id().to_string()).collect()
    }

    #[test]
    fn test_parse_sort_spec() {
        assert_eq!(
            SortSpec::parse("name:asc"),
            Some(SortSpec::new(SortKey::Name, SortDirection::Asc))
        );
        assert_eq!(
            SortSpec::parse("created_at"),
            Some(SortSpec::new(SortKey::CreatedAt, SortDirection::Desc))
        );
        assert_eq!(
            SortSpec::parse("chainId:DESC"),
            Some(SortSpec::new(SortKey::Network, SortDirection::Desc))
        );
        assert_eq!(SortSpec::parse("name:sideways"), None);
        assert_eq!(SortSpec::parse("popularity:asc"), None);
    }

    #[test]
    fn test_parse_or_falls_back_to_default() {
        assert_eq!(SortSpec::parse_or(Some("bogus"), SortSpec::default()), SortSpec::default());
        assert_eq!(SortSpec::parse_or(None, SortSpec::by_reputation()), SortSpec::by_reputation());
        assert_eq!(SortSpec::default().to_string(), "createdAt:desc");
    }

    #[test]
    fn test_missing_timestamp_sorts_as_zero() {
        let mut records = vec![
            record(1, "a", "x", None),
            record(1, "b", "x", Some(5)),
        ];
        sort_records(&mut records, &SortSpec::new(SortKey::CreatedAt, SortDirection::Asc));
        assert_eq!(ids(&records), vec!["1:a", "1:b"]);
        sort_records(&mut records, &SortSpec::default());
        assert_eq!(ids(&records), vec!["1:b", "1:a"]);
    }

    #[test]
    fn test_name_sort_is_case_folded() {
        let mut records = vec![
            record(1, "1", "bravo", None),
            record(1, "2", "Alpha", None),
            record(1, "3", "charlie", None),
        ];
        sort_records(&mut records, &SortSpec::parse("name:asc").unwrap());
        assert_eq!(ids(&records), vec!["1:2", "1:1", "1:3"]);
    }

    #[test]
    fn test_case_folded_compare_handles_prefixes_and_equal_names() {
        assert_eq!(cmp_case_folded("Scout", "scout"), Ordering::Equal);
        assert_eq!(cmp_case_folded("SCOUT", "scouting"), Ordering::Less);
        assert_eq!(cmp_case_folded("Ärger", "ärgerlich"), Ordering::Less);

        let mut records = vec![
            record(2, "1", "SCOUT", None),
            record(1, "2", "scout", None),
            record(1, "3", "Scouting", None),
        ];
        sort_records(&mut records, &SortSpec::parse("name:desc").unwrap());
        assert_eq!(ids(&records), vec!["1:3", "1:2", "2:1"]);
    }

    #[test]
    fn test_ties_break_on_network_then_local_id_in_both_directions() {
        let base = vec![
            record(3, "b", "same", Some(10)),
            record(1, "z", "same", Some(10)),
            record(3, "a", "same", Some(10)),
        ];
        for spec in [
            SortSpec::new(SortKey::CreatedAt, SortDirection::Asc),
            SortSpec::new(SortKey::CreatedAt, SortDirection::Desc),
        ] {
            let mut records = base.clone();
            sort_records(&mut records, &spec);
            assert_eq!(ids(&records), vec!["1:z", "3:a", "3:b"]);
        }
    }

    #[test]
    fn test_average_score_sort_reads_extras() {
        let mut low = record(1, "low", "l", None);
        low.extras.insert("averageScore".into(), serde_json::json!(20.0));
        let mut high = record(1, "high", "h", None);
        high.extras.insert("averageScore".into(), serde_json::json!(75.5));
        let unscored = record(1, "none", "n", None);

        let mut records = vec![low, unscored, high];
        sort_records(&mut records, &SortSpec::by_reputation());
        assert_eq!(ids(&records), vec!["1:high", "1:low", "1:none"]);
    }
}
