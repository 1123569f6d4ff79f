//! Feedback records and reputation scores used by the reputation join.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single piece of feedback left for an agent on one network.
///
/// Only consumed inside the reputation aggregator; never returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    /// Local id of the agent the feedback is about.
    pub entity_id: String,
    pub reviewer: String,
    /// 0-100; absent when the reviewer left no score.
    #[serde(default)]
    pub score: Option<u8>,
    #[serde(default)]
    pub is_revoked: bool,
    #[serde(default)]
    pub tag1: Option<String>,
    #[serde(default)]
    pub tag2: Option<String>,
    #[serde(default)]
    pub capability: Option<String>,
    #[serde(default)]
    pub skill: Option<String>,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl FeedbackRecord {
    pub fn new(entity_id: impl Into<String>, reviewer: impl Into<String>, score: Option<u8>) -> Self {
        Self {
            entity_id: entity_id.into(),
            reviewer: reviewer.into(),
            score,
            is_revoked: false,
            tag1: None,
            tag2: None,
            capability: None,
            skill: None,
            task: None,
            name: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_tags(mut self, tag1: Option<&str>, tag2: Option<&str>) -> Self {
        self.tag1 = tag1.map(str::to_string);
        self.tag2 = tag2.map(str::to_string);
        self
    }

    pub fn revoked(mut self) -> Self {
        self.is_revoked = true;
        self
    }

    /// Counts toward an average: not revoked and a strictly positive score.
    pub fn qualifies(&self) -> bool {
        !self.is_revoked && self.score.is_some_and(|s| s > 0)
    }

    fn has_tag(&self, tag: &str) -> bool {
        self.tag1.as_deref() == Some(tag) || self.tag2.as_deref() == Some(tag)
    }
}

/// Feedback-side filters of a reputation search.
///
/// Each non-empty list must match ("any of" within the list); lists are
/// combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeedbackFilters {
    /// Local ids of the agents the feedback must be about.
    pub agents: Vec<String>,
    /// Matches when a requested tag equals either `tag1` or `tag2`.
    pub tags: Vec<String>,
    pub reviewers: Vec<String>,
    pub capabilities: Vec<String>,
    pub skills: Vec<String>,
    pub tasks: Vec<String>,
    pub names: Vec<String>,
    pub exclude_revoked: bool,
}

impl FeedbackFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_reviewers<I, S>(mut self, reviewers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reviewers = reviewers.into_iter().map(Into::into).collect();
        self
    }

    /// True when a filter other than the agent restriction is set. Such
    /// filters select the candidate agents instead of only scoring them.
    pub fn has_feedback_filters(&self) -> bool {
        !(self.tags.is_empty()
            && self.reviewers.is_empty()
            && self.capabilities.is_empty()
            && self.skills.is_empty()
            && self.tasks.is_empty()
            && self.names.is_empty())
    }

    pub fn matches(&self, feedback: &FeedbackRecord) -> bool {
        if self.exclude_revoked && feedback.is_revoked {
            return false;
        }
        if !self.agents.is_empty() && !self.agents.iter().any(|a| a == &feedback.entity_id) {
            return false;
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|t| feedback.has_tag(t)) {
            return false;
        }
        if !self.reviewers.is_empty()
            && !self
                .reviewers
                .iter()
                .any(|r| r.eq_ignore_ascii_case(&feedback.reviewer))
        {
            return false;
        }
        field_in(&self.capabilities, feedback.capability.as_deref())
            && field_in(&self.skills, feedback.skill.as_deref())
            && field_in(&self.tasks, feedback.task.as_deref())
            && field_in(&self.names, feedback.name.as_deref())
    }
}

fn field_in(wanted: &[String], value: Option<&str>) -> bool {
    wanted.is_empty() || value.is_some_and(|v| wanted.iter().any(|w| w == v))
}

/// Per-agent reputation derived from qualifying feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationScore {
    pub entity_id: String,
    /// Number of qualifying feedback records.
    pub count: usize,
    /// `None` when no qualifying feedback exists.
    pub average_score: Option<f64>,
}
