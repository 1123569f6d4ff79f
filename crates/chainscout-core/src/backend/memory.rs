//! In-memory backend adapter.
//!
//! Serves a fixed set of agents and feedback, applying the same filter and
//! sort rules as the engine. Optional artificial latency and failure injection
//! make it the stand-in for real network backends in tests and demos.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::backend::{BackendAdapter, EntityQuery};
use crate::domain::{BackendError, BackendResult, EntityRecord, FeedbackFilters, FeedbackRecord};
use crate::merge::matches_params;
use crate::sort::sort_records;

/// Adapter backed by `Vec`s of agents and feedback.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    agents: Vec<EntityRecord>,
    feedback: Vec<FeedbackRecord>,
    delay: Option<Duration>,
    failure: Option<BackendError>,
    calls: AtomicUsize,
    completed: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agents(mut self, agents: Vec<EntityRecord>) -> Self {
        self.agents = agents;
        self
    }

    pub fn with_feedback(mut self, feedback: Vec<FeedbackRecord>) -> Self {
        self.feedback = feedback;
        self
    }

    /// Sleep this long before answering any call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail every call with `error` (after the delay, if any).
    pub fn failing_with(mut self, error: BackendError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Number of calls started.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of calls that ran to completion. A call abandoned by a timeout
    /// is dropped mid-sleep and never counted here.
    pub fn completed_calls(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> BackendResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BackendAdapter for MemoryBackend {
    async fn fetch_entities(&self, query: &EntityQuery) -> BackendResult<Vec<EntityRecord>> {
        self.enter().await?;

        let mut matching: Vec<EntityRecord> = self
            .agents
            .iter()
            .filter(|a| matches_params(&query.params, a))
            .cloned()
            .collect();
        sort_records(&mut matching, &query.sort);

        Ok(matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }

    async fn fetch_feedback(
        &self,
        filters: &FeedbackFilters,
        limit: usize,
        offset: usize,
    ) -> BackendResult<Vec<FeedbackRecord>> {
        self.enter().await?;

        Ok(self
            .feedback
            .iter()
            .filter(|f| filters.matches(f))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}
