//! Instrumented stores for routing tests.
//!
//! The triage flow must query the emergency corpus for critical turns and the
//! general corpus for routine ones. `RecordingKnowledgeStore` captures every
//! search call so tests can assert on the partition argument;
//! `FailingKnowledgeStore` simulates a broken index for degraded-retrieval
//! scenarios.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use triagent_core::error::KnowledgeError;
use triagent_core::knowledge::{GuidelineFragment, KnowledgeStore, Partition};

/// One captured search call.
#[derive(Debug, Clone)]
pub struct RecordedQuery {
    pub query: String,
    pub partition: Partition,
    pub k: usize,
}

/// Wraps another store and records every search call before delegating.
pub struct RecordingKnowledgeStore {
    inner: Arc<dyn KnowledgeStore>,
    calls: Mutex<Vec<RecordedQuery>>,
}

impl RecordingKnowledgeStore {
    pub fn wrap(inner: Arc<dyn KnowledgeStore>) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// All captured calls, in order.
    pub fn recorded(&self) -> Vec<RecordedQuery> {
        self.calls.lock().unwrap().clone()
    }

    /// The partition tags of captured calls, in order.
    pub fn partitions(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.partition.as_str().to_string())
            .collect()
    }
}

#[async_trait]
impl KnowledgeStore for RecordingKnowledgeStore {
    fn name(&self) -> &str {
        "recording"
    }

    async fn search(
        &self,
        query: &str,
        partition: &Partition,
        k: usize,
    ) -> std::result::Result<Vec<GuidelineFragment>, KnowledgeError> {
        self.calls.lock().unwrap().push(RecordedQuery {
            query: query.to_string(),
            partition: partition.clone(),
            k,
        });
        self.inner.search(query, partition, k).await
    }

    async fn health_check(&self) -> std::result::Result<bool, KnowledgeError> {
        self.inner.health_check().await
    }
}

/// A store whose every query fails. Simulates an unreachable index.
pub struct FailingKnowledgeStore;

#[async_trait]
impl KnowledgeStore for FailingKnowledgeStore {
    fn name(&self) -> &str {
        "failing"
    }

    async fn search(
        &self,
        _query: &str,
        _partition: &Partition,
        _k: usize,
    ) -> std::result::Result<Vec<GuidelineFragment>, KnowledgeError> {
        Err(KnowledgeError::Backend("index unreachable".into()))
    }

    async fn health_check(&self) -> std::result::Result<bool, KnowledgeError> {
        Ok(false)
    }
}
