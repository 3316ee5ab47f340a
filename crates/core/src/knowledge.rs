//! Knowledge store trait — similarity search over triage guideline corpora.
//!
//! The store is built offline by a separate ingestion job and is read-only
//! here. Fragments carry a provenance label so the two severity paths can
//! draw from disjoint corpora: emergency procedures for critical turns,
//! general clinical guidance for routine ones.

use crate::error::KnowledgeError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A provenance tag scoping retrieval to one corpus.
///
/// Matched against fragment source labels by the backend (the reference
/// corpora are distinguished by a filename substring).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Partition(pub String);

impl Partition {
    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unit of retrieved guideline text.
///
/// Ephemeral: lives only for the duration of one retrieval call and is never
/// persisted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidelineFragment {
    /// The fragment text
    pub content: String,

    /// Provenance label (source document or corpus)
    pub source: String,

    /// Relevance score (set by the search backend)
    #[serde(default)]
    pub score: f32,
}

/// The core KnowledgeStore trait.
///
/// Implementations: HTTP similarity-search client, in-memory (for testing
/// and offline use).
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// The backend name (e.g., "http", "in-memory").
    fn name(&self) -> &str;

    /// Search one partition for the `k` most relevant fragments.
    ///
    /// Returns an empty vec (not an error) when nothing matches. Backend
    /// faults do surface as errors here; the retrieval step in the triage
    /// flow is responsible for catching them and degrading to an empty
    /// context, so a broken index never aborts a triage turn.
    async fn search(
        &self,
        query: &str,
        partition: &Partition,
        k: usize,
    ) -> std::result::Result<Vec<GuidelineFragment>, KnowledgeError>;

    /// Health check — can we reach the index?
    async fn health_check(&self) -> std::result::Result<bool, KnowledgeError> {
        Ok(true)
    }
}
