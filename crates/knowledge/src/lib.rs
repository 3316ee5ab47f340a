//! Knowledge store backends for Triagent.
//!
//! The triage flow retrieves guideline text scoped to a severity-specific
//! corpus partition. Backends here implement the `KnowledgeStore` trait from
//! `triagent-core`: an HTTP client for a similarity-search service, an
//! in-memory store with keyword ranking, and a recording wrapper used by
//! routing tests.

pub mod http;
pub mod in_memory;
pub mod recording;

pub use http::HttpKnowledgeStore;
pub use in_memory::InMemoryKnowledgeStore;
pub use recording::{FailingKnowledgeStore, RecordedQuery, RecordingKnowledgeStore};

use std::sync::Arc;
use triagent_config::TriageConfig;
use triagent_core::KnowledgeStore;

/// Build the knowledge store described by the configuration.
pub fn build_from_config(config: &TriageConfig) -> Arc<dyn KnowledgeStore> {
    Arc::new(HttpKnowledgeStore::new(&config.retrieval.knowledge_url))
}
