//! HTTP client for a similarity-search service.
//!
//! Speaks a small JSON protocol: `POST /search` with
//! `{ "query": ..., "top_k": ..., "partition": ... }`, answered by ranked
//! hits carrying text, source label, and score. The index itself is built
//! offline by the ingestion job; this client only queries it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use triagent_core::error::KnowledgeError;
use triagent_core::knowledge::{GuidelineFragment, KnowledgeStore, Partition};

/// Client for a remote similarity-search index.
pub struct HttpKnowledgeStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpKnowledgeStore {
    /// Create a client for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: build_client(30),
        }
    }

    /// Replace the request timeout (seconds).
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.client = build_client(secs);
        self
    }
}

fn build_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .expect("Failed to create HTTP client")
}

#[async_trait]
impl KnowledgeStore for HttpKnowledgeStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn search(
        &self,
        query: &str,
        partition: &Partition,
        k: usize,
    ) -> std::result::Result<Vec<GuidelineFragment>, KnowledgeError> {
        let url = format!("{}/search", self.base_url);

        let body = SearchRequest {
            query: query.to_string(),
            top_k: k,
            partition: partition.as_str().to_string(),
        };

        debug!(partition = %partition, top_k = k, "Querying knowledge index");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| KnowledgeError::Backend(e.to_string()))?;

        let status = response.status().as_u16();

        if !(200..300).contains(&status) {
            let message = response.text().await.unwrap_or_default();
            return Err(KnowledgeError::QueryFailed {
                status_code: status,
                message,
            });
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| KnowledgeError::InvalidResponse(e.to_string()))?;

        Ok(parsed
            .results
            .into_iter()
            .map(|hit| GuidelineFragment {
                content: hit.text,
                source: hit.source,
                score: hit.score,
            })
            .collect())
    }

    async fn health_check(&self) -> std::result::Result<bool, KnowledgeError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| KnowledgeError::Backend(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

// --- Wire types ---

#[derive(Debug, Serialize)]
struct SearchRequest {
    query: String,
    top_k: usize,
    partition: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    text: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    score: f32,
}
