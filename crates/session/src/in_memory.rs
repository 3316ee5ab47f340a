//! In-memory session store — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use triagent_core::error::SessionError;
use triagent_core::message::{SessionId, Turn};
use triagent_core::session::{SessionStore, SessionSummary};

/// A session store that keeps histories in a map. Nothing survives the
/// process.
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Vec<Turn>>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn append_turn(&self, session: &SessionId, turn: &Turn) -> Result<(), SessionError> {
        self.sessions
            .write()
            .await
            .entry(session.as_str().to_string())
            .or_default()
            .push(turn.clone());
        Ok(())
    }

    async fn history(&self, session: &SessionId) -> Result<Vec<Turn>, SessionError> {
        Ok(self
            .sessions
            .read()
            .await
            .get(session.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, SessionError> {
        let sessions = self.sessions.read().await;
        let mut summaries: Vec<SessionSummary> = sessions
            .iter()
            .map(|(id, turns)| SessionSummary {
                id: SessionId::from(id),
                turns: turns.len(),
                updated_at: turns.last().map(|t| t.timestamp).unwrap_or_else(Utc::now),
            })
            .collect();

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }
}
