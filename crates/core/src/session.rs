//! Session identity and history storage traits.
//!
//! Session ids come from a durable monotonic counter so they stay
//! human-readable and stable across restarts. Histories are append-only:
//! the store never edits or reorders turns, it only accumulates them.

use crate::error::SessionError;
use crate::message::{SessionId, Turn};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Allocates durable, monotonically increasing session identifiers.
///
/// One global counter, not per-user. Abstracted as a trait so tests can
/// inject a deterministic in-memory counter instead of touching disk.
pub trait SessionIdAllocator: Send + Sync {
    /// Issue the next session id (e.g., `patient_session_042`).
    fn next_id(&self) -> std::result::Result<SessionId, SessionError>;
}

/// Summary row for listing stored sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// The session id
    pub id: SessionId,

    /// Number of stored turns
    pub turns: usize,

    /// Timestamp of the most recent turn
    pub updated_at: DateTime<Utc>,
}

/// The session history store.
///
/// Implementations: SQLite (durable), in-memory (for testing).
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The backend name (e.g., "sqlite", "in-memory").
    fn name(&self) -> &str;

    /// Append one turn to a session's history.
    async fn append_turn(
        &self,
        session: &SessionId,
        turn: &Turn,
    ) -> std::result::Result<(), SessionError>;

    /// Load a session's full history in insertion order.
    ///
    /// An unknown session id yields an empty history, not an error; a new
    /// session simply has no turns yet.
    async fn history(&self, session: &SessionId) -> std::result::Result<Vec<Turn>, SessionError>;

    /// List stored sessions, most recently active first.
    async fn list_sessions(&self) -> std::result::Result<Vec<SessionSummary>, SessionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_serialization() {
        let summary = SessionSummary {
            id: SessionId::from("patient_session_003"),
            turns: 4,
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("patient_session_003"));
        assert!(json.contains("\"turns\":4"));
    }
}
