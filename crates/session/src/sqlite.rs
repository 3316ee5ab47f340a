//! SQLite session store.
//!
//! One `turns` table, append-only. The integer rowid gives insertion order,
//! which is the only ordering the triage flow relies on: a session's history
//! is replayed exactly as it was appended.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};
use triagent_core::error::SessionError;
use triagent_core::message::{Role, SessionId, Turn};
use triagent_core::session::{SessionStore, SessionSummary};

/// A durable SQLite-backed session store.
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    /// Open (or create) the database at the given sqlx URL.
    ///
    /// Pass `"sqlite::memory:"` for an in-process ephemeral database
    /// (useful for tests).
    pub async fn new(url: &str) -> Result<Self, SessionError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| SessionError::Storage(format!("Invalid SQLite URL: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| SessionError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite session store initialized at {url}");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), SessionError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS turns (
                iid        INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                turn_id    TEXT NOT NULL,
                role       TEXT NOT NULL,
                content    TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| SessionError::MigrationFailed(format!("turns table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_turns_session ON turns(session_id)")
            .execute(&self.pool)
            .await
            .map_err(|e| SessionError::MigrationFailed(format!("session index: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    fn row_to_turn(row: &sqlx::sqlite::SqliteRow) -> Result<Turn, SessionError> {
        let id: String = row
            .try_get("turn_id")
            .map_err(|e| SessionError::Storage(format!("turn_id column: {e}")))?;
        let role_str: String = row
            .try_get("role")
            .map_err(|e| SessionError::Storage(format!("role column: {e}")))?;
        let content: String = row
            .try_get("content")
            .map_err(|e| SessionError::Storage(format!("content column: {e}")))?;
        let created_at_str: String = row
            .try_get("created_at")
            .map_err(|e| SessionError::Storage(format!("created_at column: {e}")))?;

        let role = Role::parse(&role_str)
            .ok_or_else(|| SessionError::Storage(format!("unknown role: {role_str}")))?;

        let timestamp = chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(Turn {
            id,
            role,
            content,
            timestamp,
        })
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn append_turn(&self, session: &SessionId, turn: &Turn) -> Result<(), SessionError> {
        sqlx::query(
            r#"
            INSERT INTO turns (session_id, turn_id, role, content, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(session.as_str())
        .bind(&turn.id)
        .bind(turn.role.as_str())
        .bind(&turn.content)
        .bind(turn.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| SessionError::Storage(format!("INSERT failed: {e}")))?;

        debug!(session = %session, role = turn.role.as_str(), "Appended turn");
        Ok(())
    }

    async fn history(&self, session: &SessionId) -> Result<Vec<Turn>, SessionError> {
        let rows = sqlx::query("SELECT * FROM turns WHERE session_id = ?1 ORDER BY iid ASC")
            .bind(session.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SessionError::Storage(format!("history query: {e}")))?;

        rows.iter().map(Self::row_to_turn).collect()
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, SessionError> {
        let rows = sqlx::query(
            r#"
            SELECT session_id, COUNT(*) AS turn_count, MAX(created_at) AS last_at
            FROM turns
            GROUP BY session_id
            ORDER BY last_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SessionError::Storage(format!("list query: {e}")))?;

        rows.iter()
            .map(|row| {
                let id: String = row
                    .try_get("session_id")
                    .map_err(|e| SessionError::Storage(format!("session_id column: {e}")))?;
                let turns: i64 = row
                    .try_get("turn_count")
                    .map_err(|e| SessionError::Storage(format!("turn_count column: {e}")))?;
                let last_at: String = row
                    .try_get("last_at")
                    .map_err(|e| SessionError::Storage(format!("last_at column: {e}")))?;

                let updated_at = chrono::DateTime::parse_from_rfc3339(&last_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now());

                Ok(SessionSummary {
                    id: SessionId(id),
                    turns: turns as usize,
                    updated_at,
                })
            })
            .collect()
    }
}
