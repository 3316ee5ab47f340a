//! Turn and Conversation domain types.
//!
//! These are the core value objects that flow through the entire system:
//! a patient message arrives → the orchestrator classifies it → a synthesizer
//! generates a reply → both turns land in the session's conversation history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a triage session.
///
/// Unlike throwaway request ids these are allocated by a durable counter
/// (e.g. `patient_session_007`) so a patient can resume a conversation
/// across process restarts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a turn's author in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The patient
    User,
    /// The triage assistant
    Assistant,
    /// System instructions (role framing, guideline context)
    System,
}

impl Role {
    /// Wire-format name, as sent to the completion service.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }

    /// Inverse of `as_str`, for decoding stored turns.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            "system" => Some(Role::System),
            _ => None,
        }
    }
}

/// A single turn in a conversation.
///
/// History is append-only: turns are never edited or removed once pushed,
/// because the full transcript is replayed verbatim on every synthesis call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Unique turn ID
    pub id: String,

    /// Who authored this turn
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a new patient turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    /// Create a new assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    /// Create a new system turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content)
    }

    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A conversation is an ordered, append-only sequence of turns for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// The owning session
    pub id: SessionId,

    /// Ordered turns
    pub turns: Vec<Turn>,

    /// When this conversation was created
    pub created_at: DateTime<Utc>,

    /// When the last turn was added
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new empty conversation for the given session.
    pub fn new(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            turns: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a conversation from previously stored turns.
    pub fn from_turns(id: SessionId, turns: Vec<Turn>) -> Self {
        let mut conv = Self::new(id);
        if let Some(last) = turns.last() {
            conv.updated_at = last.timestamp;
        }
        if let Some(first) = turns.first() {
            conv.created_at = first.timestamp;
        }
        conv.turns = turns;
        conv
    }

    /// Append a turn to the conversation.
    pub fn push(&mut self, turn: Turn) {
        self.updated_at = Utc::now();
        self.turns.push(turn);
    }

    /// The most recent patient turn, if any.
    ///
    /// Classification keys off this single turn; older history is context
    /// for synthesis only.
    pub fn last_user(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|t| t.role == Role::User)
    }

    /// Total token count estimate (rough: 4 chars ≈ 1 token).
    pub fn estimated_tokens(&self) -> usize {
        self.turns.iter().map(|t| t.content.len() / 4).sum()
    }
}
