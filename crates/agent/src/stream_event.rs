//! Triage-level streaming events.
//!
//! `TriageStreamEvent` wraps provider-level stream chunks into higher-level
//! events that the gateway can forward to clients over SSE:
//! - `severity` — the classifier's verdict, emitted once before synthesis
//! - `chunk`    — partial reply text from the responder
//! - `done`     — the turn is complete, final metadata
//! - `error`    — an error occurred

use serde::{Deserialize, Serialize};
use triagent_core::Severity;

/// Events emitted by the orchestrator during a streaming triage turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriageStreamEvent {
    /// Classification finished; synthesis is about to start.
    Severity { severity: Severity },

    /// Partial reply text from the responder.
    Chunk { content: String },

    /// The turn is complete — final metadata.
    Done {
        session_id: String,
        severity: Severity,
    },

    /// An error occurred mid-turn.
    Error { message: String },
}

impl TriageStreamEvent {
    /// SSE event name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Severity { .. } => "severity",
            Self::Chunk { .. } => "chunk",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization_severity() {
        let event = TriageStreamEvent::Severity {
            severity: Severity::Critical,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"severity""#));
        assert!(json.contains(r#""severity":"critical""#));
    }

    #[test]
    fn event_serialization_chunk() {
        let event = TriageStreamEvent::Chunk {
            content: "1. Call".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"chunk""#));
        assert!(json.contains(r#""content":"1. Call""#));
    }

    #[test]
    fn event_serialization_done() {
        let event = TriageStreamEvent::Done {
            session_id: "patient_session_001".into(),
            severity: Severity::Normal,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"done""#));
        assert!(json.contains("patient_session_001"));
    }

    #[test]
    fn event_type_names() {
        assert_eq!(
            TriageStreamEvent::Severity {
                severity: Severity::Normal
            }
            .event_type(),
            "severity"
        );
        assert_eq!(
            TriageStreamEvent::Chunk {
                content: "x".into()
            }
            .event_type(),
            "chunk"
        );
        assert_eq!(
            TriageStreamEvent::Done {
                session_id: "s".into(),
                severity: Severity::Normal
            }
            .event_type(),
            "done"
        );
        assert_eq!(
            TriageStreamEvent::Error {
                message: "x".into()
            }
            .event_type(),
            "error"
        );
    }

    #[test]
    fn event_deserialization() {
        let json = r#"{"type":"chunk","content":"hi"}"#;
        let event: TriageStreamEvent = serde_json::from_str(json).unwrap();
        match event {
            TriageStreamEvent::Chunk { content } => assert_eq!(content, "hi"),
            _ => panic!("Wrong variant"),
        }
    }
}
