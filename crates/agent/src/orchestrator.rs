//! The triage state machine.
//!
//! Each patient turn drives one pass through
//! `Start → Classifying → {CriticalResponse | NormalResponse} → Done`.
//! The branch is chosen by a single router over the typed severity tag, both
//! response phases transition unconditionally to `Done`, and `Done` appends
//! exactly one assistant turn to the conversation. The machine is re-entrant
//! per turn: the next message starts again from `Start` over the accumulated
//! history.
//!
//! The orchestrator itself is stateless across turns; the only durable state
//! is the externally stored history keyed by session id.

use crate::classifier::SeverityClassifier;
use crate::profile::ResponseProfile;
use crate::stream_event::TriageStreamEvent;
use crate::synthesizer::ResponseSynthesizer;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use triagent_config::TriageConfig;
use triagent_core::Severity;
use triagent_core::knowledge::KnowledgeStore;
use triagent_core::message::{Conversation, Turn};
use triagent_core::provider::Provider;

/// Phases of one triage turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriagePhase {
    Start,
    Classifying,
    CriticalResponse,
    NormalResponse,
    Done,
}

impl TriagePhase {
    /// The router: which response phase handles this severity.
    pub fn for_severity(severity: Severity) -> Self {
        match severity {
            Severity::Critical => TriagePhase::CriticalResponse,
            Severity::Normal => TriagePhase::NormalResponse,
        }
    }
}

/// What one triage turn produced.
#[derive(Debug, Clone)]
pub struct TriageOutcome {
    pub severity: Severity,
    pub reply: String,
}

/// Sequences classification, routing, and synthesis for each patient turn.
pub struct TriageOrchestrator {
    classifier: SeverityClassifier,
    synthesizer: ResponseSynthesizer,
    critical_profile: ResponseProfile,
    routine_profile: ResponseProfile,
}

impl TriageOrchestrator {
    pub fn new(
        provider: Arc<dyn Provider>,
        knowledge: Arc<dyn KnowledgeStore>,
        config: &TriageConfig,
    ) -> Self {
        let classifier = SeverityClassifier::new(provider.clone(), &config.model)
            .with_sampling(config.classifier.temperature, config.classifier.max_tokens)
            .with_fallback(config.triage.fallback_severity);

        let synthesizer = ResponseSynthesizer::new(provider, knowledge, &config.model)
            .with_sampling(config.responder.temperature, config.responder.max_tokens)
            .with_retrieval(config.retrieval.top_k, config.retrieval.context_max_lines);

        Self {
            classifier,
            synthesizer,
            critical_profile: ResponseProfile::for_severity(Severity::Critical, &config.retrieval),
            routine_profile: ResponseProfile::for_severity(Severity::Normal, &config.retrieval),
        }
    }

    fn profile_for(&self, phase: TriagePhase) -> &ResponseProfile {
        match phase {
            TriagePhase::CriticalResponse => &self.critical_profile,
            _ => &self.routine_profile,
        }
    }

    /// Run one triage turn to completion.
    ///
    /// Appends the user turn and the synthesized assistant turn to the
    /// conversation. Always returns an outcome; every failure mode inside
    /// the machine degrades rather than propagating.
    pub async fn run(&self, conversation: &mut Conversation, user_text: &str) -> TriageOutcome {
        self.run_inner(conversation, user_text, None).await
    }

    /// Same machine, but forwards the classifier verdict and text
    /// increments to an event channel as they occur. History mutation is
    /// identical to `run`.
    pub async fn run_streaming(
        &self,
        conversation: &mut Conversation,
        user_text: &str,
        events: mpsc::Sender<TriageStreamEvent>,
    ) -> TriageOutcome {
        let outcome = self.run_inner(conversation, user_text, Some(&events)).await;
        let _ = events
            .send(TriageStreamEvent::Done {
                session_id: conversation.id.to_string(),
                severity: outcome.severity,
            })
            .await;
        outcome
    }

    async fn run_inner(
        &self,
        conversation: &mut Conversation,
        user_text: &str,
        events: Option<&mpsc::Sender<TriageStreamEvent>>,
    ) -> TriageOutcome {
        let mut phase = TriagePhase::Start;
        debug!(session = %conversation.id, ?phase, "Triage turn started");

        conversation.push(Turn::user(user_text));

        phase = TriagePhase::Classifying;
        debug!(session = %conversation.id, ?phase, "Classifying patient message");
        let severity = self.classifier.classify(user_text).await;

        info!(session = %conversation.id, severity = %severity, "Severity assessed");
        if let Some(tx) = events {
            let _ = tx.send(TriageStreamEvent::Severity { severity }).await;
        }

        phase = TriagePhase::for_severity(severity);
        debug!(session = %conversation.id, ?phase, "Routing to response path");
        let profile = self.profile_for(phase);

        let reply = match events {
            Some(tx) => {
                self.synthesizer
                    .respond_streaming(&conversation.turns, profile, tx)
                    .await
            }
            None => self.synthesizer.respond(&conversation.turns, profile).await,
        };

        phase = TriagePhase::Done;
        debug!(
            session = %conversation.id,
            ?phase,
            reply_len = reply.content.len(),
            "Triage turn complete"
        );

        let text = reply.content.clone();
        conversation.push(reply);

        TriageOutcome {
            severity,
            reply: text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{ScriptedProvider, make_response, text_chunks};
    use triagent_core::error::ProviderError;
    use triagent_core::message::{Role, SessionId};
    use triagent_knowledge::{
        FailingKnowledgeStore, InMemoryKnowledgeStore, RecordingKnowledgeStore,
    };

    fn recording_store() -> Arc<RecordingKnowledgeStore> {
        Arc::new(RecordingKnowledgeStore::wrap(Arc::new(
            InMemoryKnowledgeStore::new().with_demo_corpus(),
        )))
    }

    fn orchestrator(
        provider: Arc<ScriptedProvider>,
        knowledge: Arc<dyn triagent_core::KnowledgeStore>,
    ) -> TriageOrchestrator {
        TriageOrchestrator::new(provider, knowledge, &TriageConfig::default())
    }

    fn conversation() -> Conversation {
        Conversation::new(SessionId::from("patient_session_001"))
    }

    #[test]
    fn router_maps_severity_to_phase() {
        assert_eq!(
            TriagePhase::for_severity(Severity::Critical),
            TriagePhase::CriticalResponse
        );
        assert_eq!(
            TriagePhase::for_severity(Severity::Normal),
            TriagePhase::NormalResponse
        );
    }

    #[tokio::test]
    async fn critical_message_routes_to_emergency_partition() {
        let provider = Arc::new(ScriptedProvider::texts(&[
            "CRITICAL",
            "1. Call emergency services now.",
        ]));
        let store = recording_store();
        let orchestrator = orchestrator(provider.clone(), store.clone());

        let mut conv = conversation();
        let outcome = orchestrator
            .run(&mut conv, "My chest feels heavy and left arm hurts.")
            .await;

        assert_eq!(outcome.severity, Severity::Critical);
        assert_eq!(outcome.reply, "1. Call emergency services now.");
        assert_eq!(store.partitions(), vec!["emergency"]);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn question_routes_to_general_partition() {
        let provider = Arc::new(ScriptedProvider::texts(&[
            "NORMAL",
            "Rest, fluids, and monitor your temperature.",
        ]));
        let store = recording_store();
        let orchestrator = orchestrator(provider, store.clone());

        let mut conv = conversation();
        let outcome = orchestrator.run(&mut conv, "Could it be the flu?").await;

        assert_eq!(outcome.severity, Severity::Normal);
        assert_eq!(store.partitions(), vec!["general"]);
    }

    #[tokio::test]
    async fn broken_index_still_produces_nonempty_reply() {
        let provider = Arc::new(ScriptedProvider::texts(&[
            "NORMAL",
            "General advice without guidelines.",
        ]));
        let orchestrator = orchestrator(provider, Arc::new(FailingKnowledgeStore));

        let mut conv = conversation();
        let outcome = orchestrator.run(&mut conv, "mild sore throat").await;

        assert!(!outcome.reply.is_empty());
        assert_eq!(outcome.reply, "General advice without guidelines.");
    }

    #[tokio::test]
    async fn appends_exactly_one_assistant_turn() {
        let provider = Arc::new(ScriptedProvider::texts(&["NORMAL", "Some advice."]));
        let orchestrator = orchestrator(provider, recording_store());

        let mut conv = conversation();
        orchestrator.run(&mut conv, "headache").await;

        let assistants = conv
            .turns
            .iter()
            .filter(|t| t.role == Role::Assistant)
            .count();
        assert_eq!(assistants, 1);
        assert_eq!(conv.turns.len(), 2);
        assert_eq!(conv.turns[0].role, Role::User);
    }

    #[tokio::test]
    async fn history_alternates_over_two_turns() {
        let provider = Arc::new(ScriptedProvider::texts(&[
            "NORMAL",
            "First answer.",
            "NORMAL",
            "Second answer.",
        ]));
        let orchestrator = orchestrator(provider, recording_store());

        let mut conv = conversation();
        orchestrator.run(&mut conv, "first question").await;
        orchestrator.run(&mut conv, "second question").await;

        let roles: Vec<Role> = conv.turns.iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
        );
        assert_eq!(conv.turns[2].content, "second question");
        assert_eq!(conv.turns[3].content, "Second answer.");
    }

    #[tokio::test]
    async fn classifier_error_falls_back_to_routine_path() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(ProviderError::Network("connection refused".into())),
            Ok(make_response("Please describe your symptoms.")),
        ]));
        let store = recording_store();
        let orchestrator = orchestrator(provider, store.clone());

        let mut conv = conversation();
        let outcome = orchestrator.run(&mut conv, "something hurts").await;

        assert_eq!(outcome.severity, Severity::Normal);
        assert_eq!(store.partitions(), vec!["general"]);
    }

    #[tokio::test]
    async fn streaming_emits_severity_chunks_done() {
        let provider = Arc::new(
            ScriptedProvider::texts(&["CRITICAL"])
                .with_stream(text_chunks(&["1. Call ", "emergency services."])),
        );
        let orchestrator = orchestrator(provider, recording_store());

        let (tx, mut rx) = mpsc::channel(16);
        let mut conv = conversation();
        let outcome = orchestrator
            .run_streaming(&mut conv, "I am choking and cannot breathe.", tx)
            .await;

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        assert!(matches!(
            events.first(),
            Some(TriageStreamEvent::Severity {
                severity: Severity::Critical
            })
        ));
        assert!(matches!(
            events.last(),
            Some(TriageStreamEvent::Done { .. })
        ));
        let streamed: String = events
            .iter()
            .filter_map(|e| match e {
                TriageStreamEvent::Chunk { content } => Some(content.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(streamed, "1. Call emergency services.");
        assert_eq!(outcome.reply, streamed);

        // history mutation identical to the blocking variant
        assert_eq!(conv.turns.len(), 2);
        assert_eq!(conv.turns[1].content, "1. Call emergency services.");
    }

    #[tokio::test]
    async fn streaming_done_carries_session_id() {
        let provider = Arc::new(ScriptedProvider::texts(&["NORMAL", "Rest."]));
        let orchestrator = orchestrator(provider, recording_store());

        let (tx, mut rx) = mpsc::channel(16);
        let mut conv = conversation();
        orchestrator.run_streaming(&mut conv, "tired", tx).await;

        let mut last = None;
        while let Some(event) = rx.recv().await {
            last = Some(event);
        }
        match last {
            Some(TriageStreamEvent::Done {
                session_id,
                severity,
            }) => {
                assert_eq!(session_id, "patient_session_001");
                assert_eq!(severity, Severity::Normal);
            }
            other => panic!("Expected done event, got {other:?}"),
        }
    }
}
