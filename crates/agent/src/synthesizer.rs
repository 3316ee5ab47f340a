//! Response synthesis — retrieval-grounded, streamed, failure-tolerant.
//!
//! One implementation serves both severity paths; the `ResponseProfile`
//! supplies everything that differs. The synthesis call streams, and the
//! accumulated text is what gets persisted; a consumer may watch increments
//! arrive through the event channel but never sees a different final text.
//!
//! Failure semantics: a mid-stream error keeps whatever accumulated so far;
//! an empty or whitespace-only accumulation is replaced by the profile's
//! fixed safety fallback. A synthesis turn never produces an empty reply.

use crate::context::ContextAssembler;
use crate::profile::ResponseProfile;
use crate::stream_event::TriageStreamEvent;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use triagent_core::knowledge::{KnowledgeStore, Partition};
use triagent_core::message::{Role, Turn};
use triagent_core::provider::{Provider, ProviderRequest};

/// Synthesizes the assistant reply for one triage turn.
pub struct ResponseSynthesizer {
    provider: Arc<dyn Provider>,
    knowledge: Arc<dyn KnowledgeStore>,
    assembler: ContextAssembler,
    model: String,
    temperature: f32,
    max_tokens: u32,
    top_k: usize,
}

impl ResponseSynthesizer {
    pub fn new(
        provider: Arc<dyn Provider>,
        knowledge: Arc<dyn KnowledgeStore>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            knowledge,
            assembler: ContextAssembler::default(),
            model: model.into(),
            temperature: 0.2,
            max_tokens: 512,
            top_k: 4,
        }
    }

    /// Override the sampling parameters.
    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Override the retrieval parameters.
    pub fn with_retrieval(mut self, top_k: usize, context_max_lines: usize) -> Self {
        self.top_k = top_k;
        self.assembler = ContextAssembler::new(context_max_lines);
        self
    }

    /// Generate the assistant turn for this history and profile.
    pub async fn respond(&self, history: &[Turn], profile: &ResponseProfile) -> Turn {
        self.respond_inner(history, profile, None).await
    }

    /// Same as `respond`, but forwards text increments as they arrive.
    ///
    /// A dropped event receiver stops the forwarding, not the synthesis;
    /// the final accumulated turn is identical either way.
    pub async fn respond_streaming(
        &self,
        history: &[Turn],
        profile: &ResponseProfile,
        events: &mpsc::Sender<TriageStreamEvent>,
    ) -> Turn {
        self.respond_inner(history, profile, Some(events)).await
    }

    async fn respond_inner(
        &self,
        history: &[Turn],
        profile: &ResponseProfile,
        events: Option<&mpsc::Sender<TriageStreamEvent>>,
    ) -> Turn {
        let query = history
            .iter()
            .rev()
            .find(|t| t.role == Role::User)
            .map(|t| t.content.as_str())
            .unwrap_or("");

        let context = if query.is_empty() {
            String::new()
        } else {
            self.retrieve_context(query, &profile.partition).await
        };

        let mut messages = vec![Turn::system(profile.system_prompt(&context))];
        messages.extend_from_slice(history);

        let request = ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
            stream: true,
            stop: vec![],
        };

        let mut accumulated = String::new();

        match self.provider.stream(request).await {
            Ok(mut rx) => {
                while let Some(chunk_result) = rx.recv().await {
                    match chunk_result {
                        Ok(chunk) => {
                            if let Some(ref text) = chunk.content
                                && !text.is_empty()
                            {
                                accumulated.push_str(text);
                                if let Some(tx) = events {
                                    let _ = tx
                                        .send(TriageStreamEvent::Chunk {
                                            content: text.clone(),
                                        })
                                        .await;
                                }
                            }
                            if chunk.done {
                                break;
                            }
                        }
                        Err(e) => {
                            // Partial output is kept; the fallback below
                            // covers the nothing-arrived case.
                            warn!(error = %e, "Synthesis stream interrupted");
                            if let Some(tx) = events {
                                let _ = tx
                                    .send(TriageStreamEvent::Error {
                                        message: e.to_string(),
                                    })
                                    .await;
                            }
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Synthesis request failed");
                if let Some(tx) = events {
                    let _ = tx
                        .send(TriageStreamEvent::Error {
                            message: e.to_string(),
                        })
                        .await;
                }
            }
        }

        if accumulated.trim().is_empty() {
            debug!(severity = %profile.severity, "Empty synthesis output, using fallback");
            accumulated = profile.fallback_text.clone();
            // Streaming consumers render chunk text only, so the fallback
            // must travel as one.
            if let Some(tx) = events {
                let _ = tx
                    .send(TriageStreamEvent::Chunk {
                        content: accumulated.clone(),
                    })
                    .await;
            }
        }

        Turn::assistant(accumulated)
    }

    /// Retrieve and assemble the context block, degrading to empty on any
    /// backend fault.
    async fn retrieve_context(&self, query: &str, partition: &Partition) -> String {
        match self.knowledge.search(query, partition, self.top_k).await {
            Ok(fragments) => {
                debug!(
                    count = fragments.len(),
                    partition = %partition,
                    "Retrieved guideline fragments"
                );
                self.assembler.assemble(&fragments)
            }
            Err(e) => {
                warn!(
                    partition = %partition,
                    error = %e,
                    "Retrieval failed, synthesizing without guidelines"
                );
                String::new()
            }
        }
    }
}

/// Strip any preamble before the first numbered step.
///
/// Small local models often open with a meta remark before the step list;
/// display surfaces show the steps only. The stored turn keeps the full
/// text.
pub fn trim_to_first_step(answer: &str) -> &str {
    match answer.find("1.") {
        Some(idx) => &answer[idx..],
        None => answer,
    }
}
