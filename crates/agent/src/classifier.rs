//! Severity classification — the single decision point of a triage turn.
//!
//! One non-streaming, zero-temperature, ten-token completion call per
//! patient message. The raw completion is normalized into a `Severity`;
//! anything the backend does wrong (errors, empty output, garbled text)
//! degrades to the configured fallback severity instead of surfacing, so
//! classification can never abort a turn.

use crate::prompts;
use std::sync::Arc;
use tracing::{debug, warn};
use triagent_core::Severity;
use triagent_core::message::Turn;
use triagent_core::provider::{Provider, ProviderRequest};

/// Classifies one patient message as CRITICAL or NORMAL.
pub struct SeverityClassifier {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    fallback: Severity,
}

impl SeverityClassifier {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
            max_tokens: 10,
            fallback: Severity::Normal,
        }
    }

    /// Override the sampling parameters.
    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Set the severity used when classification fails or is ambiguous.
    pub fn with_fallback(mut self, severity: Severity) -> Self {
        self.fallback = severity;
        self
    }

    /// Classify the most recent patient message.
    ///
    /// Only the message itself is sent; older history never influences the
    /// verdict. Never fails: every outcome maps to a valid `Severity`.
    pub async fn classify(&self, user_text: &str) -> Severity {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: vec![Turn::user(prompts::classifier_prompt(user_text))],
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
            stream: false,
            stop: vec![],
        };

        match self.provider.complete(request).await {
            Ok(response) => {
                let raw = response.message.content;
                match Severity::from_completion(&raw) {
                    Some(severity) => {
                        debug!(severity = %severity, "Severity assessed");
                        severity
                    }
                    None => {
                        warn!(
                            raw = %raw,
                            fallback = %self.fallback,
                            "Unparseable severity output, using fallback"
                        );
                        self.fallback
                    }
                }
            }
            Err(e) => {
                warn!(
                    error = %e,
                    fallback = %self.fallback,
                    "Classification call failed, using fallback"
                );
                self.fallback
            }
        }
    }
}
