//! Completion service client for Triagent.
//!
//! One backend shape covers every deployment this system targets: a local
//! OpenAI-compatible chat-completions endpoint (llama.cpp server, vLLM,
//! Ollama). The client implements the `triagent_core::Provider` trait.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use std::sync::Arc;
use triagent_config::TriageConfig;
use triagent_core::provider::Provider;

/// Build the completion provider from configuration.
pub fn build_from_config(config: &TriageConfig) -> Arc<dyn Provider> {
    Arc::new(
        OpenAiCompatProvider::new(
            "openai-compat",
            &config.base_url,
            config.api_key_or_placeholder(),
        )
        .with_timeout(config.timeout_secs),
    )
}
