//! Command implementations for the Triagent CLI.

pub mod ask;
pub mod chat;
pub mod doctor;
pub mod init;
pub mod serve;
pub mod sessions;

use std::sync::Arc;
use triagent_agent::TriageOrchestrator;
use triagent_config::TriageConfig;
use triagent_core::{SessionIdAllocator, SessionStore};

/// Everything a terminal triage command needs, wired from configuration.
pub(crate) struct TriageRuntime {
    pub orchestrator: TriageOrchestrator,
    pub store: Arc<dyn SessionStore>,
    pub allocator: Arc<dyn SessionIdAllocator>,
}

impl TriageRuntime {
    pub async fn build(config: &TriageConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let provider = triagent_providers::build_from_config(config);
        let knowledge = triagent_knowledge::build_from_config(config);
        let store: Arc<dyn SessionStore> = Arc::new(
            triagent_session::SqliteSessionStore::new(&config.session.database_url).await?,
        );
        let allocator: Arc<dyn SessionIdAllocator> = Arc::new(
            triagent_session::FileCounterAllocator::new(&config.session.counter_path),
        );

        Ok(Self {
            orchestrator: TriageOrchestrator::new(provider, knowledge, config),
            store,
            allocator,
        })
    }
}
