//! Per-severity response profiles.
//!
//! The two response paths share one synthesizer implementation; everything
//! that differs between them lives here: the system instruction, the corpus
//! partition to retrieve from, and the fixed safety fallback used when the
//! backend produces nothing usable.

use crate::prompts;
use triagent_config::RetrievalConfig;
use triagent_core::Severity;
use triagent_core::knowledge::Partition;

/// The fixed reply when the critical path yields no usable output.
pub const CRITICAL_FALLBACK: &str =
    "Critical Error: Please call Emergency Services immediately.";

/// The fixed reply when the routine path yields no usable output.
pub const ROUTINE_FALLBACK: &str =
    "I apologize, I couldn't generate a response. Please consult a doctor.";

/// Everything severity-specific about one response path.
#[derive(Debug, Clone)]
pub struct ResponseProfile {
    pub severity: Severity,
    pub partition: Partition,
    pub fallback_text: String,
}

impl ResponseProfile {
    /// The emergency-response profile.
    pub fn critical(partition: Partition) -> Self {
        Self {
            severity: Severity::Critical,
            partition,
            fallback_text: CRITICAL_FALLBACK.into(),
        }
    }

    /// The general-advice profile.
    pub fn routine(partition: Partition) -> Self {
        Self {
            severity: Severity::Normal,
            partition,
            fallback_text: ROUTINE_FALLBACK.into(),
        }
    }

    /// Build the profile for a severity using the configured partitions.
    pub fn for_severity(severity: Severity, retrieval: &RetrievalConfig) -> Self {
        match severity {
            Severity::Critical => {
                Self::critical(Partition::from(&retrieval.critical_partition))
            }
            Severity::Normal => Self::routine(Partition::from(&retrieval.routine_partition)),
        }
    }

    /// The system instruction for this profile with the context embedded.
    pub fn system_prompt(&self, context: &str) -> String {
        match self.severity {
            Severity::Critical => prompts::critical_system_prompt(context),
            Severity::Normal => prompts::routine_system_prompt(context),
        }
    }
}
