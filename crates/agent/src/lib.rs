//! The triage orchestration engine — the heart of Triagent.
//!
//! Every patient turn runs the same machine:
//!
//! 1. **Classify** the message as CRITICAL or NORMAL (one cold, short
//!    completion call)
//! 2. **Route** to the response profile for that severity
//! 3. **Retrieve** guideline fragments from the matching corpus partition
//!    and assemble a bounded context block
//! 4. **Synthesize** a constrained answer over the streamed completion,
//!    falling back to a fixed safety string if nothing usable arrives
//!
//! Classification, retrieval, and synthesis each recover from backend
//! failures locally; a turn always ends with a non-empty assistant reply.

pub mod classifier;
pub mod context;
pub mod orchestrator;
pub mod profile;
pub mod prompts;
pub mod stream_event;
pub mod synthesizer;

pub use classifier::SeverityClassifier;
pub use context::ContextAssembler;
pub use orchestrator::{TriageOrchestrator, TriageOutcome, TriagePhase};
pub use profile::ResponseProfile;
pub use stream_event::TriageStreamEvent;
pub use synthesizer::{ResponseSynthesizer, trim_to_first_step};

#[cfg(test)]
pub(crate) mod test_helpers;
