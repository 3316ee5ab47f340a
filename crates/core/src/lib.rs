//! # Triagent Core
//!
//! Domain types, traits, and error definitions for the Triagent medical-triage
//! engine. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (text generation, knowledge retrieval, session
//! identity and storage) is defined as a trait here. Implementations live in
//! their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod knowledge;
pub mod message;
pub mod provider;
pub mod session;
pub mod severity;

// Re-export key types at crate root for ergonomics
pub use error::{Error, KnowledgeError, ProviderError, Result, SessionError};
pub use knowledge::{GuidelineFragment, KnowledgeStore, Partition};
pub use message::{Conversation, Role, SessionId, Turn};
pub use provider::{Provider, ProviderRequest, ProviderResponse, StreamChunk};
pub use session::{SessionIdAllocator, SessionStore, SessionSummary};
pub use severity::Severity;
