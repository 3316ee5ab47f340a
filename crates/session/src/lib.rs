//! Session identity and history persistence for Triagent.
//!
//! Two concerns live here, both behind traits from `triagent-core`:
//! - `SessionIdAllocator`: the durable `patient_session_###` counter.
//! - `SessionStore`: append-only conversation history, SQLite-backed in
//!   production and in-memory for tests.

pub mod counter;
pub mod in_memory;
pub mod sqlite;

pub use counter::{FileCounterAllocator, InMemoryAllocator};
pub use in_memory::InMemorySessionStore;
pub use sqlite::SqliteSessionStore;
