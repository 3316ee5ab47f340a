//! Session id allocators.
//!
//! Ids are human-readable and monotonically assigned: `patient_session_001`,
//! `patient_session_002`, and so on from a single global counter. The file
//! allocator persists the last issued number so the sequence survives
//! restarts; the in-memory allocator serves tests.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;
use triagent_core::error::SessionError;
use triagent_core::message::SessionId;

fn format_id(n: u64) -> SessionId {
    SessionId(format!("patient_session_{n:03}"))
}

/// File-backed allocator. Stores the last issued number as one line of text.
pub struct FileCounterAllocator {
    path: PathBuf,
    // Serializes read-modify-write within this process; cross-process
    // callers are expected to share one allocator.
    lock: Mutex<()>,
}

impl FileCounterAllocator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_current(&self) -> u64 {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let trimmed = content.trim();
                if trimmed.is_empty() {
                    0
                } else {
                    trimmed.parse().unwrap_or_else(|_| {
                        warn!(path = %self.path.display(), "Malformed counter file, resetting");
                        0
                    })
                }
            }
            // Missing file: the counter starts fresh at zero.
            Err(_) => 0,
        }
    }
}

impl triagent_core::SessionIdAllocator for FileCounterAllocator {
    fn next_id(&self) -> std::result::Result<SessionId, SessionError> {
        let _guard = self.lock.lock().map_err(|_| {
            SessionError::Counter("counter lock poisoned".into())
        })?;

        let next = self.read_current() + 1;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| SessionError::Counter(format!("create counter dir: {e}")))?;
            }
        }

        std::fs::write(&self.path, next.to_string())
            .map_err(|e| SessionError::Counter(format!("write counter file: {e}")))?;

        Ok(format_id(next))
    }
}

/// In-memory allocator for tests and ephemeral runs.
pub struct InMemoryAllocator {
    counter: AtomicU64,
}

impl InMemoryAllocator {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }
}

impl Default for InMemoryAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl triagent_core::SessionIdAllocator for InMemoryAllocator {
    fn next_id(&self) -> std::result::Result<SessionId, SessionError> {
        let next = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format_id(next))
    }
}
