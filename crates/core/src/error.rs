//! Error types for the Triagent domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum. Note that the triage flow
//! itself recovers from provider and knowledge faults locally; these types
//! mostly travel through logs and the service surfaces.

use thiserror::Error;

/// The top-level error type for all Triagent operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Knowledge store errors ---
    #[error("Knowledge error: {0}")]
    Knowledge(#[from] KnowledgeError),

    // --- Session errors ---
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("Knowledge backend unreachable: {0}")]
    Backend(String),

    #[error("Query failed: {message} (status: {status_code})")]
    QueryFailed { status_code: u16, message: String },

    #[error("Malformed backend response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Counter I/O failed: {0}")]
    Counter(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn knowledge_error_displays_correctly() {
        let err = Error::Knowledge(KnowledgeError::QueryFailed {
            status_code: 503,
            message: "index unavailable".into(),
        });
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("index unavailable"));
    }

    #[test]
    fn session_error_displays_correctly() {
        let err = Error::Session(SessionError::Counter("permission denied".into()));
        assert!(err.to_string().contains("permission denied"));
    }
}
