//! Configuration loading, validation, and management for Triagent.
//!
//! Loads configuration from `~/.triagent/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use triagent_core::Severity;

/// The root configuration structure.
///
/// Maps directly to `~/.triagent/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct TriageConfig {
    /// API key for the completion service. Local llama.cpp-style servers
    /// ignore it; a placeholder is substituted when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible completion service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model served behind the completion endpoint
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds for completion calls
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Sampling parameters for the severity classification call
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Sampling parameters for response synthesis
    #[serde(default)]
    pub responder: ResponderConfig,

    /// Knowledge retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Triage policy knobs
    #[serde(default)]
    pub triage: TriagePolicyConfig,

    /// Session identity and history storage
    #[serde(default)]
    pub session: SessionConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_base_url() -> String {
    "http://localhost:8111/v1".into()
}
fn default_model() -> String {
    "medgemma".into()
}
fn default_timeout_secs() -> u64 {
    120
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for TriageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriageConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("classifier", &self.classifier)
            .field("responder", &self.responder)
            .field("retrieval", &self.retrieval)
            .field("triage", &self.triage)
            .field("session", &self.session)
            .field("gateway", &self.gateway)
            .finish()
    }
}

/// Sampling parameters for the one-shot classification call.
///
/// Kept cold and short on purpose: the classifier only has to emit a single
/// severity token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_classifier_temperature")]
    pub temperature: f32,

    #[serde(default = "default_classifier_max_tokens")]
    pub max_tokens: u32,
}

fn default_classifier_temperature() -> f32 {
    0.0
}
fn default_classifier_max_tokens() -> u32 {
    10
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            temperature: default_classifier_temperature(),
            max_tokens: default_classifier_max_tokens(),
        }
    }
}

/// Sampling parameters for the streamed synthesis call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponderConfig {
    #[serde(default = "default_responder_temperature")]
    pub temperature: f32,

    #[serde(default = "default_responder_max_tokens")]
    pub max_tokens: u32,
}

fn default_responder_temperature() -> f32 {
    0.2
}
fn default_responder_max_tokens() -> u32 {
    512
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            temperature: default_responder_temperature(),
            max_tokens: default_responder_max_tokens(),
        }
    }
}

/// Knowledge retrieval configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Base URL of the similarity-search service
    #[serde(default = "default_knowledge_url")]
    pub knowledge_url: String,

    /// Number of fragments to retrieve per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Line cap applied when assembling retrieved fragments into a context
    /// block
    #[serde(default = "default_context_max_lines")]
    pub context_max_lines: usize,

    /// Provenance tag of the emergency-procedures corpus
    #[serde(default = "default_critical_partition")]
    pub critical_partition: String,

    /// Provenance tag of the general-clinical-guidance corpus
    #[serde(default = "default_routine_partition")]
    pub routine_partition: String,
}

fn default_knowledge_url() -> String {
    "http://localhost:8000".into()
}
fn default_top_k() -> usize {
    4
}
fn default_context_max_lines() -> usize {
    15
}
fn default_critical_partition() -> String {
    "emergency".into()
}
fn default_routine_partition() -> String {
    "general".into()
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            knowledge_url: default_knowledge_url(),
            top_k: default_top_k(),
            context_max_lines: default_context_max_lines(),
            critical_partition: default_critical_partition(),
            routine_partition: default_routine_partition(),
        }
    }
}

/// Triage policy knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriagePolicyConfig {
    /// Severity assumed when classification fails or returns something
    /// unparseable.
    ///
    /// The default fails toward the routine path (under-triage risk) rather
    /// than the emergency path (over-triage latency). Which risk is
    /// acceptable is a clinical decision; review this setting per
    /// deployment.
    #[serde(default = "default_fallback_severity")]
    pub fallback_severity: Severity,
}

fn default_fallback_severity() -> Severity {
    Severity::Normal
}

impl Default for TriagePolicyConfig {
    fn default() -> Self {
        Self {
            fallback_severity: default_fallback_severity(),
        }
    }
}

/// Session identity and history storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Path of the session counter file
    #[serde(default = "default_counter_path")]
    pub counter_path: PathBuf,

    /// SQLite URL of the session history database
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

fn default_counter_path() -> PathBuf {
    TriageConfig::config_dir().join("session_counter.txt")
}
fn default_database_url() -> String {
    format!(
        "sqlite:{}",
        TriageConfig::config_dir().join("sessions.db").display()
    )
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            counter_path: default_counter_path(),
            database_url: default_database_url(),
        }
    }
}

/// Gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8787
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl TriageConfig {
    /// Load configuration from the default path (~/.triagent/config.toml).
    ///
    /// Environment variables override file values:
    /// - `TRIAGENT_API_KEY`
    /// - `TRIAGENT_BASE_URL`
    /// - `TRIAGENT_MODEL`
    /// - `TRIAGENT_KNOWLEDGE_URL`
    /// - `TRIAGENT_DB`
    pub fn load() -> Result<Self, ConfigError> {
        let config_dir = Self::config_dir();
        let config_path = config_dir.join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        // Environment variable overrides (highest priority)
        if config.api_key.is_none() {
            config.api_key = std::env::var("TRIAGENT_API_KEY").ok();
        }

        if let Ok(base_url) = std::env::var("TRIAGENT_BASE_URL") {
            config.base_url = base_url;
        }

        if let Ok(model) = std::env::var("TRIAGENT_MODEL") {
            config.model = model;
        }

        if let Ok(url) = std::env::var("TRIAGENT_KNOWLEDGE_URL") {
            config.retrieval.knowledge_url = url;
        }

        if let Ok(db) = std::env::var("TRIAGENT_DB") {
            config.session.database_url = db;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".triagent")
    }

    /// The API key to send, substituting the local-server placeholder when
    /// none is configured.
    pub fn api_key_or_placeholder(&self) -> String {
        self.api_key
            .clone()
            .unwrap_or_else(|| "sk-no-key-required".into())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.classifier.temperature < 0.0 || self.classifier.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "classifier.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.responder.temperature < 0.0 || self.responder.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "responder.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.classifier.max_tokens == 0 || self.responder.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_tokens must be at least 1".into(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.top_k must be at least 1".into(),
            ));
        }

        if self.retrieval.context_max_lines == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.context_max_lines must be at least 1".into(),
            ));
        }

        if self.retrieval.critical_partition == self.retrieval.routine_partition {
            return Err(ConfigError::ValidationError(
                "critical_partition and routine_partition must name disjoint corpora".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            classifier: ClassifierConfig::default(),
            responder: ResponderConfig::default(),
            retrieval: RetrievalConfig::default(),
            triage: TriagePolicyConfig::default(),
            session: SessionConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = TriageConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.base_url, "http://localhost:8111/v1");
        assert_eq!(config.model, "medgemma");
        assert_eq!(config.classifier.temperature, 0.0);
        assert_eq!(config.classifier.max_tokens, 10);
        assert_eq!(config.responder.max_tokens, 512);
        assert_eq!(config.retrieval.context_max_lines, 15);
        assert_eq!(config.gateway.port, 8787);
        assert_eq!(config.triage.fallback_severity, Severity::Normal);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = TriageConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: TriageConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.base_url, config.base_url);
        assert_eq!(parsed.retrieval.critical_partition, "emergency");
        assert_eq!(parsed.gateway.port, config.gateway.port);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = TriageConfig {
            classifier: ClassifierConfig {
                temperature: 5.0,
                ..ClassifierConfig::default()
            },
            ..TriageConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_line_cap_rejected() {
        let config = TriageConfig {
            retrieval: RetrievalConfig {
                context_max_lines: 0,
                ..RetrievalConfig::default()
            },
            ..TriageConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn identical_partitions_rejected() {
        let config = TriageConfig {
            retrieval: RetrievalConfig {
                critical_partition: "guidelines".into(),
                routine_partition: "guidelines".into(),
                ..RetrievalConfig::default()
            },
            ..TriageConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = TriageConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        let config = result.unwrap();
        assert_eq!(config.model, "medgemma");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
model = "llama-3-med"

[responder]
temperature = 0.4

[triage]
fallback_severity = "critical"
"#,
        )
        .unwrap();

        let config = TriageConfig::load_from(&path).unwrap();
        assert_eq!(config.model, "llama-3-med");
        assert_eq!(config.responder.temperature, 0.4);
        assert_eq!(config.responder.max_tokens, 512);
        assert_eq!(config.triage.fallback_severity, Severity::Critical);
        // Untouched sections keep their defaults.
        assert_eq!(config.classifier.max_tokens, 10);
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = TriageConfig {
            api_key: Some("sk-very-secret".into()),
            ..TriageConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn placeholder_key_when_unset() {
        let config = TriageConfig::default();
        assert_eq!(config.api_key_or_placeholder(), "sk-no-key-required");

        let config = TriageConfig {
            api_key: Some("sk-real".into()),
            ..TriageConfig::default()
        };
        assert_eq!(config.api_key_or_placeholder(), "sk-real");
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = TriageConfig::default_toml();
        assert!(toml_str.contains("medgemma"));
        assert!(toml_str.contains("emergency"));
        assert!(toml_str.contains("8787"));
    }
}
