//! Severity classification of a patient message.
//!
//! Produced exactly once per user turn and immutable afterwards: it selects
//! which response profile and which knowledge partition handle the turn.

use serde::{Deserialize, Serialize};

/// Urgency class of a patient message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Life-threatening situation requiring emergency guidance
    Critical,
    /// Routine or informational medical query
    Normal,
}

impl Severity {
    /// Parse a raw model completion into a severity.
    ///
    /// The completion is upper-cased and pattern-matched. `CRITICAL` is
    /// checked first so a completion containing both tokens resolves to the
    /// more urgent class. Returns `None` for ambiguous or malformed output;
    /// the caller decides the fallback policy.
    pub fn from_completion(raw: &str) -> Option<Self> {
        let upper = raw.to_uppercase();
        if upper.contains("CRITICAL") {
            Some(Severity::Critical)
        } else if upper.contains("NORMAL") {
            Some(Severity::Normal)
        } else {
            None
        }
    }

    /// Upper-case label as shown to consumers (`CRITICAL` / `NORMAL`).
    pub fn as_label(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Normal => "NORMAL",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}
