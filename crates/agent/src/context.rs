//! Context block assembly — pure, deterministic, fully unit-testable.
//!
//! Retrieved guideline fragments come from overlapping document chunks, so
//! adjacent hits frequently repeat whole lines. The assembler flattens
//! fragments into lines, deduplicates them while preserving first-seen
//! order, and caps the result so the synthesis prompt stays bounded no
//! matter how much the index returns.
//!
//! # Determinism
//!
//! Identical inputs always produce identical output. No I/O, no random or
//! time-dependent logic.

use std::collections::HashSet;
use triagent_core::knowledge::GuidelineFragment;

/// Assembles retrieved fragments into a bounded context block.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    /// Maximum number of unique lines in the assembled block.
    max_lines: usize,
}

impl ContextAssembler {
    pub fn new(max_lines: usize) -> Self {
        Self { max_lines }
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Build the context block for one synthesis call.
    ///
    /// Concatenates fragment texts, splits into lines, trims whitespace,
    /// drops empty lines, deduplicates by exact match keeping first-seen
    /// order, and truncates to the line cap.
    pub fn assemble(&self, fragments: &[GuidelineFragment]) -> String {
        let mut seen = HashSet::new();
        let mut lines = Vec::new();

        for fragment in fragments {
            for line in fragment.content.lines() {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if seen.insert(trimmed.to_string()) {
                    lines.push(trimmed.to_string());
                }
                if lines.len() == self.max_lines {
                    return lines.join("\n");
                }
            }
        }

        lines.join("\n")
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self { max_lines: 15 }
    }
}
