//! In-memory knowledge store — useful for testing and offline use.

use async_trait::async_trait;
use triagent_core::error::KnowledgeError;
use triagent_core::knowledge::{GuidelineFragment, KnowledgeStore, Partition};

/// A corpus entry seeded at construction time.
#[derive(Debug, Clone)]
struct CorpusEntry {
    content: String,
    source: String,
}

/// An in-memory store over a seeded corpus with naive keyword ranking.
///
/// Partition filtering follows the corpus naming convention: an entry belongs
/// to a partition when its source label contains the partition tag as a
/// substring (e.g. `emergency_protocols.pdf` matches `emergency`).
pub struct InMemoryKnowledgeStore {
    entries: Vec<CorpusEntry>,
}

impl InMemoryKnowledgeStore {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a corpus entry.
    pub fn with_entry(mut self, content: impl Into<String>, source: impl Into<String>) -> Self {
        self.entries.push(CorpusEntry {
            content: content.into(),
            source: source.into(),
        });
        self
    }

    /// A small seeded corpus covering both partitions.
    ///
    /// Used by the doctor command and offline demos so the triage flow has
    /// something to retrieve without a running index.
    pub fn with_demo_corpus(self) -> Self {
        self.with_entry(
            "Chest pain with radiation to the left arm: call emergency services immediately. \
             Have the person sit down and rest. Loosen tight clothing.",
            "emergency_protocols.pdf",
        )
        .with_entry(
            "Severe bleeding: apply firm direct pressure with a clean cloth. \
             Do not remove soaked dressings; add more on top. Elevate the wound if possible.",
            "emergency_protocols.pdf",
        )
        .with_entry(
            "Choking with inability to breathe: perform abdominal thrusts. \
             If the person becomes unresponsive, begin CPR and call emergency services.",
            "emergency_protocols.pdf",
        )
        .with_entry(
            "Common cold and flu: rest, fluids, and over-the-counter symptom relief. \
             Seek care if fever persists beyond three days or breathing becomes difficult.",
            "general_guidance.pdf",
        )
        .with_entry(
            "Tension headache: hydration, rest, and a standard dose of an analgesic. \
             Recurrent or sudden severe headaches warrant a clinical visit.",
            "general_guidance.pdf",
        )
        .with_entry(
            "Minor cuts: wash with clean water, apply gentle pressure until bleeding stops, \
             cover with a sterile dressing. Watch for signs of infection.",
            "general_guidance.pdf",
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for InMemoryKnowledgeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryKnowledgeStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn search(
        &self,
        query: &str,
        partition: &Partition,
        k: usize,
    ) -> std::result::Result<Vec<GuidelineFragment>, KnowledgeError> {
        let partition_lower = partition.as_str().to_lowercase();
        let query_words: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        if query_words.is_empty() {
            return Ok(Vec::new());
        }

        let mut results: Vec<GuidelineFragment> = self
            .entries
            .iter()
            .filter(|e| e.source.to_lowercase().contains(&partition_lower))
            .filter_map(|e| {
                let content_lower = e.content.to_lowercase();
                // Simple keyword overlap score
                let overlap = query_words
                    .iter()
                    .filter(|w| content_lower.contains(w.as_str()))
                    .count();
                if overlap == 0 {
                    return None;
                }
                Some(GuidelineFragment {
                    content: e.content.clone(),
                    source: e.source.clone(),
                    score: overlap as f32 / query_words.len() as f32,
                })
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);

        Ok(results)
    }
}
