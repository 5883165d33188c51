//! In-memory conversation history.

use chrono::{DateTime, Utc};

/// A source attribution attached to an answered question.
#[derive(Debug, Clone)]
pub struct SourceRef {
    pub source: String,
    pub snippet: String,
    pub score: f32,
}

/// One completed question/answer exchange.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub question: String,
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub timestamp: DateTime<Utc>,
}

/// Append-only store of exchanges for a single session.
#[derive(Debug, Default)]
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed exchange. Entries preserve append order.
    pub fn append(&mut self, question: String, answer: String, sources: Vec<SourceRef>) {
        self.entries.push(HistoryEntry {
            question,
            answer,
            sources,
            timestamp: Utc::now(),
        });
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut store = HistoryStore::new();
        for i in 0..3 {
            store.append(format!("q{}", i), format!("a{}", i), Vec::new());
        }

        assert_eq!(store.len(), 3);
        let questions: Vec<&str> = store
            .entries()
            .iter()
            .map(|e| e.question.as_str())
            .collect();
        assert_eq!(questions, vec!["q0", "q1", "q2"]);
    }

    #[test]
    fn test_clear_empties_store() {
        let mut store = HistoryStore::new();
        store.append("q".to_string(), "a".to_string(), Vec::new());
        assert!(!store.is_empty());

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_sources_are_retained() {
        let mut store = HistoryStore::new();
        store.append(
            "q".to_string(),
            "a".to_string(),
            vec![SourceRef {
                source: "doc.txt".to_string(),
                snippet: "snippet".to_string(),
                score: 0.85,
            }],
        );

        let entry = &store.entries()[0];
        assert_eq!(entry.sources.len(), 1);
        assert_eq!(entry.sources[0].source, "doc.txt");
    }
}
