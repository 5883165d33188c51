//! Top-k retrieval over the vector index.

use crate::embed::{EmbedMode, EmbeddingProvider};
use crate::index::{ScoredRecord, VectorQuerier};
use ragline_core::AppResult;

/// Default number of chunks retrieved per query.
pub const DEFAULT_TOP_K: usize = 4;

/// Composes the embedder and the vector index read path behind a fixed
/// top-k policy.
pub struct Retriever<'a, Q: VectorQuerier + ?Sized> {
    embedder: &'a dyn EmbeddingProvider,
    index: &'a Q,
    top_k: usize,
}

impl<'a, Q: VectorQuerier + ?Sized> Retriever<'a, Q> {
    /// Create a retriever with the given top-k policy.
    pub fn new(embedder: &'a dyn EmbeddingProvider, index: &'a Q, top_k: usize) -> Self {
        Self {
            embedder,
            index,
            top_k,
        }
    }

    /// Embed the query text and return the nearest chunks, in index order
    /// (non-increasing score).
    pub async fn retrieve(&self, query_text: &str) -> AppResult<Vec<ScoredRecord>> {
        tracing::debug!("Retrieving top-{} chunks for query", self.top_k);

        let query_embedding = self.embedder.embed(query_text, EmbedMode::Query).await?;
        let results = self.index.query(&query_embedding, self.top_k).await?;

        if results.is_empty() {
            tracing::info!("No chunks retrieved for query");
        } else {
            tracing::info!(
                "Retrieved {} chunks (top score: {:.3})",
                results.len(),
                results[0].score
            );
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::TrigramEmbedder;
    use crate::index::SqliteIndex;
    use crate::index::VectorWriter;
    use crate::types::VectorRecord;
    use tempfile::TempDir;

    async fn seeded_index(temp: &TempDir, texts: &[&str]) -> SqliteIndex {
        let embedder = TrigramEmbedder::new(384);
        let mut index =
            SqliteIndex::open(&temp.path().join("index.sqlite3"), 384, "ns1").unwrap();

        let owned: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        let vectors = embedder
            .embed_batch(&owned, EmbedMode::Passage)
            .await
            .unwrap();

        let records: Vec<VectorRecord> = owned
            .iter()
            .zip(vectors)
            .enumerate()
            .map(|(i, (text, vector))| VectorRecord {
                id: format!("rec-{}", i),
                vector,
                text: text.clone(),
                source: "test.txt".to_string(),
                position: i as u32,
            })
            .collect();

        index.upsert(&records).await.unwrap();
        index
    }

    #[tokio::test]
    async fn test_scores_are_non_increasing() {
        let temp = TempDir::new().unwrap();
        let index = seeded_index(
            &temp,
            &[
                "Apples are a sweet fruit.",
                "Bananas are yellow fruit.",
                "The stock market closed higher today.",
                "Rust is a systems programming language.",
            ],
        )
        .await;

        let embedder = TrigramEmbedder::new(384);
        let retriever = Retriever::new(&embedder, &index, 4);

        let results = retriever.retrieve("sweet fruit").await.unwrap();
        assert!(!results.is_empty());

        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_top_k_limits_results() {
        let temp = TempDir::new().unwrap();
        let index = seeded_index(&temp, &["one text", "two text", "three text"]).await;

        let embedder = TrigramEmbedder::new(384);
        let retriever = Retriever::new(&embedder, &index, 2);

        let results = retriever.retrieve("text").await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_identical_text_scores_near_one() {
        let temp = TempDir::new().unwrap();
        let text = "Apple Computer Company was founded in 1976.";
        let index = seeded_index(&temp, &[text]).await;

        let embedder = TrigramEmbedder::new(384);
        let retriever = Retriever::new(&embedder, &index, 1);

        let results = retriever.retrieve(text).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].score >= 0.99);
    }
}
