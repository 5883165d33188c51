//! End-to-end pipeline tests over a temporary workspace.

use crate::chunker::Chunker;
use crate::dedup::DedupGate;
use crate::embed::{EmbedMode, EmbeddingProvider, TrigramEmbedder};
use crate::index::{SqliteIndex, StatsProvider, VectorIndex};
use crate::retriever::Retriever;
use crate::types::IngestOptions;

use async_trait::async_trait;
use ragline_core::AppResult;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Embedder wrapper that counts batch calls, for asserting that skipped
/// documents never reach the embedding stage.
#[derive(Debug)]
struct CountingEmbedder {
    inner: TrigramEmbedder,
    calls: AtomicUsize,
}

impl CountingEmbedder {
    fn new() -> Self {
        Self {
            inner: TrigramEmbedder::new(384),
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for CountingEmbedder {
    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    async fn embed_batch(&self, texts: &[String], mode: EmbedMode) -> AppResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_batch(texts, mode).await
    }
}

fn write_docs(folder: &Path) {
    fs::write(
        folder.join("fruit.txt"),
        "Apples are a sweet fruit grown in orchards. They are harvested in autumn.",
    )
    .unwrap();
    fs::write(
        folder.join("company.txt"),
        "Apple Inc. is a technology company headquartered in Cupertino, California.",
    )
    .unwrap();
}

fn open_test_index(temp: &TempDir) -> SqliteIndex {
    SqliteIndex::open(&temp.path().join("index.sqlite3"), 384, "default").unwrap()
}

#[tokio::test]
async fn test_ingest_and_retrieve() {
    let temp = TempDir::new().unwrap();
    let docs = temp.path().join("docs");
    fs::create_dir(&docs).unwrap();
    write_docs(&docs);

    let chunker = Chunker::new(512, 64).unwrap();
    let embedder = TrigramEmbedder::new(384);
    let mut index = open_test_index(&temp);
    let mut gate = DedupGate::new();

    let options = IngestOptions {
        folder: docs,
        reset: false,
    };
    let stats = crate::ingest(&options, &chunker, &embedder, &mut index, &mut gate)
        .await
        .unwrap();

    assert_eq!(stats.documents, 2);
    assert_eq!(stats.skipped, 0);
    assert_eq!(stats.chunks, 2);

    let report = index.stats().await.unwrap();
    assert_eq!(report.record_count, 2);
    assert_eq!(report.dimension, 384);

    // The fruit question should rank the fruit chunk above the company one.
    let retriever = Retriever::new(&embedder, &index, 2);
    let results = retriever.retrieve("What fruit is sweet?").await.unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0].source.ends_with("fruit.txt"));
    assert!(results[0].score > results[1].score);
}

#[tokio::test]
async fn test_reingest_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let docs = temp.path().join("docs");
    fs::create_dir(&docs).unwrap();
    write_docs(&docs);

    let chunker = Chunker::new(512, 64).unwrap();
    let embedder = CountingEmbedder::new();
    let mut index = open_test_index(&temp);
    let mut gate = DedupGate::new();

    let options = IngestOptions {
        folder: docs,
        reset: false,
    };

    let first = crate::ingest(&options, &chunker, &embedder, &mut index, &mut gate)
        .await
        .unwrap();
    assert_eq!(first.documents, 2);
    assert_eq!(embedder.call_count(), 2);

    let second = crate::ingest(&options, &chunker, &embedder, &mut index, &mut gate)
        .await
        .unwrap();
    assert_eq!(second.documents, 0);
    assert_eq!(second.skipped, 2);
    // No new embedding calls and no new records.
    assert_eq!(embedder.call_count(), 2);
    assert_eq!(index.stats().await.unwrap().record_count, 2);
}

#[tokio::test]
async fn test_duplicate_files_in_one_pass_embed_once() {
    let temp = TempDir::new().unwrap();
    let docs = temp.path().join("docs");
    fs::create_dir(&docs).unwrap();

    let body = "The same bytes, copied to two files.";
    fs::write(docs.join("first.txt"), body).unwrap();
    fs::write(docs.join("copy.txt"), body).unwrap();

    let chunker = Chunker::new(512, 64).unwrap();
    let embedder = CountingEmbedder::new();
    let mut index = open_test_index(&temp);
    let mut gate = DedupGate::new();

    let options = IngestOptions {
        folder: docs,
        reset: false,
    };
    let stats = crate::ingest(&options, &chunker, &embedder, &mut index, &mut gate)
        .await
        .unwrap();

    // One embedded, the byte-identical twin skipped within the same pass
    assert_eq!(stats.documents, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(embedder.call_count(), 1);
    assert_eq!(index.stats().await.unwrap().record_count, 1);
}

#[tokio::test]
async fn test_gate_reseeded_from_index_survives_restart() {
    let temp = TempDir::new().unwrap();
    let docs = temp.path().join("docs");
    fs::create_dir(&docs).unwrap();
    write_docs(&docs);

    let chunker = Chunker::new(512, 64).unwrap();
    let embedder = TrigramEmbedder::new(384);
    let db_path = temp.path().join("index.sqlite3");

    let options = IngestOptions {
        folder: docs,
        reset: false,
    };

    {
        let mut index = SqliteIndex::open(&db_path, 384, "default").unwrap();
        let mut gate = DedupGate::new();
        crate::ingest(&options, &chunker, &embedder, &mut index, &mut gate)
            .await
            .unwrap();
    }

    // Simulated restart: fresh index handle, gate seeded from stored hashes.
    let mut index = SqliteIndex::open(&db_path, 384, "default").unwrap();
    let mut gate = DedupGate::with_seen(index.seen_hashes().unwrap());

    let stats = crate::ingest(&options, &chunker, &embedder, &mut index, &mut gate)
        .await
        .unwrap();
    assert_eq!(stats.documents, 0);
    assert_eq!(stats.skipped, 2);
}

#[tokio::test]
async fn test_reset_clears_index_and_gate() {
    let temp = TempDir::new().unwrap();
    let docs = temp.path().join("docs");
    fs::create_dir(&docs).unwrap();
    write_docs(&docs);

    let chunker = Chunker::new(512, 64).unwrap();
    let embedder = TrigramEmbedder::new(384);
    let mut index = open_test_index(&temp);
    let mut gate = DedupGate::new();

    let mut options = IngestOptions {
        folder: docs,
        reset: false,
    };
    crate::ingest(&options, &chunker, &embedder, &mut index, &mut gate)
        .await
        .unwrap();

    options.reset = true;
    let stats = crate::ingest(&options, &chunker, &embedder, &mut index, &mut gate)
        .await
        .unwrap();

    // Everything re-ingested from scratch, nothing skipped.
    assert_eq!(stats.documents, 2);
    assert_eq!(stats.skipped, 0);
    assert_eq!(index.stats().await.unwrap().record_count, 2);
}

#[tokio::test]
async fn test_missing_folder_is_an_error() {
    let temp = TempDir::new().unwrap();

    let chunker = Chunker::new(512, 64).unwrap();
    let embedder = TrigramEmbedder::new(384);
    let mut index = open_test_index(&temp);
    let mut gate = DedupGate::new();

    let options = IngestOptions {
        folder: temp.path().join("does-not-exist"),
        reset: false,
    };
    let result = crate::ingest(&options, &chunker, &embedder, &mut index, &mut gate).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_json_documents_are_split_per_entry() {
    let temp = TempDir::new().unwrap();
    let docs = temp.path().join("docs");
    fs::create_dir(&docs).unwrap();
    fs::write(
        docs.join("facts.json"),
        r#"[{"id": "a", "text": "The first fact."}, {"id": "b", "text": "The second fact."}]"#,
    )
    .unwrap();

    let chunker = Chunker::new(512, 64).unwrap();
    let embedder = TrigramEmbedder::new(384);
    let mut index = open_test_index(&temp);
    let mut gate = DedupGate::new();

    let options = IngestOptions {
        folder: docs,
        reset: false,
    };
    let stats = crate::ingest(&options, &chunker, &embedder, &mut index, &mut gate)
        .await
        .unwrap();

    assert_eq!(stats.documents, 2);
    assert_eq!(index.stats().await.unwrap().record_count, 2);
}
