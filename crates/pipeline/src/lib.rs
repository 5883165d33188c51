//! Document ingestion and retrieval pipeline.
//!
//! The pipeline covers the full path from files on disk to grounded
//! answers: loading, deduplication, chunking, embedding, vector index
//! storage, retrieval, and answer generation.

pub mod answer;
pub mod chunker;
pub mod dedup;
pub mod embed;
pub mod history;
pub mod index;
pub mod loader;
pub mod retriever;
pub mod types;

pub use chunker::Chunker;
pub use dedup::{content_hash, DedupGate};
pub use history::{HistoryEntry, HistoryStore, SourceRef};
pub use retriever::{Retriever, DEFAULT_TOP_K};
pub use types::{Document, IngestOptions, IngestStats, VectorRecord};

use futures::stream::{self, StreamExt};
use std::time::Instant;

use embed::{EmbedMode, EmbeddingProvider};
use index::VectorIndex;
use ragline_core::AppResult;

/// Number of documents embedded concurrently during ingestion.
const EMBED_CONCURRENCY: usize = 4;

/// Ingest a folder of documents into the vector index.
///
/// Documents whose content hash is already known to the gate are skipped
/// entirely, so re-running ingestion over an unchanged folder is a no-op
/// apart from the skip count.
pub async fn ingest(
    options: &IngestOptions,
    chunker: &Chunker,
    embedder: &dyn EmbeddingProvider,
    index: &mut dyn VectorIndex,
    gate: &mut DedupGate,
) -> AppResult<IngestStats> {
    let started = Instant::now();

    if options.reset {
        tracing::info!("Resetting index before ingestion");
        index.reset().await?;
        *gate = DedupGate::new();
    }

    let documents = loader::load_documents(&options.folder)?;
    tracing::info!(
        "Loaded {} documents from {}",
        documents.len(),
        options.folder.display()
    );

    // Hashes claimed by earlier documents in this same pass also count as
    // seen, so byte-identical files in one folder embed only once.
    let mut skipped = 0u32;
    let mut fresh: Vec<types::Document> = Vec::new();
    for doc in documents {
        if gate.seen(&doc.content_hash)
            || fresh.iter().any(|f| f.content_hash == doc.content_hash)
        {
            tracing::debug!("Skipping already-ingested document: {}", doc.source);
            skipped += 1;
        } else {
            fresh.push(doc);
        }
    }

    // Chunk up front so embedding batches can run concurrently.
    let chunked: Vec<(types::Document, Vec<String>)> = fresh
        .into_iter()
        .map(|doc| {
            let chunks = chunker.chunk(&doc.text);
            (doc, chunks)
        })
        .collect();

    let embedded: Vec<AppResult<(types::Document, Vec<String>, Vec<Vec<f32>>)>> =
        stream::iter(chunked)
            .map(|(doc, chunks)| async move {
                let vectors = embedder.embed_batch(&chunks, EmbedMode::Passage).await?;
                Ok((doc, chunks, vectors))
            })
            .buffered(EMBED_CONCURRENCY)
            .collect()
            .await;

    let mut stats = IngestStats {
        documents: 0,
        skipped,
        chunks: 0,
        bytes_processed: 0,
        duration_secs: 0.0,
    };

    for result in embedded {
        let (doc, chunks, vectors) = result?;

        let records: Vec<VectorRecord> = chunks
            .iter()
            .zip(vectors)
            .enumerate()
            .map(|(position, (text, vector))| VectorRecord {
                id: format!("{}-{}", &doc.content_hash[..12], position),
                vector,
                text: text.clone(),
                source: doc.source.clone(),
                position: position as u32,
            })
            .collect();

        index.upsert(&records).await?;
        index
            .record_source(&doc.content_hash, &doc.source, records.len() as u32)
            .await?;
        gate.mark_seen(doc.content_hash.clone());

        stats.documents += 1;
        stats.chunks += records.len() as u32;
        stats.bytes_processed += doc.text.len() as u64;
        tracing::info!("Ingested {} ({} chunks)", doc.source, records.len());
    }

    stats.duration_secs = started.elapsed().as_secs_f64();
    Ok(stats)
}

#[cfg(test)]
mod tests;
