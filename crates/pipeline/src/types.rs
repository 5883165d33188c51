//! Pipeline type definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A loaded source document, pre-split.
///
/// Created by the loader and discarded after chunking.
#[derive(Debug, Clone)]
pub struct Document {
    /// Where the content came from (file path, possibly with a `#id`
    /// fragment for multi-entry JSON files)
    pub source: String,

    /// Raw extracted text
    pub text: String,

    /// Hex digest of the raw content bytes, used by the dedup gate
    pub content_hash: String,
}

/// One chunk's embedding plus metadata, ready for upsert.
///
/// Write-once: updates are modeled as new records, never in-place mutation.
#[derive(Debug, Clone)]
pub struct VectorRecord {
    /// Unique record identifier
    pub id: String,

    /// Embedding vector (fixed dimension)
    pub vector: Vec<f32>,

    /// Chunk text
    pub text: String,

    /// Source identifier the chunk came from
    pub source: String,

    /// Position of the chunk within its source
    pub position: u32,
}

/// Options for the ingest operation.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Folder to load documents from
    pub folder: PathBuf,

    /// Reset the index before ingesting
    pub reset: bool,
}

/// Statistics from an ingest operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestStats {
    /// Number of documents embedded and upserted
    pub documents: u32,

    /// Number of documents skipped by the dedup gate
    pub skipped: u32,

    /// Number of chunks created
    pub chunks: u32,

    /// Total bytes of text processed
    pub bytes_processed: u64,

    /// Duration in seconds
    pub duration_secs: f64,
}
