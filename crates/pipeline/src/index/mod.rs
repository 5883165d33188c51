//! Vector index abstraction and backends.
//!
//! The index is consumed through capability traits so backends (local
//! file-backed vs hosted multi-tenant) are swappable without conditional
//! branching on object shape: [`VectorWriter`] for the write path,
//! [`VectorQuerier`] for the read path, [`StatsProvider`] for
//! introspection. [`VectorIndex`] is the supertrait both backends
//! implement.

pub mod remote;
pub mod sqlite;

pub use remote::RemoteIndex;
pub use sqlite::SqliteIndex;

use crate::types::VectorRecord;
use ragline_core::{AppConfig, AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One query match: record identity, similarity score, and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecord {
    /// Record identifier
    pub id: String,

    /// Similarity score (cosine; higher is closer)
    pub score: f32,

    /// Chunk text
    pub text: String,

    /// Source identifier the chunk came from
    pub source: String,
}

/// Index statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStatsReport {
    /// Number of vector records in the namespace
    pub record_count: u64,

    /// Fixed embedding dimension
    pub dimension: usize,

    /// Namespace the index operates in
    pub namespace: String,
}

/// Write path: insert-or-replace records by id within the namespace.
#[async_trait::async_trait]
pub trait VectorWriter: Send + Sync {
    /// Upsert a batch of records.
    ///
    /// Records whose vector dimension differs from the index dimension are
    /// rejected with `AppError::Index`.
    async fn upsert(&mut self, records: &[VectorRecord]) -> AppResult<()>;
}

/// Read path: nearest-neighbor queries.
#[async_trait::async_trait]
pub trait VectorQuerier: Send + Sync {
    /// Return up to `top_k` nearest records, ordered descending by score.
    async fn query(&self, vector: &[f32], top_k: usize) -> AppResult<Vec<ScoredRecord>>;
}

/// Introspection.
#[async_trait::async_trait]
pub trait StatsProvider: Send + Sync {
    /// Get record count, dimension and namespace.
    async fn stats(&self) -> AppResult<IndexStatsReport>;
}

/// Full index contract: writer + querier + stats, plus reset and dedup
/// seeding hooks.
#[async_trait::async_trait]
pub trait VectorIndex: VectorWriter + VectorQuerier + StatsProvider {
    /// Delete all records (explicit index reset is the only delete path).
    async fn reset(&mut self) -> AppResult<()>;

    /// Record that a source's content hash has been fully ingested.
    ///
    /// Backends without source tracking ignore this.
    async fn record_source(&mut self, _content_hash: &str, _source: &str, _chunks: u32) -> AppResult<()> {
        Ok(())
    }

    /// Content hashes of sources already in the index, for seeding the
    /// dedup gate. Backends that cannot enumerate them return an empty set
    /// (the gate then lives for the process only).
    fn seen_hashes(&self) -> AppResult<HashSet<String>> {
        Ok(HashSet::new())
    }
}

/// Open the configured index backend.
pub async fn open_index(config: &AppConfig) -> AppResult<Box<dyn VectorIndex>> {
    match config.index.backend.as_str() {
        "sqlite" => {
            config.ensure_ragline_dir()?;
            let index = SqliteIndex::open(
                &config.index_path(),
                config.embedding.dimensions,
                &config.index.namespace,
            )?;
            Ok(Box::new(index))
        }
        "pinecone" => {
            let api_key = config.require_api_key("PINECONE_API_KEY")?;
            let endpoint = config.index.endpoint.as_deref().ok_or_else(|| {
                AppError::Config(
                    "Hosted index backend requires index.endpoint in config".to_string(),
                )
            })?;

            let index = RemoteIndex::connect(
                endpoint,
                &api_key,
                &config.index.namespace,
                config.embedding.dimensions,
            )
            .await?;
            Ok(Box::new(index))
        }
        other => Err(AppError::Config(format!(
            "Unknown index backend: {}. Supported: sqlite, pinecone",
            other
        ))),
    }
}

/// Calculate cosine similarity between two vectors.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
