//! SQLite-backed vector index.
//!
//! Local file-backed persistence: vector records as little-endian f32
//! blobs, nearest-neighbor queries computed in-process with cosine
//! similarity. The dimension is fixed when the database is first created
//! and validated on every subsequent open.

use crate::index::{
    cosine_similarity, IndexStatsReport, ScoredRecord, StatsProvider, VectorIndex, VectorQuerier,
    VectorWriter,
};
use crate::types::VectorRecord;
use ragline_core::{AppError, AppResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

/// Local file-backed vector index.
#[derive(Debug)]
pub struct SqliteIndex {
    conn: Mutex<Connection>,
    dimension: usize,
    namespace: String,
}

impl SqliteIndex {
    /// Open (or create) an index database at `db_path`.
    ///
    /// A new database pins the given dimension; opening an existing
    /// database with a different dimension is rejected.
    pub fn open(db_path: &Path, dimension: usize, namespace: &str) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Index(format!("Failed to create index directory: {}", e))
            })?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Index(format!("Failed to open SQLite index: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sources (
                content_hash TEXT NOT NULL,
                namespace TEXT NOT NULL,
                source TEXT NOT NULL,
                chunk_count INTEGER NOT NULL,
                ingested_at TEXT NOT NULL,
                PRIMARY KEY (content_hash, namespace)
            );

            CREATE TABLE IF NOT EXISTS records (
                id TEXT PRIMARY KEY,
                namespace TEXT NOT NULL,
                source TEXT NOT NULL,
                position INTEGER NOT NULL,
                text TEXT NOT NULL,
                embedding BLOB NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_records_namespace ON records(namespace);
            "#,
        )
        .map_err(|e| AppError::Index(format!("Failed to create tables: {}", e)))?;

        // Pin the dimension on first open, validate on later opens
        let stored: Option<String> = conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'dimension'",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| AppError::Index(format!("Failed to read index metadata: {}", e)))?;

        match stored {
            Some(value) => {
                let stored_dim: usize = value.parse().map_err(|_| {
                    AppError::Index(format!("Corrupt dimension metadata: {}", value))
                })?;
                if stored_dim != dimension {
                    return Err(AppError::Index(format!(
                        "Index dimension mismatch: index was created with {}, configured {}",
                        stored_dim, dimension
                    )));
                }
            }
            None => {
                conn.execute(
                    "INSERT INTO meta (key, value) VALUES ('dimension', ?1)",
                    params![dimension.to_string()],
                )
                .map_err(|e| AppError::Index(format!("Failed to store dimension: {}", e)))?;
            }
        }

        tracing::debug!(
            "Opened SQLite index at {:?} (dimension: {}, namespace: {})",
            db_path,
            dimension,
            namespace
        );

        Ok(Self {
            conn: Mutex::new(conn),
            dimension,
            namespace: namespace.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl VectorWriter for SqliteIndex {
    async fn upsert(&mut self, records: &[VectorRecord]) -> AppResult<()> {
        for record in records {
            if record.vector.len() != self.dimension {
                return Err(AppError::Index(format!(
                    "Record '{}' has dimension {}, index requires {}",
                    record.id,
                    record.vector.len(),
                    self.dimension
                )));
            }
        }

        let conn = self.conn.lock().unwrap();

        for record in records {
            conn.execute(
                "INSERT OR REPLACE INTO records (id, namespace, source, position, text, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.id,
                    self.namespace,
                    record.source,
                    record.position as i64,
                    record.text,
                    embedding_to_bytes(&record.vector),
                ],
            )
            .map_err(|e| AppError::Index(format!("Failed to upsert record: {}", e)))?;
        }

        tracing::debug!("Upserted {} records", records.len());
        Ok(())
    }
}

#[async_trait::async_trait]
impl VectorQuerier for SqliteIndex {
    async fn query(&self, vector: &[f32], top_k: usize) -> AppResult<Vec<ScoredRecord>> {
        if vector.len() != self.dimension {
            return Err(AppError::Index(format!(
                "Query vector has dimension {}, index requires {}",
                vector.len(),
                self.dimension
            )));
        }

        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare("SELECT id, source, text, embedding FROM records WHERE namespace = ?1")
            .map_err(|e| AppError::Index(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params![self.namespace], |row| {
                let embedding_bytes: Vec<u8> = row.get(3)?;
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    embedding_bytes,
                ))
            })
            .map_err(|e| AppError::Index(format!("Failed to query records: {}", e)))?;

        let mut results: Vec<ScoredRecord> = Vec::new();
        for row in rows {
            let (id, source, text, embedding_bytes) =
                row.map_err(|e| AppError::Index(format!("Failed to read record row: {}", e)))?;
            let embedding = bytes_to_embedding(&embedding_bytes)?;

            results.push(ScoredRecord {
                score: cosine_similarity(vector, &embedding),
                id,
                text,
                source,
            });
        }

        // Sort by score descending; ties broken arbitrarily
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);

        tracing::debug!("Retrieved {} records (requested top-{})", results.len(), top_k);

        Ok(results)
    }
}

#[async_trait::async_trait]
impl StatsProvider for SqliteIndex {
    async fn stats(&self) -> AppResult<IndexStatsReport> {
        let conn = self.conn.lock().unwrap();

        let record_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM records WHERE namespace = ?1",
                params![self.namespace],
                |row| row.get(0),
            )
            .map_err(|e| AppError::Index(format!("Failed to count records: {}", e)))?;

        Ok(IndexStatsReport {
            record_count: record_count as u64,
            dimension: self.dimension,
            namespace: self.namespace.clone(),
        })
    }
}

#[async_trait::async_trait]
impl VectorIndex for SqliteIndex {
    async fn reset(&mut self) -> AppResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute("DELETE FROM records WHERE namespace = ?1", params![self.namespace])
            .map_err(|e| AppError::Index(format!("Failed to delete records: {}", e)))?;

        conn.execute("DELETE FROM sources WHERE namespace = ?1", params![self.namespace])
            .map_err(|e| AppError::Index(format!("Failed to delete sources: {}", e)))?;

        tracing::info!("Reset index namespace '{}'", self.namespace);
        Ok(())
    }

    async fn record_source(&mut self, content_hash: &str, source: &str, chunks: u32) -> AppResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT OR REPLACE INTO sources (content_hash, namespace, source, chunk_count, ingested_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                content_hash,
                self.namespace,
                source,
                chunks as i64,
                chrono::Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| AppError::Index(format!("Failed to record source: {}", e)))?;

        Ok(())
    }

    fn seen_hashes(&self) -> AppResult<HashSet<String>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare("SELECT content_hash FROM sources WHERE namespace = ?1")
            .map_err(|e| AppError::Index(format!("Failed to prepare hash query: {}", e)))?;

        let hashes = stmt
            .query_map(params![self.namespace], |row| row.get::<_, String>(0))
            .map_err(|e| AppError::Index(format!("Failed to query hashes: {}", e)))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(hashes)
    }
}

/// Convert embedding vector to bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Index("Invalid embedding bytes length".to_string()));
    }

    let mut embedding = Vec::with_capacity(bytes.len() / 4);
    for chunk in bytes.chunks_exact(4) {
        let value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        embedding.push(value);
    }

    Ok(embedding)
}
