//! Hosted multi-tenant vector index backend.
//!
//! Speaks the Pinecone data-plane API over HTTPS:
//! upsert, query, and describe_index_stats, all scoped to a namespace.
//! https://docs.pinecone.io/reference/api/data-plane

use crate::index::{
    IndexStatsReport, ScoredRecord, StatsProvider, VectorIndex, VectorQuerier, VectorWriter,
};
use crate::types::VectorRecord;
use ragline_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Wire format for one upserted vector.
#[derive(Debug, Serialize)]
struct WireVector {
    id: String,
    values: Vec<f32>,
    metadata: WireMetadata,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct WireMetadata {
    #[serde(default)]
    text: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    position: u32,
}

#[derive(Debug, Serialize)]
struct UpsertRequest {
    vectors: Vec<WireVector>,
    namespace: String,
}

#[derive(Debug, Deserialize)]
struct UpsertResponse {
    #[serde(rename = "upsertedCount", default)]
    upserted_count: u64,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    vector: &'a [f32],
    #[serde(rename = "topK")]
    top_k: usize,
    namespace: &'a str,
    #[serde(rename = "includeMetadata")]
    include_metadata: bool,
    #[serde(rename = "includeValues")]
    include_values: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    score: f32,
    #[serde(default)]
    metadata: Option<WireMetadata>,
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(default)]
    dimension: usize,
    #[serde(rename = "totalVectorCount", default)]
    total_vector_count: u64,
    #[serde(default)]
    namespaces: std::collections::HashMap<String, NamespaceStats>,
}

#[derive(Debug, Deserialize)]
struct NamespaceStats {
    #[serde(rename = "vectorCount", default)]
    vector_count: u64,
}

/// Record count for one namespace. The service omits empty namespaces from
/// its stats response, so an absent entry means zero, not the index total
/// (other tenants' namespaces share that total).
fn namespace_record_count(stats: &StatsResponse, namespace: &str) -> u64 {
    stats
        .namespaces
        .get(namespace)
        .map(|ns| ns.vector_count)
        .unwrap_or(0)
}

/// Hosted vector index client.
pub struct RemoteIndex {
    endpoint: String,
    api_key: String,
    namespace: String,
    dimension: usize,
    client: reqwest::Client,
}

impl RemoteIndex {
    /// Connect to a hosted index and validate its dimension.
    pub async fn connect(
        endpoint: &str,
        api_key: &str,
        namespace: &str,
        dimension: usize,
    ) -> AppResult<Self> {
        let index = Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            namespace: namespace.to_string(),
            dimension,
            client: reqwest::Client::new(),
        };

        // The index dimension is fixed at creation time on the service
        // side; refuse to proceed against a mismatched index.
        let remote = index.describe().await?;
        if remote.dimension != 0 && remote.dimension != dimension {
            return Err(AppError::Index(format!(
                "Hosted index dimension mismatch: index has {}, configured {}",
                remote.dimension, dimension
            )));
        }

        tracing::info!(
            "Connected to hosted index at {} ({} vectors, dimension {})",
            index.endpoint,
            remote.total_vector_count,
            dimension
        );

        Ok(index)
    }

    async fn describe(&self) -> AppResult<StatsResponse> {
        let url = format!("{}/describe_index_stats", self.endpoint);

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| AppError::Index(format!("Failed to reach hosted index: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Index(format!(
                "Hosted index error ({}): {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Index(format!("Failed to parse index stats: {}", e)))
    }
}

impl std::fmt::Debug for RemoteIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteIndex")
            .field("endpoint", &self.endpoint)
            .field("namespace", &self.namespace)
            .field("dimension", &self.dimension)
            .finish()
    }
}

#[async_trait::async_trait]
impl VectorWriter for RemoteIndex {
    async fn upsert(&mut self, records: &[VectorRecord]) -> AppResult<()> {
        if records.is_empty() {
            return Ok(());
        }

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

        let body = UpsertRequest {
            vectors: records
                .iter()
                .map(|r| WireVector {
                    id: r.id.clone(),
                    values: r.vector.clone(),
                    metadata: WireMetadata {
                        text: r.text.clone(),
                        source: r.source.clone(),
                        position: r.position,
                    },
                })
                .collect(),
            namespace: self.namespace.clone(),
        };

        let url = format!("{}/vectors/upsert", self.endpoint);

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Index(format!("Failed to send upsert: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Index(format!(
                "Upsert failed ({}): {}",
                status, error_text
            )));
        }

        let result: UpsertResponse = response
            .json()
            .await
            .map_err(|e| AppError::Index(format!("Failed to parse upsert response: {}", e)))?;

        tracing::debug!(
            "Upserted {} records to namespace '{}'",
            result.upserted_count,
            self.namespace
        );

        Ok(())
    }
}

#[async_trait::async_trait]
impl VectorQuerier for RemoteIndex {
    async fn query(&self, vector: &[f32], top_k: usize) -> AppResult<Vec<ScoredRecord>> {
        if vector.len() != self.dimension {
            return Err(AppError::Index(format!(
                "Query vector has dimension {}, index requires {}",
                vector.len(),
                self.dimension
            )));
        }

        let body = QueryRequest {
            vector,
            top_k,
            namespace: &self.namespace,
            include_metadata: true,
            include_values: false,
        };

        let url = format!("{}/query", self.endpoint);

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Index(format!("Failed to send query: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Index(format!(
                "Query failed ({}): {}",
                status, error_text
            )));
        }

        let result: QueryResponse = response
            .json()
            .await
            .map_err(|e| AppError::Index(format!("Failed to parse query response: {}", e)))?;

        // The service returns matches ranked by descending score already
        Ok(result
            .matches
            .into_iter()
            .map(|m| {
                let metadata = m.metadata.unwrap_or_default();
                ScoredRecord {
                    id: m.id,
                    score: m.score,
                    text: metadata.text,
                    source: metadata.source,
                }
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl StatsProvider for RemoteIndex {
    async fn stats(&self) -> AppResult<IndexStatsReport> {
        let remote = self.describe().await?;

        Ok(IndexStatsReport {
            record_count: namespace_record_count(&remote, &self.namespace),
            dimension: self.dimension,
            namespace: self.namespace.clone(),
        })
    }
}

#[async_trait::async_trait]
impl VectorIndex for RemoteIndex {
    async fn reset(&mut self) -> AppResult<()> {
        let url = format!("{}/vectors/delete", self.endpoint);

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&serde_json::json!({
                "deleteAll": true,
                "namespace": self.namespace,
            }))
            .send()
            .await
            .map_err(|e| AppError::Index(format!("Failed to send delete: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Index(format!(
                "Reset failed ({}): {}",
                status, error_text
            )));
        }

        tracing::info!("Reset hosted index namespace '{}'", self.namespace);
        Ok(())
    }

    // record_source / seen_hashes use the defaults: the hosted service has
    // no hash enumeration, so the dedup gate is process-lifetime only here.
}
