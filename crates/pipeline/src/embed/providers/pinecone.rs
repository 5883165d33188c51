//! Hosted embedding provider (Pinecone inference API).
//!
//! API: https://docs.pinecone.io/reference/api/inference/generate-embeddings

use crate::embed::provider::{EmbedMode, EmbeddingProvider};
use ragline_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.pinecone.io";

/// Inference API request format.
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    inputs: Vec<EmbedInput<'a>>,
    parameters: EmbedParameters<'a>,
}

#[derive(Debug, Serialize)]
struct EmbedInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct EmbedParameters<'a> {
    input_type: &'a str,
    truncate: &'a str,
}

/// Inference API response format.
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedVector>,
}

#[derive(Debug, Deserialize)]
struct EmbedVector {
    values: Vec<f32>,
}

/// Hosted embedding client.
pub struct PineconeEmbedder {
    base_url: String,
    api_key: String,
    model: String,
    dimensions: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for PineconeEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // api_key stays out of debug output
        f.debug_struct("PineconeEmbedder")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

impl PineconeEmbedder {
    /// Create a new hosted embedder.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        dimensions: usize,
        endpoint: Option<&str>,
    ) -> Self {
        Self {
            base_url: endpoint.unwrap_or(DEFAULT_BASE_URL).to_string(),
            api_key: api_key.into(),
            model: model.into(),
            dimensions,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for PineconeEmbedder {
    fn provider_name(&self) -> &str {
        "pinecone"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String], mode: EmbedMode) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::info!(
            "Embedding {} texts with model '{}' (mode: {})",
            texts.len(),
            self.model,
            mode.as_str()
        );

        let body = EmbedRequest {
            model: &self.model,
            inputs: texts.iter().map(|t| EmbedInput { text: t }).collect(),
            parameters: EmbedParameters {
                input_type: mode.as_str(),
                truncate: "END",
            },
        };

        let url = format!("{}/embed", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("Failed to send embed request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Embedding(format!(
                "Embedding API error ({}): {}",
                status, error_text
            )));
        }

        let api_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| AppError::Embedding(format!("Failed to parse embed response: {}", e)))?;

        if api_response.data.len() != texts.len() {
            return Err(AppError::Embedding(format!(
                "Embedding count mismatch: sent {} inputs, received {} vectors",
                texts.len(),
                api_response.data.len()
            )));
        }

        let mut embeddings = Vec::with_capacity(api_response.data.len());
        for vector in api_response.data {
            if vector.values.len() != self.dimensions {
                return Err(AppError::Embedding(format!(
                    "Embedding dimension mismatch: expected {}, got {}",
                    self.dimensions,
                    vector.values.len()
                )));
            }
            embeddings.push(vector.values);
        }

        tracing::debug!(
            "Received {} embeddings of dimension {}",
            embeddings.len(),
            self.dimensions
        );

        Ok(embeddings)
    }
}
