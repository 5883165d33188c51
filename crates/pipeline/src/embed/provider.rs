//! Embedding provider trait and factory.

use ragline_core::{AppError, AppResult, EmbeddingSettings};
use std::sync::Arc;

/// Whether texts are being embedded for indexing or for querying.
///
/// Retrieval-tuned embedding models produce different vectors for the two
/// sides; the flag is forwarded to the remote service as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedMode {
    /// Document chunks on the write path
    Passage,
    /// User questions on the read path
    Query,
}

impl EmbedMode {
    /// Wire representation of the mode flag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passage => "passage",
            Self::Query => "query",
        }
    }
}

/// Trait for embedding providers.
///
/// `embed_batch` returns one vector per input text, preserving order, all
/// of the fixed dimension reported by `dimensions()`.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "pinecone", "trigram")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String], mode: EmbedMode) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str, mode: EmbedMode) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()], mode).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Embedding("No embedding returned".to_string()))
    }
}

/// Create an embedding provider based on configuration.
pub fn create_provider(
    settings: &EmbeddingSettings,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match settings.provider.as_str() {
        "trigram" => {
            let provider = super::providers::trigram::TrigramEmbedder::new(settings.dimensions);
            Ok(Arc::new(provider))
        }

        "pinecone" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("Pinecone embedding provider requires an API key".to_string())
            })?;

            let provider = super::providers::pinecone::PineconeEmbedder::new(
                api_key,
                &settings.model,
                settings.dimensions,
                settings.endpoint.as_deref(),
            );
            Ok(Arc::new(provider))
        }

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: pinecone, trigram",
            settings.provider
        ))),
    }
}
