//! Embedding engine for the retrieval pipeline.
//!
//! Converts text (chunks or queries) into fixed-dimension vectors via a
//! configured provider. The provider choice is configuration, not a runtime
//! decision.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbedMode, EmbeddingProvider};
pub use providers::{PineconeEmbedder, TrigramEmbedder};
