//! Embedding provider implementations.

pub mod pinecone;
pub mod trigram;

pub use pinecone::PineconeEmbedder;
pub use trigram::TrigramEmbedder;
