//! Command handlers for the ragline CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod chat;
pub mod load;
pub mod stats;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use load::LoadCommand;
pub use stats::StatsCommand;

use ragline_core::{AppConfig, AppResult};

/// Resolve the embedding provider's API key when the selected provider
/// needs one.
pub(crate) fn embedding_api_key(config: &AppConfig) -> AppResult<Option<String>> {
    if config.embedding.provider == "pinecone" {
        Ok(Some(config.require_api_key("PINECONE_API_KEY")?))
    } else {
        Ok(None)
    }
}

/// Resolve the chat provider's API key.
pub(crate) fn chat_api_key(config: &AppConfig) -> AppResult<Option<String>> {
    if config.chat.provider == "openai" {
        Ok(Some(config.require_api_key("OPENAI_API_KEY")?))
    } else {
        Ok(None)
    }
}
