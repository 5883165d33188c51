//! Chat-completion integration crate for ragline.
//!
//! This crate provides a provider-agnostic abstraction for remote
//! chat-completion services through a unified trait-based interface.
//!
//! # Example
//! ```no_run
//! use ragline_llm::{ChatClient, ChatRequest, providers::OpenAiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiClient::new("sk-...");
//! let request = ChatRequest::new("gpt-3.5-turbo").with_user("Hello, world!");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{ChatClient, ChatMessage, ChatRequest, ChatResponse, ChatRole, ChatUsage};
pub use factory::create_client;
pub use providers::OpenAiClient;
