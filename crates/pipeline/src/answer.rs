//! Grounded answer generation.
//!
//! Retrieved chunks are numbered into a context block, the context is
//! embedded in a fixed system instruction, and the question goes out as
//! the user message. Provider failures come back as errors, never as
//! answer text.

use ragline_core::{AppResult, ChatSettings};
use ragline_llm::{ChatClient, ChatRequest};

use crate::index::ScoredRecord;

/// Render retrieved chunks as a numbered context block.
pub fn build_context(chunks: &[ScoredRecord]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("{}. {}", i + 1, chunk.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the system instruction carrying the context block.
pub fn build_system_prompt(context: &str) -> String {
    format!(
        "You are a helpful assistant. Use the provided context to answer the \
         user's question. If the context does not contain the answer, say so \
         and answer from general knowledge.\n\nContext:\n{}",
        context
    )
}

/// Generate an answer for `question` grounded in `chunks`.
///
/// An empty chunk list still produces an answer; the model is simply told
/// the context is empty. Chat provider failures propagate as errors.
pub async fn generate(
    client: &dyn ChatClient,
    settings: &ChatSettings,
    question: &str,
    chunks: &[ScoredRecord],
) -> AppResult<String> {
    let context = build_context(chunks);
    tracing::debug!(
        "Generating answer with {} context chunks ({} chars)",
        chunks.len(),
        context.len()
    );

    let request = ChatRequest::new(&settings.model)
        .with_system(build_system_prompt(&context))
        .with_user(question)
        .with_temperature(settings.temperature)
        .with_max_tokens(settings.max_tokens);

    let response = client.complete(&request).await?;
    Ok(response.content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ragline_core::AppError;
    use ragline_llm::{ChatResponse, ChatRole, ChatUsage};
    use std::sync::Mutex;

    /// Client that records the request it was sent and replies with canned
    /// text, standing in for the remote chat service.
    struct CannedClient {
        reply: &'static str,
        last_request: Mutex<Option<ChatRequest>>,
    }

    impl CannedClient {
        fn new(reply: &'static str) -> Self {
            Self {
                reply,
                last_request: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ChatClient for CannedClient {
        fn provider_name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, request: &ChatRequest) -> ragline_core::AppResult<ChatResponse> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            Ok(ChatResponse {
                content: self.reply.to_string(),
                model: request.model.clone(),
                usage: ChatUsage::default(),
            })
        }
    }

    /// Client whose remote call always fails.
    struct FailingClient;

    #[async_trait]
    impl ChatClient for FailingClient {
        fn provider_name(&self) -> &str {
            "failing"
        }

        async fn complete(&self, _request: &ChatRequest) -> ragline_core::AppResult<ChatResponse> {
            Err(AppError::Chat("connection refused".to_string()))
        }
    }

    fn settings() -> ragline_core::ChatSettings {
        ragline_core::ChatSettings::default()
    }

    fn chunk(text: &str, score: f32) -> ScoredRecord {
        ScoredRecord {
            id: "id".to_string(),
            score,
            text: text.to_string(),
            source: "doc.txt".to_string(),
        }
    }

    #[test]
    fn test_build_context_numbers_chunks() {
        let chunks = vec![chunk("first chunk", 0.9), chunk("second chunk", 0.8)];
        let context = build_context(&chunks);
        assert_eq!(context, "1. first chunk\n2. second chunk");
    }

    #[test]
    fn test_build_context_empty() {
        assert_eq!(build_context(&[]), "");
    }

    #[test]
    fn test_system_prompt_carries_context() {
        let prompt = build_system_prompt("1. the facts");
        assert!(prompt.contains("Context:\n1. the facts"));
        assert!(prompt.contains("general knowledge"));
    }

    #[tokio::test]
    async fn test_generate_sends_context_and_question() {
        let client = CannedClient::new("Apples are sweet.");
        let chunks = vec![chunk("Apples are a sweet fruit.", 0.9)];

        let reply = generate(&client, &settings(), "What fruit is sweet?", &chunks)
            .await
            .unwrap();
        assert_eq!(reply, "Apples are sweet.");

        let request = client.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, ChatRole::System);
        assert!(request.messages[0]
            .content
            .contains("1. Apples are a sweet fruit."));
        assert_eq!(request.messages[1].role, ChatRole::User);
        assert_eq!(request.messages[1].content, "What fruit is sweet?");
    }

    #[tokio::test]
    async fn test_generate_with_zero_chunks_still_answers() {
        let client = CannedClient::new("Answering from general knowledge.");

        let reply = generate(&client, &settings(), "What is an apple?", &[])
            .await
            .unwrap();
        assert_eq!(reply, "Answering from general knowledge.");

        // The empty context block still goes out; the model is told to fall
        // back to general knowledge rather than the pipeline failing.
        let request = client.last_request.lock().unwrap().clone().unwrap();
        assert!(request.messages[0].content.ends_with("Context:\n"));
    }

    #[tokio::test]
    async fn test_generate_propagates_remote_failure() {
        let result = generate(&FailingClient, &settings(), "anything", &[]).await;

        match result {
            Err(AppError::Chat(reason)) => assert!(reason.contains("connection refused")),
            other => panic!("Expected a chat error, got {:?}", other),
        }
    }
}
