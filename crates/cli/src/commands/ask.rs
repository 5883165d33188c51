//! Ask command handler.
//!
//! Answers a single question grounded in the indexed documents.

use clap::Args;
use ragline_core::{AppConfig, AppResult};
use ragline_llm::create_client;
use ragline_pipeline::embed::create_provider;
use ragline_pipeline::index::open_index;
use ragline_pipeline::{answer, Retriever};

/// Ask a single question against the indexed documents
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to answer
    pub question: String,

    /// Number of chunks to retrieve
    #[arg(long, short = 'k')]
    pub top_k: Option<usize>,

    /// Show the sources used for the answer
    #[arg(long)]
    pub sources: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let embed_key = super::embedding_api_key(config)?;
        let embedder = create_provider(&config.embedding, embed_key.as_deref())?;
        let index = open_index(config).await?;

        let chat_key = super::chat_api_key(config)?;
        let client = create_client(
            &config.chat.provider,
            config.chat.endpoint.as_deref(),
            chat_key.as_deref(),
        )?;

        let top_k = self.top_k.unwrap_or(config.top_k);
        let retriever = Retriever::new(embedder.as_ref(), index.as_ref(), top_k);
        let chunks = retriever.retrieve(&self.question).await?;

        let reply = answer::generate(client.as_ref(), &config.chat, &self.question, &chunks).await?;

        if self.json {
            let sources: Vec<_> = chunks
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "source": c.source,
                        "score": c.score,
                    })
                })
                .collect();
            let output = serde_json::json!({
                "question": self.question,
                "answer": reply,
                "sources": sources,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", reply);
            if self.sources {
                println!();
                for chunk in &chunks {
                    println!("  [{:.3}] {}", chunk.score, chunk.source);
                }
            }
        }

        Ok(())
    }
}
