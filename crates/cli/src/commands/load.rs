//! Load command handler.
//!
//! Ingests a folder of documents into the vector index.

use clap::Args;
use ragline_core::{AppConfig, AppResult};
use ragline_pipeline::embed::create_provider;
use ragline_pipeline::index::open_index;
use ragline_pipeline::{Chunker, DedupGate, IngestOptions};
use std::path::PathBuf;

/// Ingest documents into the vector index
#[derive(Args, Debug)]
pub struct LoadCommand {
    /// Folder containing documents (.txt, .md, .json)
    pub folder: PathBuf,

    /// Reset the index before loading
    #[arg(long)]
    pub reset: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl LoadCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing load command for {:?}", self.folder);

        let api_key = super::embedding_api_key(config)?;
        let embedder = create_provider(&config.embedding, api_key.as_deref())?;
        let mut index = open_index(config).await?;
        let mut gate = DedupGate::with_seen(index.seen_hashes()?);

        let chunker = Chunker::new(config.chunk_size, config.chunk_overlap)?;
        let options = IngestOptions {
            folder: self.folder.clone(),
            reset: self.reset,
        };

        let stats =
            ragline_pipeline::ingest(&options, &chunker, embedder.as_ref(), index.as_mut(), &mut gate)
                .await?;

        if self.json {
            let output = serde_json::json!({
                "documents": stats.documents,
                "skipped": stats.skipped,
                "chunks": stats.chunks,
                "bytesProcessed": stats.bytes_processed,
                "durationSecs": stats.duration_secs,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!(
                "Loaded {} documents ({} chunks, {} bytes, {} skipped) in {:.2}s",
                stats.documents, stats.chunks, stats.bytes_processed, stats.skipped,
                stats.duration_secs
            );
        }

        Ok(())
    }
}
