//! Stats command handler.
//!
//! Shows vector index statistics.

use clap::Args;
use ragline_core::{AppConfig, AppResult};
use ragline_pipeline::index::{open_index, StatsProvider};

/// Show vector index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let index = open_index(config).await?;
        let report = index.stats().await?;

        if self.json {
            let output = serde_json::json!({
                "recordCount": report.record_count,
                "dimension": report.dimension,
                "namespace": report.namespace,
                "backend": config.index.backend,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Backend:   {}", config.index.backend);
            println!("Namespace: {}", report.namespace);
            println!("Dimension: {}", report.dimension);
            println!("Records:   {}", report.record_count);
        }

        Ok(())
    }
}
