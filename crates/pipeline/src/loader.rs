//! Document loading from a local folder.
//!
//! Walks a folder recursively and turns supported files into [`Document`]s:
//! - `.txt` / `.md`: one document per file
//! - `.json`: an array of `{id, text}` entries, one document per entry
//!
//! PDF extraction and other binary formats are out of scope; the pipeline
//! receives already-extracted plain text.

use crate::dedup::content_hash;
use crate::types::Document;
use ragline_core::{AppError, AppResult};
use serde::Deserialize;
use std::path::Path;
use walkdir::WalkDir;

/// One entry in a JSON document file.
#[derive(Debug, Deserialize)]
struct JsonEntry {
    #[serde(default)]
    id: Option<String>,
    text: String,
}

/// Load all supported documents under `folder`.
///
/// An empty result is an error requiring caller action; no embedding or
/// upsert calls should follow it.
pub fn load_documents(folder: &Path) -> AppResult<Vec<Document>> {
    if !folder.is_dir() {
        return Err(AppError::Document(format!(
            "Document folder not found: {:?}",
            folder
        )));
    }

    let mut documents = Vec::new();

    for entry in WalkDir::new(folder)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("txt") | Some("md") => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    AppError::Document(format!("Failed to read {:?}: {}", path, e))
                })?;

                if text.trim().is_empty() {
                    tracing::warn!("Skipping empty file: {:?}", path);
                    continue;
                }

                documents.push(Document {
                    source: path.display().to_string(),
                    content_hash: content_hash(text.as_bytes()),
                    text,
                });
            }
            Some("json") => {
                documents.extend(load_json_file(path)?);
            }
            _ => {
                tracing::debug!("Ignoring unsupported file: {:?}", path);
            }
        }
    }

    if documents.is_empty() {
        return Err(AppError::Document(format!(
            "No documents found in {:?} (supported: .txt, .md, .json)",
            folder
        )));
    }

    tracing::info!("Loaded {} documents from {:?}", documents.len(), folder);

    Ok(documents)
}

/// Load a JSON file holding an array of `{id, text}` entries.
fn load_json_file(path: &Path) -> AppResult<Vec<Document>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::Document(format!("Failed to read {:?}: {}", path, e)))?;

    let entries: Vec<JsonEntry> = serde_json::from_str(&content).map_err(|e| {
        AppError::Document(format!("Failed to parse JSON in {:?}: {}", path, e))
    })?;

    let mut documents = Vec::new();

    for (i, entry) in entries.into_iter().enumerate() {
        if entry.text.trim().is_empty() {
            continue;
        }

        let fragment = entry.id.unwrap_or_else(|| i.to_string());

        documents.push(Document {
            source: format!("{}#{}", path.display(), fragment),
            content_hash: content_hash(entry.text.as_bytes()),
            text: entry.text,
        });
    }

    Ok(documents)
}
