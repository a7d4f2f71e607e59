//! Knowledge documents and character-window chunking

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::extract::{extension_of, extract_text, is_supported};
use crate::config::RagSettings;
use crate::errors::{AtendenteError, Result};

/// A loaded document, keyed by file name
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub source: String,
    pub text: String,
}

/// Window of a document; positions are character offsets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    pub source: String,
    pub start_pos: usize,
    pub end_pos: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingOptions {
    pub chunk_size: usize,
    pub overlap: usize,
    /// A chunk is kept only if its trimmed length exceeds this
    pub min_chunk_chars: usize,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
            min_chunk_chars: 100,
        }
    }
}

impl From<&RagSettings> for ChunkingOptions {
    fn from(settings: &RagSettings) -> Self {
        Self {
            chunk_size: settings.chunk_size,
            overlap: settings.overlap,
            min_chunk_chars: settings.min_chunk_chars,
        }
    }
}

impl ChunkingOptions {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 || self.overlap >= self.chunk_size {
            return Err(AtendenteError::InvalidChunking {
                chunk_size: self.chunk_size,
                overlap: self.overlap,
            });
        }
        Ok(())
    }
}

/// Read every supported file directly under `dir`, sorted by name.
///
/// Unsupported extensions, unreadable PDF or DOCX files and files with no
/// text are skipped with a warning.
pub fn load_documents(dir: &Path) -> Result<Vec<Document>> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    let mut documents = Vec::new();
    for path in paths {
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if !is_supported(&path) {
            tracing::warn!("unsupported file type: {} ({})", extension_of(&path), source);
            continue;
        }

        let text = match extract_text(&path) {
            Ok(text) => text,
            Err(e @ AtendenteError::ExtractionError { .. }) => {
                tracing::warn!("skipping {}: {}", source, e);
                continue;
            }
            Err(e) => return Err(e),
        };
        if text.trim().is_empty() {
            tracing::warn!("no text extracted from {}", source);
            continue;
        }

        tracing::info!("processed {} ({} characters)", source, text.chars().count());
        documents.push(Document { source, text });
    }

    tracing::info!("processed {} documents", documents.len());
    Ok(documents)
}

/// Overlapping windows of `chunk_size` characters, advancing by
/// `chunk_size - overlap`. Windows with too little text are dropped.
pub fn create_chunks(document: &Document, options: &ChunkingOptions) -> Result<Vec<Chunk>> {
    options.validate()?;

    let chars: Vec<char> = document.text.chars().collect();
    let step = options.chunk_size - options.overlap;
    let mut chunks = Vec::new();

    for start in (0..chars.len()).step_by(step) {
        let end = (start + options.chunk_size).min(chars.len());
        let content: String = chars[start..end].iter().collect();
        if content.trim().chars().count() > options.min_chunk_chars {
            chunks.push(Chunk {
                content,
                source: document.source.clone(),
                start_pos: start,
                end_pos: end,
            });
        }
    }

    Ok(chunks)
}

/// Chunks of every document, in document order
pub fn chunk_documents(documents: &[Document], options: &ChunkingOptions) -> Result<Vec<Chunk>> {
    let mut chunks = Vec::new();
    for document in documents {
        chunks.extend(create_chunks(document, options)?);
    }
    tracing::info!("created {} chunks", chunks.len());
    Ok(chunks)
}
