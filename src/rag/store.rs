//! Embedding store persisted as JSON

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::Result;
use crate::rag::documents::Chunk;

/// A chunk with its embedding and position in the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedChunk {
    pub chunk: Chunk,
    #[serde(default)]
    pub embedding: Vec<f32>,
    pub index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingStore {
    /// Embedding model the vectors came from
    #[serde(default)]
    pub model: String,
    pub records: Vec<EmbeddedChunk>,
}

impl EmbeddingStore {
    pub fn new(model: impl Into<String>, records: Vec<EmbeddedChunk>) -> Self {
        Self {
            model: model.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)?;
        tracing::info!("embeddings saved to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let store: Self = serde_json::from_str(&contents)?;
        tracing::info!(records = store.len(), "embeddings loaded from {}", path.display());
        Ok(store)
    }

    /// Load, or log the failure and return an empty store
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(store) => store,
            Err(e) => {
                tracing::error!("failed to load embeddings from {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
