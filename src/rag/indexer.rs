//! Build the embedding store from the knowledge folder

use futures_util::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;

use crate::errors::Result;
use crate::llm::Embedder;
use crate::rag::documents::{chunk_documents, load_documents, Chunk, ChunkingOptions};
use crate::rag::store::{EmbeddedChunk, EmbeddingStore};

pub struct Indexer {
    embedder: Arc<dyn Embedder>,
    options: ChunkingOptions,
    concurrency: usize,
    show_progress: bool,
}

impl Indexer {
    pub fn new(embedder: Arc<dyn Embedder>, options: ChunkingOptions) -> Self {
        Self {
            embedder,
            options,
            concurrency: 4,
            show_progress: false,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Load, chunk and embed every document under `dir`
    pub async fn build(&self, dir: &Path) -> Result<EmbeddingStore> {
        self.options.validate()?;
        let documents = load_documents(dir)?;
        let chunks = chunk_documents(&documents, &self.options)?;
        Ok(self.embed_chunks(chunks).await)
    }

    /// Embed chunks in order; chunks whose embedding fails are left out
    pub async fn embed_chunks(&self, chunks: Vec<Chunk>) -> EmbeddingStore {
        let total = chunks.len();
        let progress = self.progress_bar(total as u64);

        let results: Vec<Option<EmbeddedChunk>> = stream::iter(chunks.into_iter().enumerate())
            .map(|(index, chunk)| {
                let embedder = self.embedder.clone();
                let progress = progress.clone();
                async move {
                    let outcome = embedder.embed(&chunk.content).await;
                    progress.inc(1);
                    match outcome {
                        Ok(embedding) => {
                            tracing::debug!("embedded chunk {}/{}", index + 1, total);
                            Some(EmbeddedChunk {
                                chunk,
                                embedding,
                                index,
                            })
                        }
                        Err(e) => {
                            tracing::error!("failed to embed chunk {}: {}", index, e);
                            None
                        }
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        progress.finish_and_clear();
        let records: Vec<EmbeddedChunk> = results.into_iter().flatten().collect();
        tracing::info!("successfully embedded {} of {} chunks", records.len(), total);
        EmbeddingStore::new(self.embedder.model(), records)
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} Embedding [{bar:40.cyan/blue}] {pos}/{len} | ETA: {eta}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb
    }
}
