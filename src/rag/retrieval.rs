//! Cosine-similarity retrieval over the embedding store

use std::cmp::Ordering;
use std::sync::Arc;

use crate::errors::Result;
use crate::llm::Embedder;
use crate::rag::store::{EmbeddedChunk, EmbeddingStore};

/// Cosine similarity; zero-norm or mismatched vectors score 0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())) as f32
}

/// A record annotated with its similarity to the query
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub record: EmbeddedChunk,
    pub similarity: f32,
}

/// Top `top_k` records by similarity, highest first. Records with no
/// embedding are skipped.
pub fn rank(query: &[f32], records: &[EmbeddedChunk], top_k: usize) -> Vec<ScoredChunk> {
    let mut scored: Vec<ScoredChunk> = records
        .iter()
        .filter(|r| !r.embedding.is_empty())
        .map(|r| ScoredChunk {
            similarity: cosine_similarity(query, &r.embedding),
            record: r.clone(),
        })
        .collect();

    scored.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(Ordering::Equal));
    scored.truncate(top_k);
    scored
}

/// Embedded chunks plus the embedder that produced them
pub struct KnowledgeBase {
    store: EmbeddingStore,
    embedder: Arc<dyn Embedder>,
}

impl KnowledgeBase {
    pub fn new(store: EmbeddingStore, embedder: Arc<dyn Embedder>) -> Self {
        if !store.model.is_empty() && store.model != embedder.model() {
            tracing::warn!(
                store = %store.model,
                embedder = embedder.model(),
                "embedding model differs from the one used to build the index"
            );
        }
        Self { store, embedder }
    }

    pub fn store(&self) -> &EmbeddingStore {
        &self.store
    }

    pub async fn find_relevant_chunks(&self, query: &str, top_k: usize) -> Result<Vec<ScoredChunk>> {
        if self.store.is_empty() {
            tracing::error!("no embeddings loaded");
            return Ok(Vec::new());
        }
        let query_embedding = self.embedder.embed(query).await?;
        Ok(rank(&query_embedding, &self.store.records, top_k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::documents::Chunk;
    use quickcheck_macros::quickcheck;

    fn record(index: usize, embedding: Vec<f32>) -> EmbeddedChunk {
        EmbeddedChunk {
            chunk: Chunk {
                content: format!("trecho {}", index),
                source: "manual.md".to_string(),
                start_pos: 0,
                end_pos: 8,
            },
            embedding,
            index,
        }
    }

    #[test]
    fn test_cosine_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_rank_orders_and_truncates() {
        let records = vec![
            record(0, vec![0.0, 1.0]),
            record(1, vec![1.0, 0.0]),
            record(2, Vec::new()),
            record(3, vec![1.0, 1.0]),
        ];
        let ranked = rank(&[1.0, 0.0], &records, 2);
        let indices: Vec<usize> = ranked.iter().map(|s| s.record.index).collect();
        assert_eq!(indices, vec![1, 3]);
        assert!(ranked[0].similarity >= ranked[1].similarity);
    }

    #[quickcheck]
    fn prop_cosine_is_bounded_and_symmetric(a: Vec<i8>, b: Vec<i8>) -> bool {
        let a: Vec<f32> = a.into_iter().map(f32::from).collect();
        let b: Vec<f32> = b.into_iter().map(f32::from).collect();
        let ab = cosine_similarity(&a, &b);
        let ba = cosine_similarity(&b, &a);
        (-1.0001..=1.0001).contains(&ab) && (ab - ba).abs() < 1e-6
    }
}
