//! Retrieval-augmented answers over the knowledge folder
//!
//! Components:
//! - extract: text of txt, md, pdf and docx files
//! - documents: document loading and character-window chunking
//! - store: JSON embedding store
//! - indexer: embeds chunks with bounded concurrency
//! - retrieval: cosine ranking against a query embedding
//! - knowledge: the `go_to_rag` function tool

pub mod documents;
pub mod extract;
pub mod indexer;
pub mod knowledge;
pub mod retrieval;
pub mod store;

// Re-export key types
pub use documents::{chunk_documents, create_chunks, load_documents, Chunk, ChunkingOptions, Document};
pub use extract::{extract_pages, extract_text, SUPPORTED_EXTENSIONS};
pub use indexer::Indexer;
pub use knowledge::{KnowledgeTool, KnowledgeToolResult};
pub use retrieval::{cosine_similarity, rank, KnowledgeBase, ScoredChunk};
pub use store::{EmbeddedChunk, EmbeddingStore};
