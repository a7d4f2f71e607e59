//! LLM access layer
//!
//! `ChatModel` and `Embedder` are the seams every other module talks to.
//! `OpenAiClient` implements both over HTTP.

pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::errors::Result;

pub use client::OpenAiClient;
pub use types::{
    ChatMessage, ChatRequest, ChatResponse, FunctionCall, Role, ToolCall, ToolDefinition, Usage,
};

/// Chat-completions backend
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;
}

/// Text embedding backend
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Model name, recorded alongside stored vectors
    fn model(&self) -> &str;
}
