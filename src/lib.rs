//! AtendentePro - multi-agent customer support
//!
//! A network of template-driven agents (triage, flow, interview, answer,
//! confirmation, knowledge, usage) that hand a conversation to one another
//! over an OpenAI-compatible chat API.
//!
//! # Architecture
//!
//! - **Templates**: per-client YAML configuration and prompt builders
//! - **Agents**: static handoff table, turn runner and handoff summaries
//! - **Guardrails**: scope and keyword checks that run before an agent
//! - **RAG**: document chunking, embedding store and the `go_to_rag` tool

// Core
pub mod config;
pub mod errors;
pub mod llm;

// Agent network
pub mod agent;
pub mod guardrails;
pub mod prompts;
pub mod templates;
pub mod tools;

// Retrieval and long-document answers
pub mod context;
pub mod rag;

// Interface
pub mod bootstrap;
pub mod cli;
pub mod repl;
pub mod telemetry;

// Re-export commonly used types
pub use errors::{AtendenteError, Result};
