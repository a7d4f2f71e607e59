//! Error types for AtendentePro
//!
//! One error enum for the whole library. The binary wraps it in `anyhow`
//! at the top level.

use thiserror::Error;

use crate::guardrails::GuardrailVerdict;

/// Main error type for the agent system
#[derive(Error, Debug)]
pub enum AtendenteError {
    /// Configuration errors (missing credentials, bad settings)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Template file could not be parsed
    #[error("Template error in {path}: {reason}")]
    TemplateError { path: String, reason: String },

    /// Chat or embedding API returned a non-success status
    #[error("LLM API error (HTTP {status}): {body}")]
    ApiError { status: u16, body: String },

    /// The API answered but the payload had nothing usable
    #[error("Empty response from model: {0}")]
    EmptyResponse(String),

    /// An input guardrail blocked the message
    #[error("Guardrail '{}' tripped for {agent}: {}", .verdict.guardrail, .verdict.output.reasoning)]
    GuardrailTripwire {
        agent: String,
        verdict: Box<GuardrailVerdict>,
    },

    /// Unknown agent name or key
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    /// Model asked for a transfer that is not in the handoff table
    #[error("Invalid handoff from {from} to {to}")]
    InvalidHandoff { from: String, to: String },

    /// Model asked for a tool the agent does not own
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Run did not produce a final message within the turn budget
    #[error("Run exceeded {0} turns without a final answer")]
    MaxTurnsExceeded(usize),

    /// Structured output failed validation
    #[error("Invalid agent output: {0}")]
    InvalidOutput(String),

    /// Chunking parameters are inconsistent
    #[error("Invalid chunking: overlap {overlap} must be smaller than chunk size {chunk_size}")]
    InvalidChunking { chunk_size: usize, overlap: usize },

    /// A PDF or DOCX file could not be read
    #[error("Failed to extract text from {path}: {reason}")]
    ExtractionError { path: String, reason: String },

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic errors with context
    #[error("Agent error: {0}")]
    Generic(String),
}

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AtendenteError>;

/// Convert anyhow errors to AtendenteError
impl From<anyhow::Error> for AtendenteError {
    fn from(err: anyhow::Error) -> Self {
        AtendenteError::Generic(err.to_string())
    }
}
