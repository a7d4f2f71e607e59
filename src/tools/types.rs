//! Function tool types
//!
//! A function tool is something an agent may call by name with JSON
//! arguments. Its output goes back to the model as a tool message.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::errors::Result;
use crate::llm::ToolDefinition;

/// Callable tool exposed to an agent
#[async_trait]
pub trait FunctionTool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the arguments object
    fn parameters(&self) -> Value;

    /// Run with parsed arguments; the returned string is sent to the model
    async fn call(&self, arguments: Value) -> Result<String>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(self.name(), self.description(), self.parameters())
    }
}

/// Outcome of one tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool: String,
    pub output: String,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(tool: String, output: String, duration: Duration) -> Self {
        Self {
            tool,
            output,
            success: true,
            duration_ms: duration.as_millis() as u64,
            error: None,
        }
    }

    pub fn failure(tool: String, error: String, duration: Duration) -> Self {
        Self {
            tool,
            output: String::new(),
            success: false,
            duration_ms: duration.as_millis() as u64,
            error: Some(error),
        }
    }

    /// Text returned to the model; failures are reported, not raised
    pub fn model_output(&self) -> String {
        match &self.error {
            Some(error) => format!("Erro ao executar {}: {}", self.tool, error),
            None => self.output.clone(),
        }
    }
}
