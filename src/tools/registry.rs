//! Tool registry
//!
//! Holds the function tools an agent owns and dispatches calls by name.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::errors::{AtendenteError, Result};
use crate::llm::ToolDefinition;
use crate::tools::types::{FunctionTool, ToolResult};

/// Named collection of function tools
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn FunctionTool>>,
    order: Vec<String>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.order)
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Arc<dyn FunctionTool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_none() {
            self.order.push(name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Definitions in registration order
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.definition())
            .collect()
    }

    /// Parse arguments and run the named tool.
    ///
    /// Unknown names are an error. Bad arguments and tool failures come back
    /// as a failed `ToolResult` so the model can see them.
    pub async fn execute(&self, name: &str, raw_arguments: &str) -> Result<ToolResult> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| AtendenteError::UnknownTool(name.to_string()))?;

        let start = Instant::now();
        let arguments: Value = if raw_arguments.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            match serde_json::from_str(raw_arguments) {
                Ok(value) => value,
                Err(e) => {
                    return Ok(ToolResult::failure(
                        name.to_string(),
                        format!("invalid arguments: {}", e),
                        start.elapsed(),
                    ))
                }
            }
        };

        match tool.call(arguments).await {
            Ok(output) => Ok(ToolResult::success(name.to_string(), output, start.elapsed())),
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "tool call failed");
                Ok(ToolResult::failure(name.to_string(), e.to_string(), start.elapsed()))
            }
        }
    }
}
