//! Agent definition

use serde_json::json;
use std::fmt;
use std::sync::Arc;

use crate::agent::kind::AgentKind;
use crate::agent::outputs::OutputSchema;
use crate::guardrails::InputGuardrail;
use crate::llm::ToolDefinition;
use crate::tools::ToolRegistry;

/// One configured agent: instructions, tools, guardrails and handoff targets
pub struct Agent {
    pub kind: AgentKind,
    pub instructions: String,
    pub model: String,
    pub handoffs: Vec<AgentKind>,
    pub tools: ToolRegistry,
    pub input_guardrails: Vec<Arc<dyn InputGuardrail>>,
    pub output_schema: Option<OutputSchema>,
}

impl Agent {
    /// Agent with the static handoff targets of `kind` and nothing else
    pub fn new(kind: AgentKind, instructions: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            kind,
            instructions: instructions.into(),
            model: model.into(),
            handoffs: kind.handoffs().to_vec(),
            tools: ToolRegistry::new(),
            input_guardrails: Vec::new(),
            output_schema: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.display_name()
    }

    pub fn with_guardrail(mut self, guardrail: Arc<dyn InputGuardrail>) -> Self {
        self.input_guardrails.push(guardrail);
        self
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_output_schema(mut self, schema: OutputSchema) -> Self {
        self.output_schema = Some(schema);
        self
    }

    /// Transfer functions for every handoff target, then function tools
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> = self
            .handoffs
            .iter()
            .map(|target| {
                ToolDefinition::function(
                    target.transfer_tool_name(),
                    format!(
                        "Handoff to the {} agent to handle the request. {}",
                        target.display_name(),
                        target.handoff_description()
                    ),
                    json!({"type": "object", "properties": {}, "additionalProperties": false}),
                )
            })
            .collect();
        definitions.extend(self.tools.definitions());
        definitions
    }

    pub fn guardrail_names(&self) -> Vec<&str> {
        self.input_guardrails.iter().map(|g| g.name()).collect()
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("kind", &self.kind)
            .field("model", &self.model)
            .field("handoffs", &self.handoffs)
            .field("tools", &self.tools)
            .field("input_guardrails", &self.guardrail_names())
            .field("output_schema", &self.output_schema)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_definitions_follow_table() {
        let agent = Agent::new(AgentKind::Flow, "instr", "gpt-4.1");
        let names: Vec<String> = agent
            .tool_definitions()
            .into_iter()
            .map(|d| d.function.name)
            .collect();
        assert_eq!(
            names,
            vec!["transfer_to_interview_agent", "transfer_to_triage_agent"]
        );
    }

    #[test]
    fn test_new_agent_has_no_guardrails() {
        let agent = Agent::new(AgentKind::Usage, "instr", "gpt-4.1");
        assert!(agent.guardrail_names().is_empty());
        assert!(agent.output_schema.is_none());
        assert_eq!(agent.name(), "Usage Agent");
    }
}
