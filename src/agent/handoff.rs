//! Shared conversation context and handoff summaries

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::agent::runner::RunResult;
use crate::llm::ChatMessage;

/// Structured note left by one agent for the next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandoffSummary {
    pub from_agent: String,
    pub next_agent_hint: String,
    pub payload_key: String,
    pub payload: Value,
}

/// State carried across runs of one conversation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextNote {
    pub handoff_summaries: BTreeMap<String, HandoffSummary>,
    /// Display names of agents that took control, in order
    #[serde(default)]
    pub agent_path: Vec<String>,
}

impl ContextNote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self, label: &str) -> Option<&HandoffSummary> {
        self.handoff_summaries.get(label)
    }
}

/// JSON when the output parses, `{}` when empty, otherwise a JSON string
pub fn serialize_output(output: &str) -> Value {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Value::Object(Default::default());
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(output.to_string()))
}

/// Record the run's output in `context` and return the input list with a
/// `[HANDOFF_SUMMARY]` assistant message appended
pub fn append_handoff_summary(
    result: &RunResult,
    context: &mut ContextNote,
    payload_key: &str,
    next_agent_hint: Option<&str>,
    summary_label: Option<&str>,
) -> Vec<ChatMessage> {
    let payload = result
        .structured_output
        .clone()
        .unwrap_or_else(|| serialize_output(&result.final_output));
    let from_agent = result.last_agent.display_name().to_string();
    let next_agent = next_agent_hint.unwrap_or(&from_agent).to_string();
    let label = summary_label.unwrap_or(payload_key).to_string();

    let block = format!(
        "[HANDOFF_SUMMARY]\nfrom_agent: {}\npayload_key: {}\nnext_agent: {}\npayload: {}\n[/HANDOFF_SUMMARY]",
        from_agent, payload_key, next_agent, payload
    );

    tracing::debug!(label = %label, from = %from_agent, next = %next_agent, "handoff summary stored");
    context.handoff_summaries.insert(
        label,
        HandoffSummary {
            from_agent,
            next_agent_hint: next_agent,
            payload_key: payload_key.to_string(),
            payload,
        },
    );

    let mut items = result.to_input_list();
    items.push(ChatMessage::assistant(block));
    items
}
