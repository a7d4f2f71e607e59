//! Turn runner
//!
//! Drives one user turn through the network: input guardrails on the
//! starting agent, then model calls until an agent produces a plain
//! message. Transfer calls switch the active agent along the static
//! handoff table; function tool calls run and feed their output back.

use futures_util::future::join_all;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::agent::definition::Agent;
use crate::agent::handoff::ContextNote;
use crate::agent::kind::AgentKind;
use crate::agent::network::AgentNetwork;
use crate::errors::{AtendenteError, Result};
use crate::llm::{ChatMessage, ChatModel, ChatRequest, Role, ToolCall, Usage};

pub const DEFAULT_MAX_TURNS: usize = 10;

/// Something that happened during a run, in order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    AgentUpdated { agent: AgentKind },
    ToolCalled { agent: AgentKind, tool: String, arguments: String },
    ToolOutput { agent: AgentKind, tool: String, output: String },
    MessageOutput { agent: AgentKind, content: String },
}

#[derive(Debug, Clone)]
pub struct RunResult {
    pub final_output: String,
    /// Validated JSON when the last agent declares an output schema
    pub structured_output: Option<Value>,
    pub last_agent: AgentKind,
    /// Conversation items: the input followed by everything this run added
    pub items: Vec<ChatMessage>,
    pub events: Vec<RunEvent>,
    pub usage: Usage,
}

impl RunResult {
    /// Items to send as input on the next turn
    pub fn to_input_list(&self) -> Vec<ChatMessage> {
        self.items.clone()
    }
}

pub struct Runner {
    model: Arc<dyn ChatModel>,
    max_turns: usize,
}

impl Runner {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    #[tracing::instrument(name = "agent_run", skip_all, fields(start = start.key()))]
    pub async fn run(
        &self,
        network: &AgentNetwork,
        start: AgentKind,
        input: Vec<ChatMessage>,
        context: &mut ContextNote,
    ) -> Result<RunResult> {
        let mut agent = network.get(start)?;
        let mut items = input;
        let mut events = vec![RunEvent::AgentUpdated { agent: start }];
        let mut usage = Usage::default();

        let last_user = items
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.text().to_string())
            .unwrap_or_default();
        self.run_input_guardrails(agent, &last_user).await?;
        // agents that took control in this run; kept only if the run succeeds
        let mut path = vec![agent.name().to_string()];

        for turn in 0..self.max_turns {
            tracing::debug!(turn, agent = agent.kind.key(), items = items.len(), "model call");
            let response = self.model.chat(self.request_for(network, agent, &items)).await?;
            usage.add(&response.usage);
            let message = response.message;

            if message.tool_calls.is_empty() {
                let content = message.text().to_string();
                let structured_output = match (network.structured_outputs(), agent.output_schema) {
                    (true, Some(schema)) => Some(schema.validate(&content, network.answers())?),
                    _ => None,
                };
                items.push(message);
                events.push(RunEvent::MessageOutput {
                    agent: agent.kind,
                    content: content.clone(),
                });
                tracing::info!(agent = agent.kind.key(), turns = turn + 1, tokens = usage.total_tokens, "run finished");
                context.agent_path.extend(path);

                return Ok(RunResult {
                    final_output: content,
                    structured_output,
                    last_agent: agent.kind,
                    items,
                    events,
                    usage,
                });
            }

            let calls = message.tool_calls.clone();
            items.push(message);

            let mut next: Option<AgentKind> = None;
            for call in &calls {
                match AgentKind::from_transfer_tool(&call.function.name) {
                    Some(target) => {
                        let output = self.handoff(agent, target, next.is_some())?;
                        items.push(ChatMessage::tool(&call.id, output));
                        next.get_or_insert(target);
                    }
                    None => {
                        let output = self.call_tool(agent, call, &mut events).await?;
                        items.push(ChatMessage::tool(&call.id, output));
                    }
                }
            }

            if let Some(target) = next {
                tracing::info!(from = agent.kind.key(), to = target.key(), "handoff");
                agent = network.get(target)?;
                path.push(agent.name().to_string());
                events.push(RunEvent::AgentUpdated { agent: target });
            }
        }

        tracing::warn!(max_turns = self.max_turns, agent = agent.kind.key(), "turn limit reached");
        Err(AtendenteError::MaxTurnsExceeded(self.max_turns))
    }

    fn request_for(&self, network: &AgentNetwork, agent: &Agent, items: &[ChatMessage]) -> ChatRequest {
        let mut messages = Vec::with_capacity(items.len() + 1);
        messages.push(ChatMessage::system(agent.instructions.clone()));
        messages.extend(items.iter().cloned());

        let mut request = ChatRequest::new(agent.model.clone(), messages).with_tools(agent.tool_definitions());
        if network.structured_outputs() {
            if let Some(schema) = agent.output_schema {
                request = request.with_json_schema(schema.name(), schema.json_schema(network.answers()));
            }
        }
        request
    }

    /// First input guardrail to trip stops the run
    async fn run_input_guardrails(&self, agent: &Agent, message: &str) -> Result<()> {
        let verdicts = join_all(
            agent
                .input_guardrails
                .iter()
                .map(|guardrail| guardrail.check(agent.kind, message)),
        )
        .await;

        match verdicts.into_iter().find(|v| v.tripwire_triggered) {
            Some(verdict) => {
                tracing::info!(
                    agent = agent.kind.key(),
                    guardrail = %verdict.guardrail,
                    "input guardrail tripped"
                );
                Err(AtendenteError::GuardrailTripwire {
                    agent: agent.name().to_string(),
                    verdict: Box::new(verdict),
                })
            }
            None => Ok(()),
        }
    }

    /// Tool message for a transfer call; only the first transfer of a turn is taken
    fn handoff(&self, agent: &Agent, target: AgentKind, already_transferred: bool) -> Result<String> {
        if !agent.kind.can_handoff_to(target) {
            return Err(AtendenteError::InvalidHandoff {
                from: agent.name().to_string(),
                to: target.display_name().to_string(),
            });
        }
        if already_transferred {
            return Ok("Multiple handoffs detected, ignoring this one.".to_string());
        }
        Ok(json!({ "assistant": target.display_name() }).to_string())
    }

    async fn call_tool(&self, agent: &Agent, call: &ToolCall, events: &mut Vec<RunEvent>) -> Result<String> {
        events.push(RunEvent::ToolCalled {
            agent: agent.kind,
            tool: call.function.name.clone(),
            arguments: call.function.arguments.clone(),
        });

        let result = agent.tools.execute(&call.function.name, &call.function.arguments).await?;
        if !result.success {
            tracing::warn!(tool = %result.tool, error = ?result.error, "tool call failed");
        }
        let output = result.model_output();

        events.push(RunEvent::ToolOutput {
            agent: agent.kind,
            tool: call.function.name.clone(),
            output: output.clone(),
        });
        Ok(output)
    }
}
