//! Conversation state for the chat loop
//!
//! Holds the input list sent on each turn, the agent that answers next,
//! the shared context note and the session telemetry.

use crate::agent::{AgentKind, ContextNote, RunResult};
use crate::llm::{ChatMessage, Role};
use crate::telemetry::TelemetryCollector;

pub struct ChatSession {
    history: Vec<ChatMessage>,
    current_agent: AgentKind,
    start_agent: AgentKind,
    context: ContextNote,
    telemetry: TelemetryCollector,
}

impl ChatSession {
    pub fn new(start_agent: AgentKind) -> Self {
        Self {
            history: Vec::new(),
            current_agent: start_agent,
            start_agent,
            context: ContextNote::new(),
            telemetry: TelemetryCollector::new(),
        }
    }

    pub fn push_user(&mut self, text: &str) {
        self.history.push(ChatMessage::user(text));
    }

    /// Input for the next run
    pub fn input(&self) -> Vec<ChatMessage> {
        self.history.clone()
    }

    /// Adopt the run's items and hand the next turn to its last agent
    pub fn apply_result(&mut self, result: &RunResult) {
        self.history = result.to_input_list();
        self.current_agent = result.last_agent;
        self.telemetry.record_run(result);
    }

    /// Record a blocked turn; `reply` is added as the assistant's answer
    pub fn apply_guardrail_trip(&mut self, reply: Option<&str>) {
        if let Some(reply) = reply {
            self.history.push(ChatMessage::assistant(reply));
        }
        self.telemetry.record_guardrail_trip();
    }

    /// Drop the unanswered user message after a failed run
    pub fn apply_failure(&mut self) {
        if matches!(self.history.last(), Some(m) if m.role == Role::User) {
            self.history.pop();
        }
        self.telemetry.record_failure();
    }

    pub fn current_agent(&self) -> AgentKind {
        self.current_agent
    }

    pub fn set_agent(&mut self, agent: AgentKind) {
        self.current_agent = agent;
    }

    pub fn context(&self) -> &ContextNote {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ContextNote {
        &mut self.context
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn telemetry(&self) -> &TelemetryCollector {
        &self.telemetry
    }

    /// Forget the conversation and go back to the starting agent
    pub fn reset(&mut self) {
        self.history.clear();
        self.context = ContextNote::new();
        self.current_agent = self.start_agent;
    }

    /// Handoff path and stored summaries, for `/context`
    pub fn describe_context(&self) -> String {
        let mut out = String::new();
        if self.context.agent_path.is_empty() {
            out.push_str("Nenhum agente acionado ainda.\n");
        } else {
            out.push_str(&format!("Caminho: {}\n", self.context.agent_path.join(" → ")));
        }
        for (label, summary) in &self.context.handoff_summaries {
            out.push_str(&format!(
                "{}: {} → {} ({})\n",
                label, summary.from_agent, summary.next_agent_hint, summary.payload
            ));
        }
        out.push_str(&format!("Mensagens no histórico: {}", self.history.len()));
        out
    }
}
