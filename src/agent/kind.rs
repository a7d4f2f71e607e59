//! The seven agents and the static handoff table

use serde::Serialize;
use std::fmt;

use crate::errors::{AtendenteError, Result};

/// Agent identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgentKind {
    Triage,
    Flow,
    Interview,
    Answer,
    Confirmation,
    Knowledge,
    Usage,
}

impl AgentKind {
    pub const ALL: [AgentKind; 7] = [
        AgentKind::Triage,
        AgentKind::Flow,
        AgentKind::Interview,
        AgentKind::Answer,
        AgentKind::Confirmation,
        AgentKind::Knowledge,
        AgentKind::Usage,
    ];

    /// Name shown to users and recorded in handoff summaries
    pub fn display_name(&self) -> &'static str {
        match self {
            AgentKind::Triage => "Triage Agent",
            AgentKind::Flow => "Flow Agent",
            AgentKind::Interview => "Interview Agent",
            AgentKind::Answer => "Answer Agent",
            AgentKind::Confirmation => "Confirmation Agent",
            AgentKind::Knowledge => "Knowledge Agent",
            AgentKind::Usage => "Usage Agent",
        }
    }

    /// Key used in YAML configuration (`agent_scopes`) and transfer tools
    pub fn key(&self) -> &'static str {
        match self {
            AgentKind::Triage => "triage_agent",
            AgentKind::Flow => "flow_agent",
            AgentKind::Interview => "interview_agent",
            AgentKind::Answer => "answer_agent",
            AgentKind::Confirmation => "confirmation_agent",
            AgentKind::Knowledge => "knowledge_agent",
            AgentKind::Usage => "usage_agent",
        }
    }

    /// Short name accepted on the command line
    pub fn cli_name(&self) -> &'static str {
        match self {
            AgentKind::Triage => "triage",
            AgentKind::Flow => "flow",
            AgentKind::Interview => "interview",
            AgentKind::Answer => "answer",
            AgentKind::Confirmation => "confirmation",
            AgentKind::Knowledge => "knowledge",
            AgentKind::Usage => "usage",
        }
    }

    pub fn handoff_description(&self) -> &'static str {
        match self {
            AgentKind::Triage => "A triage agent that can delegate a customer's request to the appropriate agent.",
            AgentKind::Flow => "Um agente de fluxo que identifica o tópico do usuário. Se o tópico já estiver claro, segue direto para o interview_agent; caso contrário, apresenta a lista de tópicos.",
            AgentKind::Interview => "Um agente de entrevista que pode entrevistar o usuário para obter informações relevantes.",
            AgentKind::Answer => "Um agente que formula a resposta final para o usuário com as informações coletadas.",
            AgentKind::Confirmation => "Um agente de confirmação que pode confirmar a solicitação do usuário.",
            AgentKind::Knowledge => "Um agente de conhecimento que pode responder a perguntas do usuário.",
            AgentKind::Usage => "A usage agent that can answer questions about the usage of the system.",
        }
    }

    /// Allowed handoff targets. Fixed; nothing changes it at runtime.
    pub fn handoffs(&self) -> &'static [AgentKind] {
        match self {
            AgentKind::Triage => &[
                AgentKind::Flow,
                AgentKind::Confirmation,
                AgentKind::Knowledge,
                AgentKind::Usage,
            ],
            AgentKind::Flow => &[AgentKind::Interview, AgentKind::Triage],
            AgentKind::Confirmation | AgentKind::Knowledge | AgentKind::Usage => {
                &[AgentKind::Triage]
            }
            AgentKind::Interview => &[AgentKind::Answer],
            AgentKind::Answer => &[AgentKind::Interview],
        }
    }

    pub fn can_handoff_to(&self, target: AgentKind) -> bool {
        self.handoffs().contains(&target)
    }

    /// Function name the model calls to transfer to this agent
    pub fn transfer_tool_name(&self) -> String {
        format!("transfer_to_{}", self.key())
    }

    /// Inverse of `transfer_tool_name`
    pub fn from_transfer_tool(name: &str) -> Option<AgentKind> {
        let key = name.strip_prefix("transfer_to_")?;
        Self::from_key(key)
    }

    pub fn from_key(key: &str) -> Option<AgentKind> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }

    /// Resolve a CLI name, config key or display name
    pub fn parse(name: &str) -> Result<AgentKind> {
        let needle = name.trim();
        Self::ALL
            .into_iter()
            .find(|k| {
                k.cli_name().eq_ignore_ascii_case(needle)
                    || k.key().eq_ignore_ascii_case(needle)
                    || k.display_name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| AtendenteError::UnknownAgent(name.to_string()))
    }
}

impl Default for AgentKind {
    fn default() -> Self {
        AgentKind::Triage
    }
}

impl Serialize for AgentKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.display_name())
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
