//! The assembled agent network
//!
//! Built once from the templates. Handoff edges come from the static table
//! in `AgentKind::handoffs`; nothing mutates the network afterwards.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::agent::definition::Agent;
use crate::agent::kind::AgentKind;
use crate::agent::outputs::OutputSchema;
use crate::errors::{AtendenteError, Result};
use crate::guardrails::{GuardrailConfig, GuardrailSystem, InputGuardrail, KeywordGuardrail, ScopeGuardrail};
use crate::prompts;
use crate::templates::{AnswerConfig, TemplateSet};
use crate::tools::{FunctionTool, ToolRegistry};

/// Everything besides templates that goes into the network
pub struct NetworkOptions {
    pub model: String,
    pub structured_outputs: bool,
    pub guardrail_config: GuardrailConfig,
    /// Scope evaluator; `None` disables the scope guardrail
    pub guardrail_system: Option<Arc<GuardrailSystem>>,
    /// `go_to_rag`, owned by the knowledge agent
    pub knowledge_tool: Option<Arc<dyn FunctionTool>>,
}

impl NetworkOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            structured_outputs: false,
            guardrail_config: GuardrailConfig::default(),
            guardrail_system: None,
            knowledge_tool: None,
        }
    }
}

pub struct AgentNetwork {
    agents: BTreeMap<AgentKind, Agent>,
    answers: AnswerConfig,
    structured_outputs: bool,
}

impl AgentNetwork {
    pub fn build(templates: &TemplateSet, options: NetworkOptions) -> Result<Self> {
        let keyword_guardrail: Option<Arc<dyn InputGuardrail>> =
            if options.guardrail_config.has_keyword_rules() {
                Some(Arc::new(KeywordGuardrail::from_config(&options.guardrail_config)?))
            } else {
                None
            };
        let scope_guardrail: Option<Arc<dyn InputGuardrail>> = options
            .guardrail_system
            .as_ref()
            .map(|system| Arc::new(ScopeGuardrail::new(system.clone())) as Arc<dyn InputGuardrail>);

        let mut agents = BTreeMap::new();
        for kind in AgentKind::ALL {
            let mut agent = Agent::new(kind, prompts::instructions_for(kind, templates), &options.model);

            if let Some(guardrail) = &scope_guardrail {
                if options.guardrail_config.scope_for(kind.key()).is_some() {
                    agent = agent.with_guardrail(guardrail.clone());
                }
            }
            if let Some(guardrail) = &keyword_guardrail {
                if options.guardrail_config.wants_keyword_guardrail(kind.key()) {
                    agent = agent.with_guardrail(guardrail.clone());
                }
            }

            if kind == AgentKind::Knowledge {
                if let Some(tool) = &options.knowledge_tool {
                    let mut tools = ToolRegistry::new();
                    tools.register(tool.clone());
                    agent = agent.with_tools(tools);
                }
            }

            if options.structured_outputs {
                agent = match kind {
                    AgentKind::Flow => agent.with_output_schema(OutputSchema::Flow),
                    AgentKind::Interview => agent.with_output_schema(OutputSchema::Interview),
                    AgentKind::Answer => agent.with_output_schema(OutputSchema::Answer),
                    _ => agent,
                };
            }

            tracing::debug!(
                agent = kind.key(),
                guardrails = ?agent.guardrail_names(),
                tools = ?agent.tools.names(),
                "agent configured"
            );
            agents.insert(kind, agent);
        }

        Ok(Self {
            agents,
            answers: templates.answer.clone(),
            structured_outputs: options.structured_outputs,
        })
    }

    pub fn get(&self, kind: AgentKind) -> Result<&Agent> {
        self.agents
            .get(&kind)
            .ok_or_else(|| AtendenteError::UnknownAgent(kind.key().to_string()))
    }

    /// Lookup by CLI name, config key or display name
    pub fn by_name(&self, name: &str) -> Result<&Agent> {
        self.get(AgentKind::parse(name)?)
    }

    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    pub fn answers(&self) -> &AnswerConfig {
        &self.answers
    }

    pub fn structured_outputs(&self) -> bool {
        self.structured_outputs
    }
}
