//! Triage template: scope text and routing rules

use serde::{Deserialize, Serialize};

/// Scope used when no triage template is present
pub const DEFAULT_TRIAGE_ABOUT: &str = "O Triage Agent é responsável por rotear conversas para os agentes especializados. \
Ele deve identificar se a pergunta do usuário se encaixa nos tópicos disponíveis no sistema. \
Não deve responder sobre matemática, lição de casa, trabalho escolar, programação ou jogos.";

/// When to hand a conversation to `agent`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingRule {
    /// Agent config key, e.g. `flow_agent`
    pub agent: String,
    pub when: String,
}

/// `triage_config.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageConfig {
    #[serde(default = "default_about")]
    pub about: String,
    #[serde(default = "default_routing")]
    pub routing: Vec<RoutingRule>,
}

fn default_about() -> String {
    DEFAULT_TRIAGE_ABOUT.to_string()
}

fn default_routing() -> Vec<RoutingRule> {
    [
        ("flow_agent", "o usuário precisa identificar um tópico ou código para sua situação"),
        ("confirmation_agent", "o usuário quer confirmar se um código ou informação está correto"),
        ("knowledge_agent", "o usuário pergunta sobre o conteúdo dos documentos de referência"),
        ("usage_agent", "o usuário pergunta como usar este sistema"),
    ]
    .into_iter()
    .map(|(agent, when)| RoutingRule {
        agent: agent.to_string(),
        when: when.to_string(),
    })
    .collect()
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            about: default_about(),
            routing: default_routing(),
        }
    }
}

impl TriageConfig {
    /// `- agent: when` lines
    pub fn render_routes(&self) -> String {
        self.routing
            .iter()
            .map(|rule| format!("- {}: {}", rule.agent, rule.when))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_triage_target() {
        let config = TriageConfig::default();
        let agents: Vec<&str> = config.routing.iter().map(|r| r.agent.as_str()).collect();
        assert_eq!(
            agents,
            vec!["flow_agent", "confirmation_agent", "knowledge_agent", "usage_agent"]
        );
    }

    #[test]
    fn test_partial_file_keeps_default_routes() {
        let config: TriageConfig = serde_yaml::from_str("about: Atendimento fiscal").unwrap();
        assert_eq!(config.about, "Atendimento fiscal");
        assert_eq!(config.routing.len(), 4);
        assert!(config.render_routes().starts_with("- flow_agent: "));
    }
}
