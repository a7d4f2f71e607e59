//! `guardrails_config.yaml`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::templates::{load_yaml, triage::DEFAULT_TRIAGE_ABOUT, TopicId};

pub const GUARDRAILS_FILE: &str = "guardrails_config.yaml";

/// Standard template location, searched after the configured directory
pub const STANDARD_TEMPLATE_DIR: &str = "templates/standard";

/// What an agent is for, as told to the evaluator
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentScope {
    #[serde(default)]
    pub about: String,
}

/// Topic with its codes and the words that place a code in context
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GuardrailTopic {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub codes: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailConfig {
    /// Agent config key to scope; agents absent here are not evaluated
    #[serde(default)]
    pub agent_scopes: BTreeMap<String, AgentScope>,
    #[serde(default)]
    pub topics: BTreeMap<TopicId, GuardrailTopic>,
    #[serde(default)]
    pub on_topic_keywords: Vec<String>,
    #[serde(default)]
    pub sensitive_words: Vec<String>,
    /// Agents that carry the keyword guardrail
    #[serde(default = "default_keyword_agents")]
    pub keyword_agents: Vec<String>,
}

fn default_keyword_agents() -> Vec<String> {
    vec!["confirmation_agent".to_string()]
}

impl Default for GuardrailConfig {
    /// Built-in scope used when no file is found
    fn default() -> Self {
        let mut agent_scopes = BTreeMap::new();
        agent_scopes.insert(
            "triage_agent".to_string(),
            AgentScope {
                about: DEFAULT_TRIAGE_ABOUT.to_string(),
            },
        );
        Self {
            agent_scopes,
            topics: BTreeMap::new(),
            on_topic_keywords: Vec::new(),
            sensitive_words: Vec::new(),
            keyword_agents: default_keyword_agents(),
        }
    }
}

impl GuardrailConfig {
    /// Candidate paths in priority order
    pub fn search_paths(template_dir: &Path) -> Vec<PathBuf> {
        vec![
            template_dir.join(GUARDRAILS_FILE),
            Path::new(STANDARD_TEMPLATE_DIR).join(GUARDRAILS_FILE),
            PathBuf::from(GUARDRAILS_FILE),
        ]
    }

    /// First existing file wins; none found gives the built-in default
    pub fn find(template_dir: &Path) -> Result<Self> {
        match Self::search_paths(template_dir).into_iter().find(|p| p.exists()) {
            Some(path) => Self::load(&path),
            None => {
                tracing::warn!("no {} found, using default guardrail scope", GUARDRAILS_FILE);
                Ok(Self::default())
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = load_yaml(path)?;
        tracing::debug!(
            scopes = config.agent_scopes.len(),
            topics = config.topics.len(),
            "guardrail config loaded from {}",
            path.display()
        );
        Ok(config)
    }

    pub fn scope_for(&self, agent_key: &str) -> Option<&AgentScope> {
        self.agent_scopes.get(agent_key)
    }

    /// Whether any keyword list is configured
    pub fn has_keyword_rules(&self) -> bool {
        !self.topics.is_empty() || !self.on_topic_keywords.is_empty() || !self.sensitive_words.is_empty()
    }

    pub fn wants_keyword_guardrail(&self, agent_key: &str) -> bool {
        self.has_keyword_rules() && self.keyword_agents.iter().any(|a| a == agent_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scopes_triage_only() {
        let config = GuardrailConfig::default();
        assert!(config.scope_for("triage_agent").is_some());
        assert!(config.scope_for("flow_agent").is_none());
        assert!(!config.has_keyword_rules());
    }

    #[test]
    fn test_template_dir_has_priority() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(GUARDRAILS_FILE),
            "agent_scopes:\n  confirmation_agent:\n    about: Confirma códigos IVA\n",
        )
        .unwrap();

        let config = GuardrailConfig::find(dir.path()).unwrap();
        assert_eq!(
            config.scope_for("confirmation_agent").unwrap().about,
            "Confirma códigos IVA"
        );
        assert_eq!(config.keyword_agents, vec!["confirmation_agent".to_string()]);
    }

    #[test]
    fn test_search_order() {
        let paths = GuardrailConfig::search_paths(Path::new("/clientes/acme"));
        assert_eq!(paths[0], PathBuf::from("/clientes/acme/guardrails_config.yaml"));
        assert_eq!(paths[1], PathBuf::from("templates/standard/guardrails_config.yaml"));
        assert_eq!(paths[2], PathBuf::from("guardrails_config.yaml"));
    }

    #[test]
    fn test_keyword_guardrail_attachment() {
        let config: GuardrailConfig =
            serde_yaml::from_str("sensitive_words: [senha]\nkeyword_agents: [answer_agent]\n").unwrap();
        assert!(config.wants_keyword_guardrail("answer_agent"));
        assert!(!config.wants_keyword_guardrail("confirmation_agent"));
    }
}
