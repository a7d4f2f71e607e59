//! Client templates
//!
//! Each agent's client-specific content lives in a YAML file under the
//! template directory. `TemplateSet::load` reads all of them once and checks
//! that the flow topics agree with the answer topics.

pub mod answer;
pub mod flow;
pub mod interview;
pub mod reference;
pub mod triage;

use serde::de::DeserializeOwned;
use std::path::Path;

use crate::errors::{AtendenteError, Result};

pub use answer::{AnswerConfig, TopicConfig, TopicId};
pub use flow::{FlowConfig, FlowKeyword, FlowTopic};
pub use interview::InterviewConfig;
pub use reference::{ConfirmationConfig, KnowledgeConfig, ReferenceConfig};
pub use triage::{RoutingRule, TriageConfig};

pub const FLOW_FILE: &str = "flow_config.yaml";
pub const INTERVIEW_FILE: &str = "interview_config.yaml";
pub const ANSWER_FILE: &str = "answer_config.yaml";
pub const CONFIRMATION_FILE: &str = "confirmation_config.yaml";
pub const KNOWLEDGE_FILE: &str = "knowledge_config.yaml";
pub const TRIAGE_FILE: &str = "triage_config.yaml";

/// Parse a YAML file, tagging errors with the path
pub fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path).map_err(|e| AtendenteError::TemplateError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    serde_yaml::from_str(&contents).map_err(|e| AtendenteError::TemplateError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Every template the agents need
#[derive(Debug, Clone)]
pub struct TemplateSet {
    pub flow: FlowConfig,
    pub interview: InterviewConfig,
    pub answer: AnswerConfig,
    pub confirmation: ConfirmationConfig,
    pub knowledge: KnowledgeConfig,
    pub triage: TriageConfig,
}

impl TemplateSet {
    /// Load from a template directory. `triage_config.yaml` is optional.
    pub fn load(dir: &Path) -> Result<Self> {
        let triage_path = dir.join(TRIAGE_FILE);
        let triage = if triage_path.exists() {
            load_yaml(&triage_path)?
        } else {
            tracing::debug!("{} not found, using default triage scope", triage_path.display());
            TriageConfig::default()
        };

        let set = Self {
            flow: load_yaml(&dir.join(FLOW_FILE))?,
            interview: load_yaml(&dir.join(INTERVIEW_FILE))?,
            answer: load_yaml(&dir.join(ANSWER_FILE))?,
            confirmation: load_yaml(&dir.join(CONFIRMATION_FILE))?,
            knowledge: load_yaml(&dir.join(KNOWLEDGE_FILE))?,
            triage,
        };

        set.validate(dir)?;
        tracing::info!(
            topics = set.answer.topics.len(),
            "templates loaded from {}",
            dir.display()
        );
        Ok(set)
    }

    /// Flow topics and keyword topics must be answer topics
    pub fn validate(&self, dir: &Path) -> Result<()> {
        let unknown = self
            .flow
            .topic_ids()
            .find(|id| !self.answer.topics.contains_key(*id));

        match unknown {
            Some(id) => Err(AtendenteError::TemplateError {
                path: dir.join(FLOW_FILE).display().to_string(),
                reason: format!("topic '{}' is not defined in {}", id, ANSWER_FILE),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_yaml_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "topics: [").unwrap();

        let err = load_yaml::<FlowConfig>(&path).unwrap_err();
        match err {
            AtendenteError::TemplateError { path: p, .. } => assert!(p.ends_with("broken.yaml")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_template_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TemplateSet::load(dir.path()).unwrap_err();
        assert!(matches!(err, AtendenteError::TemplateError { .. }));
    }
}
