//! Answer template: topics and their allowed codes

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Client-configurable topic identifier (e.g. `aquisicao_frete`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(String);

impl TopicId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TopicId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicConfig {
    pub description: String,
    #[serde(default)]
    pub codes: Vec<String>,
}

/// `answer_config.yaml`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnswerConfig {
    #[serde(default)]
    pub topics: BTreeMap<TopicId, TopicConfig>,
    #[serde(default)]
    pub answer_template: String,
}

impl AnswerConfig {
    pub fn allowed_codes(&self, topic: &TopicId) -> Option<&[String]> {
        self.topics.get(topic).map(|t| t.codes.as_slice())
    }

    pub fn is_allowed(&self, topic: &TopicId, code: &str) -> bool {
        self.allowed_codes(topic)
            .map(|codes| codes.iter().any(|c| c == code))
            .unwrap_or(false)
    }

    /// First topic that lists `code`
    pub fn topic_for_code(&self, code: &str) -> Option<(&TopicId, &TopicConfig)> {
        self.topics
            .iter()
            .find(|(_, config)| config.codes.iter().any(|c| c == code))
    }
}
