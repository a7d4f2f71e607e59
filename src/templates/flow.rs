//! Flow template: the topic menu and routing keywords

use serde::{Deserialize, Serialize};

use super::answer::TopicId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowTopic {
    pub id: TopicId,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowKeyword {
    pub terms: Vec<String>,
    pub topic: TopicId,
}

/// `flow_config.yaml`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowConfig {
    #[serde(default)]
    pub topics: Vec<FlowTopic>,
    #[serde(default)]
    pub keywords: Vec<FlowKeyword>,
}

impl FlowConfig {
    /// Every topic id referenced by the file
    pub fn topic_ids(&self) -> impl Iterator<Item = &TopicId> {
        self.topics
            .iter()
            .map(|t| &t.id)
            .chain(self.keywords.iter().map(|k| &k.topic))
    }

    pub fn label_for(&self, topic: &TopicId) -> Option<&str> {
        self.topics
            .iter()
            .find(|t| &t.id == topic)
            .map(|t| t.label.as_str())
    }

    /// Numbered topic menu: `1. label`
    pub fn render_topics(&self) -> String {
        self.topics
            .iter()
            .enumerate()
            .map(|(i, topic)| format!("{}. {}", i + 1, topic.label))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// One line per topic with keywords: `- label: "t1", "t2"`
    pub fn render_keywords(&self) -> String {
        self.topics
            .iter()
            .filter_map(|topic| {
                let terms: Vec<String> = self
                    .keywords
                    .iter()
                    .filter(|k| k.topic == topic.id)
                    .flat_map(|k| k.terms.iter())
                    .map(|term| format!("\"{}\"", term))
                    .collect();
                if terms.is_empty() {
                    None
                } else {
                    Some(format!("- {}: {}", topic.label, terms.join(", ")))
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
