//! Structured agent outputs
//!
//! Flow, Interview and Answer agents may be asked for JSON output. The
//! schema is sent as `response_format` and the reply is checked here.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::errors::{AtendenteError, Result};
use crate::templates::{AnswerConfig, TopicId};

/// Flow agent result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowOutput {
    pub selected_topic: TopicId,
    /// The user's literal answer to the topic question
    pub user_answer: String,
    pub reasoning: String,
}

/// Interview agent result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewOutput {
    pub topic: TopicId,
    /// Question id (e.g. `1.1`) to the user's answer
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
}

/// Answer agent result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOutput {
    pub topic: TopicId,
    pub code: String,
}

impl AnswerOutput {
    /// Code must be one of the topic's allowed codes
    pub fn validate(&self, answers: &AnswerConfig) -> Result<()> {
        if !answers.topics.contains_key(&self.topic) {
            return Err(AtendenteError::InvalidOutput(format!(
                "unknown topic '{}'",
                self.topic
            )));
        }
        if !answers.is_allowed(&self.topic, &self.code) {
            return Err(AtendenteError::InvalidOutput(format!(
                "code '{}' is not allowed for topic '{}'",
                self.code, self.topic
            )));
        }
        Ok(())
    }
}

/// Which structured output an agent declares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSchema {
    Flow,
    Interview,
    Answer,
}

impl OutputSchema {
    pub fn name(&self) -> &'static str {
        match self {
            OutputSchema::Flow => "FlowOutput",
            OutputSchema::Interview => "InterviewOutput",
            OutputSchema::Answer => "AnswerOutput",
        }
    }

    /// JSON schema with topic ids restricted to the configured topics
    pub fn json_schema(&self, answers: &AnswerConfig) -> Value {
        let topics: Vec<&str> = answers.topics.keys().map(TopicId::as_str).collect();
        match self {
            OutputSchema::Flow => json!({
                "type": "object",
                "properties": {
                    "selected_topic": {"type": "string", "enum": topics},
                    "user_answer": {"type": "string"},
                    "reasoning": {"type": "string"}
                },
                "required": ["selected_topic", "user_answer", "reasoning"],
                "additionalProperties": false
            }),
            OutputSchema::Interview => json!({
                "type": "object",
                "properties": {
                    "topic": {"type": "string", "enum": topics},
                    "answers": {
                        "type": "object",
                        "additionalProperties": {"type": "string"}
                    }
                },
                "required": ["topic", "answers"]
            }),
            OutputSchema::Answer => json!({
                "type": "object",
                "properties": {
                    "topic": {"type": "string", "enum": topics},
                    "code": {"type": "string"}
                },
                "required": ["topic", "code"]
            }),
        }
    }

    /// Parse and check a final message, returning the normalized JSON
    pub fn validate(&self, text: &str, answers: &AnswerConfig) -> Result<Value> {
        let invalid = |e: serde_json::Error| {
            AtendenteError::InvalidOutput(format!("{}: {}", self.name(), e))
        };
        let unknown_topic = |topic: &TopicId| {
            AtendenteError::InvalidOutput(format!("{}: unknown topic '{}'", self.name(), topic))
        };

        match self {
            OutputSchema::Flow => {
                let output: FlowOutput = serde_json::from_str(text).map_err(invalid)?;
                if !answers.topics.contains_key(&output.selected_topic) {
                    return Err(unknown_topic(&output.selected_topic));
                }
                Ok(serde_json::to_value(output)?)
            }
            OutputSchema::Interview => {
                let output: InterviewOutput = serde_json::from_str(text).map_err(invalid)?;
                if !answers.topics.contains_key(&output.topic) {
                    return Err(unknown_topic(&output.topic));
                }
                Ok(serde_json::to_value(output)?)
            }
            OutputSchema::Answer => {
                let output: AnswerOutput = serde_json::from_str(text).map_err(invalid)?;
                output.validate(answers)?;
                Ok(serde_json::to_value(output)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers() -> AnswerConfig {
        serde_yaml::from_str(
            "topics:\n  aquisicao_frete:\n    description: Frete\n    codes: [F0, F1]\n",
        )
        .unwrap()
    }

    #[test]
    fn test_answer_code_must_belong_to_topic() {
        let ok = AnswerOutput {
            topic: "aquisicao_frete".into(),
            code: "F1".to_string(),
        };
        assert!(ok.validate(&answers()).is_ok());

        let wrong = AnswerOutput {
            topic: "aquisicao_frete".into(),
            code: "E1".to_string(),
        };
        assert!(matches!(
            wrong.validate(&answers()),
            Err(AtendenteError::InvalidOutput(_))
        ));
    }

    #[test]
    fn test_flow_output_rejects_extra_fields() {
        let text = r#"{"selected_topic":"aquisicao_frete","user_answer":"1","reasoning":"r","extra":1}"#;
        assert!(OutputSchema::Flow.validate(text, &answers()).is_err());
    }

    #[test]
    fn test_flow_output_unknown_topic() {
        let text = r#"{"selected_topic":"outro","user_answer":"1","reasoning":"r"}"#;
        let err = OutputSchema::Flow.validate(text, &answers()).unwrap_err();
        assert!(err.to_string().contains("outro"));
    }

    #[test]
    fn test_interview_output_defaults_answers() {
        let value = OutputSchema::Interview
            .validate(r#"{"topic":"aquisicao_frete"}"#, &answers())
            .unwrap();
        assert_eq!(value["answers"], json!({}));
    }

    #[test]
    fn test_schema_lists_configured_topics() {
        let schema = OutputSchema::Answer.json_schema(&answers());
        assert_eq!(schema["properties"]["topic"]["enum"], json!(["aquisicao_frete"]));
    }
}
