//! Interview template

use serde::{Deserialize, Serialize};

/// `interview_config.yaml`: the question script as free text
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InterviewConfig {
    #[serde(default)]
    pub interview_questions: String,
}
