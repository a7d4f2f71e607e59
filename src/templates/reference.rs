//! Reference templates shared by the confirmation and knowledge agents
//!
//! Both files carry the same three fields: the scope (`about`), the answer
//! format and a reference table.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReferenceConfig {
    pub about: String,
    pub format: String,
    pub template: String,
}

/// `confirmation_config.yaml`
pub type ConfirmationConfig = ReferenceConfig;

/// `knowledge_config.yaml`
pub type KnowledgeConfig = ReferenceConfig;
