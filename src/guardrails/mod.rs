//! Input guardrails
//!
//! Checks that run on the user's message before an agent acts on it:
//! - `ScopeGuardrail`: asks a model whether the message fits the agent's scope
//! - `KeywordGuardrail`: sensitive words, on-topic keywords and code/topic consistency
//!
//! Guardrails never fail the run. Internal errors let the message through.

pub mod config;
pub mod integration;
pub mod keywords;
pub mod messages;
pub mod scope;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::agent::AgentKind;

pub use config::{AgentScope, GuardrailConfig, GuardrailTopic, GUARDRAILS_FILE};
pub use integration::GuardrailIntegration;
pub use keywords::{KeywordCheck, KeywordGuardrail};
pub use messages::{GuardrailMessages, MessageKind};
pub use scope::{GuardrailSystem, ScopeGuardrail};

/// Action the evaluator recommends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestedAction {
    Continue,
    Redirect,
    Refuse,
    #[serde(other)]
    Unknown,
}

impl SuggestedAction {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "continue" => SuggestedAction::Continue,
            "redirect" => SuggestedAction::Redirect,
            "refuse" => SuggestedAction::Refuse,
            _ => SuggestedAction::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestedAction::Continue => "continue",
            SuggestedAction::Redirect => "redirect",
            SuggestedAction::Refuse => "refuse",
            SuggestedAction::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a scope evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailOutput {
    pub reasoning: String,
    pub is_in_scope: bool,
    pub confidence: f64,
    pub suggested_action: SuggestedAction,
}

impl GuardrailOutput {
    /// Let the message through without an opinion
    pub fn allow(reasoning: impl Into<String>) -> Self {
        Self {
            reasoning: reasoning.into(),
            is_in_scope: true,
            confidence: 0.0,
            suggested_action: SuggestedAction::Continue,
        }
    }

    /// Block the message with full confidence
    pub fn block(reasoning: impl Into<String>) -> Self {
        Self {
            reasoning: reasoning.into(),
            is_in_scope: false,
            confidence: 1.0,
            suggested_action: SuggestedAction::Refuse,
        }
    }
}

/// One guardrail's decision on one message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuardrailVerdict {
    pub guardrail: String,
    pub tripwire_triggered: bool,
    pub output: GuardrailOutput,
}

/// Check attached to an agent, run before its first model call
#[async_trait]
pub trait InputGuardrail: Send + Sync {
    fn name(&self) -> &str;

    async fn check(&self, agent: AgentKind, message: &str) -> GuardrailVerdict;
}
