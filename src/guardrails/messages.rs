//! Client-specific replies shown when a guardrail blocks a message
//!
//! Loaded from `guardrail_messages.yaml`, with built-in Portuguese defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::config::STANDARD_TEMPLATE_DIR;
use crate::errors::Result;
use crate::templates::load_yaml;

pub const MESSAGES_FILE: &str = "guardrail_messages.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    OutOfScope,
    ErrorFallback,
}

impl MessageKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "out_of_scope" => Some(MessageKind::OutOfScope),
            "error_fallback" => Some(MessageKind::ErrorFallback),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageText {
    pub title: String,
    pub message: String,
    pub short_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageTable {
    #[serde(default = "default_out_of_scope")]
    pub out_of_scope: MessageText,
    #[serde(default = "default_error_fallback")]
    pub error_fallback: MessageText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSettings {
    #[serde(default = "default_true")]
    pub show_detailed_message: bool,
    #[serde(default = "default_true")]
    pub include_suggestions: bool,
    #[serde(default = "default_true")]
    pub add_to_conversation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailMessages {
    #[serde(default)]
    pub guardrail_messages: MessageTable,
    #[serde(default)]
    pub settings: MessageSettings,
}

fn default_true() -> bool {
    true
}

fn default_out_of_scope() -> MessageText {
    MessageText {
        title: "🚫 Pergunta fora do escopo".to_string(),
        message: "Desculpe, só posso ajudar com questões relacionadas aos nossos serviços.".to_string(),
        short_message: "Pergunta fora do escopo.".to_string(),
    }
}

fn default_error_fallback() -> MessageText {
    MessageText {
        title: "⚠️ Erro no sistema".to_string(),
        message: "Erro técnico. Tente novamente.".to_string(),
        short_message: "Erro técnico.".to_string(),
    }
}

impl Default for MessageTable {
    fn default() -> Self {
        Self {
            out_of_scope: default_out_of_scope(),
            error_fallback: default_error_fallback(),
        }
    }
}

impl Default for MessageSettings {
    fn default() -> Self {
        Self {
            show_detailed_message: true,
            include_suggestions: true,
            add_to_conversation: true,
        }
    }
}

impl Default for GuardrailMessages {
    fn default() -> Self {
        Self {
            guardrail_messages: MessageTable::default(),
            settings: MessageSettings::default(),
        }
    }
}

impl GuardrailMessages {
    pub fn search_paths(template_dir: &Path) -> Vec<PathBuf> {
        vec![
            template_dir.join(MESSAGES_FILE),
            Path::new(STANDARD_TEMPLATE_DIR).join(MESSAGES_FILE),
            PathBuf::from(MESSAGES_FILE),
        ]
    }

    pub fn find(template_dir: &Path) -> Result<Self> {
        match Self::search_paths(template_dir).into_iter().find(|p| p.exists()) {
            Some(path) => load_yaml(&path),
            None => Ok(Self::default()),
        }
    }

    fn text(&self, kind: MessageKind) -> &MessageText {
        match kind {
            MessageKind::OutOfScope => &self.guardrail_messages.out_of_scope,
            MessageKind::ErrorFallback => &self.guardrail_messages.error_fallback,
        }
    }

    /// Long or short text; `None` follows `settings.show_detailed_message`
    pub fn message(&self, kind: MessageKind, detailed: Option<bool>) -> &str {
        let detailed = detailed.unwrap_or(self.settings.show_detailed_message);
        let text = self.text(kind);
        if detailed {
            &text.message
        } else {
            &text.short_message
        }
    }

    pub fn out_of_scope(&self, detailed: Option<bool>) -> &str {
        self.message(MessageKind::OutOfScope, detailed)
    }

    pub fn error_fallback(&self, detailed: Option<bool>) -> &str {
        self.message(MessageKind::ErrorFallback, detailed)
    }

    pub fn title(&self, kind: MessageKind) -> &str {
        &self.text(kind).title
    }

    /// Lookup by YAML key name
    pub fn by_name(&self, name: &str, detailed: Option<bool>) -> &str {
        match MessageKind::parse(name) {
            Some(kind) => self.message(kind, detailed),
            None => "Mensagem não encontrada.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let messages = GuardrailMessages::default();
        assert_eq!(
            messages.out_of_scope(None),
            "Desculpe, só posso ajudar com questões relacionadas aos nossos serviços."
        );
        assert_eq!(messages.out_of_scope(Some(false)), "Pergunta fora do escopo.");
        assert_eq!(messages.error_fallback(Some(true)), "Erro técnico. Tente novamente.");
        assert_eq!(messages.error_fallback(Some(false)), "Erro técnico.");
        assert_eq!(messages.title(MessageKind::OutOfScope), "🚫 Pergunta fora do escopo");
    }

    #[test]
    fn test_setting_controls_default_detail() {
        let messages: GuardrailMessages =
            serde_yaml::from_str("settings:\n  show_detailed_message: false\n").unwrap();
        assert_eq!(messages.out_of_scope(None), "Pergunta fora do escopo.");
    }

    #[test]
    fn test_custom_file_overrides_one_kind() {
        let messages: GuardrailMessages = serde_yaml::from_str(
            r#"
guardrail_messages:
  out_of_scope:
    title: "Fora"
    message: "Só atendo dúvidas fiscais."
    short_message: "Fora do escopo fiscal."
"#,
        )
        .unwrap();
        assert_eq!(messages.out_of_scope(Some(true)), "Só atendo dúvidas fiscais.");
        assert_eq!(messages.error_fallback(Some(false)), "Erro técnico.");
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(
            GuardrailMessages::default().by_name("rate_limit", None),
            "Mensagem não encontrada."
        );
    }

    #[test]
    fn test_find_in_template_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(MESSAGES_FILE),
            "settings:\n  show_detailed_message: false\n",
        )
        .unwrap();
        let messages = GuardrailMessages::find(dir.path()).unwrap();
        assert!(!messages.settings.show_detailed_message);
    }
}
