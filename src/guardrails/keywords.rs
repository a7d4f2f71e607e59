//! Keyword and code guardrail
//!
//! Rules, in order:
//! 1. a sensitive word anywhere in the message blocks it
//! 2. when on-topic keywords are configured, at least one must appear
//! 3. every code-like token must belong to a topic, and the message must
//!    mention one of that topic's keywords

use async_trait::async_trait;
use regex::Regex;
use std::collections::BTreeMap;

use super::config::{GuardrailConfig, GuardrailTopic};
use super::{GuardrailOutput, GuardrailVerdict, InputGuardrail};
use crate::agent::AgentKind;
use crate::errors::{AtendenteError, Result};
use crate::templates::TopicId;

/// Code-like tokens: `E1`, `FA`, `ABC`, `42`
const CODE_PATTERN: &str = r"\b([A-Z]\d|[A-Z]{2,3}|\d{2,3})\b";

/// Uppercase words that match the code pattern but are not codes
const COMMON_WORDS: &[&str] = &[
    "QUAL", "PARA", "COM", "SEM", "DOS", "DAS", "DO", "DA", "DE", "EM", "NA", "NO", "IVA", "CODIGO",
];

/// Outcome of the keyword rules
#[derive(Debug, Clone, PartialEq)]
pub enum KeywordCheck {
    Allowed,
    Sensitive { word: String },
    OffTopic,
    UnknownCode { code: String },
    CodeContextMismatch { code: String, topic_description: String },
}

impl KeywordCheck {
    pub fn is_allowed(&self) -> bool {
        matches!(self, KeywordCheck::Allowed)
    }

    /// Message shown when the check blocks
    pub fn message(&self) -> String {
        match self {
            KeywordCheck::Allowed => "Conteúdo validado".to_string(),
            KeywordCheck::Sensitive { word } => format!(
                "🚨 Conteúdo sensível detectado: '{}'. Sua consulta foi bloqueada.",
                word
            ),
            KeywordCheck::OffTopic => "🚨 Consulta fora do escopo: não foi identificado nenhum tópico relacionado aos serviços da empresa".to_string(),
            KeywordCheck::UnknownCode { code } => {
                format!("🚨 Código IVA '{}' não encontrado em nenhum tópico válido", code)
            }
            KeywordCheck::CodeContextMismatch {
                code,
                topic_description,
            } => format!(
                "🚨 Código IVA '{}' não corresponde ao contexto da pergunta. Este código é para: {}",
                code, topic_description
            ),
        }
    }
}

/// Deterministic guardrail over configured word lists
#[derive(Debug, Clone)]
pub struct KeywordGuardrail {
    topics: BTreeMap<TopicId, GuardrailTopic>,
    on_topic_keywords: Vec<String>,
    /// Lowercased match key and the configured spelling
    sensitive_words: Vec<(String, String)>,
    code_pattern: Regex,
}

impl KeywordGuardrail {
    pub fn new(
        topics: BTreeMap<TopicId, GuardrailTopic>,
        on_topic_keywords: Vec<String>,
        sensitive_words: Vec<String>,
    ) -> Result<Self> {
        let code_pattern = Regex::new(CODE_PATTERN)
            .map_err(|e| AtendenteError::ConfigError(format!("invalid code pattern: {}", e)))?;
        Ok(Self {
            topics,
            on_topic_keywords: lowercase_all(on_topic_keywords),
            sensitive_words: sensitive_words
                .into_iter()
                .map(|word| (word.to_lowercase(), word))
                .collect(),
            code_pattern,
        })
    }

    pub fn from_config(config: &GuardrailConfig) -> Result<Self> {
        Self::new(
            config.topics.clone(),
            config.on_topic_keywords.clone(),
            config.sensitive_words.clone(),
        )
    }

    /// Code-like tokens in `text`, common words removed
    pub fn extract_codes(&self, text: &str) -> Vec<String> {
        self.code_pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_uppercase())
            .filter(|code| !COMMON_WORDS.contains(&code.as_str()))
            .collect()
    }

    pub fn evaluate(&self, message: &str) -> KeywordCheck {
        let lower = message.to_lowercase();

        if let Some((_, word)) = self.sensitive_words.iter().find(|(key, _)| lower.contains(key.as_str())) {
            return KeywordCheck::Sensitive { word: word.clone() };
        }

        if !self.on_topic_keywords.is_empty()
            && !self.on_topic_keywords.iter().any(|k| lower.contains(k.as_str()))
        {
            return KeywordCheck::OffTopic;
        }

        if self.topics.is_empty() {
            return KeywordCheck::Allowed;
        }

        for code in self.extract_codes(message) {
            let Some(topic) = self.topics.values().find(|t| t.codes.contains(&code)) else {
                return KeywordCheck::UnknownCode { code };
            };

            let in_context = topic
                .keywords
                .iter()
                .any(|k| lower.contains(&k.to_lowercase()));
            if !in_context {
                return KeywordCheck::CodeContextMismatch {
                    code,
                    topic_description: topic.description.clone(),
                };
            }
        }

        KeywordCheck::Allowed
    }
}

fn lowercase_all(words: Vec<String>) -> Vec<String> {
    words.into_iter().map(|w| w.to_lowercase()).collect()
}

#[async_trait]
impl InputGuardrail for KeywordGuardrail {
    fn name(&self) -> &str {
        "keywords"
    }

    async fn check(&self, agent: AgentKind, message: &str) -> GuardrailVerdict {
        let result = self.evaluate(message);
        let output = if result.is_allowed() {
            GuardrailOutput {
                confidence: 1.0,
                ..GuardrailOutput::allow(result.message())
            }
        } else {
            tracing::info!(agent = agent.key(), "keyword guardrail blocked message: {:?}", result);
            GuardrailOutput::block(result.message())
        };

        GuardrailVerdict {
            guardrail: self.name().to_string(),
            tripwire_triggered: !result.is_allowed(),
            output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(description: &str, codes: &[&str], keywords: &[&str]) -> GuardrailTopic {
        GuardrailTopic {
            description: description.to_string(),
            codes: codes.iter().map(|s| s.to_string()).collect(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn guardrail() -> KeywordGuardrail {
        let mut topics = BTreeMap::new();
        topics.insert(
            TopicId::from("compra_industrializacao"),
            topic(
                "Compra para industrialização",
                &["I0", "ID", "IE", "I8"],
                &["industrialização", "industrial", "produção"],
            ),
        );
        topics.insert(
            TopicId::from("aquisicao_energia_eletrica"),
            topic("Aquisição de energia elétrica", &["E1", "E2"], &["energia", "elétrica"]),
        );
        topics.insert(
            TopicId::from("aquisicao_frete"),
            topic("Aquisição de frete", &["F0", "FA"], &["frete", "transporte"]),
        );

        KeywordGuardrail::new(
            topics,
            ["iva", "código", "frete", "energia", "industrialização", "compra"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ["senha", "Fraude"].iter().map(|s| s.to_string()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_code_in_context() {
        assert_eq!(
            guardrail().evaluate("Qual o código IVA E1 para energia elétrica?"),
            KeywordCheck::Allowed
        );
    }

    #[test]
    fn test_code_for_wrong_topic() {
        let check = guardrail().evaluate("Qual o código IVA E1 para industrialização?");
        assert_eq!(
            check,
            KeywordCheck::CodeContextMismatch {
                code: "E1".to_string(),
                topic_description: "Aquisição de energia elétrica".to_string(),
            }
        );
        assert!(check.message().contains("Este código é para: Aquisição de energia elétrica"));
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(
            guardrail().evaluate("O código Z9 serve para frete?"),
            KeywordCheck::UnknownCode {
                code: "Z9".to_string()
            }
        );
    }

    #[test]
    fn test_sensitive_word_case_insensitive() {
        assert_eq!(
            guardrail().evaluate("Como cometer FRAUDE na compra?"),
            KeywordCheck::Sensitive {
                word: "Fraude".to_string()
            }
        );
    }

    #[test]
    fn test_sensitive_word_reported_as_configured() {
        let check = guardrail().evaluate("qual a senha do sistema?");
        assert_eq!(
            check,
            KeywordCheck::Sensitive {
                word: "senha".to_string()
            }
        );
        assert!(guardrail()
            .evaluate("houve fraude no frete?")
            .message()
            .contains("'Fraude'"));
    }

    #[test]
    fn test_off_topic() {
        assert_eq!(
            guardrail().evaluate("Qual a capital da França?"),
            KeywordCheck::OffTopic
        );
    }

    #[test]
    fn test_common_words_are_not_codes() {
        let codes = guardrail().extract_codes("QUAL CODIGO IVA DO FA PARA 123 e E1");
        assert_eq!(codes, vec!["FA", "123", "E1"]);
    }

    #[test]
    fn test_no_rules_allows_everything() {
        let open = KeywordGuardrail::new(BTreeMap::new(), vec![], vec![]).unwrap();
        assert!(open.evaluate("qualquer coisa XYZ").is_allowed());
    }

    #[tokio::test]
    async fn test_verdict_blocks() {
        let verdict = guardrail().check(AgentKind::Confirmation, "minha senha é 123").await;
        assert!(verdict.tripwire_triggered);
        assert!(!verdict.output.is_in_scope);
        assert_eq!(verdict.guardrail, "keywords");
    }
}
