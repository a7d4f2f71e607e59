//! Model-based scope evaluation

use async_trait::async_trait;
use std::sync::Arc;

use super::config::GuardrailConfig;
use super::{GuardrailOutput, GuardrailVerdict, InputGuardrail, SuggestedAction};
use crate::agent::AgentKind;
use crate::llm::{ChatMessage, ChatModel, ChatRequest};

const EVALUATOR_SYSTEM_PROMPT: &str = "Você é um especialista em análise de contexto e escopo de conversas. \
Avalie se a mensagem do usuário está de acordo com o escopo do agente.";

const EVALUATION_TEMPERATURE: f32 = 0.1;
const EVALUATION_MAX_TOKENS: u32 = 500;

/// Asks a chat model whether messages fit an agent's configured scope
pub struct GuardrailSystem {
    config: GuardrailConfig,
    model: Arc<dyn ChatModel>,
    model_name: String,
}

impl GuardrailSystem {
    pub fn new(config: GuardrailConfig, model: Arc<dyn ChatModel>, model_name: impl Into<String>) -> Self {
        Self {
            config,
            model,
            model_name: model_name.into(),
        }
    }

    pub fn config(&self) -> &GuardrailConfig {
        &self.config
    }

    /// Evaluate `message` against the scope of `agent_key`.
    ///
    /// Unconfigured agents and evaluator failures both let the message through.
    #[tracing::instrument(name = "scope_guardrail", skip(self, message))]
    pub async fn evaluate_message(&self, message: &str, agent_key: &str) -> GuardrailOutput {
        let Some(scope) = self.config.scope_for(agent_key) else {
            return GuardrailOutput::allow("Agente não encontrado na configuração");
        };

        let request = ChatRequest::new(
            &self.model_name,
            vec![
                ChatMessage::system(EVALUATOR_SYSTEM_PROMPT),
                ChatMessage::user(build_evaluation_prompt(message, &scope.about)),
            ],
        )
        .with_temperature(EVALUATION_TEMPERATURE)
        .with_max_tokens(EVALUATION_MAX_TOKENS);

        match self.model.chat(request).await {
            Ok(response) => parse_response(response.message.text()),
            Err(e) => {
                tracing::warn!(agent = agent_key, error = %e, "guardrail evaluation failed, allowing message");
                GuardrailOutput::allow(format!("Erro na avaliação: {}", e))
            }
        }
    }
}

/// Prompt sent to the evaluator
pub fn build_evaluation_prompt(message: &str, about: &str) -> String {
    format!(
        r#"
Analise se a mensagem do usuário está de acordo com o escopo do agente.

SOBRE O AGENTE:
{about}

MENSAGEM DO USUÁRIO:
"{message}"

INSTRUÇÕES:
1. Analise se a mensagem está relacionada ao escopo do agente descrito acima
2. Considere tanto o que o agente DEVE fazer quanto o que NÃO DEVE fazer
3. Forneça uma pontuação de confiança (0.0 a 1.0)
4. Sugira uma ação: "continue", "redirect", "refuse"

FORMATO DE RESPOSTA:
RAZÃO: [explicação detalhada da análise]
ESCOPO: [true/false]
CONFIANÇA: [0.0-1.0]
AÇÃO: [continue/redirect/refuse]
"#
    )
}

/// Read the `RAZÃO` / `ESCOPO` / `CONFIANÇA` / `AÇÃO` lines.
///
/// Missing lines keep their defaults; scope is only `false` when the value
/// is something other than `true`.
pub fn parse_response(text: &str) -> GuardrailOutput {
    let mut reasoning = String::new();
    let mut is_in_scope = true;
    let mut confidence = 0.5;
    let mut suggested_action = SuggestedAction::Continue;

    for line in text.trim().lines() {
        if let Some(rest) = line.strip_prefix("RAZÃO:") {
            reasoning = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("ESCOPO:") {
            is_in_scope = rest.trim().to_lowercase() == "true";
        } else if let Some(rest) = line.strip_prefix("CONFIANÇA:") {
            confidence = rest.trim().parse::<f64>().unwrap_or(0.5);
        } else if let Some(rest) = line.strip_prefix("AÇÃO:") {
            suggested_action = SuggestedAction::parse(rest);
        }
    }

    GuardrailOutput {
        reasoning: if reasoning.is_empty() {
            "Análise realizada".to_string()
        } else {
            reasoning
        },
        is_in_scope,
        confidence,
        suggested_action,
    }
}

/// `GuardrailSystem` as an agent input guardrail
pub struct ScopeGuardrail {
    system: Arc<GuardrailSystem>,
}

impl ScopeGuardrail {
    pub fn new(system: Arc<GuardrailSystem>) -> Self {
        Self { system }
    }
}

#[async_trait]
impl InputGuardrail for ScopeGuardrail {
    fn name(&self) -> &str {
        "scope"
    }

    async fn check(&self, agent: AgentKind, message: &str) -> GuardrailVerdict {
        if message.is_empty() {
            return GuardrailVerdict {
                guardrail: self.name().to_string(),
                tripwire_triggered: false,
                output: GuardrailOutput {
                    reasoning: "Mensagem vazia".to_string(),
                    is_in_scope: true,
                    confidence: 0.0,
                    suggested_action: SuggestedAction::Continue,
                },
            };
        }

        let output = self.system.evaluate_message(message, agent.key()).await;
        tracing::debug!(
            agent = agent.key(),
            in_scope = output.is_in_scope,
            confidence = output.confidence,
            "scope evaluated"
        );

        GuardrailVerdict {
            guardrail: self.name().to_string(),
            tripwire_triggered: !output.is_in_scope,
            output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{AtendenteError, Result};
    use crate::llm::{ChatResponse, Usage};
    use std::sync::Mutex;

    struct ScriptedEvaluator {
        reply: Result<String>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedEvaluator {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(AtendenteError::ApiError {
                    status: 500,
                    body: "boom".to_string(),
                }),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedEvaluator {
        async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
            self.requests.lock().unwrap().push(request);
            match &self.reply {
                Ok(text) => Ok(ChatResponse {
                    message: ChatMessage::assistant(text.clone()),
                    usage: Usage::default(),
                }),
                Err(_) => Err(AtendenteError::ApiError {
                    status: 500,
                    body: "boom".to_string(),
                }),
            }
        }
    }

    fn system(model: Arc<ScriptedEvaluator>) -> GuardrailSystem {
        GuardrailSystem::new(GuardrailConfig::default(), model, "gpt-4o-mini")
    }

    #[test]
    fn test_parse_full_response() {
        let output = parse_response(
            "RAZÃO: Pergunta de matemática\nESCOPO: false\nCONFIANÇA: 0.92\nAÇÃO: refuse",
        );
        assert_eq!(output.reasoning, "Pergunta de matemática");
        assert!(!output.is_in_scope);
        assert_eq!(output.confidence, 0.92);
        assert_eq!(output.suggested_action, SuggestedAction::Refuse);
    }

    #[test]
    fn test_parse_defaults() {
        let output = parse_response("nada útil aqui");
        assert_eq!(output.reasoning, "Análise realizada");
        assert!(output.is_in_scope);
        assert_eq!(output.confidence, 0.5);
        assert_eq!(output.suggested_action, SuggestedAction::Continue);
    }

    #[test]
    fn test_parse_bad_confidence_and_scope_value() {
        let output = parse_response("ESCOPO: sim\nCONFIANÇA: alta");
        assert!(!output.is_in_scope);
        assert_eq!(output.confidence, 0.5);
    }

    #[test]
    fn test_parse_scope_case_insensitive() {
        assert!(parse_response("ESCOPO: TRUE").is_in_scope);
    }

    #[test]
    fn test_prompt_contains_scope_and_message() {
        let prompt = build_evaluation_prompt("Como resolver 2x + 5 = 11?", "Roteia consultas fiscais");
        assert!(prompt.contains("SOBRE O AGENTE:\nRoteia consultas fiscais"));
        assert!(prompt.contains("\"Como resolver 2x + 5 = 11?\""));
        assert!(prompt.contains("AÇÃO: [continue/redirect/refuse]"));
    }

    #[tokio::test]
    async fn test_unconfigured_agent_is_allowed_without_call() {
        let model = ScriptedEvaluator::replying("ESCOPO: false");
        let output = system(model.clone())
            .evaluate_message("qualquer coisa", "usage_agent")
            .await;
        assert!(output.is_in_scope);
        assert_eq!(output.confidence, 0.0);
        assert!(model.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_request_parameters() {
        let model = ScriptedEvaluator::replying("ESCOPO: true\nCONFIANÇA: 0.9");
        system(model.clone())
            .evaluate_message("Preciso de ajuda com meu produto", "triage_agent")
            .await;
        let requests = model.requests.lock().unwrap();
        assert_eq!(requests[0].model, "gpt-4o-mini");
        assert_eq!(requests[0].temperature, Some(0.1));
        assert_eq!(requests[0].max_tokens, Some(500));
    }

    #[tokio::test]
    async fn test_evaluator_failure_fails_open() {
        let output = system(ScriptedEvaluator::failing())
            .evaluate_message("oi", "triage_agent")
            .await;
        assert!(output.is_in_scope);
        assert_eq!(output.confidence, 0.0);
        assert!(output.reasoning.starts_with("Erro na avaliação"));
    }

    #[tokio::test]
    async fn test_guardrail_trips_when_out_of_scope() {
        let guardrail = ScopeGuardrail::new(Arc::new(system(ScriptedEvaluator::replying(
            "RAZÃO: fora\nESCOPO: false\nCONFIANÇA: 0.9\nAÇÃO: refuse",
        ))));
        let verdict = guardrail.check(AgentKind::Triage, "Me ajude com Python").await;
        assert!(verdict.tripwire_triggered);
        assert_eq!(verdict.output.reasoning, "fora");
    }

    #[tokio::test]
    async fn test_empty_message_never_trips() {
        let model = ScriptedEvaluator::replying("ESCOPO: false");
        let guardrail = ScopeGuardrail::new(Arc::new(system(model.clone())));
        let verdict = guardrail.check(AgentKind::Triage, "").await;
        assert!(!verdict.tripwire_triggered);
        assert!(model.requests.lock().unwrap().is_empty());
    }
}
