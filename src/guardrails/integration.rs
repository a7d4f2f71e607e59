//! Pre-agent scope check with a confidence threshold

use std::sync::Arc;

use super::scope::GuardrailSystem;
use super::{GuardrailOutput, SuggestedAction};

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Gate a message before handing it to an agent
pub struct GuardrailIntegration {
    system: Arc<GuardrailSystem>,
    confidence_threshold: f64,
}

impl GuardrailIntegration {
    pub fn new(system: Arc<GuardrailSystem>) -> Self {
        Self {
            system,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Continue only when in scope with enough confidence
    pub async fn check_before_agent(&self, message: &str, agent_key: &str) -> (bool, GuardrailOutput) {
        let result = self.system.evaluate_message(message, agent_key).await;
        let should_continue = result.is_in_scope && result.confidence >= self.confidence_threshold;
        (should_continue, result)
    }

    /// Reply for a message that did not pass
    pub fn handle_out_of_scope(&self, result: &GuardrailOutput) -> String {
        match result.suggested_action {
            SuggestedAction::Refuse => "Desculpe, mas não posso ajudá-lo com essa consulta. \
                Estou aqui para auxiliar com questões relacionadas aos nossos produtos e serviços. \
                Como posso ajudá-lo dentro desse escopo?"
                .to_string(),
            SuggestedAction::Redirect => "Parece que sua consulta pode ser melhor atendida por outro agente. \
                Vou redirecioná-lo para o agente mais apropriado. \
                Por favor, reformule sua pergunta focando em nossos produtos ou serviços."
                .to_string(),
            _ => "Entendi sua consulta. Embora não seja exatamente minha especialidade, \
                vou tentar ajudá-lo da melhor forma possível. \
                Você poderia fornecer mais detalhes sobre sua necessidade?"
                .to_string(),
        }
    }
}
