//! Fake models shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use atendente::bootstrap::{Services, Workspace};
use atendente::config::Settings;
use atendente::llm::{ChatMessage, ChatModel, ChatRequest, ChatResponse, Embedder, ToolCall, Usage};
use atendente::Result;

const EVALUATOR_PREFIX: &str = "Você é um especialista em análise de contexto";
const SYNTHESIS_PREFIX: &str = "Você é um especialista em processos fiscais";

pub const SYNTHESIZED_ANSWER: &str = "O crédito de ICMS do imobilizado é apropriado em 48 parcelas.";

/// Chat model that answers scope checks and RAG synthesis by itself and
/// replays scripted replies for agent turns
pub struct FakeModel {
    replies: Mutex<VecDeque<ChatMessage>>,
    /// Agent turns only
    pub requests: Mutex<Vec<ChatRequest>>,
    pub evaluations: Mutex<usize>,
}

impl FakeModel {
    pub fn new(replies: Vec<ChatMessage>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            evaluations: Mutex::new(0),
        })
    }

    pub fn agent_turns(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for FakeModel {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let system = request
            .messages
            .first()
            .map(|m| m.text().to_string())
            .unwrap_or_default();

        let message = if system.starts_with(EVALUATOR_PREFIX) {
            *self.evaluations.lock().unwrap() += 1;
            let prompt = request.messages.last().map(|m| m.text().to_string()).unwrap_or_default();
            if prompt.contains("2x + 5") {
                ChatMessage::assistant("RAZÃO: equação matemática\nESCOPO: false\nCONFIANÇA: 0.95\nAÇÃO: refuse")
            } else {
                ChatMessage::assistant("RAZÃO: pergunta fiscal\nESCOPO: true\nCONFIANÇA: 0.9\nAÇÃO: continue")
            }
        } else if system.starts_with(SYNTHESIS_PREFIX) {
            ChatMessage::assistant(SYNTHESIZED_ANSWER)
        } else {
            self.requests.lock().unwrap().push(request);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| ChatMessage::assistant("Posso ajudar em algo mais?"))
        };

        Ok(ChatResponse {
            message,
            usage: Usage {
                prompt_tokens: 20,
                completion_tokens: 10,
                total_tokens: 30,
            },
        })
    }
}

/// Three-axis embedding: ICMS mentions, ISS mentions, constant bias
pub struct KeywordEmbedder;

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let lower = text.to_lowercase();
        let axis = |term: &str| if lower.contains(term) { 1.0 } else { 0.0 };
        Ok(vec![axis("icms"), axis("iss"), 0.1])
    }

    fn model(&self) -> &str {
        "keyword-embedder"
    }
}

pub fn transfer(tool: &str) -> ChatMessage {
    ChatMessage::assistant_tool_calls(vec![ToolCall::new(tool, "{}")])
}

pub fn standard_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates/standard")
}

/// Standard templates with the embedding store pointed at `store_file`
pub fn workspace(store_file: Option<PathBuf>) -> Workspace {
    let mut settings = Settings::default();
    settings.rag.knowledge_dir = standard_dir().join("knowledge").display().to_string();
    settings.rag.embeddings_file = store_file.map(|p| p.display().to_string());
    Workspace::load(settings, Some(standard_dir())).unwrap()
}

pub fn services(model: Arc<FakeModel>) -> Services {
    Services::with_models(model, Arc::new(KeywordEmbedder))
}
