//! `go_to_rag`: the knowledge agent's retrieval tool

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::errors::{AtendenteError, Result};
use crate::llm::{ChatMessage, ChatModel, ChatRequest};
use crate::rag::retrieval::{KnowledgeBase, ScoredChunk};
use crate::tools::FunctionTool;

pub const TOOL_NAME: &str = "go_to_rag";
pub const DEFAULT_TOP_K: usize = 3;

const NO_CHUNKS_ANSWER: &str =
    "Não consegui encontrar informações relevantes nos documentos para responder sua pergunta.";
const FALLBACK_ANSWER: &str = "Encontrei trechos relevantes, mas não consegui sintetizar uma resposta a partir deles. \
Use o contexto abaixo para responder manualmente.";
const SYNTHESIS_SYSTEM_PROMPT: &str = "Você é um especialista em processos fiscais. Use apenas o contexto fornecido para \
responder de forma objetiva. Se não houver informação suficiente, informe isso.";
const UNKNOWN_SOURCE: &str = "Desconhecido";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeToolResult {
    pub answer: String,
    pub context: String,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub confidence: f64,
}

impl KnowledgeToolResult {
    fn empty() -> Self {
        Self {
            answer: NO_CHUNKS_ANSWER.to_string(),
            context: String::new(),
            sources: Vec::new(),
            confidence: 0.0,
        }
    }
}

/// Context sections, first-seen sources and mean non-negative similarity
pub fn assemble_context(chunks: &[ScoredChunk]) -> (String, Vec<String>, f64) {
    let mut sections = Vec::with_capacity(chunks.len());
    let mut sources: Vec<String> = Vec::new();

    for scored in chunks {
        let chunk = &scored.record.chunk;
        let source = if chunk.source.is_empty() {
            UNKNOWN_SOURCE
        } else {
            chunk.source.as_str()
        };
        if !sources.iter().any(|s| s == source) {
            sources.push(source.to_string());
        }
        sections.push(format!("Documento: {}\nConteúdo: {}", source, chunk.content));
    }

    let confidence = if chunks.is_empty() {
        0.0
    } else {
        chunks.iter().map(|c| (c.similarity as f64).max(0.0)).sum::<f64>() / chunks.len() as f64
    };

    (sections.join("\n\n"), sources, confidence)
}

pub struct KnowledgeTool {
    knowledge: Arc<KnowledgeBase>,
    model: Arc<dyn ChatModel>,
    model_name: String,
    top_k: usize,
}

impl KnowledgeTool {
    pub fn new(knowledge: Arc<KnowledgeBase>, model: Arc<dyn ChatModel>, model_name: impl Into<String>) -> Self {
        Self {
            knowledge,
            model,
            model_name: model_name.into(),
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Retrieve and synthesize. Retrieval and synthesis failures degrade
    /// to the fixed answers instead of failing the tool call.
    #[tracing::instrument(name = "go_to_rag", skip_all)]
    pub async fn answer(&self, question: &str) -> KnowledgeToolResult {
        tracing::info!("processing question: {}", question);

        let chunks = match self.knowledge.find_relevant_chunks(question, self.top_k).await {
            Ok(chunks) => chunks,
            Err(e) => {
                tracing::error!("error finding relevant chunks: {}", e);
                Vec::new()
            }
        };
        if chunks.is_empty() {
            return KnowledgeToolResult::empty();
        }

        let (context, sources, confidence) = assemble_context(&chunks);
        tracing::debug!("context: {}", context);

        let answer = match self.synthesize(question, &context).await {
            Ok(answer) if !answer.trim().is_empty() => answer.trim().to_string(),
            Ok(_) => FALLBACK_ANSWER.to_string(),
            Err(e) => {
                tracing::error!("failed to synthesize answer: {}", e);
                FALLBACK_ANSWER.to_string()
            }
        };

        KnowledgeToolResult {
            answer,
            context,
            sources,
            confidence,
        }
    }

    async fn synthesize(&self, question: &str, context: &str) -> Result<String> {
        let request = ChatRequest::new(
            self.model_name.clone(),
            vec![
                ChatMessage::system(SYNTHESIS_SYSTEM_PROMPT),
                ChatMessage::user(format!(
                    "Pergunta: {}\n\nContexto:\n{}\n\nResponda em português, destacando os passos principais e cite os documentos utilizados.",
                    question, context
                )),
            ],
        );
        let response = self.model.chat(request).await?;
        Ok(response.message.text().to_string())
    }
}

#[async_trait]
impl FunctionTool for KnowledgeTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Utilize o RAG para responder à pergunta do usuário."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "question": {"type": "string", "description": "Pergunta do usuário, com o documento de referência."}
            },
            "required": ["question"],
            "additionalProperties": false
        })
    }

    async fn call(&self, arguments: Value) -> Result<String> {
        let question = arguments
            .get("question")
            .and_then(Value::as_str)
            .ok_or_else(|| AtendenteError::Generic("missing 'question' argument".to_string()))?;
        let result = self.answer(question).await;
        Ok(serde_json::to_string(&result)?)
    }
}
