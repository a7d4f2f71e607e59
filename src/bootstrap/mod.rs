//! Startup wiring
//!
//! `Workspace` is everything read from disk (settings, templates, guardrail
//! files). `Services` adds the model client and builds the runtime pieces
//! each command needs.

use std::path::PathBuf;
use std::sync::Arc;

use crate::agent::{AgentKind, AgentNetwork, NetworkOptions, Runner};
use crate::config::Settings;
use crate::context::BudgetedQuery;
use crate::errors::Result;
use crate::guardrails::{GuardrailConfig, GuardrailIntegration, GuardrailMessages, GuardrailSystem};
use crate::llm::{ChatModel, Embedder, OpenAiClient};
use crate::rag::{ChunkingOptions, EmbeddingStore, Indexer, KnowledgeBase, KnowledgeTool};
use crate::repl::Conversation;
use crate::templates::TemplateSet;
use crate::tools::FunctionTool;

/// Settings plus the template directory contents
pub struct Workspace {
    pub settings: Settings,
    pub template_dir: PathBuf,
    pub templates: TemplateSet,
    pub guardrail_config: GuardrailConfig,
    pub messages: GuardrailMessages,
}

impl Workspace {
    /// Load templates from `template_dir`, or from the configured directory
    pub fn load(settings: Settings, template_dir: Option<PathBuf>) -> Result<Self> {
        let template_dir = template_dir.unwrap_or_else(|| settings.template_dir());
        let templates = TemplateSet::load(&template_dir)?;
        let guardrail_config = GuardrailConfig::find(&template_dir)?;
        let messages = GuardrailMessages::find(&template_dir)?;

        Ok(Self {
            settings,
            template_dir,
            templates,
            guardrail_config,
            messages,
        })
    }
}

/// Model-backed components built from a workspace
pub struct Services {
    chat: Arc<dyn ChatModel>,
    embedder: Arc<dyn Embedder>,
}

impl Services {
    /// Connect to the provider configured in settings and the environment
    pub fn connect(settings: &Settings) -> Result<Self> {
        let client = Arc::new(OpenAiClient::from_settings(settings)?);
        tracing::info!(
            provider = client.provider().kind().as_str(),
            model = %settings.models.default,
            "model client ready"
        );
        Ok(Self::with_models(client.clone(), client))
    }

    pub fn with_models(chat: Arc<dyn ChatModel>, embedder: Arc<dyn Embedder>) -> Self {
        Self { chat, embedder }
    }

    pub fn chat(&self) -> Arc<dyn ChatModel> {
        self.chat.clone()
    }

    pub fn guardrail_system(&self, workspace: &Workspace) -> Arc<GuardrailSystem> {
        Arc::new(GuardrailSystem::new(
            workspace.guardrail_config.clone(),
            self.chat.clone(),
            workspace.settings.models.guardrail.clone(),
        ))
    }

    pub fn guardrail_integration(&self, workspace: &Workspace) -> GuardrailIntegration {
        GuardrailIntegration::new(self.guardrail_system(workspace))
            .with_threshold(workspace.settings.guardrails.confidence_threshold)
    }

    /// Loads the embedding store; a missing store gives an empty base
    pub fn knowledge_base(&self, settings: &Settings) -> Arc<KnowledgeBase> {
        let store = EmbeddingStore::load_or_empty(&settings.embeddings_file());
        Arc::new(KnowledgeBase::new(store, self.embedder.clone()))
    }

    pub fn knowledge_tool(&self, settings: &Settings) -> KnowledgeTool {
        KnowledgeTool::new(
            self.knowledge_base(settings),
            self.chat.clone(),
            settings.models.default.clone(),
        )
        .with_top_k(settings.rag.top_k)
    }

    pub fn network(&self, workspace: &Workspace) -> Result<AgentNetwork> {
        let settings = &workspace.settings;
        let knowledge_tool: Arc<dyn FunctionTool> = Arc::new(self.knowledge_tool(settings));

        let mut options = NetworkOptions::new(settings.models.default.clone());
        options.structured_outputs = settings.agents.structured_outputs;
        options.guardrail_config = workspace.guardrail_config.clone();
        options.guardrail_system = Some(self.guardrail_system(workspace));
        options.knowledge_tool = Some(knowledge_tool);

        AgentNetwork::build(&workspace.templates, options)
    }

    pub fn runner(&self, settings: &Settings) -> Runner {
        Runner::new(self.chat.clone()).with_max_turns(settings.agents.max_turns)
    }

    pub fn conversation(&self, workspace: &Workspace, start: AgentKind) -> Result<Conversation> {
        let network = Arc::new(self.network(workspace)?);
        Ok(Conversation::new(
            self.runner(&workspace.settings),
            network,
            workspace.messages.clone(),
            start,
        ))
    }

    pub fn indexer(&self, settings: &Settings, show_progress: bool) -> Indexer {
        Indexer::new(self.embedder.clone(), ChunkingOptions::from(&settings.rag))
            .with_concurrency(settings.rag.embed_concurrency)
            .with_progress(show_progress)
    }

    pub fn budgeted_query(&self, settings: &Settings) -> BudgetedQuery {
        BudgetedQuery::new(self.chat.clone(), settings.models.default.clone())
            .with_max_tokens(settings.rag.max_context_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AtendenteError;

    #[test]
    fn test_workspace_requires_templates() {
        let dir = tempfile::tempdir().unwrap();
        let result = Workspace::load(Settings::default(), Some(dir.path().to_path_buf()));
        assert!(matches!(result, Err(AtendenteError::TemplateError { .. })));
    }

    #[test]
    fn test_workspace_loads_standard_templates() {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates/standard");
        let workspace = Workspace::load(Settings::default(), Some(dir)).unwrap();
        assert!(!workspace.templates.answer.topics.is_empty());
        assert!(!workspace.guardrail_config.agent_scopes.is_empty());
    }
}
