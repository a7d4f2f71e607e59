//! Configuration management for AtendentePro
//!
//! TOML settings with defaults and validation, plus credential resolution
//! from the environment. Credentials are never written to the settings file.
//! Location: ~/.atendente/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{AtendenteError, Result};

/// Default chat model used by every agent
pub const DEFAULT_MODEL: &str = "gpt-4.1";

/// Model used by the scope guardrail
pub const DEFAULT_GUARDRAIL_MODEL: &str = "gpt-4o-mini";

/// Embedding model used for both indexing and querying
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-large";

/// Public OpenAI endpoint
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Environment variable naming an OTLP collector
pub const OTLP_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

/// Default Azure API version
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-02-15-preview";

/// Complete configuration for AtendentePro
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub models: ModelSettings,
    #[serde(default)]
    pub agents: AgentSettings,
    #[serde(default)]
    pub guardrails: GuardrailSettings,
    #[serde(default)]
    pub rag: RagSettings,
    #[serde(default)]
    pub paths: PathSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

/// Which OpenAI-compatible backend to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Azure,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Azure => "azure",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "openai" => Some(ProviderKind::OpenAi),
            "azure" => Some(ProviderKind::Azure),
            _ => None,
        }
    }
}

/// Provider connection settings (non-secret parts)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Explicit provider; auto-detected from credentials when absent
    pub kind: Option<ProviderKind>,
    pub openai_base_url: String,
    pub azure_endpoint: Option<String>,
    pub azure_api_version: String,
    pub azure_deployment: Option<String>,
}

/// Model names
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub default: String,
    pub guardrail: String,
    pub embedding: String,
}

/// Agent runtime behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub max_turns: usize,
    /// Ask Flow/Interview/Answer agents for JSON output and validate it
    pub structured_outputs: bool,
}

/// Guardrail behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardrailSettings {
    pub confidence_threshold: f64,
}

/// Retrieval and document-analysis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    pub knowledge_dir: String,
    pub embeddings_file: Option<String>,
    pub chunk_size: usize,
    pub overlap: usize,
    pub min_chunk_chars: usize,
    pub top_k: usize,
    pub max_context_tokens: usize,
    pub embed_concurrency: usize,
}

/// File system paths
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub template_dir: String,
    pub history_file: String,
}

/// Trace export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    /// OTLP collector; spans are exported only when set
    pub otlp_endpoint: Option<String>,
    pub service_name: String,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            otlp_endpoint: None,
            service_name: "atendente".to_string(),
        }
    }
}

impl TelemetrySettings {
    /// Collector endpoint, `OTEL_EXPORTER_OTLP_ENDPOINT` first. Blank values disable export.
    pub fn exporter_endpoint<F>(&self, env: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        env(OTLP_ENDPOINT_ENV)
            .or_else(|| self.otlp_endpoint.clone())
            .map(|endpoint| endpoint.trim().to_string())
            .filter(|endpoint| !endpoint.is_empty())
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: None,
            openai_base_url: OPENAI_BASE_URL.to_string(),
            azure_endpoint: None,
            azure_api_version: DEFAULT_AZURE_API_VERSION.to_string(),
            azure_deployment: None,
        }
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            default: DEFAULT_MODEL.to_string(),
            guardrail: DEFAULT_GUARDRAIL_MODEL.to_string(),
            embedding: DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_turns: 10,
            structured_outputs: false,
        }
    }
}

impl Default for GuardrailSettings {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
        }
    }
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            knowledge_dir: "templates/standard/knowledge".to_string(),
            embeddings_file: None,
            chunk_size: 1000,
            overlap: 200,
            min_chunk_chars: 100,
            top_k: 3,
            max_context_tokens: 128_000,
            embed_concurrency: 4,
        }
    }
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            template_dir: "templates/standard".to_string(),
            history_file: "~/.atendente/history".to_string(),
        }
    }
}

/// Fully resolved provider with credentials
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedProvider {
    OpenAi {
        api_key: String,
        base_url: String,
    },
    Azure {
        api_key: String,
        endpoint: String,
        api_version: String,
        deployment: Option<String>,
    },
}

impl ResolvedProvider {
    pub fn kind(&self) -> ProviderKind {
        match self {
            ResolvedProvider::OpenAi { .. } => ProviderKind::OpenAi,
            ResolvedProvider::Azure { .. } => ProviderKind::Azure,
        }
    }
}

impl Settings {
    /// Load settings from an explicit file or from the standard location
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(config_path) => Self::load_from_file(&config_path),
            None => Self::load_default(),
        }
    }

    /// Load settings from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AtendenteError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let settings: Settings = toml::from_str(&contents)
            .map_err(|e| AtendenteError::ConfigError(format!("Failed to parse config: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Load from ~/.atendente/config.toml, writing defaults on first run
    pub fn load_default() -> Result<Self> {
        let Some(config_path) = Self::default_path() else {
            return Ok(Settings::default());
        };

        if config_path.exists() {
            return Self::load_from_file(&config_path);
        }

        let settings = Settings::default();
        if let Err(e) = settings.save(&config_path) {
            tracing::warn!("Could not write default config to {}: {}", config_path.display(), e);
        }
        Ok(settings)
    }

    /// Standard settings location
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".atendente").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.agents.max_turns == 0 {
            return Err(AtendenteError::ConfigError(
                "agents.max_turns must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.guardrails.confidence_threshold) {
            return Err(AtendenteError::ConfigError(
                "guardrails.confidence_threshold must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.rag.overlap >= self.rag.chunk_size {
            return Err(AtendenteError::InvalidChunking {
                chunk_size: self.rag.chunk_size,
                overlap: self.rag.overlap,
            });
        }

        if self.rag.top_k == 0 {
            return Err(AtendenteError::ConfigError(
                "rag.top_k must be greater than 0".to_string(),
            ));
        }

        if self.rag.max_context_tokens == 0 {
            return Err(AtendenteError::ConfigError(
                "rag.max_context_tokens must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Save settings to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| AtendenteError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Resolve provider and credentials from the process environment
    pub fn resolve_provider(&self) -> Result<ResolvedProvider> {
        self.provider.resolve(|key| std::env::var(key).ok())
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    pub fn template_dir(&self) -> PathBuf {
        Self::expand_path(&self.paths.template_dir)
    }

    pub fn history_file(&self) -> PathBuf {
        Self::expand_path(&self.paths.history_file)
    }

    pub fn knowledge_dir(&self) -> PathBuf {
        Self::expand_path(&self.rag.knowledge_dir)
    }

    /// Embedding store path, defaulting to `<knowledge_dir>/embedding/embeddings.json`
    pub fn embeddings_file(&self) -> PathBuf {
        match &self.rag.embeddings_file {
            Some(path) => Self::expand_path(path),
            None => self.knowledge_dir().join("embedding").join("embeddings.json"),
        }
    }
}

impl ProviderSettings {
    /// Pick the provider and collect its credentials.
    ///
    /// Order: `OPENAI_PROVIDER` env > `kind` in settings > Azure when both
    /// `AZURE_API_KEY` and an endpoint are available > OpenAI.
    pub fn resolve<F>(&self, env: F) -> Result<ResolvedProvider>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let endpoint = non_empty("AZURE_API_ENDPOINT").or_else(|| self.azure_endpoint.clone());
        let azure_key = non_empty("AZURE_API_KEY");

        let kind = non_empty("OPENAI_PROVIDER")
            .and_then(|v| ProviderKind::parse(&v))
            .or(self.kind)
            .unwrap_or(if azure_key.is_some() && endpoint.is_some() {
                ProviderKind::Azure
            } else {
                ProviderKind::OpenAi
            });

        match kind {
            ProviderKind::Azure => {
                let mut missing = Vec::new();
                if azure_key.is_none() {
                    missing.push("AZURE_API_KEY");
                }
                if endpoint.is_none() {
                    missing.push("AZURE_API_ENDPOINT");
                }
                match (azure_key, endpoint) {
                    (Some(api_key), Some(endpoint)) => Ok(ResolvedProvider::Azure {
                        api_key,
                        endpoint: endpoint.trim_end_matches('/').to_string(),
                        api_version: non_empty("AZURE_API_VERSION")
                            .unwrap_or_else(|| self.azure_api_version.clone()),
                        deployment: non_empty("AZURE_DEPLOYMENT_NAME")
                            .or_else(|| self.azure_deployment.clone()),
                    }),
                    _ => Err(AtendenteError::ConfigError(format!(
                        "Missing Azure OpenAI credentials: {}",
                        missing.join(", ")
                    ))),
                }
            }
            ProviderKind::OpenAi => {
                let api_key = non_empty("OPENAI_API_KEY").ok_or_else(|| {
                    AtendenteError::ConfigError(
                        "OPENAI_API_KEY is not set. Export it or select provider=azure.".to_string(),
                    )
                })?;
                Ok(ResolvedProvider::OpenAi {
                    api_key,
                    base_url: self.openai_base_url.trim_end_matches('/').to_string(),
                })
            }
        }
    }
}
