//! OpenAI / Azure OpenAI HTTP client
//!
//! - OpenAI: `POST {base}/chat/completions`, bearer auth
//! - Azure: `POST {endpoint}/openai/deployments/{deployment}/chat/completions?api-version=V`,
//!   `api-key` header

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use std::time::Duration;

use super::types::{ChatCompletion, ChatRequest, ChatResponse, EmbeddingRequest, EmbeddingResponse};
use super::{ChatModel, Embedder};
use crate::config::{ResolvedProvider, Settings};
use crate::errors::{AtendenteError, Result};

/// Request timeout (60 seconds)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Chat and embedding client for either provider
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    provider: ResolvedProvider,
    embedding_model: String,
}

impl OpenAiClient {
    /// Build a client from settings and the process environment
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let provider = settings.resolve_provider()?;
        Self::with_provider(provider, &settings.models.embedding)
    }

    pub fn with_provider(provider: ResolvedProvider, embedding_model: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(AtendenteError::HttpError)?;

        Ok(Self {
            client,
            provider,
            embedding_model: embedding_model.to_string(),
        })
    }

    pub fn provider(&self) -> &ResolvedProvider {
        &self.provider
    }

    /// Endpoint URL for `operation` (`chat/completions` or `embeddings`)
    pub fn endpoint(&self, operation: &str, model: &str) -> String {
        match &self.provider {
            ResolvedProvider::OpenAi { base_url, .. } => format!("{}/{}", base_url, operation),
            ResolvedProvider::Azure {
                endpoint,
                api_version,
                deployment,
                ..
            } => {
                // Embeddings always address their own model deployment
                let target = match deployment {
                    Some(name) if operation != "embeddings" => name.as_str(),
                    _ => model,
                };
                format!(
                    "{}/openai/deployments/{}/{}?api-version={}",
                    endpoint, target, operation, api_version
                )
            }
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.provider {
            ResolvedProvider::OpenAi { api_key, .. } => request.bearer_auth(api_key),
            ResolvedProvider::Azure { api_key, .. } => request.header("api-key", api_key),
        }
    }

    async fn post_json<B: Serialize>(&self, url: &str, body: &B) -> Result<reqwest::Response> {
        let response = self
            .authorize(self.client.post(url))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AtendenteError::ApiError { status, body });
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let url = self.endpoint("chat/completions", &request.model);
        tracing::debug!(model = %request.model, messages = request.messages.len(), "chat request");

        let completion: ChatCompletion = self.post_json(&url, &request).await?.json().await?;
        let usage = completion.usage.unwrap_or_default();
        let message = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| AtendenteError::EmptyResponse("no choices returned".to_string()))?;

        Ok(ChatResponse { message, usage })
    }
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = self.endpoint("embeddings", &self.embedding_model);
        let body = EmbeddingRequest {
            model: &self.embedding_model,
            input: text,
        };

        let response: EmbeddingResponse = self.post_json(&url, &body).await?.json().await?;
        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| AtendenteError::EmptyResponse("no embedding returned".to_string()))
    }

    fn model(&self) -> &str {
        &self.embedding_model
    }
}
