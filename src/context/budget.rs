//! Token-budgeted document queries
//!
//! A document is a list of pages. When the whole document fits the budget it
//! goes to the model in one call; otherwise pages are grouped greedily and
//! each group is asked the same question, answers joined with a space.

use std::sync::Arc;

use super::counter::TokenCounter;
use crate::errors::Result;
use crate::llm::{ChatMessage, ChatModel, ChatRequest};

/// Default budget, below the model's context window
pub const DEFAULT_MAX_CONTEXT_TOKENS: usize = 128_000;

/// Page separator in plain-text exports
pub const PAGE_BREAK: char = '\x0c';

/// Split extracted text into pages on form feeds
pub fn pages_from_text(text: &str) -> Vec<String> {
    text.split(PAGE_BREAK).map(str::to_string).collect()
}

/// Group page indices so each group stays under `max_tokens`.
///
/// A page that would overflow a non-empty group starts a new one. A single
/// oversized page still forms its own group.
pub fn split_into_token_chunks(
    pages: &[String],
    max_tokens: usize,
    counter: &TokenCounter,
) -> Vec<Vec<usize>> {
    let mut groups = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut current_tokens = 0;

    for (index, page) in pages.iter().enumerate() {
        let page_tokens = counter.estimate(page);
        if current_tokens + page_tokens > max_tokens && !current.is_empty() {
            groups.push(std::mem::take(&mut current));
            current.push(index);
            current_tokens = page_tokens;
        } else {
            current.push(index);
            current_tokens += page_tokens;
        }
    }

    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

fn join_pages(pages: &[String], indices: &[usize]) -> String {
    indices
        .iter()
        .filter_map(|&i| pages.get(i))
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Answer and token accounting for a budgeted query
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetedAnswer {
    pub text: String,
    /// Input plus output tokens across every call made
    pub token_count: usize,
    /// Number of model calls
    pub calls: usize,
}

/// Runs a question against a paged document within a token budget
pub struct BudgetedQuery {
    model: Arc<dyn ChatModel>,
    model_name: String,
    max_tokens: usize,
    counter: TokenCounter,
}

impl BudgetedQuery {
    pub fn new(model: Arc<dyn ChatModel>, model_name: impl Into<String>) -> Self {
        let model_name = model_name.into();
        Self {
            model,
            counter: TokenCounter::for_model(&model_name),
            model_name,
            max_tokens: DEFAULT_MAX_CONTEXT_TOKENS,
        }
    }

    pub fn with_counter(mut self, counter: TokenCounter) -> Self {
        self.counter = counter;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    #[tracing::instrument(name = "budgeted_query", skip_all, fields(pages = pages.len()))]
    pub async fn run(
        &self,
        pages: &[String],
        question: &str,
        system_prompt: &str,
        default_value: &str,
    ) -> Result<BudgetedAnswer> {
        let all: Vec<usize> = (0..pages.len()).collect();
        let context = join_pages(pages, &all);
        let token_count = self.counter.estimate(&context);

        if token_count > self.max_tokens {
            tracing::info!(
                tokens = token_count,
                budget = self.max_tokens,
                "context exceeds token limit, splitting into chunks"
            );
            self.run_chunked(pages, question, system_prompt).await
        } else {
            self.run_single(&context, question, system_prompt, default_value)
                .await
        }
    }

    async fn run_single(
        &self,
        context: &str,
        question: &str,
        system_prompt: &str,
        default_value: &str,
    ) -> Result<BudgetedAnswer> {
        if context.trim().is_empty() {
            return Ok(BudgetedAnswer {
                text: default_value.to_string(),
                token_count: 0,
                calls: 0,
            });
        }

        let user = format!("Context:\n{}\n\nQuestion: {}", context, question);
        let (text, tokens) = self.ask(system_prompt, user).await?;
        Ok(BudgetedAnswer {
            text,
            token_count: tokens,
            calls: 1,
        })
    }

    async fn run_chunked(
        &self,
        pages: &[String],
        question: &str,
        system_prompt: &str,
    ) -> Result<BudgetedAnswer> {
        let groups = split_into_token_chunks(pages, self.max_tokens, &self.counter);
        tracing::info!("document split into {} chunks due to token limit", groups.len());

        let total = groups.len();
        let mut answers = Vec::with_capacity(total);
        let mut token_count = 0;
        let mut calls = 0;

        for (i, group) in groups.iter().enumerate() {
            let chunk_text = join_pages(pages, group);
            if chunk_text.trim().is_empty() {
                continue;
            }

            let user = format!(
                "Context (part {} of {}):\n{}\n\nQuestion: {}",
                i + 1,
                total,
                chunk_text,
                question
            );
            let (text, tokens) = self.ask(system_prompt, user).await?;
            answers.push(text);
            token_count += tokens;
            calls += 1;
        }

        Ok(BudgetedAnswer {
            text: answers.join(" "),
            token_count,
            calls,
        })
    }

    /// One call; returns the answer and input + output tokens
    async fn ask(&self, system_prompt: &str, user: String) -> Result<(String, usize)> {
        let messages = vec![ChatMessage::system(system_prompt), ChatMessage::user(user)];
        let input_estimate: usize = messages.iter().map(|m| self.counter.estimate(m.text())).sum();

        let response = self
            .model
            .chat(ChatRequest::new(&self.model_name, messages))
            .await?;
        let text = response.message.text().to_string();

        let tokens = if response.usage.total_tokens > 0 {
            (response.usage.prompt_tokens + response.usage.completion_tokens) as usize
        } else {
            input_estimate + self.counter.estimate(&text)
        };
        Ok((text, tokens))
    }
}
