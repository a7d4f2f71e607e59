//! Properties of page grouping under a token budget

use std::sync::Arc;

use atendente::context::{split_into_token_chunks, BudgetedQuery, TokenCounter};
use atendente::llm::{ChatMessage, ChatModel, ChatRequest, ChatResponse, Usage};
use quickcheck_macros::quickcheck;

fn pages_from(lengths: &[u8]) -> Vec<String> {
    lengths.iter().map(|&n| "palavra ".repeat(n as usize)).collect()
}

#[quickcheck]
fn prop_groups_cover_every_page_in_order(lengths: Vec<u8>, budget: u16) -> bool {
    let pages = pages_from(&lengths);
    let groups = split_into_token_chunks(&pages, budget as usize + 1, &TokenCounter::new());
    let flattened: Vec<usize> = groups.into_iter().flatten().collect();
    flattened == (0..pages.len()).collect::<Vec<_>>()
}

#[quickcheck]
fn prop_multi_page_groups_fit_the_budget(lengths: Vec<u8>, budget: u16) -> bool {
    let counter = TokenCounter::new();
    let max_tokens = budget as usize + 1;
    let pages = pages_from(&lengths);

    split_into_token_chunks(&pages, max_tokens, &counter)
        .iter()
        .all(|group| {
            group.len() == 1 || group.iter().map(|&i| counter.estimate(&pages[i])).sum::<usize>() <= max_tokens
        })
}

/// Echoes a fixed answer and reports no usage
struct Echo;

#[async_trait::async_trait]
impl ChatModel for Echo {
    async fn chat(&self, _request: ChatRequest) -> atendente::Result<ChatResponse> {
        Ok(ChatResponse {
            message: ChatMessage::assistant("ok"),
            usage: Usage::default(),
        })
    }
}

#[quickcheck]
fn prop_model_is_called_only_for_text(lengths: Vec<u8>, budget: u16) -> bool {
    let pages = pages_from(&lengths);
    let max_tokens = budget as usize + 1;
    let groups = split_into_token_chunks(&pages, max_tokens, &TokenCounter::new());
    let query = BudgetedQuery::new(Arc::new(Echo), "m").with_max_tokens(max_tokens);

    let answer = tokio_test::block_on(query.run(&pages, "pergunta", "sistema", "nada")).unwrap();

    let has_text = lengths.iter().any(|&n| n > 0);
    if has_text {
        answer.calls >= 1 && answer.calls <= groups.len()
    } else {
        answer.calls == 0 && (answer.text.is_empty() || answer.text == "nada")
    }
}
