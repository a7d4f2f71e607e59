//! Context window management
//!
//! Token estimation and token-budgeted document queries.

pub mod budget;
pub mod counter;

pub use budget::{
    pages_from_text, split_into_token_chunks, BudgetedAnswer, BudgetedQuery,
    DEFAULT_MAX_CONTEXT_TOKENS,
};
pub use counter::TokenCounter;
