//! Agent network module
//!
//! Agent identities and the static handoff table, the configured network,
//! structured outputs, handoff summaries and the turn runner.

pub mod definition;
pub mod handoff;
pub mod kind;
pub mod network;
pub mod outputs;
pub mod runner;

// Re-export commonly used types
pub use definition::Agent;
pub use handoff::{append_handoff_summary, ContextNote, HandoffSummary};
pub use kind::AgentKind;
pub use network::{AgentNetwork, NetworkOptions};
pub use outputs::{AnswerOutput, FlowOutput, InterviewOutput, OutputSchema};
pub use runner::{RunEvent, RunResult, Runner, DEFAULT_MAX_TURNS};
