//! Agent instructions
//!
//! Every instruction string is assembled from fixed step sections plus
//! client text from the templates. All agents except Usage get the
//! multi-agent prefix.

mod reference;
mod routing;
mod structured;

use crate::agent::AgentKind;
use crate::templates::TemplateSet;

pub use reference::{confirmation_prompt, knowledge_prompt};
pub use routing::{flow_prompt, triage_prompt};
pub use structured::{answer_prompt, interview_prompt};

/// Context every agent receives about transfers
pub const RECOMMENDED_PROMPT_PREFIX: &str = "[CONTEXT SYSTEM]
- Você faz parte de um sistema multiagente chamado Agents SDK, criado para facilitar a coordenação e execução de agentes.
- O Agents SDK utiliza duas principais abstrações: **Agentes** e **Handoffs** (transferências).
- Um agente abrange instruções e ferramentas e pode transferir uma conversa para outro agente quando apropriado.
- Transferências entre agentes são realizadas chamando uma função de transferência, geralmente nomeada como `transfer_to_<nome_do_agente>`.
- As transferências entre agentes ocorrem de forma transparente em segundo plano; não mencione nem chame atenção para essas transferências na sua conversa com o usuário.
";

pub const USAGE_INSTRUCTIONS: &str =
    "You are a helpful usage agent. You will answer questions about the usage of the system.";

/// Internal-reasoning bullet
pub(crate) fn think(text: &str) -> String {
    format!("- (Raciocínio interno) {}", text)
}

/// Bullet addressed to the user
pub(crate) fn say(text: &str) -> String {
    format!("- (Mensagem ao usuário) {}", text)
}

/// `[TAG]` block with one bullet per line
pub(crate) fn section(tag: &str, bullets: &[String]) -> String {
    format!("[{}]\n{}\n", tag, bullets.join("\n"))
}

/// Step list line shown at the top of each prompt
pub(crate) fn modules(steps: &[&str]) -> String {
    let chain = steps
        .iter()
        .map(|s| format!("[{}]", s))
        .collect::<Vec<_>>()
        .join(" - ");
    format!(
        "Deve seguir as seguintes etapas de forma sequencial (todas são raciocínio interno; não exponha nada ao usuário):\n{}\n",
        chain
    )
}

pub(crate) fn join_blocks(blocks: &[String]) -> String {
    blocks.join("\n")
}

/// Full instructions for `kind`
pub fn instructions_for(kind: AgentKind, templates: &TemplateSet) -> String {
    let body = match kind {
        AgentKind::Usage => return USAGE_INSTRUCTIONS.to_string(),
        AgentKind::Triage => triage_prompt(&templates.triage),
        AgentKind::Flow => flow_prompt(&templates.flow),
        AgentKind::Interview => interview_prompt(&templates.interview, &templates.flow),
        AgentKind::Answer => answer_prompt(&templates.answer),
        AgentKind::Confirmation => confirmation_prompt(&templates.confirmation),
        AgentKind::Knowledge => knowledge_prompt(&templates.knowledge),
    };
    format!("{} {}", RECOMMENDED_PROMPT_PREFIX, body)
}
