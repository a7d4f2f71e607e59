//! Slash commands for the chat loop

use crate::agent::AgentKind;

/// Chat commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    /// Show the current agent, or switch to the named one
    Agent { name: Option<String> },
    Agents,
    Context,
    Status,
    Reset,
    Clear,
    Exit,
    Unknown { input: String },
}

pub fn is_command(input: &str) -> bool {
    input.trim_start().starts_with('/')
}

pub fn parse(input: &str) -> Command {
    let trimmed = input.trim();
    let Some(body) = trimmed.strip_prefix('/') else {
        return Command::Unknown {
            input: input.to_string(),
        };
    };

    let mut parts = body.split_whitespace();
    let Some(name) = parts.next() else {
        return Command::Unknown {
            input: input.to_string(),
        };
    };

    match name.to_lowercase().as_str() {
        "help" | "h" => Command::Help,
        "agent" => Command::Agent {
            name: parts.next().map(str::to_string),
        },
        "agents" => Command::Agents,
        "context" | "ctx" => Command::Context,
        "status" => Command::Status,
        "reset" => Command::Reset,
        "clear" | "cls" => Command::Clear,
        "exit" | "quit" | "q" => Command::Exit,
        _ => Command::Unknown {
            input: input.to_string(),
        },
    }
}

pub fn help_lines() -> Vec<(&'static str, &'static str)> {
    vec![
        ("/help, /h", "Mostra esta ajuda"),
        ("/agent [nome]", "Mostra ou troca o agente atual"),
        ("/agents", "Lista os agentes e suas transferências"),
        ("/context, /ctx", "Mostra o caminho de agentes e os resumos de handoff"),
        ("/status", "Resumo da sessão"),
        ("/reset", "Limpa a conversa"),
        ("/clear, /cls", "Limpa a tela"),
        ("/exit, exit, quit", "Encerra"),
    ]
}

/// One line per agent: `cli_name  Display Name -> targets`
pub fn agent_table() -> Vec<String> {
    AgentKind::ALL
        .iter()
        .map(|kind| {
            let targets: Vec<&str> = kind.handoffs().iter().map(|t| t.cli_name()).collect();
            format!("{:<13} {:<19} → {}", kind.cli_name(), kind.display_name(), targets.join(", "))
        })
        .collect()
}
