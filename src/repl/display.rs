//! Terminal output for the chat loop

use colored::*;
use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::time::Duration;

use crate::agent::RunEvent;

/// Characters of tool output shown inline
const TOOL_OUTPUT_PREVIEW: usize = 300;

pub struct DisplayManager {
    show_events: bool,
    show_progress: bool,
}

impl DisplayManager {
    pub fn new(show_events: bool, show_progress: bool) -> Self {
        DisplayManager {
            show_events,
            show_progress,
        }
    }

    pub fn show_banner(&self, version: &str, model: &str, agent: &str) {
        let width = 64;
        println!("\n{}", "=".repeat(width).cyan());
        println!("{}", format!("  AtendentePro {} - Atendimento multiagente", version).bold().cyan());
        println!("{}", format!("  Modelo: {} | Agente inicial: {}", model, agent).dimmed());
        println!("{}\n", "=".repeat(width).cyan());
        println!(
            "Digite sua mensagem ({} para comandos, {} para sair)\n",
            "/help".green(),
            "exit".green()
        );
    }

    /// Spinner while the agents work; hidden in quiet mode
    pub fn start_thinking(&self) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Pensando...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    pub fn show_events(&self, events: &[RunEvent]) {
        if !self.show_events {
            return;
        }
        for event in events {
            if let Some(line) = format_event(event) {
                println!("{}", line.dimmed());
            }
        }
    }

    pub fn show_reply(&self, agent: &str, text: &str) {
        println!("{} {}", format!("{}:", agent).bold().green(), text);
    }

    pub fn show_guardrail(&self, title: &str, message: &str) {
        println!("{}", title.yellow().bold());
        println!("{}", message.yellow());
    }

    pub fn show_error(&self, error: &str) {
        println!("{} {}", "Erro:".red().bold(), error.red());
    }

    pub fn show_info(&self, info: &str) {
        println!("{} {}", "Info:".cyan(), info);
    }

    pub fn show_section(&self, title: &str) {
        println!("\n{}", title.bold().cyan());
        println!("{}", "-".repeat(60).cyan());
    }

    pub fn show_help(&self, lines: &[(&str, &str)]) {
        self.show_section("Comandos disponíveis:");
        for (command, description) in lines {
            println!("  {:<20} {}", command.green(), description);
        }
        println!();
    }

    pub fn show_goodbye(&self) {
        println!("👋 Até logo!");
    }

    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(io::stdout(), Clear(ClearType::All), cursor::MoveTo(0, 0))
    }
}

/// Line printed for a run event; plain messages are shown as replies instead
pub fn format_event(event: &RunEvent) -> Option<String> {
    match event {
        RunEvent::AgentUpdated { agent } => Some(format!("[Agent updated: {}]", agent.display_name())),
        RunEvent::ToolCalled { .. } => Some("[tool called]".to_string()),
        RunEvent::ToolOutput { output, .. } => {
            let preview: String = output.chars().take(TOOL_OUTPUT_PREVIEW).collect();
            let ellipsis = if output.chars().count() > TOOL_OUTPUT_PREVIEW { "…" } else { "" };
            Some(format!("[tool output: {}{}]", preview, ellipsis))
        }
        RunEvent::MessageOutput { .. } => None,
    }
}
