//! Interactive chat loop
//!
//! `Conversation` runs one user message through the agent network and
//! applies the guardrail policy. `ReplSession` wraps it with readline
//! input, slash commands and terminal output.

pub mod commands;
pub mod display;
pub mod input;
pub mod session;

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use crate::agent::{AgentKind, AgentNetwork, RunEvent, Runner};
use crate::errors::AtendenteError;
use crate::guardrails::{GuardrailMessages, MessageKind};
use crate::repl::commands::{is_command, Command};
pub use crate::repl::display::DisplayManager;
use crate::repl::input::{is_exit, InputHandler};
pub use crate::repl::session::ChatSession;

/// What happened to one user message
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Reply {
        agent: AgentKind,
        text: String,
        events: Vec<RunEvent>,
    },
    /// A guardrail blocked the message
    Blocked { title: String, message: String },
    /// The run failed; the message was dropped from history
    Failed { message: String, error: String },
}

/// Agent network plus conversation state
pub struct Conversation {
    runner: Runner,
    network: Arc<AgentNetwork>,
    messages: GuardrailMessages,
    session: ChatSession,
}

impl Conversation {
    pub fn new(runner: Runner, network: Arc<AgentNetwork>, messages: GuardrailMessages, start: AgentKind) -> Self {
        Self {
            runner,
            network,
            messages,
            session: ChatSession::new(start),
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ChatSession {
        &mut self.session
    }

    /// Send one message to the current agent
    #[tracing::instrument(name = "chat_turn", skip_all, fields(agent = self.session.current_agent().key()))]
    pub async fn send(&mut self, text: &str) -> TurnOutcome {
        self.session.push_user(text);
        let agent = self.session.current_agent();
        let input = self.session.input();

        let result = self
            .runner
            .run(&self.network, agent, input, self.session.context_mut())
            .await;

        match result {
            Ok(result) => {
                self.session.apply_result(&result);
                TurnOutcome::Reply {
                    agent: result.last_agent,
                    text: result.final_output,
                    events: result.events,
                }
            }
            Err(AtendenteError::GuardrailTripwire { agent, verdict }) => {
                tracing::info!(
                    agent = %agent,
                    guardrail = %verdict.guardrail,
                    reasoning = %verdict.output.reasoning,
                    "message blocked"
                );
                let settings = &self.messages.settings;
                let short = self.messages.out_of_scope(Some(false)).to_string();
                self.session
                    .apply_guardrail_trip(settings.add_to_conversation.then_some(short.as_str()));
                TurnOutcome::Blocked {
                    title: self.messages.title(MessageKind::OutOfScope).to_string(),
                    message: self.messages.out_of_scope(Some(true)).to_string(),
                }
            }
            Err(e) => {
                tracing::error!("run failed: {}", e);
                self.session.apply_failure();
                TurnOutcome::Failed {
                    message: self.messages.error_fallback(None).to_string(),
                    error: e.to_string(),
                }
            }
        }
    }

    pub fn network(&self) -> &AgentNetwork {
        &self.network
    }
}

/// Terminal front end
pub struct ReplSession {
    input: InputHandler,
    display: DisplayManager,
    conversation: Conversation,
}

impl ReplSession {
    pub fn new(conversation: Conversation, display: DisplayManager, history_file: Option<PathBuf>) -> Result<Self> {
        let input = match history_file {
            Some(path) => InputHandler::with_history(path)?,
            None => InputHandler::new()?,
        };
        Ok(Self {
            input,
            display,
            conversation,
        })
    }

    pub fn show_welcome(&self, version: &str, model: &str) {
        let agent = self.conversation.session().current_agent();
        self.display.show_banner(version, model, agent.display_name());
    }

    /// Read-eval-print until exit or EOF
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let Some(line) = self.input.read_line()? else {
                self.display.show_goodbye();
                break;
            };
            if line.is_empty() {
                continue;
            }
            if is_exit(&line) {
                break;
            }
            if is_command(&line) {
                if !self.execute(commands::parse(&line))? {
                    break;
                }
                continue;
            }

            let spinner = self.display.start_thinking();
            let outcome = self.conversation.send(&line).await;
            spinner.finish_and_clear();
            self.show_outcome(outcome);
        }

        if let Err(e) = self.input.save_history() {
            tracing::warn!("could not save history: {}", e);
        }
        Ok(())
    }

    fn show_outcome(&self, outcome: TurnOutcome) {
        match outcome {
            TurnOutcome::Reply { agent, text, events } => {
                self.display.show_events(&events);
                self.display.show_reply(agent.display_name(), &text);
            }
            TurnOutcome::Blocked { title, message } => self.display.show_guardrail(&title, &message),
            TurnOutcome::Failed { message, error } => {
                self.display.show_error(&error);
                self.display.show_info(&message);
            }
        }
    }

    /// Returns false when the loop should end
    fn execute(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Help => self.display.show_help(&commands::help_lines()),
            Command::Agent { name: None } => {
                let agent = self.conversation.session().current_agent();
                self.display.show_info(&format!("Agente atual: {}", agent.display_name()));
            }
            Command::Agent { name: Some(name) } => match AgentKind::parse(&name) {
                Ok(kind) => {
                    self.conversation.session_mut().set_agent(kind);
                    self.display.show_info(&format!("Agente atual: {}", kind.display_name()));
                }
                Err(e) => self.display.show_error(&e.to_string()),
            },
            Command::Agents => {
                self.display.show_section("Agentes");
                for line in commands::agent_table() {
                    println!("  {}", line);
                }
            }
            Command::Context => {
                self.display.show_section("Contexto");
                println!("{}", self.conversation.session().describe_context());
            }
            Command::Status => println!("{}", self.conversation.session().telemetry().summary()),
            Command::Reset => {
                self.conversation.session_mut().reset();
                self.display.show_info("Conversa reiniciada.");
            }
            Command::Clear => self.display.clear_screen()?,
            Command::Exit => return Ok(false),
            Command::Unknown { input } => {
                self.display.show_error(&format!("Comando desconhecido: {}", input));
            }
        }
        Ok(true)
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }
}
