//! Command-line argument parsing for AtendentePro
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// AtendentePro - multi-agent customer support over client templates
#[derive(Parser, Debug)]
#[command(name = "atendente")]
#[command(version)]
#[command(about = "Multi-agent customer support chat driven by YAML templates", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Template directory (overrides the configured one)
    #[arg(short, long)]
    pub templates: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand; interactive chat when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Interactive chat
    Chat {
        /// Starting agent
        #[arg(short, long, default_value = "triage")]
        agent: String,
    },

    /// Embed the knowledge documents and write the embedding store
    Index,

    /// Ask the knowledge base one question
    Ask {
        question: String,
    },

    /// Evaluate a message against an agent's scope
    Check {
        message: String,

        /// Agent config key
        #[arg(short, long, default_value = "triage_agent")]
        agent: String,
    },

    /// Print an agent's instructions
    Prompt {
        agent: String,
    },

    /// List agents and their handoff targets
    Agents,

    /// Answer a question about a long document (txt, md, pdf, docx) within the token budget
    Analyze {
        file: PathBuf,

        #[arg(long)]
        question: String,

        /// System prompt for every call
        #[arg(long)]
        system_prompt: Option<String>,

        /// Answer when the document has no text
        #[arg(long, default_value = "")]
        default: String,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Chat {
            agent: "triage".to_string(),
        }
    }
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Subcommand to run, chat by default
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or_default()
    }
}

impl Verbosity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Default `tracing` filter when `RUST_LOG` is unset
    pub fn log_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "atendente=info",
            Verbosity::VeryVerbose => "atendente=debug",
        }
    }

    /// Check if should show progress bars
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if should show run events (agent changes, tool calls)
    pub fn show_events(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if should show the token summary after each turn
    pub fn show_usage(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_default_command_is_chat() {
        let args = parse(&["atendente"]);
        assert_eq!(
            args.command(),
            Commands::Chat {
                agent: "triage".to_string()
            }
        );
        assert_eq!(args.verbosity(), Verbosity::Normal);
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(parse(&["atendente", "-q"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["atendente", "-v"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["atendente", "-vv"]).verbosity(), Verbosity::VeryVerbose);
        assert_eq!(Verbosity::VeryVerbose.log_filter(), "atendente=debug");
    }

    #[test]
    fn test_check_subcommand() {
        let args = parse(&["atendente", "check", "2x + 5 = 11", "--agent", "confirmation_agent"]);
        assert_eq!(
            args.command(),
            Commands::Check {
                message: "2x + 5 = 11".to_string(),
                agent: "confirmation_agent".to_string()
            }
        );
    }

    #[test]
    fn test_analyze_requires_question() {
        assert!(Args::try_parse_from(["atendente", "analyze", "doc.txt"]).is_err());
        let args = parse(&["atendente", "analyze", "doc.txt", "--question", "Qual o prazo?"]);
        assert!(matches!(args.command(), Commands::Analyze { .. }));
    }

    #[test]
    fn test_chat_with_agent() {
        let args = parse(&["atendente", "chat", "--agent", "knowledge"]);
        assert_eq!(
            args.command(),
            Commands::Chat {
                agent: "knowledge".to_string()
            }
        );
    }
}
