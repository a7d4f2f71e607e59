//! AtendentePro - CLI entry point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::Path;

use atendente::{
    agent::AgentKind,
    bootstrap::{Services, Workspace},
    cli::{Args, Commands, Verbosity},
    config::Settings,
    prompts,
    rag::extract_pages,
    repl::{commands::agent_table, DisplayManager, ReplSession},
    telemetry,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let verbosity = args.verbosity();

    let settings = Settings::load(args.config.clone())?;
    let _tracing = telemetry::init_tracing(verbosity, &settings.telemetry);

    match args.command() {
        Commands::Chat { agent } => {
            let workspace = Workspace::load(settings, args.templates.clone())?;
            run_chat(&workspace, &agent, verbosity).await?;
        }
        Commands::Index => run_index(&settings, verbosity).await?,
        Commands::Ask { question } => run_ask(&settings, &question).await?,
        Commands::Check { message, agent } => {
            let workspace = Workspace::load(settings, args.templates.clone())?;
            run_check(&workspace, &message, &agent).await?;
        }
        Commands::Prompt { agent } => {
            let workspace = Workspace::load(settings, args.templates.clone())?;
            let kind = AgentKind::parse(&agent)?;
            println!("{}", prompts::instructions_for(kind, &workspace.templates));
        }
        Commands::Agents => {
            for line in agent_table() {
                println!("{}", line);
            }
        }
        Commands::Analyze {
            file,
            question,
            system_prompt,
            default,
        } => {
            run_analyze(&settings, &file, &question, system_prompt.as_deref(), &default).await?;
        }
    }

    Ok(())
}

async fn run_chat(workspace: &Workspace, agent: &str, verbosity: Verbosity) -> Result<()> {
    let start = AgentKind::parse(agent)?;
    let services = Services::connect(&workspace.settings)?;
    let conversation = services.conversation(workspace, start)?;

    let display = DisplayManager::new(verbosity.show_events(), verbosity.show_progress());
    let mut repl = ReplSession::new(conversation, display, Some(workspace.settings.history_file()))?;
    repl.show_welcome(env!("CARGO_PKG_VERSION"), &workspace.settings.models.default);
    repl.run().await?;

    if verbosity.show_usage() {
        println!("{}", repl.conversation().session().telemetry().summary());
    }
    Ok(())
}

async fn run_index(settings: &Settings, verbosity: Verbosity) -> Result<()> {
    let services = Services::connect(settings)?;
    let knowledge_dir = settings.knowledge_dir();
    let output = settings.embeddings_file();

    println!("Indexando documentos em {}", knowledge_dir.display());
    let store = services
        .indexer(settings, verbosity.show_progress())
        .build(&knowledge_dir)
        .await?;
    store.save(&output)?;

    println!(
        "{} {} chunks salvos em {}",
        "✓".green(),
        store.len(),
        output.display()
    );
    Ok(())
}

async fn run_ask(settings: &Settings, question: &str) -> Result<()> {
    let services = Services::connect(settings)?;
    let result = services.knowledge_tool(settings).answer(question).await;

    println!("{}", result.answer);
    if !result.sources.is_empty() {
        println!("\n{} {}", "Fontes:".bold(), result.sources.join(", "));
    }
    println!("{} {:.2}", "Confiança:".bold(), result.confidence);
    Ok(())
}

async fn run_check(workspace: &Workspace, message: &str, agent_key: &str) -> Result<()> {
    let services = Services::connect(&workspace.settings)?;
    let integration = services.guardrail_integration(workspace);
    let (should_continue, result) = integration.check_before_agent(message, agent_key).await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    if should_continue {
        println!("{}", "✓ Mensagem dentro do escopo".green());
    } else {
        println!("{}", "✗ Mensagem fora do escopo".red());
        println!("{}", integration.handle_out_of_scope(&result));
    }
    Ok(())
}

async fn run_analyze(
    settings: &Settings,
    file: &Path,
    question: &str,
    system_prompt: Option<&str>,
    default: &str,
) -> Result<()> {
    let pages = extract_pages(file).with_context(|| format!("Failed to read {}", file.display()))?;

    let services = Services::connect(settings)?;
    let system_prompt = system_prompt.unwrap_or("Responda com base apenas no documento fornecido.");
    let answer = services
        .budgeted_query(settings)
        .run(&pages, question, system_prompt, default)
        .await?;

    println!("{}", answer.text);
    println!(
        "\n{}",
        format!("{} páginas, {} chamadas, {} tokens", pages.len(), answer.calls, answer.token_count).dimmed()
    );
    Ok(())
}
