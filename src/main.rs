use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

use medcore::coordinator::Coordinator;
use medcore::domain::{Activity, Message, MessageRole};
use medcore::tools::ToolCatalog;

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;

fn setup_logging(level: Option<&str>, verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("medcore")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("medcore.log");

    // Log to a file so the chat on stdout stays clean
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG wins over the configured level
    let default_level = if verbose { "debug" } else { level.unwrap_or("info") };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn build_coordinator(config: &Config) -> Coordinator {
    let coordinator = Coordinator::from_config(config.llm.to_gemini_config())
        .with_reset_delay(config.activity.reset_delay());
    if !coordinator.is_initialized() {
        eprintln!(
            "{} no API key found in ${}; messages will not be routed",
            "Warning:".yellow(),
            config.llm.api_key_env
        );
    }
    coordinator
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        None => run_chat(config).await,
        Some(Commands::Send { message }) => handle_send_command(&message.join(" "), config).await,
        Some(Commands::Tools { detailed }) => {
            handle_tools_command(*detailed);
            Ok(())
        }
    }
}

async fn run_chat(config: &Config) -> Result<()> {
    info!("Launching interactive chat");
    let mut coordinator = build_coordinator(config);
    coordinator.greet(config.chat.greeting.clone());
    if let Some(greeting) = coordinator.log().last() {
        print_message(greeting);
    }
    println!("{}", "Type /help for commands.".dimmed());

    let watcher = spawn_activity_watcher(&coordinator);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} ", "you>".bold());
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        match text {
            "/quit" | "/exit" => break,
            "/help" => print_help(),
            "/clear" => {
                coordinator.new_conversation();
                println!("{}", "Conversation cleared.".dimmed());
            }
            "/history" => {
                for message in coordinator.log().messages() {
                    print_message(message);
                }
            }
            _ => {
                coordinator.submit(text).await;
                if let Some(answer) = coordinator.log().last() {
                    print_message(answer);
                }
            }
        }
    }

    watcher.abort();
    let usage = coordinator.usage();
    info!("Chat ended: {} input / {} output tokens", usage.input_tokens, usage.output_tokens);
    Ok(())
}

/// Print activity changes as they are published
fn spawn_activity_watcher(coordinator: &Coordinator) -> tokio::task::JoinHandle<()> {
    let mut rx = coordinator.notifier().subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let activity = *rx.borrow_and_update();
            match activity {
                Activity::Idle => {}
                Activity::Coordinating => println!("{}", "  [Coordinator analyzing request...]".dimmed()),
                Activity::Tool(agent) => println!("{}", format!("  [Routed to {}]", agent.label()).cyan()),
            }
        }
    })
}

async fn handle_send_command(message: &str, config: &Config) -> Result<()> {
    info!("One-shot send ({} chars)", message.len());
    let mut coordinator = build_coordinator(config).with_reset_delay(std::time::Duration::ZERO);
    let outcome = coordinator.route(message).await;

    let responder = outcome.invoked_tool.map(|a| a.label()).unwrap_or("Coordinator");
    println!("{} {}", format!("[{}]", responder).green(), outcome.text);
    Ok(())
}

fn handle_tools_command(detailed: bool) {
    let catalog = ToolCatalog::hospital();
    for tool in catalog.iter() {
        println!("{} - {}", tool.name().bold(), tool.description);
        if detailed {
            for param in &tool.params {
                let marker = if param.required { "required".red() } else { "optional".dimmed() };
                println!("    {} ({}): {}", param.name, marker, param.description);
            }
        }
    }
}

fn print_message(message: &Message) {
    match message.role {
        MessageRole::User => println!("{} {}", "you>".bold(), message.content),
        MessageRole::Assistant => {
            let label = message.responder.map(|r| r.label()).unwrap_or("Coordinator");
            println!("{} {}", format!("[{}]", label).green().bold(), message.content);
        }
    }
}

fn print_help() {
    println!("{}", "Commands:".bold());
    println!("  /history  show the conversation so far");
    println!("  /clear    start a new conversation");
    println!("  /quit     exit");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(config.log_level.as_deref(), cli.is_verbose()).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
