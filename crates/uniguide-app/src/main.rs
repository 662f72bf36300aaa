//! UniGuide application binary - composition root.
//!
//! 1. Parse CLI args and load configuration from TOML
//! 2. Install the tracing subscriber (stderr)
//! 3. Load the university catalog (JSON seed or built-in sample)
//! 4. Build the query dispatcher and a chat session
//! 5. Run the terminal chat loop over stdin

mod cli;

use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use uniguide_chat::{ChatSession, QueryDispatcher, TurnOutcome};
use uniguide_core::config::UniGuideConfig;
use uniguide_core::provider::InMemoryCatalog;
use uniguide_core::types::Message;

use cli::CliArgs;

/// One line of terminal input, interpreted.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Quit,
    NewChat,
    Submit(String),
    Invalid(String),
    Empty,
}

fn parse_command(line: &str, chips: &[String]) -> Command {
    let line = line.trim();
    match line {
        "" => Command::Empty,
        "/quit" | "/exit" => Command::Quit,
        "/new" => Command::NewChat,
        _ => match line.strip_prefix('/') {
            Some(rest) => match rest.parse::<usize>() {
                Ok(n) if (1..=9).contains(&n) => match chips.get(n - 1) {
                    Some(chip) => Command::Submit(chip.clone()),
                    None => Command::Invalid(format!("There is no suggestion {}.", n)),
                },
                _ => Command::Invalid(format!(
                    "Unknown command \"{}\". Use /new, /1../9, or /quit.",
                    line
                )),
            },
            None => Command::Submit(line.to_string()),
        },
    }
}

/// Print an assistant message and return its suggestion chips.
fn print_assistant(message: &Message) -> Vec<String> {
    println!("UniGuide: {}", message.content);
    let chips = message.suggestions.clone().unwrap_or_default();
    for (i, chip) in chips.iter().take(9).enumerate() {
        println!("  [/{}] {}", i + 1, chip);
    }
    chips
}

fn prompt() -> std::io::Result<()> {
    print!("> ");
    std::io::stdout().flush()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config. Loaded before tracing so the configured level can apply.
    let config_file = args.resolve_config_path();
    let (mut config, config_error) = UniGuideConfig::load_or_fallback(&config_file);

    // Tracing, on stderr so the transcript on stdout stays clean.
    let filter = args.resolve_log_filter(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&filter)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting UniGuide v{}", env!("CARGO_PKG_VERSION"));
    match config_error {
        None => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Some(e) => tracing::info!(
            path = %config_file.display(),
            error = %e,
            "No usable configuration file, using defaults"
        ),
    }

    config.chat.response_delay_ms = args.resolve_delay_ms(config.chat.response_delay_ms);

    // Catalog.
    let catalog = match args.resolve_catalog_path(config.catalog.path.as_deref()) {
        Some(path) => match InMemoryCatalog::from_json_file(&path) {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to load catalog");
                return Err(e.into());
            }
        },
        None => {
            tracing::info!("Using built-in sample catalog");
            InMemoryCatalog::sample()
        }
    };

    // Engine and session.
    let dispatcher = Arc::new(QueryDispatcher::with_defaults(Arc::new(catalog), &config.chat)?);
    let session = ChatSession::new(dispatcher, &config.chat);
    tracing::debug!(
        delay_ms = config.chat.response_delay_ms,
        timeout_ms = config.chat.provider_timeout_ms,
        "Chat session ready"
    );

    // === Chat loop ===

    let mut chips = Vec::new();
    if let Some(greeting) = session.messages().first() {
        chips = print_assistant(greeting);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line, &chips) {
            Command::Quit => break,
            Command::Empty => {}
            Command::Invalid(msg) => println!("{}", msg),
            Command::NewChat => {
                session.reset();
                println!("--- New chat ---");
                chips = session
                    .messages()
                    .first()
                    .map(print_assistant)
                    .unwrap_or_default();
            }
            Command::Submit(text) => match session.submit(&text) {
                Ok(pending) => {
                    if session.is_typing() {
                        println!("UniGuide is typing...");
                    }
                    match pending.wait().await {
                        TurnOutcome::Delivered(reply) => chips = print_assistant(&reply),
                        TurnOutcome::Discarded => {}
                    }
                }
                Err(e) => println!("{}", e),
            },
        }
        prompt()?;
    }

    tracing::info!("UniGuide exiting");
    Ok(())
}
