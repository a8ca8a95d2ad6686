//! Legal Buddy terminal client - composition root.
//!
//! 1. Resolve configuration (flags > env > TOML file > defaults)
//! 2. Initialize tracing on stderr
//! 3. Wire the assistant to the HTTP backend
//! 4. Print view events while reading commands from stdin

mod cli;
mod command;
mod render;

use std::sync::Arc;

use buddy_chat::{SchemeAssistant, ViewEvent};
use buddy_core::BuddyConfig;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

use crate::cli::CliArgs;
use crate::command::{Command, HELP};

/// Print every view event until the channel closes.
async fn print_events(mut events: broadcast::Receiver<ViewEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => {
                if let Some(text) = render::format_event(&event) {
                    println!("{text}");
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Terminal fell behind; events dropped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Apply one command. Returns `false` when the user asked to quit.
fn dispatch(assistant: &Arc<SchemeAssistant>, command: Command) -> bool {
    match command {
        Command::Send(text) => {
            let assistant = Arc::clone(assistant);
            tokio::spawn(async move {
                assistant.chat().send_message(&text).await;
            });
        }
        Command::Language(code) => {
            if let Err(e) = assistant.chat().set_language_code(&code) {
                println!("{e}");
            }
        }
        Command::Schemes => {
            let assistant = Arc::clone(assistant);
            tokio::spawn(async move { assistant.catalog().load_all().await });
        }
        Command::Categories => {
            let assistant = Arc::clone(assistant);
            tokio::spawn(async move { assistant.catalog().load_categories().await });
        }
        Command::Category(name) => {
            let assistant = Arc::clone(assistant);
            tokio::spawn(async move { assistant.catalog().filter_by_category(&name).await });
        }
        Command::Search(term) => {
            let assistant = Arc::clone(assistant);
            tokio::spawn(async move { assistant.catalog().filter_by_search(&term).await });
        }
        Command::Select(id) => {
            assistant.catalog().select_id(id);
        }
        Command::Clear => assistant.chat().clear(),
        Command::Help => println!("{HELP}"),
        Command::Quit => return false,
        Command::Invalid(reason) => println!("{reason}\n{HELP}"),
    }
    true
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing so its log level can seed the filter.
    let config_file = args.resolve_config_path();
    let loaded = BuddyConfig::load(&config_file);
    let mut config = loaded.as_ref().cloned().unwrap_or_default();
    args.apply(&mut config);

    // Tracing. RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting Legal Buddy v{}", env!("CARGO_PKG_VERSION"));
    match loaded {
        Ok(_) => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Err(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Configuration unavailable, using defaults"
        ),
    }
    tracing::info!(base_url = %config.endpoint.base_url, "Using endpoint");

    let assistant = Arc::new(SchemeAssistant::connect(&config)?);

    println!("{}\n", render::banner());
    let printer = tokio::spawn(print_events(assistant.subscribe()));
    assistant.start().await;
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !dispatch(&assistant, command::parse(&line)) {
            break;
        }
    }

    tracing::info!("Goodbye");
    printer.abort();
    Ok(())
}
