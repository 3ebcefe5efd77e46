//! Main Entrypoint for the Blocks Console Client
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment and CLI flags.
//! 2. Initializing logging.
//! 3. Opening the chat session against the configured origin.
//! 4. Forwarding terminal input to the session until the connection ends.

mod config;
mod input;
mod ui;

use anyhow::Context;
use clap::Parser;
use config::Config;
use input::InputLine;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tracing::{error, info};
use ui::ConsoleUi;

/// Terminal client for a blocks chat server.
#[derive(Parser, Debug)]
#[command(name = "blocks-console", version, about)]
struct Cli {
    /// Origin of the chat host, e.g. https://chat.example.com
    #[arg(long)]
    origin: Option<String>,

    /// Answer choose prompts automatically instead of waiting for input
    #[arg(long)]
    automatic: bool,
}

/// Listens for the `Ctrl+C` signal to shut the client down.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal. Shutting down...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let cli = Cli::parse();
    let config = Config::from_env()
        .context("Failed to load configuration")?
        .apply(cli.origin.as_deref(), cli.automatic)?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    // --- 3. Open the Session ---
    let ui = Arc::new(ConsoleUi::new(config.automatic));
    info!(
        endpoint = %config.endpoint.url(),
        automatic = config.automatic,
        "connecting to chat server"
    );
    let (session, mut pump) = blocks_client::connect(&config.endpoint, ui).await?;

    // --- 4. Forward Input Until the Connection Ends ---
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            finished = &mut pump => {
                match finished {
                    Ok(Ok(())) => info!("session ended"),
                    Ok(Err(e)) => error!(error = ?e, "session terminated with error"),
                    Err(e) => error!(error = ?e, "session task failed"),
                }
                break;
            }
            line = lines.next_line() => match line.context("failed to read terminal input")? {
                Some(line) => match input::classify(&line) {
                    InputLine::Choice(index) => session.select_option(index).await,
                    InputLine::Text(text) => session.submit_input(&text).await,
                    InputLine::Empty => {}
                },
                None => break,
            },
            _ = shutdown_signal() => break,
        }
    }

    Ok(())
}
