use std::{io, path::PathBuf, thread};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{parse_endpoint, ChatSession, WsTransport};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod input;
mod terminal;

use config::{load_settings, DEFAULT_CONFIG_FILE};
use terminal::TerminalView;

/// Terminal chat client for the relay server.
#[derive(Parser, Debug)]
struct Args {
    /// Relay endpoint; overrides the config file and environment.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut settings = load_settings(&config_path, args.config.is_some(), |key| {
        std::env::var(key).ok()
    })?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    let endpoint = parse_endpoint(&settings.server_url)
        .with_context(|| format!("invalid server url '{}'", settings.server_url))?;

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let transport = WsTransport::connect(endpoint, events_tx.clone());
    info!(endpoint = %transport.endpoint(), "chat session starting");

    thread::Builder::new()
        .name("stdin".into())
        .spawn(move || input::forward_lines(io::stdin().lock(), events_tx))
        .context("failed to start input thread")?;

    let session = ChatSession::new(transport, TerminalView::new(io::stdout()));
    tokio::select! {
        _ = session.run(events_rx) => info!("chat session ended"),
        _ = tokio::signal::ctrl_c() => info!("interrupted"),
    }
    Ok(())
}
