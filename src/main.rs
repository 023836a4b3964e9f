#![allow(missing_docs)]

//! Chatbridge: multi-channel conversation bridge daemon and CLI.
//!
//! `start` runs the bridge loop (link the personal account if needed, then
//! keep the cross-channel conversation view fresh). `link` runs just the QR
//! handshake. `status` probes the personal bridge.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::Mutex;
use tracing::{info, warn};

use chatbridge::adapters::official::OfficialAdapter;
use chatbridge::adapters::page::PageAdapter;
use chatbridge::adapters::personal::PersonalAdapter;
use chatbridge::adapters::ChannelAdapter;
use chatbridge::config::BridgeConfig;
use chatbridge::logging;
use chatbridge::providers::official::OfficialClient;
use chatbridge::providers::page::PageClient;
use chatbridge::providers::personal::PersonalClient;
use chatbridge::router::ConversationHub;
use chatbridge::session::{run_login, SessionConnector, SessionPhase};

#[derive(Parser)]
#[command(name = "chatbridge", version, about = "Multi-channel conversation bridge")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the bridge: link the personal account if needed, then keep the
    /// merged conversation view fresh until interrupted.
    Start,
    /// Run the QR link handshake for the personal channel.
    Link,
    /// Probe the personal bridge connection status.
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = BridgeConfig::load().context("failed to load configuration")?;

    match cli.command {
        Command::Start => run_start(&config).await,
        Command::Link => {
            logging::init_oneshot(&config.bridge.log_level);
            run_link(&config).await
        }
        Command::Status => {
            logging::init_oneshot(&config.bridge.log_level);
            run_status(&config).await
        }
    }
}

fn build_hub(config: &BridgeConfig) -> (Arc<PersonalClient>, ConversationHub) {
    let personal_client = Arc::new(PersonalClient::new(config.personal.bridge_url.clone()));
    let official_client = Arc::new(OfficialClient::new(
        config.official.base_url.clone(),
        config.official.access_token.clone(),
    ));
    let page_client = Arc::new(PageClient::new(
        config.page.base_url.clone(),
        config.page.page_id.clone(),
        config.page.access_token.clone(),
    ));

    let adapters: Vec<Arc<dyn ChannelAdapter>> = vec![
        Arc::new(PersonalAdapter::new(Arc::clone(&personal_client))),
        Arc::new(OfficialAdapter::new(official_client)),
        Arc::new(PageAdapter::new(page_client)),
    ];
    (personal_client, ConversationHub::new(adapters))
}

async fn run_status(config: &BridgeConfig) -> Result<()> {
    let client = PersonalClient::new(config.personal.bridge_url.clone());
    let status = client
        .status()
        .await
        .with_context(|| format!("personal bridge unreachable at {}", client.base_url()))?;
    if status.connected {
        println!(
            "connected as {}",
            status.account_id.as_deref().unwrap_or("(unknown account)")
        );
    } else {
        println!("not connected -- run `chatbridge link` to pair a device");
    }
    Ok(())
}

async fn run_link(config: &BridgeConfig) -> Result<()> {
    let client = Arc::new(PersonalClient::new(config.personal.bridge_url.clone()));
    let connector = Arc::new(Mutex::new(SessionConnector::new()));

    let login = tokio::spawn({
        let connector = Arc::clone(&connector);
        let client = Arc::clone(&client);
        async move { run_login(&connector, client).await }
    });

    // Mirror payload changes to stdout while the handshake runs: the QR data
    // URI once it arrives, then every new status or error hint.
    let mut shown = chatbridge::session::QrPayload::default();
    while !login.is_finished() {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let payload = connector.lock().await.payload().clone();
        if payload.image_data_uri != shown.image_data_uri {
            if let Some(ref uri) = payload.image_data_uri {
                println!("scan this QR with the companion device:\n{uri}");
            }
        }
        if payload.status_code != shown.status_code {
            if let Some(ref code) = payload.status_code {
                println!("status: {code}");
            }
        }
        if payload.error_message != shown.error_message {
            if let Some(ref message) = payload.error_message {
                println!("error: {message}");
            }
        }
        shown = payload;
    }

    match login.await {
        Ok(SessionPhase::Connected) => {
            println!("linked successfully");
            Ok(())
        }
        Ok(phase) => Err(anyhow::anyhow!("link did not complete (phase {phase:?})")),
        Err(e) => Err(anyhow::anyhow!("link task failed: {e}")),
    }
}

async fn run_start(config: &BridgeConfig) -> Result<()> {
    let _guard = logging::init_daemon(
        Path::new(&config.bridge.logs_dir),
        &config.bridge.log_level,
    )?;
    info!("chatbridge starting");

    let (personal_client, hub) = build_hub(config);

    if !personal_client.health_check().await.unwrap_or(false) {
        info!("personal account not linked, starting QR handshake");
        let connector = Mutex::new(SessionConnector::new());
        let phase = run_login(&connector, Arc::clone(&personal_client)).await;
        if phase != SessionPhase::Connected {
            warn!(?phase, "personal channel left unlinked, continuing without it");
        }
    }

    let count = hub.refresh_all().await;
    info!(conversations = count, "initial conversation refresh complete");

    let mut ticker = tokio::time::interval(Duration::from_secs(
        config.bridge.refresh_interval_secs.max(1),
    ));
    ticker.tick().await; // first tick fires immediately

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let count = hub.refresh_all().await;
                info!(conversations = count, "conversation refresh complete");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("received shutdown signal");
                break;
            }
        }
    }

    info!("chatbridge shut down cleanly");
    Ok(())
}
