mod client;
mod config;
mod controller;
mod render;
mod types;
mod view;

use crate::client::StatusClient;
use crate::config::MonitorConfig;
use crate::controller::DashboardController;
use crate::render::{ConsoleRenderer, Renderer};
use crate::view::Screen;
use anyhow::{bail, Result};
use clap::Parser;
use std::io::IsTerminal;
use tracing::info;

#[derive(Parser)]
#[command(name = "tradmon", about = "Terminal status dashboard for the trading bot backend")]
struct Cli {
    /// Fetch status once, print it, then exit
    #[arg(long)]
    once: bool,

    /// Backend base URL (default http://localhost:8000)
    #[arg(long)]
    base_url: Option<String>,

    /// Override poll interval (milliseconds)
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Override per-request timeout (milliseconds)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Load config from a specific .env file
    #[arg(long)]
    config_file: Option<String>,

    /// Append frames instead of redrawing the terminal in place
    #[arg(long)]
    no_clear: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so the panel owns stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = MonitorConfig::from_env_file(cli.config_file.as_deref())?.with_overrides(
        cli.base_url,
        cli.interval_ms,
        cli.timeout_ms,
    )?;

    let client = StatusClient::new(&cfg.base_url, cfg.request_timeout());
    info!(
        "Polling {} every {}ms (timeout {}ms)",
        client.url(),
        cfg.poll_interval_ms,
        cfg.request_timeout_ms
    );

    let stdout = std::io::stdout();
    let clear = !cli.no_clear && stdout.is_terminal();
    let mut renderer = ConsoleRenderer::new(stdout, clear);
    let controller = DashboardController::new(client, cfg.poll_interval());

    if cli.once {
        controller.poll_once().await;
        let state = controller.state();
        renderer.render(&Screen::from_state(&state))?;
        if state.last_snapshot.is_none() {
            bail!("No status available from {}", cfg.base_url);
        }
        return Ok(());
    }

    let mut rx = controller.subscribe();
    let initial = rx.borrow_and_update().clone();
    renderer.render(&Screen::from_state(&initial))?;
    controller.start()?;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                renderer.render(&Screen::from_state(&state))?;
            }
            _ = &mut shutdown => {
                info!("STOP SIGNAL (Ctrl+C)");
                break;
            }
        }
    }

    controller.stop();
    Ok(())
}
