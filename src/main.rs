//! HOS Log Worker - Hours-of-Service compliant trip schedules
//!
//! This worker connects to NATS and answers trip planning requests from the frontend.

mod cli;
mod config;
mod defaults;
mod handlers;
mod services;
mod types;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tracing::{info, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use cli::{Cli, Command};
use services::hos::{self, RegulatoryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs directory - use LOGS_DIR env var or default to ../logs (relative to worker)
    let logs_dir = std::env::var("LOGS_DIR")
        .unwrap_or_else(|_| "../logs".to_string());
    std::fs::create_dir_all(&logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(
        Rotation::DAILY,
        &logs_dir,
        "worker.log",
    );
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Initialize logging - both stderr and file; stdout is reserved for `plan` output
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,hos_log_worker=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))  // file
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Plan { to_pickup_meters, to_dropoff_meters, cycle_used }) => {
            dotenvy::dotenv().ok();
            let regulatory = RegulatoryConfig::from_env()
                .context("Invalid Hours-of-Service configuration")?;
            run_plan(&regulatory, to_pickup_meters, to_dropoff_meters, cycle_used)
        }
        Some(Command::Serve) | None => serve().await,
    }
}

/// Offline schedule for known leg distances, printed to stdout
fn run_plan(
    regulatory: &RegulatoryConfig,
    to_pickup_meters: f64,
    to_dropoff_meters: f64,
    cycle_used: f64,
) -> Result<()> {
    let steps = hos::generate(to_pickup_meters, to_dropoff_meters, cycle_used, regulatory)?;
    let summary = hos::summarize(&steps);
    info!("Generated {} segments over {} day(s)", steps.len(), summary.day_count);

    let output = json!({
        "steps": steps,
        "summary": summary,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

async fn serve() -> Result<()> {
    info!("Starting HOS Log Worker...");

    // Load configuration
    let config = config::Config::from_env()?;
    info!("Configuration loaded");

    // Connect to NATS (supports optional NATS_USER/NATS_PASSWORD auth).
    let nats_client = match (std::env::var("NATS_USER"), std::env::var("NATS_PASSWORD")) {
        (Ok(user), Ok(password)) if !user.is_empty() => {
            async_nats::ConnectOptions::new()
                .user_and_password(user, password)
                .connect(&config.nats_url)
                .await?
        }
        _ => async_nats::connect(&config.nats_url).await?,
    };
    info!("Connected to NATS at {}", config.nats_url);

    // Start message handlers
    let handler_result = handlers::start_handlers(nats_client, &config).await;

    if let Err(e) = handler_result {
        error!("Handler error: {}", e);
        return Err(e);
    }

    Ok(())
}
