//! Keepsake terminal entry point.

use std::error::Error;
use std::sync::Arc;

use keepsake_cli::config::Config;
use keepsake_cli::driver;
use keepsake_cli::terminal::{TerminalPlayback, TerminalSurface};
use keepsake_core::clock::SystemClock;
use keepsake_presentation::domain::aggregates::Presentation;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Read configuration from environment.
    let config = Config::from_env()?;

    // Initialize tracing subscriber. Logs go to stderr, the presentation
    // owns stdout.
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr);
    if config.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::info!(mute = config.mute, "Starting Keepsake");

    let mut presentation = Presentation::new(
        Uuid::new_v4(),
        config.script,
        config.pacing,
        TerminalSurface::new(std::io::stdout()),
        TerminalPlayback::new(config.mute),
        Arc::new(SystemClock),
    )?;

    let lines = BufReader::new(tokio::io::stdin()).lines();
    driver::run(&mut presentation, lines).await?;

    Ok(())
}
