use std::sync::Arc;

use anyhow::Context;
use health_bridge_core::Config;
use health_bridge_core::fixture::FixtureProvider;
use health_bridge_plugin::{HealthPlugin, LoggingMiddleware, bridge};
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configure logging from env var `HEALTH_BRIDGE_LOG_LEVEL` (or fallback to `RUST_LOG`, default `info`).
    let log_env = std::env::var("HEALTH_BRIDGE_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());

    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    tracing::info!("health_bridge: log filter: {}", log_env);

    let config = Config::from_env()?;
    let fixture = config
        .fixture_path
        .clone()
        .context("HEALTH_BRIDGE_FIXTURE must point at a JSON health dataset")?;
    let provider = FixtureProvider::from_path(&fixture)?;
    let provider = LoggingMiddleware::new(provider);
    let plugin = Arc::new(HealthPlugin::new(Arc::new(provider), &config));

    tracing::info!(
        platform = ?plugin.platform(),
        concurrency = config.workout_concurrency,
        "health_bridge: serving {} over stdio",
        fixture.display()
    );

    bridge::serve(plugin, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;

    tracing::info!("health_bridge: input closed, shutting down");
    Ok(())
}
