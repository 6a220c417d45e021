//! Headband telemetry daemon.
//!
//! Wires the device link to the telemetry store, runs the render tick, and
//! exports the buffered session as CSV on shutdown.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use headband_link::{DeviceLink, MockLink, StreamSession};
use telemetry_core::{export, TelemetryStore};

mod config;
mod render;

use config::load_config;
use render::{render_loop, LogSink};

#[derive(Parser)]
#[command(name = "headband_daemon", about = "Headband telemetry streaming daemon")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(long, default_value = "./config.json")]
    config: PathBuf,

    /// Use synthetic data. Required until a hardware transport is built in.
    #[arg(long)]
    mock: bool,

    /// Stop after this many seconds instead of waiting for ctrl-c.
    #[arg(long)]
    duration: Option<f64>,

    /// Skip the CSV export on shutdown.
    #[arg(long)]
    no_export: bool,
}

/// Select the device link for this run. Only the mock transport is built
/// in today, so running without `--mock` is an error rather than a silent
/// fallback.
fn build_link(mock: bool) -> anyhow::Result<Box<dyn DeviceLink>> {
    if !mock {
        anyhow::bail!("no hardware transport is built in; run with --mock");
    }
    Ok(Box::new(MockLink::new()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "headband_daemon=info,headband_link=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    tracing::info!("headband daemon starting");

    let store = Arc::new(TelemetryStore::with_capacity(config.buffer_capacity));
    let mut session = StreamSession::new(build_link(cli.mock)?, Arc::clone(&store));
    session.start().await?;

    let tick_interval = Duration::from_millis(config.tick_interval_ms);
    let render_cancel = CancellationToken::new();
    let render_task = tokio::spawn(render_loop(
        Arc::clone(&store),
        Box::new(LogSink::new(tick_interval)),
        tick_interval,
        config.window_seconds,
        render_cancel.clone(),
    ));

    match cli.duration {
        Some(seconds) => {
            tokio::time::sleep(Duration::from_secs_f64(seconds)).await;
            tracing::info!(seconds, "run duration elapsed");
        }
        None => {
            tokio::signal::ctrl_c().await?;
            tracing::info!("ctrl-c received, shutting down");
        }
    }

    render_cancel.cancel();
    let _ = render_task.await;

    // Export before stop(): stopping clears the buffers.
    if !cli.no_export {
        let dir = PathBuf::from(&config.export_directory);
        match export::export_session(&store, &dir) {
            Ok(paths) => tracing::info!(files = paths.len(), "session exported"),
            Err(err) => tracing::error!(%err, "session export failed"),
        }
    }

    session.stop().await?;
    tracing::info!("headband daemon stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_selection_requires_the_mock_flag() {
        let err = build_link(false).unwrap_err();
        assert!(err.to_string().contains("--mock"));
        assert!(build_link(true).is_ok());
    }
}
