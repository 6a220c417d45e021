//! The render-tick actor.
//!
//! A fixed-rate timer pulls a windowed snapshot per modality from the store
//! and hands the batch to a [`PresentationSink`]. The sink is the external
//! rendering layer's seam; the daemon ships a logging sink that reports
//! live readouts and frame counts.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use headband_link::wall_clock_seconds;
use telemetry_core::{ModalityWindow, TelemetryStore};
use telemetry_types::Modality;

/// Receives one windowed snapshot per modality on every render tick.
pub trait PresentationSink: Send {
    fn present(&mut self, windows: &[ModalityWindow]);
}

/// Drive the render tick until cancelled. Ticks before the first sample
/// arrives are skipped: the session clock has no origin yet, which simply
/// means "no data yet".
pub async fn render_loop(
    store: Arc<TelemetryStore>,
    mut sink: Box<dyn PresentationSink>,
    tick_interval: Duration,
    window_seconds: f64,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(tick_interval);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let Some(now) = store.session_time(wall_clock_seconds()) else {
            debug!("render tick before first sample");
            continue;
        };

        let windows: Vec<ModalityWindow> = Modality::ALL
            .iter()
            .map(|&modality| store.window(modality, now, window_seconds))
            .collect();
        sink.present(&windows);
    }
    info!("render loop stopped");
}

/// Logs the newest value of every channel about once a second.
pub struct LogSink {
    ticks: u64,
    report_every: u64,
}

impl LogSink {
    /// `tick_interval` is the render cadence; reports are throttled to
    /// roughly one per second regardless of it.
    pub fn new(tick_interval: Duration) -> Self {
        let per_second = (1000 / tick_interval.as_millis().max(1)) as u64;
        Self {
            ticks: 0,
            report_every: per_second.max(1),
        }
    }
}

impl PresentationSink for LogSink {
    fn present(&mut self, windows: &[ModalityWindow]) {
        self.ticks += 1;
        if self.ticks % self.report_every != 0 {
            return;
        }
        for window in windows {
            let Some(&latest_time) = window.timestamps.last() else {
                continue;
            };
            let readouts: Vec<String> = window
                .modality
                .channel_names()
                .iter()
                .zip(&window.channels)
                .map(|(name, values)| {
                    let value = values.last().copied().unwrap_or(0.0);
                    format!("{name}={value:.2}{}", window.modality.unit())
                })
                .collect();
            info!(
                modality = %window.modality,
                t = latest_time,
                samples = window.len(),
                "{}",
                readouts.join(" ")
            );
        }
    }
}
