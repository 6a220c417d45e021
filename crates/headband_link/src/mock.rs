//! A hardware-free device link producing synthetic frames.
//!
//! Generates plausible waveforms at roughly the headband's notification
//! rates: a 10 Hz alpha-band sine with noise for EEG, gravity on the
//! accelerometer Z axis, near-zero gyro drift, and a ~1.2 Hz pulse for PPG.
//! Useful for driving the daemon and the render tick without a device.

use async_trait::async_trait;
use bytes::Bytes;
use rand::Rng;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use telemetry_types::{Modality, Notification};

use crate::control::ControlCommand;
use crate::link::{wall_clock_seconds, DeviceLink, LinkError};

const EEG_FRAME_INTERVAL_MS: u64 = 20;
/// Motion and PPG notifications arrive at a fraction of the EEG rate.
const SLOW_FRAME_DIVISOR: u64 = 3;

#[derive(Debug)]
pub struct MockLink {
    connected: bool,
    started: bool,
    generator: Option<CancellationToken>,
}

impl MockLink {
    pub fn new() -> Self {
        Self {
            connected: false,
            started: false,
            generator: None,
        }
    }

    /// True between START and STOP control writes.
    pub fn is_streaming(&self) -> bool {
        self.started
    }
}

impl Default for MockLink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceLink for MockLink {
    async fn connect(&mut self) -> Result<(), LinkError> {
        self.connected = true;
        debug!("mock link connected");
        Ok(())
    }

    async fn write_control(&mut self, command: ControlCommand) -> Result<(), LinkError> {
        if !self.connected {
            return Err(LinkError::NotConnected);
        }
        match command {
            ControlCommand::Start => self.started = true,
            ControlCommand::Stop => self.started = false,
            ControlCommand::SetPreset => {}
        }
        Ok(())
    }

    async fn subscribe(&mut self) -> Result<mpsc::Receiver<Notification>, LinkError> {
        if !self.connected {
            return Err(LinkError::NotConnected);
        }
        let (tx, rx) = mpsc::channel(64);
        let cancel = CancellationToken::new();
        self.generator = Some(cancel.clone());
        tokio::spawn(generate_frames(tx, cancel));
        Ok(rx)
    }

    async fn disconnect(&mut self) -> Result<(), LinkError> {
        if let Some(cancel) = self.generator.take() {
            cancel.cancel();
        }
        self.connected = false;
        self.started = false;
        debug!("mock link disconnected");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

async fn generate_frames(tx: mpsc::Sender<Notification>, cancel: CancellationToken) {
    let mut interval =
        tokio::time::interval(std::time::Duration::from_millis(EEG_FRAME_INTERVAL_MS));
    let mut tick: u64 = 0;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let now = wall_clock_seconds();
        let mut frames = vec![(Modality::Eeg, eeg_frame(now))];
        if tick % SLOW_FRAME_DIVISOR == 0 {
            frames.push((Modality::Accelerometer, motion_frame(acc_raw(now))));
            frames.push((Modality::Gyroscope, motion_frame(gyro_raw())));
            frames.push((Modality::Ppg, motion_frame(ppg_raw(now))));
        }
        tick += 1;

        for (modality, payload) in frames {
            let note = Notification::new(modality, Bytes::from(payload), now);
            // Send fails once the receiver is dropped; stop generating.
            if tx.send(note).await.is_err() {
                return;
            }
        }
    }
}

/// 20-byte EEG frame: four 5-byte slots, sample in the first two bytes.
fn eeg_frame(now: f64) -> Vec<u8> {
    let mut frame = vec![0u8; 20];
    let alpha = (now * 2.0 * std::f64::consts::PI * 10.0).sin();
    for slot in 0..4 {
        // ~50 uV alpha plus noise, in 0.1 uV counts.
        let noise: f64 = rand::thread_rng().gen_range(-40.0..40.0);
        let counts = (alpha * 500.0 + noise) as i16;
        frame[slot * 5..slot * 5 + 2].copy_from_slice(&counts.to_le_bytes());
    }
    frame
}

/// 6-byte frame of three little-endian i16 values.
fn motion_frame(raw: [i16; 3]) -> Vec<u8> {
    let mut frame = vec![0u8; 6];
    for (i, v) in raw.iter().enumerate() {
        frame[i * 2..i * 2 + 2].copy_from_slice(&v.to_le_bytes());
    }
    frame
}

fn acc_raw(now: f64) -> [i16; 3] {
    let mut rng = rand::thread_rng();
    let sway = (now * 2.0 * std::f64::consts::PI * 0.3).sin();
    [
        (sway * 800.0) as i16 + rng.gen_range(-50..50),
        rng.gen_range(-50..50),
        // Gravity: 1 g on Z at the +/-2 g scale.
        16384 + rng.gen_range(-100..100),
    ]
}

fn gyro_raw() -> [i16; 3] {
    let mut rng = rand::thread_rng();
    [
        rng.gen_range(-30..30),
        rng.gen_range(-30..30),
        rng.gen_range(-30..30),
    ]
}

fn ppg_raw(now: f64) -> [i16; 3] {
    let mut rng = rand::thread_rng();
    let pulse = (now * 2.0 * std::f64::consts::PI * 1.2).sin().max(0.0);
    let base = (pulse * 800.0) as i16;
    [
        base + rng.gen_range(-20..20),
        base / 2 + rng.gen_range(-20..20),
        base / 3 + rng.gen_range(-20..20),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_frames_satisfy_the_layouts() {
        let eeg = eeg_frame(1.25);
        assert_eq!(eeg.len(), Modality::Eeg.min_frame_len());
        assert_eq!(motion_frame(acc_raw(1.25)).len(), 6);
        assert_eq!(motion_frame(gyro_raw()).len(), 6);
        assert_eq!(motion_frame(ppg_raw(1.25)).len(), 6);
    }

    #[tokio::test]
    async fn control_writes_require_a_connection() {
        let mut link = MockLink::new();
        assert!(matches!(
            link.write_control(ControlCommand::Start).await,
            Err(LinkError::NotConnected)
        ));
        link.connect().await.unwrap();
        link.write_control(ControlCommand::Start).await.unwrap();
        assert!(link.is_streaming());
        link.write_control(ControlCommand::Stop).await.unwrap();
        assert!(!link.is_streaming());
    }
}
