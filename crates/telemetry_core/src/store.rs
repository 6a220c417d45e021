//! Shared, locked telemetry state.
//!
//! One reader/writer lock per modality: the notification-ingest task takes
//! the write side per frame, the render tick takes the read side per query.
//! Modalities are independent, so there is no global lock. [`ingest`] is the
//! only write path; a frame either fully applies (timestamp plus one value
//! per channel) or touches nothing.
//!
//! [`ingest`]: TelemetryStore::ingest

use std::sync::{Mutex, RwLock};

use tracing::warn;

use telemetry_types::{BufferError, ClockError, DecodeError, Modality, Notification};

use crate::buffer::{ModalityBuffer, DEFAULT_CAPACITY};
use crate::clock::SessionClock;
use crate::codec;
use crate::window::{self, ModalityWindow};

/// A notification could not be applied to the store.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Recoverable: the frame is dropped and the stream continues.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// Invariant violation; should not occur with a correct codec.
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error(transparent)]
    Clock(#[from] ClockError),
}

/// Per-connection telemetry state: one buffer per modality plus the shared
/// session clock.
pub struct TelemetryStore {
    clock: Mutex<SessionClock>,
    buffers: [RwLock<ModalityBuffer>; Modality::ALL.len()],
}

impl TelemetryStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Store whose per-modality buffers each hold up to `capacity` samples.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            clock: Mutex::new(SessionClock::new()),
            buffers: Modality::ALL
                .map(|modality| RwLock::new(ModalityBuffer::with_capacity(modality, capacity))),
        }
    }

    fn buffer(&self, modality: Modality) -> &RwLock<ModalityBuffer> {
        let index = Modality::ALL
            .iter()
            .position(|&m| m == modality)
            .expect("Modality::ALL covers every variant");
        &self.buffers[index]
    }

    /// Decode a notification and append it: codec -> clock -> aggregator.
    ///
    /// Called once per delivered frame by the ingest task. Decoding happens
    /// before any lock is taken, so a truncated frame leaves every buffer
    /// and the clock origin untouched.
    pub fn ingest(&self, note: &Notification) -> Result<(), IngestError> {
        let values = codec::decode(note.modality, &note.payload)?;

        let timestamp = {
            let mut clock = self.clock.lock().unwrap();
            clock.start_at(note.receipt_time);
            clock.relative(note.receipt_time)?
        };

        let mut buffer = self.buffer(note.modality).write().unwrap();
        buffer.append(timestamp, &values)?;
        Ok(())
    }

    /// Windowed snapshot of the trailing `window_seconds` at `now`
    /// (session-relative seconds). Empty when nothing is in range.
    pub fn window(&self, modality: Modality, now: f64, window_seconds: f64) -> ModalityWindow {
        let buffer = self.buffer(modality).read().unwrap();
        window::slice(&buffer, now, window_seconds)
    }

    /// Most recent (timestamp, value) for a named channel, for live
    /// readouts. `None` while no data has arrived or the name is unknown.
    pub fn latest(&self, modality: Modality, channel: &str) -> Option<(f64, f32)> {
        let index = modality.channel_index(channel)?;
        let buffer = self.buffer(modality).read().unwrap();
        buffer.latest(index)
    }

    /// Frames ingested for a modality since connect, for rate reporting.
    pub fn frames_seen(&self, modality: Modality) -> u64 {
        self.buffer(modality).read().unwrap().frames_seen()
    }

    /// Buffered sample count for a modality.
    pub fn len(&self, modality: Modality) -> usize {
        self.buffer(modality).read().unwrap().len()
    }

    pub fn is_empty(&self, modality: Modality) -> bool {
        self.len(modality) == 0
    }

    /// Session-relative seconds for a wall-clock receipt time, if the
    /// session has started. Drives the render tick's `now` argument.
    pub fn session_time(&self, receipt_time: f64) -> Option<f64> {
        self.clock.lock().unwrap().relative(receipt_time).ok()
    }

    /// Run `f` against a modality's buffer under the read lock. Used by the
    /// CSV exporter to stream rows without an intermediate copy.
    pub fn with_buffer<R>(&self, modality: Modality, f: impl FnOnce(&ModalityBuffer) -> R) -> R {
        let buffer = self.buffer(modality).read().unwrap();
        f(&buffer)
    }

    /// Disconnect handling: drop every buffer's contents and reset the
    /// session clock so the next connection restarts relative time at zero.
    pub fn clear(&self) {
        for buffer in &self.buffers {
            buffer.write().unwrap().clear();
        }
        self.clock.lock().unwrap().reset();
    }

    /// Ingest and log-and-drop on recoverable decode failures, per the
    /// stream's propagation policy. Buffer-layer faults still propagate.
    pub fn ingest_lossy(&self, note: &Notification) -> Result<(), IngestError> {
        match self.ingest(note) {
            Err(IngestError::Decode(err)) => {
                warn!(modality = %note.modality, %err, "dropping undecodable frame");
                Ok(())
            }
            other => other,
        }
    }
}

impl Default for TelemetryStore {
    fn default() -> Self {
        Self::new()
    }
}
