//! Fixed-capacity rolling history for one modality.
//!
//! All channels of a modality share one timestamp sequence and are appended
//! and evicted in lockstep, so index `i` refers to the same instant in every
//! channel. Eviction is oldest-first and O(1) amortized (`VecDeque` fronts,
//! never index-0 removal on a `Vec`).

use std::collections::VecDeque;

use telemetry_types::{BufferError, Modality};

pub const DEFAULT_CAPACITY: usize = 500;

/// Rolling (timestamp, per-channel value) history for one modality.
#[derive(Debug)]
pub struct ModalityBuffer {
    modality: Modality,
    capacity: usize,
    timestamps: VecDeque<f64>,
    channels: Vec<VecDeque<f32>>,
    /// Frames appended since the last clear, for rate/status reporting.
    frames_seen: u64,
}

impl ModalityBuffer {
    pub fn new(modality: Modality) -> Self {
        Self::with_capacity(modality, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(modality: Modality, capacity: usize) -> Self {
        assert!(capacity > 0, "buffer capacity must be non-zero");
        Self {
            modality,
            capacity,
            timestamps: VecDeque::with_capacity(capacity + 1),
            channels: (0..modality.channel_count())
                .map(|_| VecDeque::with_capacity(capacity + 1))
                .collect(),
            frames_seen: 0,
        }
    }

    /// Append one decoded frame: the timestamp once, one value per channel,
    /// then evict the oldest entry everywhere if capacity is exceeded.
    ///
    /// This is the only mutator of sample state; `values` must hold exactly
    /// one value per declared channel.
    pub fn append(&mut self, timestamp: f64, values: &[f32]) -> Result<(), BufferError> {
        if values.len() != self.channels.len() {
            return Err(BufferError::ChannelMismatch {
                modality: self.modality,
                expected: self.channels.len(),
                got: values.len(),
            });
        }

        self.timestamps.push_back(timestamp);
        for (channel, &value) in self.channels.iter_mut().zip(values) {
            channel.push_back(value);
        }

        if self.timestamps.len() > self.capacity {
            self.timestamps.pop_front();
            for channel in &mut self.channels {
                channel.pop_front();
            }
        }

        self.frames_seen += 1;
        Ok(())
    }

    pub fn modality(&self) -> Modality {
        self.modality
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of buffered samples; identical for every channel.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    pub fn timestamps(&self) -> &VecDeque<f64> {
        &self.timestamps
    }

    pub fn channel(&self, index: usize) -> Option<&VecDeque<f32>> {
        self.channels.get(index)
    }

    /// Most recent (timestamp, value) for one channel index.
    pub fn latest(&self, channel: usize) -> Option<(f64, f32)> {
        let timestamp = *self.timestamps.back()?;
        let value = *self.channels.get(channel)?.back()?;
        Some((timestamp, value))
    }

    /// Drop all buffered samples and the frame counter. Capacity and
    /// channel layout are preserved.
    pub fn clear(&mut self) {
        self.timestamps.clear();
        for channel in &mut self.channels {
            channel.clear();
        }
        self.frames_seen = 0;
    }
}
