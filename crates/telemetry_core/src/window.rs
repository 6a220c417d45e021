//! Time-windowed queries over a modality buffer.
//!
//! Timestamps are monotonically non-decreasing, so the visible range
//! `[max(0, now - window), now]` is a contiguous run of indices found by
//! binary search. Queries return an owned snapshot: the render tick never
//! holds a borrow into the live buffer.

use std::collections::VecDeque;

use telemetry_types::Modality;

use crate::buffer::ModalityBuffer;

/// Owned slice of recent samples for every channel of a modality.
///
/// `timestamps` is shared by all channels; `channels[i]` is aligned with it
/// and ordered per [`Modality::channel_names`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModalityWindow {
    pub modality: Modality,
    pub timestamps: Vec<f64>,
    pub channels: Vec<Vec<f32>>,
}

impl ModalityWindow {
    pub fn empty(modality: Modality) -> Self {
        Self {
            modality,
            timestamps: Vec::new(),
            channels: vec![Vec::new(); modality.channel_count()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Values for a channel by name.
    pub fn channel(&self, name: &str) -> Option<&[f32]> {
        let index = self.modality.channel_index(name)?;
        self.channels.get(index).map(Vec::as_slice)
    }
}

/// Extract the samples with `visible_start <= t <= visible_end`, inclusive
/// on both ends, for every channel. Empty windows are a normal result, not
/// an error.
pub fn slice(buffer: &ModalityBuffer, now: f64, window_seconds: f64) -> ModalityWindow {
    let timestamps = buffer.timestamps();
    if timestamps.is_empty() {
        return ModalityWindow::empty(buffer.modality());
    }

    let visible_start = (now - window_seconds).max(0.0);
    let visible_end = now;

    let start = partition_point(timestamps, |t| t < visible_start);
    let end = partition_point(timestamps, |t| t <= visible_end);
    if start >= end {
        return ModalityWindow::empty(buffer.modality());
    }

    let modality = buffer.modality();
    let channels = (0..modality.channel_count())
        .map(|ch| {
            buffer
                .channel(ch)
                .map(|values| values.range(start..end).copied().collect())
                .unwrap_or_default()
        })
        .collect();

    ModalityWindow {
        modality,
        timestamps: timestamps.range(start..end).copied().collect(),
        channels,
    }
}

/// First index at which `pred` is false, assuming `pred` is monotone over
/// the deque. `VecDeque` has no `partition_point`, so this is the usual
/// binary search by index.
fn partition_point(deque: &VecDeque<f64>, pred: impl Fn(f64) -> bool) -> usize {
    let mut lo = 0;
    let mut hi = deque.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if pred(deque[mid]) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}
