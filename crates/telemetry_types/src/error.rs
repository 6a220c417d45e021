//! Error taxonomy for the decode and buffer layers.
//!
//! Decode and buffer errors are local and recoverable: a malformed frame is
//! logged and dropped, the stream continues. Only link-level failures (see
//! `headband_link`) are surfaced to the user.

use serde::{Deserialize, Serialize};

use crate::modality::Modality;

/// A notification payload could not be decoded into samples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum DecodeError {
    /// Frame shorter than the modality's minimum length. The frame is
    /// dropped whole; no buffer or clock state changes.
    #[error("{modality} frame truncated: got {len} bytes, need {required}")]
    TruncatedFrame {
        modality: Modality,
        len: usize,
        required: usize,
    },
}

/// An aggregator precondition was violated.
///
/// This is a programming-error-class fault: the codec always produces one
/// value per declared channel, so a mismatch means a caller bypassed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum BufferError {
    #[error("{modality} append expects {expected} channel values, got {got}")]
    ChannelMismatch {
        modality: Modality,
        expected: usize,
        got: usize,
    },
}

/// Session clock queried before its origin exists.
///
/// Callers treat this as "no data yet", not a user-visible failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ClockError {
    #[error("session clock not started")]
    NotStarted,
}
