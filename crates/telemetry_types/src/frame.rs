//! Raw notification frames as delivered by the device link.

use bytes::Bytes;

use crate::modality::Modality;

/// One raw notification from the headband, prior to decoding.
///
/// The payload is shared (`Bytes`) so the link task can hand frames to the
/// ingest path without copying.
#[derive(Debug, Clone)]
pub struct Notification {
    pub modality: Modality,
    pub payload: Bytes,
    /// Wall-clock receipt time in seconds. The session clock turns this
    /// into a session-relative timestamp.
    pub receipt_time: f64,
}

impl Notification {
    pub fn new(modality: Modality, payload: impl Into<Bytes>, receipt_time: f64) -> Self {
        Self {
            modality,
            payload: payload.into(),
            receipt_time,
        }
    }
}
