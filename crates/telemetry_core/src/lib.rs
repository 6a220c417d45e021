//! Telemetry decoding and bounded sliding-window buffering.
//!
//! Data flow: device link -> [`codec::decode`] (raw bytes -> typed values)
//! -> [`clock::SessionClock`] (session-relative timestamp) ->
//! [`buffer::ModalityBuffer`] (lockstep append, oldest-first eviction) ->
//! [`window`] queries on the render tick -> presentation sink.
//!
//! [`store::TelemetryStore`] ties these together behind one reader/writer
//! lock per modality, so the notification-ingest task and the render tick
//! never observe a torn buffer.

pub mod buffer;
pub mod clock;
pub mod codec;
pub mod export;
pub mod store;
pub mod window;

pub use buffer::ModalityBuffer;
pub use clock::SessionClock;
pub use store::{IngestError, TelemetryStore};
pub use window::ModalityWindow;
