//! Shared types for the headband telemetry pipeline.
//!
//! This crate is the leaf of the workspace: it defines the sensor modalities
//! with their fixed channel sets and wire layouts, the notification type the
//! device link delivers, and the error taxonomy used by the decoding and
//! buffering layers.

pub mod error;
pub mod frame;
pub mod modality;

pub use error::{BufferError, ClockError, DecodeError};
pub use frame::Notification;
pub use modality::Modality;
