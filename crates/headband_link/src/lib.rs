//! Device-link seam for the headband.
//!
//! The wireless transport itself (discovery, pairing, GATT subscription) is
//! an external collaborator behind the [`DeviceLink`] trait. This crate owns
//! the control handshake with its bounded retry policy, the cancellable
//! notification-ingest task, and a mock link for development without
//! hardware.

pub mod control;
pub mod link;
pub mod mock;
pub mod session;

pub use control::ControlCommand;
pub use link::{wall_clock_seconds, DeviceLink, LinkError};
pub use mock::MockLink;
pub use session::{RetryPolicy, StreamSession};
