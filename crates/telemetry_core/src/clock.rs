//! Session-relative time.
//!
//! The origin is pinned by the first sample received after a connect and
//! stays fixed until [`SessionClock::reset`], so every stream of the session
//! shares one zero point and relative time restarts at zero per connection.

use telemetry_types::ClockError;

/// Converts wall-clock receipt times into seconds since session start.
#[derive(Debug, Default)]
pub struct SessionClock {
    origin: Option<f64>,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the origin to `receipt_time` if it is not already set.
    /// Subsequent calls are no-ops until [`reset`](Self::reset).
    pub fn start_at(&mut self, receipt_time: f64) {
        if self.origin.is_none() {
            self.origin = Some(receipt_time);
        }
    }

    /// Seconds elapsed between the session origin and `receipt_time`.
    pub fn relative(&self, receipt_time: f64) -> Result<f64, ClockError> {
        match self.origin {
            Some(origin) => Ok(receipt_time - origin),
            None => Err(ClockError::NotStarted),
        }
    }

    pub fn is_started(&self) -> bool {
        self.origin.is_some()
    }

    /// Clear the origin. Called on disconnect so the next connection's
    /// first sample re-pins it.
    pub fn reset(&mut self) {
        self.origin = None;
    }
}
