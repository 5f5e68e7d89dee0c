//! Time source collaborator.
//!
//! The core never fetches or validates time itself; it asks a [`TimeSource`]
//! once per operation and skips the operation when none is available.

use thiserror_no_std::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    #[error("time source unavailable")]
    Unavailable,
    #[error("time source not synchronized yet")]
    NotSynchronized,
}

/// Wall clock in seconds since the Unix epoch.
pub trait TimeSource {
    fn now(&mut self) -> Result<u32, ClockError>;
}

/// Clock that only moves when told to.
///
/// Drives the simulator and the tests; `None` models a time source that has
/// not synchronized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualClock {
    now: Option<u32>,
}

impl ManualClock {
    pub const fn new(now: u32) -> Self {
        Self { now: Some(now) }
    }

    /// A clock that has never synchronized.
    pub const fn unsynchronized() -> Self {
        Self { now: None }
    }

    pub fn set(&mut self, now: u32) {
        self.now = Some(now);
    }

    /// Move the clock forward by `secs`, saturating at `u32::MAX`.
    pub fn advance(&mut self, secs: u32) {
        if let Some(now) = self.now.as_mut() {
            *now = now.saturating_add(secs);
        }
    }

    /// Drop synchronization, e.g. to model a lost network clock.
    pub fn lose_sync(&mut self) {
        self.now = None;
    }
}

impl TimeSource for ManualClock {
    fn now(&mut self) -> Result<u32, ClockError> {
        self.now.ok_or(ClockError::NotSynchronized)
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &mut T {
    fn now(&mut self) -> Result<u32, ClockError> {
        (**self).now()
    }
}
