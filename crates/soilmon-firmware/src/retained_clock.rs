//! Wall clock that survives soft resets without a network time source.
//!
//! Time is `base + uptime`. The base is the newest valid record still in the
//! retained region, or the build-time epoch after power loss, whichever is
//! later. Rotation only needs coarse elapsed time, so the drift this
//! introduces across resets is acceptable.
//!
//! Records more than [`RESUME_WINDOW_SECS`] past the build epoch are ignored:
//! after power loss a garbage slot occasionally verifies, and its random
//! timestamp would otherwise become the clock.

use embassy_time::Instant;
use log::info;
use soilmon_core::clock::{ClockError, TimeSource};
use soilmon_core::storage::{SlotStorage, newest_record_until};

/// How far past the build epoch a retained timestamp may be (five years)
pub const RESUME_WINDOW_SECS: u32 = 5 * 365 * 24 * 60 * 60;

pub struct RetainedClock {
    base: u32,
    boot: Instant,
}

impl RetainedClock {
    pub fn resume<R: SlotStorage + ?Sized>(region: &R, build_epoch: u32) -> Self {
        let latest = build_epoch.saturating_add(RESUME_WINDOW_SECS);
        let base = match newest_record_until(region, latest) {
            Some((offset, record)) if record.timestamp > build_epoch => {
                info!(
                    "Resuming clock from slot {} at {}",
                    offset, record.timestamp
                );
                record.timestamp
            }
            _ => {
                info!("Starting clock from build epoch {}", build_epoch);
                build_epoch
            }
        };

        Self {
            base,
            boot: Instant::now(),
        }
    }
}

impl TimeSource for RetainedClock {
    fn now(&mut self) -> Result<u32, ClockError> {
        let uptime = self.boot.elapsed().as_secs();
        let uptime = u32::try_from(uptime).map_err(|_| ClockError::Unavailable)?;
        Ok(self.base.saturating_add(uptime))
    }
}
