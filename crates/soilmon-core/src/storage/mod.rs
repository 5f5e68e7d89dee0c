//! Retained-memory ring of moisture records.
//!
//! - [`record`]: 8-byte layout and checksum
//! - [`region`]: slot accessor trait and geometry
//! - [`selector`]: startup choice of the first slot to write
//! - [`scheduler`]: hourly rotation of the write cursor
//! - [`report`]: per-slot diagnostics

pub mod record;
pub mod region;
pub mod report;
pub mod scheduler;
pub mod selector;

#[cfg(test)]
pub(crate) mod faulty;

pub use record::{RECORD_SIZE, Record, checksum};
pub use region::{
    ALIGNMENT_UNIT, MAX_SLOTS, MemoryRegion, REGION_CAPACITY, RegionError, SLOT_STRIDE,
    SlotStorage, check_offset, next_offset,
};
pub use report::{SlotReport, diagnose};
pub use scheduler::{LogError, RotationScheduler, SchedulerState, TickOutcome};
pub use selector::{find_oldest_offset, newest_record, newest_record_until};
