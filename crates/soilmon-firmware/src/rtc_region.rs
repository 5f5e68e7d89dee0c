//! Slot region backed by RTC fast memory.
//!
//! The buffer is placed in RTC fast RAM and marked persistent, so the
//! bootloader leaves it alone across software and watchdog resets. After
//! power loss its contents are garbage; the record checksums sort that out.

use core::sync::atomic::{AtomicBool, Ordering};

use soilmon_core::storage::{
    RECORD_SIZE, REGION_CAPACITY, Record, RegionError, SlotStorage, check_offset,
};

#[esp_hal::ram(unstable(rtc_fast, persistent))]
static mut RTC_REGION: [u8; REGION_CAPACITY] = [0; REGION_CAPACITY];

static TAKEN: AtomicBool = AtomicBool::new(false);

/// Exclusive handle to the retained region
pub struct RtcRegion {
    _private: (),
}

impl RtcRegion {
    /// Claim the region. Returns `None` if it was already claimed.
    pub fn take() -> Option<Self> {
        if TAKEN.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some(Self { _private: () })
    }
}

impl SlotStorage for RtcRegion {
    fn capacity(&self) -> usize {
        REGION_CAPACITY
    }

    fn read_slot(&self, offset: usize) -> Result<Record, RegionError> {
        check_offset(offset, REGION_CAPACITY)?;

        let mut slot = [0u8; RECORD_SIZE];
        critical_section::with(|_| {
            // Safety: offset is bounds-checked above and the handle is unique,
            // so nothing else touches the buffer while we copy out of it.
            unsafe {
                let base = (&raw const RTC_REGION).cast::<u8>().add(offset);
                core::ptr::copy_nonoverlapping(base, slot.as_mut_ptr(), RECORD_SIZE);
            }
        });

        Ok(Record::from_bytes(&slot))
    }

    fn write_slot(&mut self, offset: usize, record: &Record) -> Result<(), RegionError> {
        check_offset(offset, REGION_CAPACITY)?;

        let bytes = record.to_bytes();
        critical_section::with(|_| {
            // Safety: as in `read_slot`, plus `&mut self` rules out a
            // concurrent reader through this handle.
            unsafe {
                let base = (&raw mut RTC_REGION).cast::<u8>().add(offset);
                core::ptr::copy_nonoverlapping(bytes.as_ptr(), base, RECORD_SIZE);
            }
        });

        Ok(())
    }
}
