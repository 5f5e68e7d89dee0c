//! Read-only diagnostic dump of every slot.

use core::fmt::Display;

use heapless::Vec;
use log::warn;

use super::region::{MAX_SLOTS, RegionError, SlotStorage};

/// Decoded state of one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotReport {
    pub offset: usize,
    pub timestamp: u32,
    pub value: u8,
    pub stored_checksum: u8,
    pub computed_checksum: u8,
    pub valid: bool,
    /// Set when the medium could not be read; the other fields are then zero
    pub fault: Option<RegionError>,
}

impl SlotReport {
    fn unreadable(offset: usize, fault: RegionError) -> Self {
        Self {
            offset,
            timestamp: 0,
            value: 0,
            stored_checksum: 0,
            computed_checksum: 0,
            valid: false,
            fault: Some(fault),
        }
    }
}

impl Display for SlotReport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if let Some(fault) = self.fault {
            return write!(f, "{:>4}  unreadable: {}", self.offset, fault);
        }

        write!(
            f,
            "{:>4}  {:>10}  {:>3}  {:02X}  {:02X}  {}",
            self.offset,
            self.timestamp,
            self.value,
            self.stored_checksum,
            self.computed_checksum,
            if self.valid { "valid" } else { "invalid" }
        )
    }
}

/// Report every slot in offset order.
///
/// Never writes to the region, so two calls without an intervening write
/// return identical reports. A slot that cannot be read is reported with its
/// fault and the scan carries on.
pub fn diagnose<R: SlotStorage + ?Sized>(region: &R) -> Vec<SlotReport, MAX_SLOTS> {
    let mut reports = Vec::new();

    if region.slot_count() > MAX_SLOTS {
        warn!(
            "Region has {} slots, reporting only the first {}",
            region.slot_count(),
            MAX_SLOTS
        );
    }

    for offset in region.offsets().take(MAX_SLOTS) {
        let report = match region.read_slot(offset) {
            Ok(record) => SlotReport {
                offset,
                timestamp: record.timestamp,
                value: record.value,
                stored_checksum: record.checksum,
                computed_checksum: record.recomputed_checksum(),
                valid: record.verify(),
                fault: None,
            },
            Err(e) => SlotReport::unreadable(offset, e),
        };

        // Bounded by `take` above
        let _ = reports.push(report);
    }

    reports
}
