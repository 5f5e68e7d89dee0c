//! Startup slot selection.
//!
//! After a reset the write cursor is lost, so the region is scanned once to
//! pick where the first record goes: the first slot that does not verify, or
//! failing that the slot holding the oldest valid timestamp.

use log::{debug, warn};

use super::record::Record;
use super::region::SlotStorage;

/// Pick the slot the next startup write should overwrite.
///
/// Scans offsets in increasing order. The first slot whose checksum does not
/// verify is returned immediately; an unused slot always beats evicting data.
/// Otherwise the offset of the smallest timestamp strictly older than `now` is
/// returned, or 0 if no slot is older than `now`.
///
/// Slots that cannot be read are skipped: they are neither free nor candidates
/// for eviction.
pub fn find_oldest_offset<R: SlotStorage + ?Sized>(region: &R, now: u32) -> usize {
    let mut best_offset = 0;
    let mut best_timestamp = now;

    for offset in region.offsets() {
        let record = match region.read_slot(offset) {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping unreadable slot during scan: {}", e);
                continue;
            }
        };

        if !record.verify() {
            debug!("Slot {} is free (checksum mismatch)", offset);
            return offset;
        }

        if record.timestamp < best_timestamp {
            best_timestamp = record.timestamp;
            best_offset = offset;
        }
    }

    debug!(
        "No free slot, oldest is {} at timestamp {}",
        best_offset, best_timestamp
    );
    best_offset
}

/// The valid record with the greatest timestamp, with its offset.
pub fn newest_record<R: SlotStorage + ?Sized>(region: &R) -> Option<(usize, Record)> {
    newest_record_until(region, u32::MAX)
}

/// The valid record with the greatest timestamp not after `latest`.
///
/// Used to resume a clock across soft resets when no time source is reachable.
/// After power loss about one garbage slot in 256 verifies by chance, so
/// callers pass the latest timestamp they are prepared to believe.
pub fn newest_record_until<R: SlotStorage + ?Sized>(
    region: &R,
    latest: u32,
) -> Option<(usize, Record)> {
    region
        .offsets()
        .filter_map(|offset| {
            region
                .read_slot(offset)
                .ok()
                .filter(|record| record.verify() && record.timestamp <= latest)
                .map(|record| (offset, record))
        })
        .max_by_key(|(_, record)| record.timestamp)
}
