//! Slot-addressed access to the retained memory region.
//!
//! Offsets are byte offsets. The medium is addressed in 4-byte units and a
//! record takes two of them, so the only legal offsets are multiples of
//! [`SLOT_STRIDE`] in `0..=capacity - SLOT_STRIDE`. Anything else is rejected
//! with [`RegionError::OutOfBounds`] or [`RegionError::Misaligned`] before the
//! medium is touched.

use thiserror_no_std::Error;

use super::record::{RECORD_SIZE, Record};

/// Alignment unit of the retained medium in bytes
pub const ALIGNMENT_UNIT: usize = 4;

/// Distance between consecutive slots (two alignment units)
pub const SLOT_STRIDE: usize = 2 * ALIGNMENT_UNIT;

/// Capacity of the reference region in bytes
pub const REGION_CAPACITY: usize = 128;

/// Largest number of slots any supported region may hold.
///
/// Bounds the diagnostic buffers; 512 bytes is the largest retained user
/// region on the supported targets.
pub const MAX_SLOTS: usize = 512 / SLOT_STRIDE;

const _: () = assert!(RECORD_SIZE <= SLOT_STRIDE);

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionError {
    #[error("offset {offset} is past the last slot of a {capacity} byte region")]
    OutOfBounds { offset: usize, capacity: usize },
    #[error("offset {offset} is not a multiple of the slot stride")]
    Misaligned { offset: usize },
    #[error("medium fault at offset {offset}")]
    Fault { offset: usize },
}

/// Read/write one record at a slot offset.
///
/// Implementations only report medium-level failures. A read that returns
/// garbage is still a successful read; callers decide validity with
/// [`Record::verify`].
pub trait SlotStorage {
    /// Total size of the region in bytes
    fn capacity(&self) -> usize;

    /// Read the record stored at `offset`.
    fn read_slot(&self, offset: usize) -> Result<Record, RegionError>;

    /// Overwrite the slot at `offset` with `record`.
    fn write_slot(&mut self, offset: usize, record: &Record) -> Result<(), RegionError>;

    /// Number of whole slots in the region.
    fn slot_count(&self) -> usize {
        self.capacity() / SLOT_STRIDE
    }

    /// Offset of the last slot; rotation wraps to 0 after it.
    fn last_offset(&self) -> usize {
        self.slot_count().saturating_sub(1) * SLOT_STRIDE
    }

    /// Every slot offset in increasing order.
    fn offsets(&self) -> impl Iterator<Item = usize> {
        (0..self.slot_count()).map(|slot| slot * SLOT_STRIDE)
    }
}

/// Reject offsets that do not name a slot inside a region of `capacity` bytes.
pub fn check_offset(offset: usize, capacity: usize) -> Result<(), RegionError> {
    if offset % SLOT_STRIDE != 0 {
        return Err(RegionError::Misaligned { offset });
    }
    if offset
        .checked_add(SLOT_STRIDE)
        .is_none_or(|end| end > capacity)
    {
        return Err(RegionError::OutOfBounds { offset, capacity });
    }
    Ok(())
}

/// Offset of the slot after `offset`, wrapping to 0 past the last slot.
pub fn next_offset(offset: usize, capacity: usize) -> usize {
    match offset.checked_add(SLOT_STRIDE) {
        Some(next) if check_offset(next, capacity).is_ok() => next,
        _ => 0,
    }
}

/// Byte-array backed region.
///
/// The simulator persists its bytes between runs to emulate soft resets, and
/// tests use it as the retained medium.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRegion<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> MemoryRegion<N> {
    const VALID_GEOMETRY: () = assert!(N >= SLOT_STRIDE && N % SLOT_STRIDE == 0);

    /// A zeroed region, as found after power loss.
    pub const fn new() -> Self {
        Self::from_bytes([0; N])
    }

    /// Wrap previously retained bytes.
    pub const fn from_bytes(bytes: [u8; N]) -> Self {
        let () = Self::VALID_GEOMETRY;
        Self { bytes }
    }

    /// Raw region contents.
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.bytes
    }

    /// Mutable raw contents, for fault injection.
    pub fn as_bytes_mut(&mut self) -> &mut [u8; N] {
        &mut self.bytes
    }
}

impl<const N: usize> Default for MemoryRegion<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SlotStorage for MemoryRegion<N> {
    fn capacity(&self) -> usize {
        N
    }

    fn read_slot(&self, offset: usize) -> Result<Record, RegionError> {
        check_offset(offset, N)?;
        let mut slot = [0u8; RECORD_SIZE];
        slot.copy_from_slice(&self.bytes[offset..offset + RECORD_SIZE]);
        Ok(Record::from_bytes(&slot))
    }

    fn write_slot(&mut self, offset: usize, record: &Record) -> Result<(), RegionError> {
        check_offset(offset, N)?;
        self.bytes[offset..offset + RECORD_SIZE].copy_from_slice(&record.to_bytes());
        Ok(())
    }
}
