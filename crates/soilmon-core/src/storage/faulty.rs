//! Region double with injectable medium faults.

use super::record::Record;
use super::region::{MemoryRegion, RegionError, SlotStorage};

/// Memory region whose reads at one offset, or whose writes, can be made to fail.
#[derive(Debug, Clone, Default)]
pub struct FaultyRegion<const N: usize> {
    pub inner: MemoryRegion<N>,
    pub fail_writes: bool,
    pub fail_reads_at: Option<usize>,
}

impl<const N: usize> FaultyRegion<N> {
    pub fn new(inner: MemoryRegion<N>) -> Self {
        Self {
            inner,
            fail_writes: false,
            fail_reads_at: None,
        }
    }
}

impl<const N: usize> SlotStorage for FaultyRegion<N> {
    fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    fn read_slot(&self, offset: usize) -> Result<Record, RegionError> {
        if self.fail_reads_at == Some(offset) {
            return Err(RegionError::Fault { offset });
        }
        self.inner.read_slot(offset)
    }

    fn write_slot(&mut self, offset: usize, record: &Record) -> Result<(), RegionError> {
        if self.fail_writes {
            return Err(RegionError::Fault { offset });
        }
        self.inner.write_slot(offset, record)
    }
}
