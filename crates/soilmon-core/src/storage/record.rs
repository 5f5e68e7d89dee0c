//! Record layout and checksum for one retained moisture reading.
//!
//! Binary format (8 bytes, one slot):
//! - checksum: 1 byte (CRC-8 over the timestamp bytes only)
//! - timestamp: 4 bytes (u32, little-endian)
//! - value: 1 byte (normalized moisture)
//! - padding: 2 bytes (zero)
//!
//! The value byte is deliberately outside the checksum. Corrupting it alone is
//! not detectable.

use core::fmt::Display;

use crc::{CRC_8_I_432_1, Crc};

/// Size of one encoded record in bytes
pub const RECORD_SIZE: usize = 8;

/// CRC-8 with the SMBus polynomial (0x07, init 0) and an output XOR of 0x55,
/// so a zeroed slot never verifies.
const CHECKSUM: Crc<u8> = Crc::<u8>::new(&CRC_8_I_432_1);

const CHECKSUM_AT: usize = 0;
const TIMESTAMP_AT: core::ops::Range<usize> = 1..5;
const VALUE_AT: usize = 5;

/// One moisture observation as stored in a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Record {
    /// Checksum as stored; only trustworthy after [`Record::verify`]
    pub checksum: u8,
    /// Seconds since the Unix epoch
    pub timestamp: u32,
    /// Normalized reading, 0-100 in normal operation
    pub value: u8,
}

impl Record {
    /// Build a record, computing its checksum from `timestamp`.
    pub fn encode(timestamp: u32, value: u8) -> Self {
        Self {
            checksum: checksum(timestamp),
            timestamp,
            value,
        }
    }

    /// Whether the stored checksum matches the timestamp.
    pub fn verify(&self) -> bool {
        self.checksum == checksum(self.timestamp)
    }

    /// Checksum recomputed from the stored timestamp.
    pub fn recomputed_checksum(&self) -> u8 {
        checksum(self.timestamp)
    }

    /// Converts the record to its in-region byte layout.
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut bytes = [0u8; RECORD_SIZE];
        bytes[CHECKSUM_AT] = self.checksum;
        bytes[TIMESTAMP_AT].copy_from_slice(&self.timestamp.to_le_bytes());
        bytes[VALUE_AT] = self.value;
        bytes
    }

    /// Decodes a slot's bytes. Never fails; validity is a separate question.
    pub fn from_bytes(bytes: &[u8; RECORD_SIZE]) -> Self {
        let mut timestamp_bytes = [0u8; 4];
        timestamp_bytes.copy_from_slice(&bytes[TIMESTAMP_AT]);

        Self {
            checksum: bytes[CHECKSUM_AT],
            timestamp: u32::from_le_bytes(timestamp_bytes),
            value: bytes[VALUE_AT],
        }
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "[Record] timestamp: {}, moisture: {}, crc: {:02X}",
            self.timestamp, self.value, self.checksum
        )
    }
}

/// Checksum over the little-endian bytes of `timestamp`.
pub fn checksum(timestamp: u32) -> u8 {
    CHECKSUM.checksum(&timestamp.to_le_bytes())
}
