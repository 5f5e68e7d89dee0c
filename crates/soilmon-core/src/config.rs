//! Logger configuration.
//!
//! Region geometry is fixed at compile time (see [`crate::storage`]); only the
//! rotation period and probe calibration are tunable at runtime.

use serde::{Deserialize, Serialize};

/// Seconds between rotations in the reference deployment
pub const ROTATION_INTERVAL_SECS: u32 = 3600;

/// Raw probe reading when sitting in water
pub const WET_RAW: u16 = 400;

/// Raw distance from [`WET_RAW`] to a probe held in dry air (900)
pub const DRY_SPAN: u16 = 500;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct LoggerConfig {
    /// A new slot is written once the last record is strictly older than this
    pub rotation_interval_secs: u32,
    pub calibration: MoistureCalibration,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            rotation_interval_secs: ROTATION_INTERVAL_SECS,
            calibration: MoistureCalibration::default(),
        }
    }
}

/// Constants of the raw-to-percent transform, see
/// [`crate::sensors::normalize_moisture`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct MoistureCalibration {
    pub wet_raw: u16,
    pub span: u16,
}

impl Default for MoistureCalibration {
    fn default() -> Self {
        Self {
            wet_raw: WET_RAW,
            span: DRY_SPAN,
        }
    }
}
