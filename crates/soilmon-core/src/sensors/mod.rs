//! Sensor collaborator and reading normalization.

mod moisture;

pub use moisture::*;

use thiserror_no_std::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    #[error("sensor {sensor} unavailable")]
    Unavailable { sensor: &'static str },
    #[error("sensor {sensor} read failed: {details}")]
    ReadFailed {
        sensor: &'static str,
        details: &'static str,
    },
}

/// Source of raw moisture probe readings.
///
/// Readings are in ADC counts on the 10-bit scale the calibration constants
/// assume.
pub trait MoistureSource {
    fn read_raw(&mut self) -> Result<u16, SensorError>;
}

impl<S: MoistureSource + ?Sized> MoistureSource for &mut S {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        (**self).read_raw()
    }
}
