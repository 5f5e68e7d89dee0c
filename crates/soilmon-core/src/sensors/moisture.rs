use crate::config::MoistureCalibration;

use super::{MoistureSource, SensorError};

/// Map a raw probe reading onto the stored byte.
///
/// Computes `clamp(round(100 * (1 - span / (raw - wet_raw))), 0, 255)` with
/// integer arithmetic, rounding half away from zero. With the default
/// calibration a probe in dry air (900) maps to 0.
///
/// The transform has a pole at `raw == wet_raw`. Readings just above it tend to
/// minus infinity and clamp to 0, so the pole itself also yields 0. Readings
/// below `wet_raw` come out above 100 and saturate at 255.
pub fn normalize_moisture(raw: u16, calibration: &MoistureCalibration) -> u8 {
    let mut denominator = i32::from(raw) - i32::from(calibration.wet_raw);
    if denominator == 0 {
        return 0;
    }

    let mut numerator = 100 * (denominator - i32::from(calibration.span));
    if denominator < 0 {
        numerator = -numerator;
        denominator = -denominator;
    }

    let rounded = if numerator >= 0 {
        (2 * numerator + denominator) / (2 * denominator)
    } else {
        -((-2 * numerator + denominator) / (2 * denominator))
    };

    rounded.clamp(0, i32::from(u8::MAX)) as u8
}

/// Probe that returns the same raw reading every time.
///
/// `None` models a disconnected probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedProbe {
    raw: Option<u16>,
}

impl FixedProbe {
    pub const fn new(raw: u16) -> Self {
        Self { raw: Some(raw) }
    }

    pub const fn disconnected() -> Self {
        Self { raw: None }
    }

    pub fn set(&mut self, raw: Option<u16>) {
        self.raw = raw;
    }
}

impl MoistureSource for FixedProbe {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        self.raw
            .ok_or(SensorError::Unavailable { sensor: "fixed probe" })
    }
}
