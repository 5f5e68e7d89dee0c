//! Capacitive moisture probe on ADC1.

use esp_hal::Blocking;
use esp_hal::analog::adc::{Adc, AdcConfig, AdcPin, Attenuation};
use esp_hal::peripherals::{ADC1, GPIO1};
use log::debug;
use soilmon_core::sensors::{MoistureSource, SensorError};

/// One-shot conversions give up after this many polls
const MAX_POLLS: u32 = 1000;

/// The S3 converts with 12 bits; the calibration constants assume 10.
const RESOLUTION_SHIFT: u32 = 2;

pub struct AdcProbe<'d> {
    adc: Adc<'d, ADC1<'d>, Blocking>,
    pin: AdcPin<GPIO1<'d>, ADC1<'d>>,
}

impl<'d> AdcProbe<'d> {
    pub fn new(adc1: ADC1<'d>, gpio1: GPIO1<'d>) -> Self {
        let mut config = AdcConfig::new();
        let pin = config.enable_pin(gpio1, Attenuation::_11dB);
        let adc = Adc::new(adc1, config);

        Self { adc, pin }
    }
}

impl MoistureSource for AdcProbe<'_> {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        for _ in 0..MAX_POLLS {
            if let Ok(raw) = self.adc.read_oneshot(&mut self.pin) {
                debug!("Probe raw reading {}", raw);
                return Ok(raw >> RESOLUTION_SHIFT);
            }
        }

        Err(SensorError::ReadFailed {
            sensor: "ADC1 probe",
            details: "conversion did not complete",
        })
    }
}
