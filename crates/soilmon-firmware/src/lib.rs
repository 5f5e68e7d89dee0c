//! ESP32-S3 firmware-specific modules for soilmon
//!
//! Hardware-backed implementations of the core collaborator traits: the
//! retained RTC fast memory region, the moisture probe on ADC1, and a clock
//! that resumes from the region after a soft reset.

#![no_std]

pub mod adc_probe;
pub mod retained_clock;
pub mod rtc_region;
