//! Hardware-independent core library for soilmon
//!
//! This crate contains the persistence logic for the soilmon moisture logger:
//! an 8-byte checksummed record, a fixed-capacity slot region that survives
//! soft resets, startup slot selection, hourly rotation, and a read-only
//! diagnostic dump of every slot.
//!
//! It is `#![no_std]` so it compiles on both the ESP32-S3 firmware and desktop
//! hosts (for the simulator and tests). Time and sensor readings come in through
//! the [`clock::TimeSource`] and [`sensors::MoistureSource`] traits.

#![no_std]

pub mod app_state;
pub mod clock;
pub mod config;
pub mod sensors;
pub mod storage;

pub use app_state::{MoistureLogger, TickOutcome};
pub use config::{LoggerConfig, MoistureCalibration};
pub use storage::{Record, SlotReport, SlotStorage};
