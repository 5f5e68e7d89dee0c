//! Application state tying the region to its collaborators.
//!
//! [`MoistureLogger`] is what a control loop owns: build it once at boot with
//! [`MoistureLogger::start`], then call [`MoistureLogger::tick`] every
//! iteration and [`MoistureLogger::diagnostics`] whenever something wants to
//! look at the ring. Faults are logged and reported as
//! [`TickOutcome::Skipped`]; nothing here panics or blocks.

use heapless::Vec;
use log::{info, warn};

use crate::clock::TimeSource;
use crate::config::LoggerConfig;
use crate::sensors::MoistureSource;
use crate::storage::{
    MAX_SLOTS, Record, RotationScheduler, SlotReport, SlotStorage, diagnose, find_oldest_offset,
};

pub use crate::storage::TickOutcome;

pub struct MoistureLogger<R, C, S>
where
    R: SlotStorage,
    C: TimeSource,
    S: MoistureSource,
{
    region: R,
    clock: C,
    sensor: S,
    scheduler: RotationScheduler,
}

impl<R, C, S> MoistureLogger<R, C, S>
where
    R: SlotStorage,
    C: TimeSource,
    S: MoistureSource,
{
    /// Pick the starting slot and perform the startup write.
    ///
    /// Without a clock the scan treats every valid slot as older than "now",
    /// so the globally oldest one is chosen. A failed startup write is retried
    /// by the following ticks.
    pub fn start(region: R, mut clock: C, mut sensor: S, config: LoggerConfig) -> Self {
        let now = clock.now().unwrap_or_else(|e| {
            warn!("Scanning region without a clock: {}", e);
            u32::MAX
        });

        let start_offset = find_oldest_offset(&region, now);
        info!("Oldest offset is {}", start_offset);

        let mut scheduler = RotationScheduler::new(config, start_offset);
        let mut region = region;
        if let Err(e) = scheduler.seed(&mut region, &mut clock, &mut sensor) {
            warn!("Startup write at slot {} failed: {}", start_offset, e);
        }

        Self {
            region,
            clock,
            sensor,
            scheduler,
        }
    }

    /// Run one scheduler step.
    pub fn tick(&mut self) -> TickOutcome {
        match self
            .scheduler
            .tick(&mut self.region, &mut self.clock, &mut self.sensor)
        {
            Ok(outcome) => outcome,
            Err(reason) => {
                warn!(
                    "Skipping tick at slot {}: {}",
                    self.scheduler.cursor(),
                    reason
                );
                TickOutcome::Skipped { reason }
            }
        }
    }

    /// Per-slot state of the whole region.
    pub fn diagnostics(&self) -> Vec<SlotReport, MAX_SLOTS> {
        diagnose(&self.region)
    }

    /// Most recent reading, for a gauge.
    pub fn current(&self) -> Option<Record> {
        self.scheduler.last_record()
    }

    pub fn cursor(&self) -> usize {
        self.scheduler.cursor()
    }

    pub fn scheduler(&self) -> &RotationScheduler {
        &self.scheduler
    }

    pub fn region(&self) -> &R {
        &self.region
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// Give the region back, e.g. to persist it before a reset.
    pub fn into_region(self) -> R {
        self.region
    }
}
