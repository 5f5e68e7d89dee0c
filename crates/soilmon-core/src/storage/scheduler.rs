//! Time-driven rotation of the write cursor.
//!
//! The scheduler is ticked by the caller's control loop. Each tick checks
//! whether the last written record is older than the rotation interval and, if
//! so, writes a fresh record to the next slot. The check is level-triggered:
//! a late tick rotates once, never catching up on missed intervals.

use log::{info, warn};
use thiserror_no_std::Error;

use crate::clock::{ClockError, TimeSource};
use crate::config::LoggerConfig;
use crate::sensors::{MoistureSource, SensorError, normalize_moisture};

use super::record::Record;
use super::region::{RegionError, SlotStorage, check_offset, next_offset};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogError {
    #[error("region error: {0}")]
    Region(#[from] RegionError),
    #[error("clock error: {0}")]
    Clock(#[from] ClockError),
    #[error("sensor error: {0}")]
    Sensor(#[from] SensorError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Waiting for the rotation interval to elapse
    Idle,
    /// Writing the next record; never observable between ticks
    Rotating,
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Interval not yet elapsed
    Idle,
    /// The startup write had failed and was retried at the cursor
    Seeded { offset: usize, record: Record },
    /// Cursor advanced and a new record written
    Rotated { offset: usize, record: Record },
    /// A fault stopped the tick; only reported by [`crate::MoistureLogger`]
    Skipped { reason: LogError },
}

/// Owner of the active write cursor.
///
/// The cursor only moves after a successful write, so a failed write is
/// retried at the same offset on the next tick.
#[derive(Debug, Clone)]
pub struct RotationScheduler {
    config: LoggerConfig,
    cursor: usize,
    last_record: Option<Record>,
    state: SchedulerState,
}

impl RotationScheduler {
    /// Start with the cursor at `start_offset`, as chosen by
    /// [`super::find_oldest_offset`]. Nothing is written until [`Self::seed`].
    pub fn new(config: LoggerConfig, start_offset: usize) -> Self {
        Self {
            config,
            cursor: start_offset,
            last_record: None,
            state: SchedulerState::Idle,
        }
    }

    /// Offset of the slot most recently written (or about to be seeded)
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Record most recently written by this scheduler
    pub fn last_record(&self) -> Option<Record> {
        self.last_record
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Unconditional startup write at the cursor.
    pub fn seed<R, C, S>(
        &mut self,
        region: &mut R,
        clock: &mut C,
        sensor: &mut S,
    ) -> Result<Record, LogError>
    where
        R: SlotStorage + ?Sized,
        C: TimeSource + ?Sized,
        S: MoistureSource + ?Sized,
    {
        check_offset(self.cursor, region.capacity())?;
        let now = clock.now()?;
        let record = self.write_fresh(self.cursor, now, region, sensor)?;
        self.last_record = Some(record);
        info!("Seeded slot {}: {}", self.cursor, record);
        Ok(record)
    }

    /// Check the rotation condition and rotate if it holds.
    ///
    /// Until a seed write has succeeded every tick retries it instead.
    pub fn tick<R, C, S>(
        &mut self,
        region: &mut R,
        clock: &mut C,
        sensor: &mut S,
    ) -> Result<TickOutcome, LogError>
    where
        R: SlotStorage + ?Sized,
        C: TimeSource + ?Sized,
        S: MoistureSource + ?Sized,
    {
        let Some(last) = self.last_record else {
            let record = self.seed(region, clock, sensor)?;
            return Ok(TickOutcome::Seeded {
                offset: self.cursor,
                record,
            });
        };

        let now = clock.now()?;
        if !self.rotation_due(&last, now) {
            return Ok(TickOutcome::Idle);
        }

        self.state = SchedulerState::Rotating;
        let offset = next_offset(self.cursor, region.capacity());
        let written = self.write_fresh(offset, now, region, sensor);
        self.state = SchedulerState::Idle;

        let record = written?;
        self.cursor = offset;
        self.last_record = Some(record);
        info!("Rotated to slot {}: {}", offset, record);

        Ok(TickOutcome::Rotated { offset, record })
    }

    /// `now - last.timestamp > interval`; a clock behind the record never rotates.
    fn rotation_due(&self, last: &Record, now: u32) -> bool {
        now.saturating_sub(last.timestamp) > self.config.rotation_interval_secs
    }

    /// Sample, encode and persist one record stamped `timestamp` at `offset`.
    fn write_fresh<R, S>(
        &self,
        offset: usize,
        timestamp: u32,
        region: &mut R,
        sensor: &mut S,
    ) -> Result<Record, LogError>
    where
        R: SlotStorage + ?Sized,
        S: MoistureSource + ?Sized,
    {
        let raw = sensor.read_raw()?;
        let record = Record::encode(
            timestamp,
            normalize_moisture(raw, &self.config.calibration),
        );

        region.write_slot(offset, &record)?;

        match region.read_slot(offset) {
            Ok(stored) if stored == record => {}
            Ok(stored) => warn!("Read-back mismatch at slot {}: {}", offset, stored),
            Err(e) => warn!("Read-back of slot {} failed: {}", offset, e),
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::sensors::FixedProbe;
    use crate::storage::faulty::FaultyRegion;
    use crate::storage::region::{MemoryRegion, SLOT_STRIDE};

    const START: u32 = 1_700_000_000;
    const HOUR: u32 = 3600;

    /// Clock that moves forward one second every time it is read.
    struct SteppingClock {
        next: u32,
    }

    impl TimeSource for SteppingClock {
        fn now(&mut self) -> Result<u32, ClockError> {
            let now = self.next;
            self.next += 1;
            Ok(now)
        }
    }

    fn seeded(
        start_offset: usize,
    ) -> (RotationScheduler, MemoryRegion<32>, ManualClock, FixedProbe) {
        let mut region = MemoryRegion::<32>::new();
        let mut clock = ManualClock::new(START);
        let mut probe = FixedProbe::new(1400);
        let mut scheduler = RotationScheduler::new(LoggerConfig::default(), start_offset);
        scheduler.seed(&mut region, &mut clock, &mut probe).unwrap();
        (scheduler, region, clock, probe)
    }

    #[test]
    fn test_seed_writes_at_start_offset() {
        let (scheduler, region, _, _) = seeded(16);

        let expected = Record::encode(START, 50);
        assert_eq!(scheduler.cursor(), 16);
        assert_eq!(scheduler.last_record(), Some(expected));
        assert_eq!(region.read_slot(16), Ok(expected));
    }

    #[test]
    fn test_no_rotation_at_exact_interval() {
        let (mut scheduler, mut region, mut clock, mut probe) = seeded(0);

        clock.advance(HOUR);
        let outcome = scheduler.tick(&mut region, &mut clock, &mut probe);

        assert_eq!(outcome, Ok(TickOutcome::Idle));
        assert_eq!(scheduler.cursor(), 0);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[test]
    fn test_rotates_after_interval() {
        let (mut scheduler, mut region, mut clock, mut probe) = seeded(0);

        clock.advance(HOUR + 1);
        probe.set(Some(900));
        let outcome = scheduler.tick(&mut region, &mut clock, &mut probe);

        let expected = Record::encode(START + HOUR + 1, 0);
        assert_eq!(
            outcome,
            Ok(TickOutcome::Rotated {
                offset: SLOT_STRIDE,
                record: expected
            })
        );
        assert_eq!(scheduler.cursor(), SLOT_STRIDE);
        assert_eq!(region.read_slot(SLOT_STRIDE), Ok(expected));
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[test]
    fn test_wraps_from_last_slot() {
        let (mut scheduler, mut region, mut clock, mut probe) = seeded(32 - SLOT_STRIDE);

        clock.advance(HOUR + 1);
        scheduler.tick(&mut region, &mut clock, &mut probe).unwrap();

        assert_eq!(scheduler.cursor(), 0);
        assert!(region.read_slot(0).unwrap().verify());
    }

    #[test]
    fn test_one_rotation_per_tick_after_long_delay() {
        let (mut scheduler, mut region, mut clock, mut probe) = seeded(0);

        clock.advance(10 * HOUR);
        scheduler.tick(&mut region, &mut clock, &mut probe).unwrap();
        let second = scheduler.tick(&mut region, &mut clock, &mut probe);

        assert_eq!(scheduler.cursor(), SLOT_STRIDE);
        assert_eq!(second, Ok(TickOutcome::Idle));
    }

    #[test]
    fn test_clock_behind_record_never_rotates() {
        let (mut scheduler, mut region, mut clock, mut probe) = seeded(0);

        clock.set(START - 10 * HOUR);
        let outcome = scheduler.tick(&mut region, &mut clock, &mut probe);

        assert_eq!(outcome, Ok(TickOutcome::Idle));
    }

    #[test]
    fn test_failed_write_keeps_cursor() {
        let mut region = FaultyRegion::new(MemoryRegion::<32>::new());
        let mut clock = ManualClock::new(START);
        let mut probe = FixedProbe::new(1400);
        let mut scheduler = RotationScheduler::new(LoggerConfig::default(), 0);
        scheduler.seed(&mut region, &mut clock, &mut probe).unwrap();

        clock.advance(HOUR + 1);
        region.fail_writes = true;
        let outcome = scheduler.tick(&mut region, &mut clock, &mut probe);

        assert_eq!(
            outcome,
            Err(LogError::Region(RegionError::Fault {
                offset: SLOT_STRIDE
            }))
        );
        assert_eq!(scheduler.cursor(), 0);
        assert_eq!(scheduler.last_record(), Some(Record::encode(START, 50)));
        assert_eq!(scheduler.state(), SchedulerState::Idle);

        region.fail_writes = false;
        let retried = scheduler.tick(&mut region, &mut clock, &mut probe);
        assert!(matches!(
            retried,
            Ok(TickOutcome::Rotated {
                offset: SLOT_STRIDE,
                ..
            })
        ));
    }

    #[test]
    fn test_failed_seed_is_retried_at_same_offset() {
        let mut region = FaultyRegion::new(MemoryRegion::<32>::new());
        region.fail_writes = true;
        let mut clock = ManualClock::new(START);
        let mut probe = FixedProbe::new(1400);
        let mut scheduler = RotationScheduler::new(LoggerConfig::default(), 24);

        assert!(scheduler.seed(&mut region, &mut clock, &mut probe).is_err());
        assert_eq!(scheduler.last_record(), None);

        region.fail_writes = false;
        let outcome = scheduler.tick(&mut region, &mut clock, &mut probe);

        assert!(matches!(outcome, Ok(TickOutcome::Seeded { offset: 24, .. })));
        assert_eq!(scheduler.cursor(), 24);
    }

    #[test]
    fn test_failed_read_back_still_rotates() {
        let mut region = FaultyRegion::new(MemoryRegion::<32>::new());
        let mut clock = ManualClock::new(START);
        let mut probe = FixedProbe::new(1400);
        let mut scheduler = RotationScheduler::new(LoggerConfig::default(), 0);
        scheduler.seed(&mut region, &mut clock, &mut probe).unwrap();

        clock.advance(HOUR + 1);
        region.fail_reads_at = Some(SLOT_STRIDE);
        let outcome = scheduler.tick(&mut region, &mut clock, &mut probe);

        let expected = Record::encode(START + HOUR + 1, 50);
        assert_eq!(
            outcome,
            Ok(TickOutcome::Rotated {
                offset: SLOT_STRIDE,
                record: expected
            })
        );
        assert_eq!(scheduler.cursor(), SLOT_STRIDE);
        assert_eq!(region.inner.read_slot(SLOT_STRIDE), Ok(expected));
    }

    #[test]
    fn test_rotation_stamps_the_time_that_triggered_it() {
        let mut region = MemoryRegion::<32>::new();
        let mut clock = SteppingClock { next: START };
        let mut probe = FixedProbe::new(1400);
        let mut scheduler = RotationScheduler::new(LoggerConfig::default(), 0);

        let seeded = scheduler.seed(&mut region, &mut clock, &mut probe).unwrap();
        assert_eq!(seeded.timestamp, START);

        clock.next = START + HOUR + 1;
        let outcome = scheduler.tick(&mut region, &mut clock, &mut probe);

        assert!(matches!(
            outcome,
            Ok(TickOutcome::Rotated { record, .. }) if record.timestamp == START + HOUR + 1
        ));
        assert_eq!(clock.next, START + HOUR + 2);
    }

    #[test]
    fn test_missing_collaborators_skip_tick() {
        let (mut scheduler, mut region, mut clock, mut probe) = seeded(0);
        let before = region.clone();

        clock.advance(HOUR + 1);
        probe.set(None);
        let outcome = scheduler.tick(&mut region, &mut clock, &mut probe);
        assert!(matches!(outcome, Err(LogError::Sensor(_))));

        clock.lose_sync();
        let outcome = scheduler.tick(&mut region, &mut clock, &mut probe);
        assert_eq!(outcome, Err(LogError::Clock(ClockError::NotSynchronized)));

        assert_eq!(region, before);
        assert_eq!(scheduler.cursor(), 0);
    }

    #[test]
    fn test_custom_interval() {
        let config = LoggerConfig {
            rotation_interval_secs: 60,
            ..LoggerConfig::default()
        };
        let mut region = MemoryRegion::<32>::new();
        let mut clock = ManualClock::new(START);
        let mut probe = FixedProbe::new(1400);
        let mut scheduler = RotationScheduler::new(config, 0);
        scheduler.seed(&mut region, &mut clock, &mut probe).unwrap();

        clock.advance(61);
        assert!(matches!(
            scheduler.tick(&mut region, &mut clock, &mut probe),
            Ok(TickOutcome::Rotated { .. })
        ));
    }

    #[test]
    fn test_seed_rejects_bad_start_offset() {
        let mut region = MemoryRegion::<32>::new();
        let mut scheduler = RotationScheduler::new(LoggerConfig::default(), 32);

        let result = scheduler.seed(
            &mut region,
            &mut ManualClock::new(START),
            &mut FixedProbe::new(1400),
        );

        assert!(matches!(
            result,
            Err(LogError::Region(RegionError::OutOfBounds { .. }))
        ));
    }
}
