//! Desktop simulator for the soilmon retained-memory moisture log.
//!
//! Each run behaves like one boot of the device. The retained region lives in
//! a file between runs, so running the simulator again is a soft reset; pass
//! `--cold` (or delete the file) to model power loss.
//!
//! A run scans the region for its starting slot, performs the startup write,
//! advances a simulated clock through `--ticks` steps of `--step` seconds, and
//! prints the diagnostic table before saving the region back.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use log::{debug, info};

use soilmon_core::clock::ManualClock;
use soilmon_core::sensors::{MoistureSource, SensorError};
use soilmon_core::storage::{MemoryRegion, REGION_CAPACITY};
use soilmon_core::{LoggerConfig, MoistureLogger, TickOutcome};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Simulate one boot of the soilmon moisture logger
#[derive(Debug, Parser)]
#[command(name = "soilmon-simulator")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// File holding the retained region between runs
    #[arg(long, value_name = "FILE", default_value = "soilmon-region.bin")]
    region: PathBuf,

    /// TOML file overriding the logger configuration
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Simulated epoch seconds at boot (defaults to the host clock)
    #[arg(long, value_name = "EPOCH")]
    start: Option<u32>,

    /// Number of scheduler ticks to run after startup
    #[arg(long, default_value_t = 24)]
    ticks: u32,

    /// Simulated seconds between ticks
    #[arg(long, value_name = "SECS", default_value_t = 900)]
    step: u32,

    /// Ignore the region file, as after power loss
    #[arg(long)]
    cold: bool,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Defaults, then the TOML file, then `SOILMON_` environment variables.
///
/// Nested keys use a double underscore, e.g. `SOILMON_CALIBRATION__WET_RAW`.
fn load_config(path: Option<&Path>) -> Result<LoggerConfig> {
    let mut figment = Figment::new().merge(Serialized::defaults(LoggerConfig::default()));
    if let Some(path) = path {
        figment = figment.merge(Toml::file(path));
    }
    figment = figment.merge(Env::prefixed("SOILMON_").split("__"));

    figment
        .extract()
        .context("failed to load logger configuration")
}

// ---------------------------------------------------------------------------
// Retained region
// ---------------------------------------------------------------------------

type Region = MemoryRegion<REGION_CAPACITY>;

fn load_region(path: &Path, cold: bool) -> Result<Region> {
    if cold {
        info!("Cold start: region zeroed");
        return Ok(Region::new());
    }

    match fs::read(path) {
        Ok(bytes) => {
            let bytes: [u8; REGION_CAPACITY] = bytes.as_slice().try_into().with_context(|| {
                format!(
                    "{} holds {} bytes, expected {}",
                    path.display(),
                    bytes.len(),
                    REGION_CAPACITY
                )
            })?;
            info!("Soft reset: region restored from {}", path.display());
            Ok(Region::from_bytes(bytes))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No region at {}, cold start", path.display());
            Ok(Region::new())
        }
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

fn save_region(path: &Path, region: &Region) -> Result<()> {
    fs::write(path, region.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))
}

// ---------------------------------------------------------------------------
// Mock probe
// ---------------------------------------------------------------------------

/// Synthetic probe drifting between roughly 860 and 1440 raw counts.
struct WaveProbe {
    reads: u32,
}

impl WaveProbe {
    fn new() -> Self {
        Self { reads: 0 }
    }
}

impl MoistureSource for WaveProbe {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        self.reads += 1;
        let t = f64::from(self.reads);
        let raw = 1150.0 + 250.0 * (t / 6.0).sin() + 40.0 * (t / 1.7).cos();
        debug!("Probe read {}: {:.0}", self.reads, raw);
        Ok(raw as u16)
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Whole seconds of `elapsed`, saturating at the end of the `u32` epoch.
fn epoch_secs(elapsed: Duration) -> u32 {
    u32::try_from(elapsed.as_secs()).unwrap_or(u32::MAX)
}

fn host_epoch() -> u32 {
    epoch_secs(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default(),
    )
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    let config = load_config(cli.config.as_deref())?;
    info!(
        "Rotation every {} s, calibration wet={} span={}",
        config.rotation_interval_secs, config.calibration.wet_raw, config.calibration.span
    );

    let region = load_region(&cli.region, cli.cold)?;
    let clock = ManualClock::new(cli.start.unwrap_or_else(host_epoch));

    let mut logger = MoistureLogger::start(region, clock, WaveProbe::new(), config);

    let mut rotations = 0;
    for _ in 0..cli.ticks {
        logger.clock_mut().advance(cli.step);
        if let TickOutcome::Rotated { .. } = logger.tick() {
            rotations += 1;
        }
    }
    info!("{} ticks, {} rotations", cli.ticks, rotations);

    println!(
        "{:>4}  {:>10}  {:>3}  {:>2}  {:>2}  state",
        "slot", "timestamp", "val", "st", "ck"
    );
    for slot in logger.diagnostics() {
        let marker = if slot.offset == logger.cursor() { " <" } else { "" };
        println!("{}{}", slot, marker);
    }
    match logger.current() {
        Some(record) => println!("current moisture: {}", record.value),
        None => println!("current moisture: unknown"),
    }

    save_region(&cli.region, logger.region())
}
