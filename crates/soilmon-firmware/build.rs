//! Build script for soilmon-firmware
//!
//! Exposes `SOILMON_BASE_EPOCH` to the firmware. The value comes from the
//! environment or a `.env` file; without one the build time is used, so a
//! freshly flashed device starts its clock near the flashing date.

use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    let _ = dotenvy::dotenv();
    println!("cargo:rerun-if-changed=.env");
    println!("cargo:rerun-if-env-changed=SOILMON_BASE_EPOCH");

    let epoch = std::env::var("SOILMON_BASE_EPOCH")
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| u32::try_from(elapsed.as_secs()).unwrap_or(u32::MAX))
                .unwrap_or(0)
        });
    println!("cargo:rustc-env=SOILMON_BASE_EPOCH={epoch}");

    println!("cargo:rustc-link-arg=-Tlinkall.x");
}
