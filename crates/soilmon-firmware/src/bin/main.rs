#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_hal::clock::CpuClock;
use esp_hal::timer::timg::TimerGroup;
use log::info;

use soilmon_core::{LoggerConfig, MoistureLogger};
use soilmon_firmware::adc_probe::AdcProbe;
use soilmon_firmware::retained_clock::RetainedClock;
use soilmon_firmware::rtc_region::RtcRegion;

/// Seconds between scheduler ticks
const TICK_INTERVAL_SECS: u64 = 1;

/// Ticks between diagnostic dumps (ten minutes)
const REPORT_EVERY_TICKS: u32 = 600;

const BUILD_EPOCH: u32 = match u32::from_str_radix(env!("SOILMON_BASE_EPOCH"), 10) {
    Ok(epoch) => epoch,
    Err(_) => 0,
};

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Embassy initialized!");

    let region = RtcRegion::take().expect("RTC region claimed twice");
    let clock = RetainedClock::resume(&region, BUILD_EPOCH);
    let probe = AdcProbe::new(peripherals.ADC1, peripherals.GPIO1);

    let mut logger = MoistureLogger::start(region, clock, probe, LoggerConfig::default());

    let mut ticks: u32 = 0;
    loop {
        // Rotation completes inside tick() before the report below can run.
        logger.tick();

        if ticks % REPORT_EVERY_TICKS == 0 {
            for slot in logger.diagnostics() {
                info!("{}", slot);
            }
            if let Some(record) = logger.current() {
                info!("Current moisture: {}", record.value);
            }
        }
        ticks = ticks.wrapping_add(1);

        Timer::after(Duration::from_secs(TICK_INTERVAL_SECS)).await;
    }
}
