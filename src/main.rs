//! EnvLog Firmware — Main Entry Point
//!
//! Hexagonal architecture around one blocking acquisition loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  HardwareAdapter       SdCardStorage    SerialConsole        │
//! │  (Sensor+Clock+Indic.) (StoragePort)    (ConsolePort)        │
//! │  SharedBusSwitch       TimeAdapter                           │
//! │  (BusControlPort)      (TimePort)                            │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ────────────────        │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │            LoggerService (pure logic)              │      │
//! │  │  BusArbiter · Formatter · DualSink                 │      │
//! │  └────────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod config;
mod error;
mod pins;

pub mod app;
mod adapters;
mod drivers;
mod sensors;

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{info, warn};

use adapters::bus::SharedBusSwitch;
use adapters::console::SerialConsole;
use adapters::hardware::HardwareAdapter;
use adapters::sd_card::SdCardStorage;
use adapters::time::TimeAdapter;
use app::cycle::LoggerService;
use config::LoggerConfig;
use drivers::status_led::IndicatorLed;
use sensors::SensorHub;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;
    }

    info!("EnvLog v{} starting", env!("CARGO_PKG_VERSION"));

    // ── 2. Peripheral init — degraded on failure, never fatal ─
    if let Err(e) = drivers::hw_init::init_peripherals() {
        warn!("HAL init failed ({}), sensors will read degraded", e);
    }

    let config = LoggerConfig::default();

    // ── 3. Sensor hub + per-device init ───────────────────────
    let mut hub = SensorHub::new(&config);
    if let Err(e) = hub.clock.init() {
        warn!("RTC init failed ({}), timestamps fall back to uptime", e);
    }
    if let Err(e) = hub.barometer.init() {
        warn!("BMP280 init failed ({}), pressure fields log NaN", e);
    }
    if let Err(e) = hub.co2.init() {
        warn!("SCD30 init failed ({}), CO2 fields carry last value", e);
    }

    // ── 4. SD card mount (once; failures retry per-cycle Open) ─
    #[cfg(target_os = "espidf")]
    let (sd_mounted, _fatfs) = match mount_sd_card() {
        Ok(fs) => (true, Some(fs)),
        Err(e) => {
            warn!("SD mount failed ({}), cycles will report open failures", e);
            (false, None)
        }
    };
    #[cfg(not(target_os = "espidf"))]
    let sd_mounted = true;

    // ── 5. Adapters + service ─────────────────────────────────
    // The bus switch is constructed after the mount so the shared line
    // starts in the released (probe-safe) state.
    let mut hw = HardwareAdapter::new(hub, IndicatorLed::new(), TimeAdapter::new());
    let mut bus = SharedBusSwitch::new();
    let mut storage = SdCardStorage::new(config.log_path, sd_mounted);
    let mut console = SerialConsole::new();
    let mut time = TimeAdapter::new();

    let mut service = LoggerService::new(config);
    service.announce(&mut console);

    info!("Entering acquisition loop");

    // ── 6. Acquisition loop — runs until power-off ────────────
    loop {
        let outcome = service.run_cycle(&mut hw, &mut bus, &mut storage, &mut console, &mut time);
        time.delay_ms(service.wait_ms(&outcome));
    }
}

/// Bring up the SPI bus, the SD card, and the FAT mount at `/sdcard`.
/// The returned handle keeps the volume mounted for the process lifetime.
///
/// Pin numbers follow `pins.rs`; the HAL claims them as typed peripherals.
#[cfg(target_os = "espidf")]
fn mount_sd_card() -> Result<impl Sized> {
    use esp_idf_hal::gpio::AnyIOPin;
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_hal::sd::{spi::SdSpiHostDriver, SdCardConfiguration, SdCardDriver};
    use esp_idf_hal::spi::{config::DriverConfig, SpiDriver};
    use esp_idf_svc::fs::fatfs::Fatfs;
    use esp_idf_svc::io::vfs::MountedFatfs;

    let p = Peripherals::take()?;
    let spi_driver = SpiDriver::new(
        p.spi2,
        p.pins.gpio12, // SD_SCK_GPIO
        p.pins.gpio11, // SD_MOSI_GPIO
        Some(p.pins.gpio13), // SHARED_MISO_1W_GPIO
        &DriverConfig::default(),
    )?;
    let sd_spi = SdSpiHostDriver::new(
        spi_driver,
        Some(p.pins.gpio10), // SD_CS_GPIO
        AnyIOPin::none(),
        AnyIOPin::none(),
        None,
        None,
    )?;
    let card = SdCardDriver::new_spi(sd_spi, &SdCardConfiguration::new())?;
    let mounted = MountedFatfs::mount(Fatfs::new_sdcard(0, card)?, "/sdcard", 2)?;
    Ok(mounted)
}
