//! GPIO / peripheral pin assignments for the EnvLog sensor board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// SD card (SPI2) — storage side of the shared bus
// ---------------------------------------------------------------------------

/// SPI clock to the SD socket.
pub const SD_SCK_GPIO: i32 = 12;
/// SPI MOSI to the SD socket.
pub const SD_MOSI_GPIO: i32 = 11;
/// SPI chip-select, active LOW.  Driven HIGH whenever the shared line is
/// handed to the probe.
pub const SD_CS_GPIO: i32 = 10;

/// Shared line: SD SPI MISO *and* the DS18B20 1-Wire data line.
///
/// The sensor header routes both signals on this one pin, so the SD SPI
/// peripheral and the probe can never be electrically active at the same
/// time.  Ownership is handed back and forth by the bus arbiter.
pub const SHARED_MISO_1W_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// Sensors — dedicated single-wire
// ---------------------------------------------------------------------------

/// DHT22 humidity/temperature data line (own pin, no bus conflict).
pub const DHT_DATA_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Sensors — Analog (ADC1)
// ---------------------------------------------------------------------------

/// GUVA-S12SD UV sensor — analog voltage out.
/// ADC1 channel 4 (GPIO 5 on ESP32-S3).
pub const UV_ADC_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// I²C bus (BMP280 barometer, DS3231 RTC, SCD30 CO2)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 14;
pub const I2C_SCL_GPIO: i32 = 15;

/// I²C bus frequency.  100 kHz — the SCD30 maximum.
pub const I2C_FREQ_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// Indicator LED
// ---------------------------------------------------------------------------

/// Write-acknowledge LED, active HIGH.  Held on for the life of the
/// process and pulsed off briefly after each successful record.
pub const INDICATOR_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// I²C device addresses
// ---------------------------------------------------------------------------

pub const BMP280_I2C_ADDR: u8 = 0x76;
pub const DS3231_I2C_ADDR: u8 = 0x68;
pub const SCD30_I2C_ADDR: u8 = 0x61;
