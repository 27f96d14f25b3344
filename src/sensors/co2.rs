//! SCD30 CO2 / temperature / humidity sensor driver.
//!
//! Command-word protocol over I²C: every data word travels with a
//! Sensirion CRC-8.  The sensor runs continuous measurement; a read
//! returns `None` when no fresh measurement is ready or a frame fails its
//! CRC, and the cycle controller carries the last good reading forward.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: I²C transactions via hw_init helpers.
//! On host/test: reads from static atomics for injection.

use core::sync::atomic::{AtomicBool, AtomicI32, AtomicU16, Ordering};

use crate::app::record::Co2Reading;
use crate::error::InitError;
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
#[cfg(target_os = "espidf")]
use crate::pins;

static SIM_CO2_PPM: AtomicU16 = AtomicU16::new(0);
static SIM_TEMP_CENTI: AtomicI32 = AtomicI32::new(0);
static SIM_HUM_CENTI: AtomicI32 = AtomicI32::new(0);
static SIM_READY: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_co2(ppm: u16, temperature_c: f32, humidity_pct: f32) {
    SIM_CO2_PPM.store(ppm, Ordering::Relaxed);
    SIM_TEMP_CENTI.store((temperature_c * 100.0) as i32, Ordering::Relaxed);
    SIM_HUM_CENTI.store((humidity_pct * 100.0) as i32, Ordering::Relaxed);
    SIM_READY.store(true, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_co2_not_ready() {
    SIM_READY.store(false, Ordering::Relaxed);
}

// SCD30 command words.
#[cfg(target_os = "espidf")]
const CMD_START_CONTINUOUS: u16 = 0x0010;
#[cfg(target_os = "espidf")]
const CMD_SET_INTERVAL: u16 = 0x4600;
#[cfg(target_os = "espidf")]
const CMD_DATA_READY: u16 = 0x0202;
#[cfg(target_os = "espidf")]
const CMD_READ_MEASUREMENT: u16 = 0x0300;
#[cfg(target_os = "espidf")]
const CMD_FIRMWARE_VERSION: u16 = 0xD100;

pub struct Scd30Sensor {
    available: bool,
}

impl Scd30Sensor {
    /// Construct in the degraded state; call [`init`](Self::init) next.
    pub fn new() -> Self {
        Self { available: false }
    }

    /// Detect the sensor and start continuous measurement at a 2 s
    /// interval (fresh data is then usually ready each 5 s cycle).
    #[cfg(target_os = "espidf")]
    pub fn init(&mut self) -> Result<(), InitError> {
        let mut version = [0u8; 3];
        let rc = hw_init::i2c_write_read(
            pins::SCD30_I2C_ADDR,
            &CMD_FIRMWARE_VERSION.to_be_bytes(),
            &mut version,
        );
        if rc != 0 {
            return Err(InitError::NotDetected("SCD30"));
        }

        let rc = write_command(CMD_SET_INTERVAL, Some(2));
        if rc != 0 {
            return Err(InitError::Bus(rc));
        }
        // Argument 0 = no external pressure compensation.
        let rc = write_command(CMD_START_CONTINUOUS, Some(0));
        if rc != 0 {
            return Err(InitError::Bus(rc));
        }

        self.available = true;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn init(&mut self) -> Result<(), InitError> {
        self.available = true;
        Ok(())
    }

    /// Fresh measurement if one is ready, else `None`.
    #[cfg(target_os = "espidf")]
    pub fn read(&mut self) -> Option<Co2Reading> {
        if !self.available {
            return None;
        }

        let mut status = [0u8; 3];
        let rc = hw_init::i2c_write_read(
            pins::SCD30_I2C_ADDR,
            &CMD_DATA_READY.to_be_bytes(),
            &mut status,
        );
        if rc != 0 || crc8_sensirion(&status[..2]) != status[2] {
            return None;
        }
        if u16::from_be_bytes([status[0], status[1]]) != 1 {
            return None;
        }

        let mut frame = [0u8; 18];
        let rc = hw_init::i2c_write_read(
            pins::SCD30_I2C_ADDR,
            &CMD_READ_MEASUREMENT.to_be_bytes(),
            &mut frame,
        );
        if rc != 0 {
            return None;
        }
        parse_measurement(&frame)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn read(&mut self) -> Option<Co2Reading> {
        if !self.available || !SIM_READY.load(Ordering::Relaxed) {
            return None;
        }
        Some(Co2Reading {
            ppm: SIM_CO2_PPM.load(Ordering::Relaxed),
            temperature_c: SIM_TEMP_CENTI.load(Ordering::Relaxed) as f32 / 100.0,
            humidity_pct: SIM_HUM_CENTI.load(Ordering::Relaxed) as f32 / 100.0,
        })
    }
}

/// Send a command word, optionally with one CRC-protected argument word.
#[cfg(target_os = "espidf")]
fn write_command(cmd: u16, arg: Option<u16>) -> i32 {
    let c = cmd.to_be_bytes();
    match arg {
        None => hw_init::i2c_write(pins::SCD30_I2C_ADDR, &c),
        Some(a) => {
            let w = a.to_be_bytes();
            let buf = [c[0], c[1], w[0], w[1], crc8_sensirion(&w)];
            hw_init::i2c_write(pins::SCD30_I2C_ADDR, &buf)
        }
    }
}

/// Parse the 18-byte measurement frame: three big-endian f32 values (CO2
/// ppm, temperature °C, humidity %RH), each split into two CRC'd words.
fn parse_measurement(frame: &[u8; 18]) -> Option<Co2Reading> {
    let mut values = [0f32; 3];
    for (i, v) in values.iter_mut().enumerate() {
        let chunk = &frame[i * 6..i * 6 + 6];
        if crc8_sensirion(&chunk[..2]) != chunk[2] || crc8_sensirion(&chunk[3..5]) != chunk[5] {
            return None;
        }
        *v = f32::from_be_bytes([chunk[0], chunk[1], chunk[3], chunk[4]]);
    }
    Some(Co2Reading {
        ppm: values[0].max(0.0) as u16,
        temperature_c: values[1],
        humidity_pct: values[2],
    })
}

/// Sensirion CRC-8: polynomial 0x31, init 0xFF.
fn crc8_sensirion(data: &[u8]) -> u8 {
    let mut crc: u8 = 0xFF;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x31
            } else {
                crc << 1
            };
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc8_datasheet_check_value() {
        // From the Sensirion interface description: CRC(0xBE, 0xEF) = 0x92.
        assert_eq!(crc8_sensirion(&[0xBE, 0xEF]), 0x92);
    }

    fn encode(value: f32, out: &mut [u8]) {
        let b = value.to_be_bytes();
        out[0] = b[0];
        out[1] = b[1];
        out[2] = crc8_sensirion(&b[..2]);
        out[3] = b[2];
        out[4] = b[3];
        out[5] = crc8_sensirion(&b[2..]);
    }

    #[test]
    fn parse_valid_measurement_frame() {
        let mut frame = [0u8; 18];
        encode(800.0, &mut frame[0..6]);
        encode(21.3, &mut frame[6..12]);
        encode(41.0, &mut frame[12..18]);

        let r = parse_measurement(&frame).unwrap();
        assert_eq!(r.ppm, 800);
        assert!((r.temperature_c - 21.3).abs() < 0.001);
        assert!((r.humidity_pct - 41.0).abs() < 0.001);
    }

    #[test]
    fn parse_rejects_corrupt_crc() {
        let mut frame = [0u8; 18];
        encode(800.0, &mut frame[0..6]);
        encode(21.3, &mut frame[6..12]);
        encode(41.0, &mut frame[12..18]);
        frame[2] ^= 0xFF;
        assert!(parse_measurement(&frame).is_none());
    }
}
