//! DHT22 humidity/temperature sensor driver.
//!
//! Bit-banged single-wire protocol on a dedicated open-drain GPIO: host
//! start pulse, 40 data bits discriminated by high-phase width, checksum
//! byte.  A failed read (timeout or checksum mismatch) yields NaN fields —
//! the cycle controller logs the `NaN` token and moves on.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: bit-bangs the data GPIO with microsecond delays.
//! On host/test: reads from static atomics for injection.

use core::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use embedded_hal::delay::DelayNs;

use crate::app::record::ClimateReading;
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

// Sim values in centi-units so they fit plain integer atomics.
static SIM_TEMP_CENTI: AtomicI32 = AtomicI32::new(2_100);
static SIM_HUM_CENTI: AtomicI32 = AtomicI32::new(4_000);
static SIM_VALID: AtomicBool = AtomicBool::new(true);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_climate(temperature_c: f32, humidity_pct: f32) {
    SIM_TEMP_CENTI.store((temperature_c * 100.0) as i32, Ordering::Relaxed);
    SIM_HUM_CENTI.store((humidity_pct * 100.0) as i32, Ordering::Relaxed);
    SIM_VALID.store(true, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_climate_invalid() {
    SIM_VALID.store(false, Ordering::Relaxed);
}

pub struct DhtSensor {
    _data_gpio: i32,
}

impl DhtSensor {
    pub fn new(data_gpio: i32) -> Self {
        Self {
            _data_gpio: data_gpio,
        }
    }

    #[cfg(target_os = "espidf")]
    pub fn read(&mut self, delay: &mut impl DelayNs) -> ClimateReading {
        match self.read_frame(delay).and_then(decode_frame) {
            Some(reading) => reading,
            None => ClimateReading::INVALID,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn read(&mut self, delay: &mut impl DelayNs) -> ClimateReading {
        let _ = delay;
        if !SIM_VALID.load(Ordering::Relaxed) {
            return ClimateReading::INVALID;
        }
        ClimateReading {
            temperature_c: SIM_TEMP_CENTI.load(Ordering::Relaxed) as f32 / 100.0,
            humidity_pct: SIM_HUM_CENTI.load(Ordering::Relaxed) as f32 / 100.0,
        }
    }

    /// Sample the 40-bit frame.  `None` on any pulse timeout.
    #[cfg(target_os = "espidf")]
    fn read_frame(&self, delay: &mut impl DelayNs) -> Option<[u8; 5]> {
        let pin = self._data_gpio;

        // Host start: hold low >= 1 ms, release, then the sensor answers
        // with an 80 us low / 80 us high preamble.
        hw_init::gpio_write(pin, false);
        delay.delay_us(1_100);
        hw_init::gpio_write(pin, true);

        wait_for_level(delay, pin, false, 100)?;
        wait_for_level(delay, pin, true, 100)?;
        wait_for_level(delay, pin, false, 100)?;

        let mut bytes = [0u8; 5];
        for bit in 0..40 {
            // 50 us low, then a high phase whose width encodes the bit.
            wait_for_level(delay, pin, true, 80)?;
            let high_us = wait_for_level(delay, pin, false, 100)?;
            if high_us > 40 {
                bytes[bit / 8] |= 1 << (7 - bit % 8);
            }
        }
        Some(bytes)
    }
}

/// Spin until the pin reaches `level`, returning the elapsed microseconds.
#[cfg(target_os = "espidf")]
fn wait_for_level(delay: &mut impl DelayNs, pin: i32, level: bool, timeout_us: u32) -> Option<u32> {
    for elapsed in 0..timeout_us {
        if hw_init::gpio_read(pin) == level {
            return Some(elapsed);
        }
        delay.delay_us(1);
    }
    None
}

/// Decode a checksummed 5-byte DHT22 frame into physical units.
fn decode_frame(bytes: [u8; 5]) -> Option<ClimateReading> {
    let sum = bytes[0]
        .wrapping_add(bytes[1])
        .wrapping_add(bytes[2])
        .wrapping_add(bytes[3]);
    if sum != bytes[4] {
        return None;
    }

    let humidity_pct = f32::from(u16::from_be_bytes([bytes[0], bytes[1]])) / 10.0;
    let raw_t = u16::from_be_bytes([bytes[2] & 0x7F, bytes[3]]);
    let mut temperature_c = f32::from(raw_t) / 10.0;
    if bytes[2] & 0x80 != 0 {
        temperature_c = -temperature_c;
    }

    Some(ClimateReading {
        temperature_c,
        humidity_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_positive_frame() {
        // 40.0 %RH, 21.5 C
        let r = decode_frame([0x01, 0x90, 0x00, 0xD7, 0x68]).unwrap();
        assert!((r.humidity_pct - 40.0).abs() < 0.01);
        assert!((r.temperature_c - 21.5).abs() < 0.01);
    }

    #[test]
    fn decode_negative_temperature() {
        // Sign bit in the temperature high byte: -10.1 C
        let r = decode_frame([0x01, 0x90, 0x80, 0x65, 0x76]).unwrap();
        assert!((r.temperature_c + 10.1).abs() < 0.01);
    }

    #[test]
    fn decode_rejects_bad_checksum() {
        assert!(decode_frame([0x01, 0x90, 0x00, 0xD7, 0x00]).is_none());
    }
}
