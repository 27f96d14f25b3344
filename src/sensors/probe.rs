//! DS18B20 contact temperature probe driver (1-Wire).
//!
//! The probe's data line is the shared MISO/1-Wire pin — reads are only
//! legal while the bus arbiter has the line released to the probe.  A
//! missing presence pulse or a bad scratchpad CRC yields the in-band
//! disconnect sentinel `-127.0`.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: bit-bangs the 1-Wire protocol with microsecond delays.
//! On host/test: reads from a static atomic for injection (defaults to the
//! disconnect sentinel, i.e. "no probe plugged in").

use core::sync::atomic::{AtomicI32, Ordering};

use embedded_hal::delay::DelayNs;

use crate::app::record::PROBE_DISCONNECTED_C;
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

static SIM_PROBE_CENTI: AtomicI32 = AtomicI32::new(-12_700);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_probe_c(temperature_c: f32) {
    SIM_PROBE_CENTI.store((temperature_c * 100.0) as i32, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_probe_disconnected() {
    SIM_PROBE_CENTI.store((PROBE_DISCONNECTED_C * 100.0) as i32, Ordering::Relaxed);
}

pub struct Ds18b20Probe {
    _data_gpio: i32,
}

impl Ds18b20Probe {
    pub fn new(data_gpio: i32) -> Self {
        Self {
            _data_gpio: data_gpio,
        }
    }

    /// Blocking convert-and-read (°C).  Returns
    /// [`PROBE_DISCONNECTED_C`] when no probe answers or the CRC fails.
    #[cfg(target_os = "espidf")]
    pub fn read_c(&mut self, delay: &mut impl DelayNs) -> f32 {
        let pin = self._data_gpio;

        if !reset(delay, pin) {
            return PROBE_DISCONNECTED_C;
        }
        write_byte(delay, pin, 0xCC); // skip ROM
        write_byte(delay, pin, 0x44); // convert T
        delay.delay_ms(750); // 12-bit conversion time

        if !reset(delay, pin) {
            return PROBE_DISCONNECTED_C;
        }
        write_byte(delay, pin, 0xCC);
        write_byte(delay, pin, 0xBE); // read scratchpad

        let mut scratch = [0u8; 9];
        for b in &mut scratch {
            *b = read_byte(delay, pin);
        }
        if crc8_dallas(&scratch[..8]) != scratch[8] {
            return PROBE_DISCONNECTED_C;
        }
        decode_temperature(scratch[0], scratch[1])
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn read_c(&mut self, delay: &mut impl DelayNs) -> f32 {
        let _ = delay;
        SIM_PROBE_CENTI.load(Ordering::Relaxed) as f32 / 100.0
    }
}

/// Raw scratchpad LSB/MSB to °C (1/16 degree steps, two's complement).
fn decode_temperature(lsb: u8, msb: u8) -> f32 {
    f32::from(i16::from_le_bytes([lsb, msb])) / 16.0
}

/// Dallas/Maxim CRC-8 (reflected polynomial 0x8C).
fn crc8_dallas(data: &[u8]) -> u8 {
    let mut crc: u8 = 0;
    for &byte in data {
        let mut b = byte;
        for _ in 0..8 {
            let mix = (crc ^ b) & 0x01;
            crc >>= 1;
            if mix != 0 {
                crc ^= 0x8C;
            }
            b >>= 1;
        }
    }
    crc
}

// ── 1-Wire primitives (timing per the DS18B20 datasheet) ──────

/// Reset pulse; true when a device answers with a presence pulse.
#[cfg(target_os = "espidf")]
fn reset(delay: &mut impl DelayNs, pin: i32) -> bool {
    hw_init::gpio_write(pin, false);
    delay.delay_us(480);
    hw_init::gpio_write(pin, true);
    delay.delay_us(70);
    let present = !hw_init::gpio_read(pin);
    delay.delay_us(410);
    present
}

#[cfg(target_os = "espidf")]
fn write_bit(delay: &mut impl DelayNs, pin: i32, bit: bool) {
    hw_init::gpio_write(pin, false);
    if bit {
        delay.delay_us(6);
        hw_init::gpio_write(pin, true);
        delay.delay_us(64);
    } else {
        delay.delay_us(60);
        hw_init::gpio_write(pin, true);
        delay.delay_us(10);
    }
}

#[cfg(target_os = "espidf")]
fn read_bit(delay: &mut impl DelayNs, pin: i32) -> bool {
    hw_init::gpio_write(pin, false);
    delay.delay_us(6);
    hw_init::gpio_write(pin, true);
    delay.delay_us(9);
    let bit = hw_init::gpio_read(pin);
    delay.delay_us(55);
    bit
}

#[cfg(target_os = "espidf")]
fn write_byte(delay: &mut impl DelayNs, pin: i32, byte: u8) {
    for i in 0..8 {
        write_bit(delay, pin, byte & (1 << i) != 0);
    }
}

#[cfg(target_os = "espidf")]
fn read_byte(delay: &mut impl DelayNs, pin: i32) -> u8 {
    let mut byte = 0u8;
    for i in 0..8 {
        if read_bit(delay, pin) {
            byte |= 1 << i;
        }
    }
    byte
}
