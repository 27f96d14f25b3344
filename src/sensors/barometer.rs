//! BMP280 barometric pressure / temperature sensor driver.
//!
//! Register access runs over the shared I²C bus; the datasheet's integer
//! compensation math is kept as pure functions so it can be verified on the
//! host against the datasheet's worked example.  Altitude is derived from
//! the compensated pressure against a configured sea-level reference.
//!
//! When the sensor is absent at boot the driver stays degraded and every
//! read returns NaN fields, which the formatter renders as `NaN`.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: I²C register reads via hw_init helpers.
//! On host/test: reads from static atomics for injection.

use core::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use crate::app::record::BaroReading;
use crate::error::InitError;
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
#[cfg(target_os = "espidf")]
use crate::pins;

static SIM_PRESS_CENTI: AtomicI32 = AtomicI32::new(101_325); // 1013.25 mBar
static SIM_TEMP_CENTI: AtomicI32 = AtomicI32::new(2_100);
static SIM_VALID: AtomicBool = AtomicBool::new(true);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_baro(pressure_mbar: f32, temperature_c: f32) {
    SIM_PRESS_CENTI.store((pressure_mbar * 100.0) as i32, Ordering::Relaxed);
    SIM_TEMP_CENTI.store((temperature_c * 100.0) as i32, Ordering::Relaxed);
    SIM_VALID.store(true, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_baro_absent() {
    SIM_VALID.store(false, Ordering::Relaxed);
}

// ---------------------------------------------------------------------------
// Calibration + compensation (pure, both targets)
// ---------------------------------------------------------------------------

/// Factory trim values from registers 0x88..0x9F.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bmp280Calib {
    pub dig_t1: u16,
    pub dig_t2: i16,
    pub dig_t3: i16,
    pub dig_p1: u16,
    pub dig_p2: i16,
    pub dig_p3: i16,
    pub dig_p4: i16,
    pub dig_p5: i16,
    pub dig_p6: i16,
    pub dig_p7: i16,
    pub dig_p8: i16,
    pub dig_p9: i16,
}

/// Datasheet 32-bit temperature compensation.  Returns (°C, t_fine).
fn compensate_temperature(c: &Bmp280Calib, adc_t: i32) -> (f32, i32) {
    let var1 = (((adc_t >> 3) - ((c.dig_t1 as i32) << 1)) * (c.dig_t2 as i32)) >> 11;
    let d = (adc_t >> 4) - (c.dig_t1 as i32);
    let var2 = (((d * d) >> 12) * (c.dig_t3 as i32)) >> 14;
    let t_fine = var1 + var2;
    let centi_c = (t_fine * 5 + 128) >> 8;
    (centi_c as f32 / 100.0, t_fine)
}

/// Datasheet 64-bit pressure compensation.  Returns Pascal.
fn compensate_pressure(c: &Bmp280Calib, adc_p: i32, t_fine: i32) -> f32 {
    let mut var1 = i64::from(t_fine) - 128_000;
    let mut var2 = var1 * var1 * i64::from(c.dig_p6);
    var2 += (var1 * i64::from(c.dig_p5)) << 17;
    var2 += i64::from(c.dig_p4) << 35;
    var1 = ((var1 * var1 * i64::from(c.dig_p3)) >> 8) + ((var1 * i64::from(c.dig_p2)) << 12);
    var1 = ((1i64 << 47) + var1) * i64::from(c.dig_p1) >> 33;
    if var1 == 0 {
        return f32::NAN;
    }
    let mut p = 1_048_576 - i64::from(adc_p);
    p = (((p << 31) - var2) * 3_125) / var1;
    let var1 = (i64::from(c.dig_p9) * (p >> 13) * (p >> 13)) >> 25;
    let var2 = (i64::from(c.dig_p8) * p) >> 19;
    p = ((p + var1 + var2) >> 8) + (i64::from(c.dig_p7) << 4);
    // Q24.8 fixed point Pascal.
    p as f32 / 256.0
}

/// International barometric formula, output in feet.
fn altitude_ft(pressure_hpa: f32, sea_level_hpa: f32) -> f32 {
    44_330.0 * (1.0 - (pressure_hpa / sea_level_hpa).powf(0.190_3)) * 3.280_84
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

pub struct Barometer {
    sea_level_hpa: f32,
    available: bool,
    #[cfg(target_os = "espidf")]
    calib: Bmp280Calib,
}

impl Barometer {
    /// Construct in the degraded state; call [`init`](Self::init) next.
    pub fn new(sea_level_hpa: f32) -> Self {
        Self {
            sea_level_hpa,
            available: false,
            #[cfg(target_os = "espidf")]
            calib: Bmp280Calib::default(),
        }
    }

    /// Probe the chip, load calibration, and start continuous measurement.
    #[cfg(target_os = "espidf")]
    pub fn init(&mut self) -> Result<(), InitError> {
        let mut id = [0u8; 1];
        let rc = hw_init::i2c_write_read(pins::BMP280_I2C_ADDR, &[0xD0], &mut id);
        if rc != 0 {
            return Err(InitError::Bus(rc));
        }
        if id[0] != 0x58 {
            return Err(InitError::NotDetected("BMP280"));
        }

        let mut raw = [0u8; 24];
        let rc = hw_init::i2c_write_read(pins::BMP280_I2C_ADDR, &[0x88], &mut raw);
        if rc != 0 {
            return Err(InitError::Bus(rc));
        }
        self.calib = parse_calib(&raw);

        // ctrl_meas: osrs_t=x1, osrs_p=x1, normal mode.
        let rc = hw_init::i2c_write(pins::BMP280_I2C_ADDR, &[0xF4, 0b0010_0111]);
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

    /// One compensated reading; NaN fields while degraded.
    #[cfg(target_os = "espidf")]
    pub fn read(&mut self) -> BaroReading {
        if !self.available {
            return BaroReading::INVALID;
        }

        // Burst read press_msb..temp_xlsb (0xF7..0xFC).
        let mut raw = [0u8; 6];
        let rc = hw_init::i2c_write_read(pins::BMP280_I2C_ADDR, &[0xF7], &mut raw);
        if rc != 0 {
            return BaroReading::INVALID;
        }
        let adc_p =
            (i32::from(raw[0]) << 12) | (i32::from(raw[1]) << 4) | (i32::from(raw[2]) >> 4);
        let adc_t =
            (i32::from(raw[3]) << 12) | (i32::from(raw[4]) << 4) | (i32::from(raw[5]) >> 4);

        let (temperature_c, t_fine) = compensate_temperature(&self.calib, adc_t);
        let pressure_hpa = compensate_pressure(&self.calib, adc_p, t_fine) / 100.0;

        BaroReading {
            pressure_mbar: pressure_hpa,
            temperature_c,
            altitude_ft: altitude_ft(pressure_hpa, self.sea_level_hpa),
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn read(&mut self) -> BaroReading {
        if !self.available || !SIM_VALID.load(Ordering::Relaxed) {
            return BaroReading::INVALID;
        }
        let pressure_hpa = SIM_PRESS_CENTI.load(Ordering::Relaxed) as f32 / 100.0;
        BaroReading {
            pressure_mbar: pressure_hpa,
            temperature_c: SIM_TEMP_CENTI.load(Ordering::Relaxed) as f32 / 100.0,
            altitude_ft: altitude_ft(pressure_hpa, self.sea_level_hpa),
        }
    }
}

#[cfg(target_os = "espidf")]
fn parse_calib(raw: &[u8; 24]) -> Bmp280Calib {
    let u = |i: usize| u16::from_le_bytes([raw[i], raw[i + 1]]);
    let s = |i: usize| i16::from_le_bytes([raw[i], raw[i + 1]]);
    Bmp280Calib {
        dig_t1: u(0),
        dig_t2: s(2),
        dig_t3: s(4),
        dig_p1: u(6),
        dig_p2: s(8),
        dig_p3: s(10),
        dig_p4: s(12),
        dig_p5: s(14),
        dig_p6: s(16),
        dig_p7: s(18),
        dig_p8: s(20),
        dig_p9: s(22),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Worked example from the BMP280 datasheet, section 3.12.
    fn datasheet_calib() -> Bmp280Calib {
        Bmp280Calib {
            dig_t1: 27_504,
            dig_t2: 26_435,
            dig_t3: -1_000,
            dig_p1: 36_477,
            dig_p2: -10_685,
            dig_p3: 3_024,
            dig_p4: 2_855,
            dig_p5: 140,
            dig_p6: -7,
            dig_p7: 15_500,
            dig_p8: -14_600,
            dig_p9: 6_000,
        }
    }

    #[test]
    fn datasheet_temperature_example() {
        let (t, _) = compensate_temperature(&datasheet_calib(), 519_888);
        assert!((t - 25.08).abs() < 0.01, "got {}", t);
    }

    #[test]
    fn datasheet_pressure_example() {
        let c = datasheet_calib();
        let (_, t_fine) = compensate_temperature(&c, 519_888);
        let p = compensate_pressure(&c, 415_148, t_fine);
        assert!((p - 100_653.0).abs() < 10.0, "got {}", p);
    }

    #[test]
    fn altitude_zero_at_sea_level_reference() {
        assert!(altitude_ft(1013.25, 1013.25).abs() < 0.01);
    }

    #[test]
    fn altitude_increases_as_pressure_drops() {
        let a = altitude_ft(1008.0, 1013.25);
        assert!(a > 100.0 && a < 300.0, "got {}", a);
    }
}
