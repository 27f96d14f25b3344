//! GUVA-S12SD analog UV sensor driver.
//!
//! The sensor's op-amp output is read through an ESP32-S3 ADC channel and
//! logged as raw counts — downstream analysis owns any UV-index mapping.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static `AtomicU16` for injection.

use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

static SIM_UV_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_uv_adc(raw: u16) {
    SIM_UV_ADC.store(raw, Ordering::Relaxed);
}

pub struct UvSensor {
    _adc_gpio: i32,
}

impl UvSensor {
    pub fn new(adc_gpio: i32) -> Self {
        Self {
            _adc_gpio: adc_gpio,
        }
    }

    /// Raw ADC counts (0 – 4095).  An unlit or absent sensor reads 0,
    /// which is a legitimate value — there is no error path here.
    #[cfg(target_os = "espidf")]
    pub fn read_raw(&mut self) -> u16 {
        hw_init::adc1_read(hw_init::ADC1_CH_UV)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn read_raw(&mut self) -> u16 {
        SIM_UV_ADC.load(Ordering::Relaxed)
    }
}
