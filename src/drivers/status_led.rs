//! Write-acknowledge indicator LED driver.
//!
//! A single active-high LED held on for the life of the process.  The
//! cycle controller releases it briefly after each successful record.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the indicator GPIO via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;

pub struct IndicatorLed {
    lit: bool,
}

impl IndicatorLed {
    /// Construct and switch the indicator on (its normal state).
    pub fn new() -> Self {
        hw_init::gpio_write(pins::INDICATOR_GPIO, true);
        Self { lit: true }
    }

    pub fn set(&mut self, on: bool) {
        hw_init::gpio_write(pins::INDICATOR_GPIO, on);
        self.lit = on;
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_lit_and_tracks_state() {
        let mut led = IndicatorLed::new();
        assert!(led.is_lit());
        led.set(false);
        assert!(!led.is_lit());
        led.set(true);
        assert!(led.is_lit());
    }
}
