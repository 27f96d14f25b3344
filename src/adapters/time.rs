//! Monotonic time adapter.
//!
//! Implements [`TimePort`] for the cycle loop's blocking waits and
//! `embedded_hal::delay::DelayNs` for the bit-banged sensor buses.
//!
//! - **`target_os = "espidf"`** — `esp_timer_get_time()` for uptime,
//!   FreeRTOS ticks for millisecond sleeps, busy-wait for microseconds.
//! - **`not(target_os = "espidf")`** — `std::time::Instant` and
//!   `std::thread::sleep` for host-side testing and simulation.

use embedded_hal::delay::DelayNs;

use crate::app::ports::TimePort;

pub struct TimeAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl TimeAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_ms(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    /// Milliseconds since boot (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Blocking millisecond sleep (yields to FreeRTOS on the device).
    #[cfg(target_os = "espidf")]
    pub fn delay_ms(&mut self, ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }

    /// Blocking millisecond sleep.
    #[cfg(not(target_os = "espidf"))]
    pub fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}

impl TimePort for TimeAdapter {
    fn uptime_ms(&self) -> u64 {
        TimeAdapter::uptime_ms(self)
    }

    fn delay_ms(&mut self, ms: u32) {
        TimeAdapter::delay_ms(self, ms);
    }
}

impl DelayNs for TimeAdapter {
    /// Sub-millisecond waits busy-spin — the 1-Wire and DHT protocols need
    /// microsecond timing that a FreeRTOS tick sleep cannot provide.
    #[cfg(target_os = "espidf")]
    fn delay_ns(&mut self, ns: u32) {
        // SAFETY: esp_rom_delay_us is a calibrated busy-wait, safe anywhere.
        unsafe { esp_idf_svc::sys::esp_rom_delay_us(ns.div_ceil(1_000)) }
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }
}
