//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`], the RTC-backed clock, and the indicator LED,
//! exposing them through [`SensorPort`], [`ClockPort`], and
//! [`IndicatorPort`].  On non-espidf targets the underlying drivers use
//! cfg-gated simulation stubs.

use crate::adapters::time::TimeAdapter;
use crate::app::ports::{ClockPort, IndicatorPort, SensorPort};
use crate::app::record::{BaroReading, ClimateReading, Co2Reading, Timestamp};
use crate::drivers::status_led::IndicatorLed;
use crate::sensors::SensorHub;

/// Concrete adapter that combines the input-side hardware behind ports.
pub struct HardwareAdapter {
    hub: SensorHub,
    led: IndicatorLed,
    /// Microsecond delays for the bit-banged buses and the clock fallback.
    time: TimeAdapter,
}

impl HardwareAdapter {
    pub fn new(hub: SensorHub, led: IndicatorLed, time: TimeAdapter) -> Self {
        Self { hub, led, time }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_climate(&mut self) -> ClimateReading {
        self.hub.dht.read(&mut self.time)
    }

    fn read_uv_raw(&mut self) -> u16 {
        self.hub.uv.read_raw()
    }

    fn read_barometer(&mut self) -> BaroReading {
        self.hub.barometer.read()
    }

    fn read_probe_c(&mut self) -> f32 {
        self.hub.probe.read_c(&mut self.time)
    }

    fn read_co2(&mut self) -> Option<Co2Reading> {
        self.hub.co2.read()
    }
}

// ── ClockPort implementation ──────────────────────────────────

impl ClockPort for HardwareAdapter {
    fn now(&mut self) -> Timestamp {
        let uptime_secs = self.time.uptime_ms() / 1_000;
        self.hub.clock.now(uptime_secs)
    }
}

// ── IndicatorPort implementation ──────────────────────────────

impl IndicatorPort for HardwareAdapter {
    fn set_indicator(&mut self, on: bool) {
        self.led.set(on);
    }
}
