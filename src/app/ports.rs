//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ LoggerService (domain)
//! ```
//!
//! Driven adapters (sensors, clock, indicator, bus switch, storage, console,
//! time source) implement these traits.  The
//! [`LoggerService`](super::cycle::LoggerService) consumes them via generics,
//! so the cycle state machine never touches hardware directly and every
//! testable property runs against mocks.

use crate::app::record::{BaroReading, ClimateReading, Co2Reading, Timestamp};
use crate::error::StorageError;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the five sensor sources.
///
/// Failure is reported in-band, one policy per sensor: the DHT22 returns
/// NaN fields, the barometer returns NaN fields when degraded, the probe
/// returns the disconnect sentinel, and the SCD30 returns `None` when no
/// fresh measurement is available.  Reads are independent — one failing
/// sensor never affects another.
pub trait SensorPort {
    /// DHT22 humidity/temperature.
    fn read_climate(&mut self) -> ClimateReading;

    /// GUVA-S12SD UV intensity, raw ADC counts.
    fn read_uv_raw(&mut self) -> u16;

    /// BMP280 pressure / temperature / derived altitude.
    fn read_barometer(&mut self) -> BaroReading;

    /// DS18B20 contact probe (°C).  Returns
    /// [`PROBE_DISCONNECTED_C`](crate::app::record::PROBE_DISCONNECTED_C)
    /// when no probe answers.  Only legal while the shared bus is released
    /// to the probe.
    fn read_probe_c(&mut self) -> f32;

    /// SCD30 CO2 measurement, `None` if not ready or the frame was bad.
    fn read_co2(&mut self) -> Option<Co2Reading>;
}

/// Calendar clock port (DS3231, with degraded fallback inside the adapter).
pub trait ClockPort {
    fn now(&mut self) -> Timestamp;
}

/// Write-acknowledge indicator.  Normally held on; the controller pulses it
/// off briefly after each successful write.
pub trait IndicatorPort {
    fn set_indicator(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Shared-bus control port
// ───────────────────────────────────────────────────────────────

/// Electrical handover of the shared MISO/1-Wire line.
///
/// Transitions are unconditional hardware mode switches and always succeed;
/// correctness lives entirely in the caller's discipline, which the
/// [`BusArbiter`](super::arbiter::BusArbiter) enforces.
pub trait BusControlPort {
    /// Route the shared line to the SD SPI peripheral (CS under SPI control).
    fn grant_storage(&mut self);

    /// Release the shared line for 1-Wire use (CS high, pin open-drain).
    fn grant_probe(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Sink ports
// ───────────────────────────────────────────────────────────────

/// Append-only log file on removable storage.
///
/// The file is opened, appended to, and closed once per cycle — never held
/// open across cycles.  Only `open_append` can fail; a successfully opened
/// handle is assumed writable for the rest of the cycle.  All three calls
/// are only legal while the bus arbiter owns the bus for storage.
pub trait StoragePort {
    /// Open the log file for append, creating it (header first) if absent.
    fn open_append(&mut self) -> Result<(), StorageError>;

    /// Append one line (terminator added by the sink) to the open file.
    fn write_line(&mut self, line: &str);

    /// Flush and close the per-cycle handle.
    fn close(&mut self);
}

/// Line-oriented serial console.  Assumed always to succeed.
pub trait ConsolePort {
    fn write_line(&mut self, line: &str);
}

/// Monotonic time source and blocking delay.
///
/// Injected so the controller's timing logic (interval minus acknowledgment
/// pulse) is unit-testable without real sleeps.
pub trait TimePort {
    fn uptime_ms(&self) -> u64;

    fn delay_ms(&mut self, ms: u32);
}
