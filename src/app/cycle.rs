//! Acquisition-cycle controller — the hexagonal core.
//!
//! [`LoggerService`] runs one sense-format-write-wait iteration per call,
//! forever.  All I/O flows through port traits injected at the call site,
//! making the entire cycle state machine testable with mock adapters.
//!
//! ```text
//!   SensorPort ──▶ ┌──────────────────────────┐ ──▶ ConsolePort
//!   ClockPort  ──▶ │      LoggerService        │ ──▶ StoragePort
//!                  │  BusArbiter · Formatter   │ ──▶ IndicatorPort
//!                  └──────────────────────────┘ ──▶ BusControlPort
//! ```

use log::{debug, warn};

use crate::app::arbiter::BusArbiter;
use crate::app::format::{format_record, CSV_HEADER};
use crate::app::ports::{
    BusControlPort, ClockPort, ConsolePort, IndicatorPort, SensorPort, StoragePort, TimePort,
};
use crate::app::record::{Co2Reading, Record, PROBE_DISCONNECTED_C};
use crate::app::writer::write_both;
use crate::config::LoggerConfig;

/// Console diagnostic emitted instead of a data line when the log file
/// cannot be opened.
pub const SD_OPEN_FAIL_MSG: &str = "SD Open Fail";

/// Success/failure signal for one cycle, plus the acknowledgment time
/// already spent — consumed only by [`LoggerService::wait_ms`].
#[derive(Debug, Clone, Copy)]
pub struct CycleOutcome {
    pub logged: bool,
    pub ack_ms: u32,
}

/// The acquisition-cycle controller.
///
/// Owns the bus arbiter and the only piece of state carried across cycles:
/// the last good SCD30 reading (stale-value-on-error policy).
pub struct LoggerService {
    config: LoggerConfig,
    arbiter: BusArbiter,
    co2_last: Co2Reading,
}

impl LoggerService {
    pub fn new(config: LoggerConfig) -> Self {
        Self {
            config,
            arbiter: BusArbiter::new(),
            co2_last: Co2Reading::ZERO,
        }
    }

    /// Emit the CSV header to the console.  Called once at startup.
    pub fn announce(&self, console: &mut impl ConsolePort) {
        console.write_line(CSV_HEADER);
    }

    /// Run one full acquisition cycle.
    ///
    /// The `hw` parameter satisfies the sensor, clock, and indicator ports
    /// at once — this avoids a triple mutable borrow while keeping the
    /// port boundary explicit.  The blocking inter-cycle sleep belongs to
    /// the caller (see [`wait_ms`](Self::wait_ms)).
    pub fn run_cycle(
        &mut self,
        hw: &mut (impl SensorPort + ClockPort + IndicatorPort),
        bus: &mut impl BusControlPort,
        storage: &mut impl StoragePort,
        console: &mut impl ConsolePort,
        time: &mut impl TimePort,
    ) -> CycleOutcome {
        // 1. Sense — the bus must be released here so the probe's 1-Wire
        //    read is electrically safe.
        debug_assert!(self.arbiter.is_released(), "bus held across cycles");

        let timestamp = hw.now();
        let climate = hw.read_climate();
        if !climate.is_valid() {
            warn!("DHT22 read failed, logging NaN");
        }
        let uv_raw = hw.read_uv_raw();
        let baro = hw.read_barometer();
        let probe_c = hw.read_probe_c();
        if probe_c == PROBE_DISCONNECTED_C {
            warn!("probe disconnected, logging sentinel");
        }
        let co2 = self.latch_co2(hw.read_co2());

        let record = Record::assemble(timestamp, climate, uv_raw, baro, probe_c, co2);

        // 2. Acquire — storage owns the shared line from here.
        self.arbiter.acquire_for_storage(bus);

        // 3.-5. Open, write both sinks, close, signal.
        let outcome = match storage.open_append() {
            Ok(()) => {
                let line = format_record(&record);
                write_both(&line, console, storage);
                storage.close();
                self.pulse_ack(hw, time);
                CycleOutcome {
                    logged: true,
                    ack_ms: self.config.ack_pulse_ms,
                }
            }
            Err(e) => {
                warn!("storage open failed: {}", e);
                console.write_line(SD_OPEN_FAIL_MSG);
                CycleOutcome {
                    logged: false,
                    ack_ms: 0,
                }
            }
        };

        // 6. Release — unconditional, failure path included.  The probe
        //    must never be starved of the bus.
        self.arbiter.release_for_probe(bus);
        outcome
    }

    /// Remaining sleep for this cycle: the full interval on failure, the
    /// interval minus the acknowledgment pulse already spent on success.
    pub fn wait_ms(&self, outcome: &CycleOutcome) -> u32 {
        if outcome.logged {
            self.config.log_interval_ms.saturating_sub(outcome.ack_ms)
        } else {
            self.config.log_interval_ms
        }
    }

    /// True when the shared line is in the probe-safe state.
    pub fn bus_released(&self) -> bool {
        self.arbiter.is_released()
    }

    /// Stale-value policy: a fresh SCD30 reading (zero ppm included —
    /// zero is a legitimate passthrough value) replaces the carried one; a
    /// not-ready or failed read keeps the last good reading.
    fn latch_co2(&mut self, fresh: Option<Co2Reading>) -> Co2Reading {
        match fresh {
            Some(r) => {
                self.co2_last = r;
                r
            }
            None => {
                debug!("SCD30 not ready, carrying last reading");
                self.co2_last
            }
        }
    }

    /// Brief visible acknowledgment: the normally-on indicator is released
    /// for `ack_pulse_ms`, then restored.
    fn pulse_ack(&self, hw: &mut impl IndicatorPort, time: &mut impl TimePort) {
        hw.set_indicator(false);
        time.delay_ms(self.config.ack_pulse_ms);
        hw.set_indicator(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> LoggerService {
        LoggerService::new(LoggerConfig::default())
    }

    #[test]
    fn co2_fresh_reading_replaces_carried() {
        let mut svc = service();
        let fresh = Co2Reading {
            ppm: 800,
            temperature_c: 21.3,
            humidity_pct: 41.0,
        };
        let out = svc.latch_co2(Some(fresh));
        assert_eq!(out.ppm, 800);
        assert_eq!(svc.co2_last.ppm, 800);
    }

    #[test]
    fn co2_not_ready_carries_last() {
        let mut svc = service();
        svc.latch_co2(Some(Co2Reading {
            ppm: 650,
            temperature_c: 20.0,
            humidity_pct: 38.5,
        }));
        let out = svc.latch_co2(None);
        assert_eq!(out.ppm, 650);
        assert_eq!(out.humidity_pct, 38.5);
    }

    #[test]
    fn co2_zero_is_a_valid_passthrough() {
        let mut svc = service();
        svc.latch_co2(Some(Co2Reading {
            ppm: 900,
            temperature_c: 21.0,
            humidity_pct: 40.0,
        }));
        let out = svc.latch_co2(Some(Co2Reading {
            ppm: 0,
            temperature_c: 21.0,
            humidity_pct: 40.0,
        }));
        assert_eq!(out.ppm, 0, "zero must not trigger the stale policy");
    }

    #[test]
    fn wait_subtracts_ack_on_success() {
        let svc = service();
        let wait = svc.wait_ms(&CycleOutcome {
            logged: true,
            ack_ms: 100,
        });
        assert_eq!(wait, 4_900);
    }

    #[test]
    fn wait_is_full_interval_on_failure() {
        let svc = service();
        let wait = svc.wait_ms(&CycleOutcome {
            logged: false,
            ack_ms: 0,
        });
        assert_eq!(wait, 5_000);
    }
}
