//! Integration tests: LoggerService → bus arbiter → sinks.
//!
//! Drives the full acquisition cycle against mock adapters, covering the
//! bus-discipline, failure-isolation, and record-schema properties plus
//! the end-to-end logging scenarios.

use envlog::app::cycle::{CycleOutcome, LoggerService, SD_OPEN_FAIL_MSG};
use envlog::app::format::CSV_HEADER;
use envlog::app::ports::{
    BusControlPort, ClockPort, ConsolePort, IndicatorPort, SensorPort, StoragePort, TimePort,
};
use envlog::app::record::{
    BaroReading, ClimateReading, Co2Reading, Timestamp, PROBE_DISCONNECTED_C,
};
use envlog::config::LoggerConfig;
use envlog::error::StorageError;

// ── Mock implementations ──────────────────────────────────────

struct MockHw {
    climate: ClimateReading,
    uv_raw: u16,
    baro: BaroReading,
    probe_c: f32,
    co2: Option<Co2Reading>,
    timestamp: Timestamp,
    /// Every indicator transition, in order.
    indicator_events: Vec<bool>,
}

impl MockHw {
    /// Scenario A readings.
    fn new() -> Self {
        Self {
            climate: ClimateReading {
                temperature_c: 21.5,
                humidity_pct: 40.0,
            },
            uv_raw: 123,
            baro: BaroReading {
                pressure_mbar: 1013.25,
                temperature_c: 21.0,
                altitude_ft: 150.0,
            },
            probe_c: 20.75,
            co2: Some(Co2Reading {
                ppm: 800,
                temperature_c: 21.3,
                humidity_pct: 41.0,
            }),
            timestamp: Timestamp {
                year: 2024,
                month: 6,
                day: 1,
                hour: 12,
                minute: 0,
                second: 0,
            },
            indicator_events: Vec::new(),
        }
    }
}

const SCENARIO_A_LINE: &str =
    "2024-06-01T12:00:00,21.50,40.00,123,1013.25,21.00,150.00,20.75,800,21.30,41.00";

impl SensorPort for MockHw {
    fn read_climate(&mut self) -> ClimateReading {
        self.climate
    }
    fn read_uv_raw(&mut self) -> u16 {
        self.uv_raw
    }
    fn read_barometer(&mut self) -> BaroReading {
        self.baro
    }
    fn read_probe_c(&mut self) -> f32 {
        self.probe_c
    }
    fn read_co2(&mut self) -> Option<Co2Reading> {
        self.co2
    }
}

impl ClockPort for MockHw {
    fn now(&mut self) -> Timestamp {
        self.timestamp
    }
}

impl IndicatorPort for MockHw {
    fn set_indicator(&mut self, on: bool) {
        self.indicator_events.push(on);
    }
}

#[derive(Default)]
struct SpyBus {
    /// "storage" / "probe" grant sequence.
    grants: Vec<&'static str>,
}

impl BusControlPort for SpyBus {
    fn grant_storage(&mut self) {
        self.grants.push("storage");
    }
    fn grant_probe(&mut self) {
        self.grants.push("probe");
    }
}

#[derive(Default)]
struct MockStorage {
    fail_open: bool,
    lines: Vec<String>,
    is_open: bool,
    opens: u32,
    closes: u32,
}

impl StoragePort for MockStorage {
    fn open_append(&mut self) -> Result<(), StorageError> {
        if self.fail_open {
            return Err(StorageError::OpenFailed);
        }
        self.is_open = true;
        self.opens += 1;
        Ok(())
    }
    fn write_line(&mut self, line: &str) {
        assert!(self.is_open, "write without a successful open");
        self.lines.push(line.to_owned());
    }
    fn close(&mut self) {
        assert!(self.is_open, "close without open");
        self.is_open = false;
        self.closes += 1;
    }
}

#[derive(Default)]
struct MockConsole {
    lines: Vec<String>,
}

impl ConsolePort for MockConsole {
    fn write_line(&mut self, line: &str) {
        self.lines.push(line.to_owned());
    }
}

#[derive(Default)]
struct MockTime {
    delays: Vec<u32>,
}

impl TimePort for MockTime {
    fn uptime_ms(&self) -> u64 {
        0
    }
    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
    }
}

fn make_fixture() -> (LoggerService, MockHw, SpyBus, MockStorage, MockConsole, MockTime) {
    (
        LoggerService::new(LoggerConfig::default()),
        MockHw::new(),
        SpyBus::default(),
        MockStorage::default(),
        MockConsole::default(),
        MockTime::default(),
    )
}

// ── Scenario A: happy path, byte-identical dual-sink write ────

#[test]
fn successful_cycle_writes_identical_line_to_both_sinks() {
    let (mut svc, mut hw, mut bus, mut storage, mut console, mut time) = make_fixture();

    let outcome = svc.run_cycle(&mut hw, &mut bus, &mut storage, &mut console, &mut time);

    assert!(outcome.logged);
    assert_eq!(console.lines, vec![SCENARIO_A_LINE.to_owned()]);
    assert_eq!(storage.lines, console.lines, "sinks must be byte-identical");
}

// ── P1: bus discipline ────────────────────────────────────────

#[test]
fn bus_acquire_release_balanced_every_cycle() {
    let (mut svc, mut hw, mut bus, mut storage, mut console, mut time) = make_fixture();

    assert!(svc.bus_released(), "bus must start released");
    for _ in 0..3 {
        svc.run_cycle(&mut hw, &mut bus, &mut storage, &mut console, &mut time);
        assert!(svc.bus_released(), "bus must be released after each cycle");
    }
    assert_eq!(
        bus.grants,
        vec!["storage", "probe", "storage", "probe", "storage", "probe"]
    );
}

#[test]
fn bus_released_even_when_open_fails() {
    let (mut svc, mut hw, mut bus, mut storage, mut console, mut time) = make_fixture();
    storage.fail_open = true;

    svc.run_cycle(&mut hw, &mut bus, &mut storage, &mut console, &mut time);

    assert!(svc.bus_released(), "failure path must still release the bus");
    assert_eq!(bus.grants, vec!["storage", "probe"]);
}

// ── Signal + Wait arithmetic ──────────────────────────────────

#[test]
fn success_pulses_indicator_and_shortens_wait() {
    let (mut svc, mut hw, mut bus, mut storage, mut console, mut time) = make_fixture();

    let outcome = svc.run_cycle(&mut hw, &mut bus, &mut storage, &mut console, &mut time);

    // Indicator released then restored, exactly once.
    assert_eq!(hw.indicator_events, vec![false, true]);
    // The pulse itself was the only delay inside the cycle.
    assert_eq!(time.delays, vec![100]);
    // Wait = interval minus the acknowledgment already spent.
    assert_eq!(svc.wait_ms(&outcome), 4_900);
}

#[test]
fn storage_handle_never_held_across_cycles() {
    let (mut svc, mut hw, mut bus, mut storage, mut console, mut time) = make_fixture();

    for _ in 0..4 {
        svc.run_cycle(&mut hw, &mut bus, &mut storage, &mut console, &mut time);
    }
    assert_eq!(storage.opens, 4);
    assert_eq!(storage.closes, 4);
    assert!(!storage.is_open);
}

// ── Scenario D / P5: storage open failure ─────────────────────

#[test]
fn open_failure_reports_diagnostic_and_recovers_next_cycle() {
    let (mut svc, mut hw, mut bus, mut storage, mut console, mut time) = make_fixture();
    storage.fail_open = true;

    let outcome = svc.run_cycle(&mut hw, &mut bus, &mut storage, &mut console, &mut time);

    assert!(!outcome.logged);
    assert_eq!(console.lines, vec![SD_OPEN_FAIL_MSG.to_owned()]);
    assert!(storage.lines.is_empty(), "no write may be attempted");
    assert!(hw.indicator_events.is_empty(), "no ack on failure");
    assert_eq!(svc.wait_ms(&outcome), 5_000, "failure waits the full interval");

    // Card comes back: the very next cycle logs normally.
    storage.fail_open = false;
    let outcome = svc.run_cycle(&mut hw, &mut bus, &mut storage, &mut console, &mut time);
    assert!(outcome.logged);
    assert_eq!(storage.lines, vec![SCENARIO_A_LINE.to_owned()]);
}

// ── CO2 stale-value policy ────────────────────────────────────

#[test]
fn co2_not_ready_carries_last_good_reading() {
    let (mut svc, mut hw, mut bus, mut storage, mut console, mut time) = make_fixture();

    svc.run_cycle(&mut hw, &mut bus, &mut storage, &mut console, &mut time);

    // Sensor goes quiet: the logged values must repeat the last reading.
    hw.co2 = None;
    svc.run_cycle(&mut hw, &mut bus, &mut storage, &mut console, &mut time);

    let fields: Vec<&str> = storage.lines[1].split(',').collect();
    assert_eq!(fields[8], "800");
    assert_eq!(fields[9], "21.30");
    assert_eq!(fields[10], "41.00");
}

#[test]
fn co2_never_ready_logs_schema_stable_zeros() {
    let (mut svc, mut hw, mut bus, mut storage, mut console, mut time) = make_fixture();
    hw.co2 = None;

    svc.run_cycle(&mut hw, &mut bus, &mut storage, &mut console, &mut time);

    let fields: Vec<&str> = storage.lines[0].split(',').collect();
    assert_eq!(fields.len(), 11);
    assert_eq!(fields[8], "0");
}

// ── Scenario B: invalid DHT renders NaN ───────────────────────

#[test]
fn invalid_dht_logs_nan_fields_only() {
    let (mut svc, mut hw, mut bus, mut storage, mut console, mut time) = make_fixture();
    hw.climate = ClimateReading::INVALID;

    svc.run_cycle(&mut hw, &mut bus, &mut storage, &mut console, &mut time);

    let fields: Vec<&str> = storage.lines[0].split(',').collect();
    assert_eq!(fields[1], "NaN");
    assert_eq!(fields[2], "NaN");
    assert_eq!(fields[3], "123", "other fields unaffected");
}

// ── Scenario C: disconnected probe renders the sentinel ───────

#[test]
fn disconnected_probe_logs_sentinel_value() {
    let (mut svc, mut hw, mut bus, mut storage, mut console, mut time) = make_fixture();
    hw.probe_c = PROBE_DISCONNECTED_C;

    svc.run_cycle(&mut hw, &mut bus, &mut storage, &mut console, &mut time);

    let fields: Vec<&str> = storage.lines[0].split(',').collect();
    assert_eq!(fields[7], "-127.00");
}

// ── Startup header ────────────────────────────────────────────

#[test]
fn announce_emits_header_matching_data_schema() {
    let (svc, _, _, _, mut console, _) = make_fixture();

    svc.announce(&mut console);

    assert_eq!(console.lines, vec![CSV_HEADER.to_owned()]);
    assert_eq!(CSV_HEADER.split(',').count(), 11);
}

// ── Outcome plumbing ──────────────────────────────────────────

#[test]
fn wait_never_underflows_on_oversized_ack() {
    let (svc, ..) = make_fixture();
    let wait = svc.wait_ms(&CycleOutcome {
        logged: true,
        ack_ms: 10_000,
    });
    assert_eq!(wait, 0);
}
