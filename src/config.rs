//! Logger configuration parameters.
//!
//! All tunable parameters for the EnvLog system.  There is no persistence
//! layer — values are compiled in and a fresh `Default` is built at boot.

/// Core logger configuration.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    // --- Timing ---
    /// Total cycle interval (milliseconds): sense + write + wait.
    pub log_interval_ms: u32,
    /// Indicator off-pulse acknowledging a successful write (milliseconds).
    /// Subtracted from the wait on the success path.
    pub ack_pulse_ms: u32,

    // --- Storage ---
    /// Log file path.  On the device this lives under the FAT mount point.
    pub log_path: &'static str,

    // --- Barometer ---
    /// Sea-level reference pressure (hPa) for the altitude calculation.
    pub sea_level_hpa: f32,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_interval_ms: 5_000,
            ack_pulse_ms: 100,
            #[cfg(target_os = "espidf")]
            log_path: "/sdcard/envlog.csv",
            #[cfg(not(target_os = "espidf"))]
            log_path: "envlog.csv",
            sea_level_hpa: 1013.25,
        }
    }
}
