//! Unified error types for the EnvLog firmware.
//!
//! Follows embedded best practice: small `Copy` enums with manual `Display`
//! impls, so failures can be logged and threaded through the cycle
//! controller without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

/// Errors from [`StoragePort`](crate::app::ports::StoragePort) operations.
///
/// Per the open-append-close-per-cycle contract, failures are only detected
/// at the Open step; `write_line` on an open file is infallible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// The card never mounted (missing, unreadable, or mount failed at boot).
    NotMounted,
    /// The log file could not be opened for append this cycle.
    OpenFailed,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotMounted => write!(f, "SD card not mounted"),
            Self::OpenFailed => write!(f, "log file open failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Peripheral init errors
// ---------------------------------------------------------------------------

/// Startup-only initialisation failures for the I²C peripherals and the SD
/// mount.  Never fatal: the affected subsystem runs degraded and the cycle
/// loop continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// The device did not acknowledge its address on the bus.
    NotDetected(&'static str),
    /// The underlying bus transaction failed with the given IDF return code.
    Bus(i32),
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotDetected(dev) => write!(f, "{} not detected", dev),
            Self::Bus(rc) => write!(f, "bus error (rc={})", rc),
        }
    }
}
