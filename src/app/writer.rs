//! Dual-sink record writer.
//!
//! One formatted line goes byte-identically to the console and to the open
//! storage file.  The console cannot fail; storage failures belong to the
//! Open step of the cycle, so the file handle here is assumed valid.

use crate::app::ports::{ConsolePort, StoragePort};

/// Write `line` to both sinks.  Caller guarantees the storage file is open.
pub fn write_both(line: &str, console: &mut impl ConsolePort, storage: &mut impl StoragePort) {
    console.write_line(line);
    storage.write_line(line);
}
