//! Serial console adapter.
//!
//! Implements [`ConsolePort`] with raw line writes to stdout (UART0 /
//! USB-CDC on the device).  The CSV surface is data, not diagnostics, so
//! it bypasses the `log` facade and its prefixes.

use crate::app::ports::ConsolePort;

pub struct SerialConsole;

impl SerialConsole {
    pub fn new() -> Self {
        Self
    }
}

impl ConsolePort for SerialConsole {
    fn write_line(&mut self, line: &str) {
        println!("{}", line);
    }
}
