//! SD card storage adapter.
//!
//! Implements [`StoragePort`] over the mounted FAT volume (the ESP-IDF VFS
//! exposes it through `std::fs`; on the host the path is a plain local
//! file).  The mount itself happens once at boot in `main` — if it failed,
//! every `open_append` reports [`StorageError::NotMounted`] and the cycle
//! loop keeps retrying, per the degraded-init policy.
//!
//! The log file is opened, appended to, and closed once per cycle; when
//! the adapter creates the file it writes the CSV header as the first
//! line.  All calls here run with the shared bus in storage mode.

use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::Path;

use log::warn;

use crate::app::format::CSV_HEADER;
use crate::app::ports::StoragePort;
use crate::error::StorageError;

pub struct SdCardStorage {
    path: &'static str,
    mounted: bool,
    file: Option<File>,
}

impl SdCardStorage {
    /// `mounted` reflects the boot-time FAT mount result; a `false` here
    /// makes every cycle fail its Open step until power cycle.
    pub fn new(path: &'static str, mounted: bool) -> Self {
        Self {
            path,
            mounted,
            file: None,
        }
    }
}

impl StoragePort for SdCardStorage {
    fn open_append(&mut self) -> Result<(), StorageError> {
        if !self.mounted {
            return Err(StorageError::NotMounted);
        }
        let fresh = !Path::new(self.path).exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path)
            .map_err(|_| StorageError::OpenFailed)?;
        if fresh {
            writeln!(file, "{}", CSV_HEADER).map_err(|_| StorageError::OpenFailed)?;
        }
        self.file = Some(file);
        Ok(())
    }

    fn write_line(&mut self, line: &str) {
        // Contract: only called between a successful open_append and close.
        if let Some(file) = &mut self.file {
            if writeln!(file, "{}", line).is_err() {
                warn!("SD append lost a line");
            }
        }
    }

    fn close(&mut self) {
        if let Some(file) = self.file.take() {
            if file.sync_all().is_err() {
                warn!("SD sync failed on close");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_log_path(tag: &str) -> &'static str {
        let path = std::env::temp_dir().join(format!("envlog-test-{}-{}.csv", tag, std::process::id()));
        Box::leak(path.to_string_lossy().into_owned().into_boxed_str())
    }

    #[test]
    fn unmounted_card_fails_open() {
        let mut sd = SdCardStorage::new("unused.csv", false);
        assert_eq!(sd.open_append(), Err(StorageError::NotMounted));
    }

    #[test]
    fn fresh_file_gets_header_then_appends() {
        let path = temp_log_path("fresh");
        let _ = std::fs::remove_file(path);

        let mut sd = SdCardStorage::new(path, true);
        sd.open_append().unwrap();
        sd.write_line("line-one");
        sd.close();

        sd.open_append().unwrap();
        sd.write_line("line-two");
        sd.close();

        let contents = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec![CSV_HEADER, "line-one", "line-two"]);

        let _ = std::fs::remove_file(path);
    }
}
