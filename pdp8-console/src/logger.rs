//! Diagnostic logging with repeat coalescing, appended to `pdp8-log.txt`.
//!
//! Grounded on `log_invalid`/`log_error`: both kinds of event share one
//! last-message/repeat-count pair, so a run of identical invalid
//! instructions collapses to one line plus a repeat count instead of
//! flooding the file. A host I/O error is also echoed to stderr when
//! logging isn't enabled, matching `log_error`'s fallback.

use std::fs::{File, OpenOptions};
use std::io::Write;

const LOG_FILE: &str = "pdp8-log.txt";

pub struct Logger {
    file: Option<File>,
    last_msg: String,
    repeat: u32,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    #[must_use]
    pub fn new() -> Self {
        Logger {
            file: None,
            last_msg: String::new(),
            repeat: 0,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Open (or reopen) the log file, appending a timestamped banner.
    pub fn open(&mut self) {
        if self.file.is_some() {
            return;
        }
        match OpenOptions::new().create(true).append(true).open(LOG_FILE) {
            Ok(mut file) => {
                let _ = writeln!(file, "----- Opened {}", chrono::Local::now().to_rfc2822());
                self.file = Some(file);
                self.last_msg.clear();
                self.repeat = 0;
            }
            Err(err) => eprintln!("Could not open {LOG_FILE}: {err}"),
        }
    }

    /// Flush the pending message and close the log file.
    pub fn close(&mut self) {
        if let Some(mut file) = self.file.take() {
            self.flush_pending(&mut file);
            let _ = writeln!(file, "----- Closed {}", chrono::Local::now().to_rfc2822());
        }
        self.last_msg.clear();
        self.repeat = 0;
    }

    fn flush_pending(&mut self, file: &mut File) {
        if self.last_msg.is_empty() {
            return;
        }
        let _ = writeln!(file, "{}", self.last_msg);
        if self.repeat > 0 {
            let _ = writeln!(file, "  repeated {} times", self.repeat + 1);
        }
    }

    fn record(&mut self, msg: String) {
        let Some(mut file) = self.file.take() else { return };
        if msg != self.last_msg {
            self.flush_pending(&mut file);
            self.last_msg = msg;
            self.repeat = 0;
        } else {
            self.repeat += 1;
        }
        self.file = Some(file);
    }
}

impl pdp8_core::DiagnosticSink for Logger {
    fn invalid_instruction(&mut self, pc: u16, ir: u16) {
        if self.file.is_none() {
            return;
        }
        self.record(format!("Invalid {pc:05o} {ir:04o}"));
    }

    fn io_error(&mut self, pc: u16, ir: u16, context: &str, error: &std::io::Error) {
        let msg = format!("Error @ {pc:05o} {ir:04o} {context}: {error}");
        if self.file.is_none() {
            eprintln!("{msg}");
            return;
        }
        self.record(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdp8_core::DiagnosticSink;

    #[test]
    fn coalesces_consecutive_identical_invalid_instructions() {
        let mut logger = Logger::new();
        // Not open: calls are no-ops, but must not panic.
        logger.invalid_instruction(0o0200, 0o6611);
        logger.invalid_instruction(0o0200, 0o6611);
        assert!(!logger.is_open());
    }
}
