//! The crate-wide error type.
//!
//! Variants line up with the error kinds of spec.md §7. Kinds 4 (simulated
//! invalid instruction) and 6 (internal invariant violation) are not
//! represented here: §7 says the interpreter "never halts on simulated
//! errors", so invalid-instruction events flow through [`crate::DiagnosticSink`]
//! instead, and invariant violations are a `panic!` at the single call site
//! that can detect them (an impossibly large device number).

use std::fmt;

/// An error surfaced by configuration, console commands, or tape/image
/// loading.
#[derive(Debug)]
pub enum Pdp8Error {
    /// Bad command-line argument (spec.md §7 kind 1). Carries the message
    /// already formatted for display to the operator.
    Configuration(String),
    /// Operator-visible console command diagnostic (kind 2): unknown
    /// command, ambiguous command, wrong argument count, octal overflow.
    Command(String),
    /// Malformed source, RIM, BIN or TXT image (kind 3).
    Load(String),
    /// Host I/O failure from the terminal, paper tape, or log/trace files
    /// (kind 5). Wraps the underlying error so `Display` reproduces the OS
    /// message the way `log_error`'s `strerror_r` call did.
    Io(std::io::Error),
}

impl fmt::Display for Pdp8Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pdp8Error::Configuration(msg) => write!(f, "{msg}"),
            Pdp8Error::Command(msg) => write!(f, "{msg}"),
            Pdp8Error::Load(msg) => write!(f, "load error: {msg}"),
            Pdp8Error::Io(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Pdp8Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Pdp8Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Pdp8Error {
    fn from(err: std::io::Error) -> Self {
        Pdp8Error::Io(err)
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Pdp8Error>;
