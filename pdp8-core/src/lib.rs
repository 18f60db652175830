//! Shared primitive types for the PDP-8 simulator.
//!
//! The PDP-8 word is 12 bits wide; everything here works in terms of plain
//! `u16`/`u32` host integers masked to that width rather than a bit-width
//! newtype, matching how register-level emulator code in this workspace is
//! written elsewhere.

mod constants;
mod diagnostic;
mod error;
pub mod isa;
mod observable;

pub use constants::*;
pub use diagnostic::{DiagnosticSink, NullSink};
pub use error::{Pdp8Error, Result};
pub use observable::{Observable, Value};
