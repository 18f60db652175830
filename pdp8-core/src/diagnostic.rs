//! Sink for simulated-invalid-instruction and host-I/O diagnostics.
//!
//! `pdp8-cpu` and `pdp8-devices` need somewhere to report an unimplemented
//! opcode/function combination or a degraded host I/O operation without
//! depending on `pdp8-console`'s concrete logger. A `DiagnosticSink` is
//! handed to the interpreter and device table by the console binary; the
//! trait is the seam spec.md §9 asks for ("flat invalid-instruction logging
//! with repeat coalescing... as a property of the logger sink").

/// Receives diagnostic events from the interpreter and device table.
///
/// Implementations are expected to coalesce identical consecutive calls
/// (spec.md §7 kind 4, §9): count repeats and flush once on change. A
/// no-op implementation (discarding everything) is valid and is what the
/// interpreter uses when no sink has been attached.
pub trait DiagnosticSink {
    /// An opcode/function combination with no modeled effect was executed.
    /// `pc` is the address of the offending instruction, `ir` its word.
    fn invalid_instruction(&mut self, pc: u16, ir: u16);

    /// A host I/O operation failed or degraded. `pc`/`ir` identify the
    /// instruction in flight when the failure was noticed, `context`
    /// names the operation (e.g. `"paper tape reader"`), and `error` is
    /// the underlying error whose `Display` carries the OS message.
    fn io_error(&mut self, pc: u16, ir: u16, context: &str, error: &std::io::Error);
}

/// A sink that discards every event. Used as the default when the
/// interpreter is driven without a console attached (e.g. from tests).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn invalid_instruction(&mut self, _pc: u16, _ir: u16) {}
    fn io_error(&mut self, _pc: u16, _ir: u16, _context: &str, _error: &std::io::Error) {}
}
