//! Device 10 (octal): memory parity / power-low stub.
//!
//! No parity errors or power-fail conditions are modeled; this simply
//! reproduces the three function codes' fixed responses (spec.md §4.5).

use pdp8_core::DiagnosticSink;

use crate::context::{IotContext, IotOutcome};

mod func {
    pub const SMP: u16 = 1;
    pub const SPL: u16 = 2;
    pub const CMP: u16 = 4;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ParityDevice;

impl ParityDevice {
    pub const DEVICE_NUMBER: u16 = 0o10;

    #[must_use]
    pub fn new() -> Self {
        ParityDevice
    }

    pub fn iot(
        &mut self,
        function: u16,
        ctx: &mut IotContext<'_>,
        sink: &mut dyn DiagnosticSink,
    ) -> IotOutcome {
        match function {
            func::SMP => IotOutcome::SKIP,
            func::SPL | func::CMP => IotOutcome::NONE,
            _ => {
                sink.invalid_instruction(ctx.this_pc, ctx.ir);
                IotOutcome::NONE
            }
        }
    }
}
