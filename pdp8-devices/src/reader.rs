//! Device 1: high-speed paper-tape reader.

use std::io::Read;

use pdp8_core::DiagnosticSink;

use crate::context::{IotContext, IotOutcome};

/// Function codes as they appear in bits 0-2 of the IOT word.
mod func {
    pub const ENABLE_IOMEC: u16 = 0;
    pub const RSF: u16 = 1;
    pub const RRB: u16 = 2;
    pub const SKIP_EOT_IOMEC: u16 = 5;
    pub const RFC: u16 = 4;
    pub const RFC_RRB: u16 = 6;
    pub const CLEAR_EOT_IOMEC: u16 = 7;
}

/// The high-speed paper-tape reader (device 1).
///
/// `io_mechanism` gates the extra IOmec-only subcodes (function 0, 5, 7),
/// active only when the IOmec high-speed-reader controller variant is
/// configured, as distinct from the stock ASR-33/PC-04 reader. Off by
/// default.
pub struct ReaderDevice {
    source: Option<Box<dyn Read>>,
    flag: bool,
    buffer: u8,
    eot: bool,
    io_mechanism: bool,
    mechanism_ien: bool,
}

impl Default for ReaderDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl ReaderDevice {
    pub const DEVICE_NUMBER: u16 = 1;

    #[must_use]
    pub fn new() -> Self {
        ReaderDevice {
            source: None,
            flag: false,
            buffer: 0,
            eot: false,
            io_mechanism: false,
            mechanism_ien: false,
        }
    }

    /// Redirect the reader to read from `source` (the `assign` console
    /// command). Clears the end-of-tape latch.
    pub fn assign(&mut self, source: Box<dyn Read>) {
        self.source = Some(source);
        self.eot = false;
        self.flag = false;
    }

    /// Enable or disable the IOmec high-speed controller subcodes.
    pub fn set_io_mechanism(&mut self, enabled: bool) {
        self.io_mechanism = enabled;
    }

    #[must_use]
    pub fn flag(&self) -> bool {
        self.flag
    }

    #[must_use]
    pub fn eot(&self) -> bool {
        self.eot
    }

    fn fetch(&mut self, sink: &mut dyn DiagnosticSink, this_pc: u16, ir: u16) {
        let Some(source) = self.source.as_mut() else {
            self.eot = true;
            return;
        };
        let mut byte = [0u8; 1];
        match source.read(&mut byte) {
            Ok(0) => self.eot = true,
            Ok(_) => {
                // LF -> CR translation, matching the ASR-33's line discipline.
                self.buffer = if byte[0] == b'\n' { b'\r' } else { byte[0] };
                self.flag = true;
            }
            Err(err) => sink.io_error(this_pc, ir, "paper tape reader", &err),
        }
    }

    pub fn iot(
        &mut self,
        function: u16,
        ctx: &mut IotContext<'_>,
        sink: &mut dyn DiagnosticSink,
    ) -> IotOutcome {
        match function {
            func::ENABLE_IOMEC if self.io_mechanism => {
                self.mechanism_ien = true;
                IotOutcome::NONE
            }
            func::RSF => {
                if self.flag {
                    IotOutcome::SKIP
                } else {
                    IotOutcome::NONE
                }
            }
            func::RRB => {
                *ctx.ac |= u16::from(self.buffer);
                self.flag = false;
                IotOutcome::NONE
            }
            func::SKIP_EOT_IOMEC if self.io_mechanism => {
                if self.eot {
                    IotOutcome::SKIP
                } else {
                    IotOutcome::NONE
                }
            }
            func::RFC => {
                self.fetch(sink, ctx.this_pc, ctx.ir);
                IotOutcome::NONE
            }
            func::RFC_RRB => {
                *ctx.ac |= u16::from(self.buffer);
                self.flag = false;
                self.fetch(sink, ctx.this_pc, ctx.ir);
                IotOutcome::NONE
            }
            func::CLEAR_EOT_IOMEC if self.io_mechanism => {
                self.eot = false;
                IotOutcome::NONE
            }
            _ => {
                sink.invalid_instruction(ctx.this_pc, ctx.ir);
                IotOutcome::NONE
            }
        }
    }
}
