//! Device 4: ASR-33 printer / low-speed paper-tape punch.

use std::io::Write;

use pdp8_core::DiagnosticSink;

use crate::context::{IotContext, IotOutcome};

mod func {
    pub const SPF: u16 = 0;
    pub const TSF: u16 = 1;
    pub const TCF: u16 = 2;
    pub const TPC: u16 = 4;
    pub const TLS: u16 = 6;
}

/// ASR-33 printer (device 4). Writes to `sink`, by default the process's
/// standard output.
pub struct PrinterDevice {
    sink: Box<dyn Write>,
    flag: bool,
}

impl PrinterDevice {
    pub const DEVICE_NUMBER: u16 = 4;

    #[must_use]
    pub fn new(sink: Box<dyn Write>) -> Self {
        PrinterDevice { sink, flag: false }
    }

    #[must_use]
    pub fn flag(&self) -> bool {
        self.flag
    }

    fn write(&mut self, byte: u8, sink: &mut dyn DiagnosticSink, this_pc: u16, ir: u16) {
        match self.sink.write_all(&[byte]) {
            Ok(()) => self.flag = true,
            Err(err) => sink.io_error(this_pc, ir, "printer", &err),
        }
    }

    pub fn iot(
        &mut self,
        function: u16,
        ctx: &mut IotContext<'_>,
        sink: &mut dyn DiagnosticSink,
    ) -> IotOutcome {
        match function {
            func::SPF => {
                self.flag = true;
                ctx.raise_request();
                IotOutcome::NONE
            }
            // Deliberate deviation: some PDP-8 references skip TSF
            // unconditionally, treating the printer as always ready. This
            // checks the real flag so a full buffer is observable.
            func::TSF => {
                if self.flag {
                    IotOutcome::SKIP
                } else {
                    IotOutcome::NONE
                }
            }
            func::TCF => {
                self.flag = false;
                ctx.clear_request();
                IotOutcome::NONE
            }
            func::TPC => {
                let byte = (*ctx.ac & 0o177) as u8;
                self.write(byte, sink, ctx.this_pc, ctx.ir);
                ctx.raise_request();
                IotOutcome::NONE
            }
            func::TLS => {
                self.flag = false;
                let byte = (*ctx.ac & 0o177) as u8;
                self.write(byte, sink, ctx.this_pc, ctx.ir);
                ctx.raise_request();
                IotOutcome::NONE
            }
            _ => {
                sink.invalid_instruction(ctx.this_pc, ctx.ir);
                IotOutcome::NONE
            }
        }
    }
}
