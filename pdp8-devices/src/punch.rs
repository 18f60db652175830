//! Device 2: high-speed paper-tape punch.

use std::io::Write;

use pdp8_core::DiagnosticSink;

use crate::context::{IotContext, IotOutcome};

mod func {
    pub const PSF: u16 = 1;
    pub const PCF: u16 = 2;
    pub const PPC: u16 = 4;
    pub const PLS: u16 = 6;
}

/// The high-speed paper-tape punch (device 2).
pub struct PunchDevice {
    sink: Option<Box<dyn Write>>,
    flag: bool,
}

impl Default for PunchDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl PunchDevice {
    pub const DEVICE_NUMBER: u16 = 2;

    #[must_use]
    pub fn new() -> Self {
        PunchDevice {
            sink: None,
            flag: false,
        }
    }

    /// Redirect the punch to write to `sink` (the `assign` console command).
    /// Closes and replaces any previously assigned file.
    pub fn assign(&mut self, sink: Box<dyn Write>) {
        self.sink = Some(sink);
        self.flag = false;
    }

    #[must_use]
    pub fn flag(&self) -> bool {
        self.flag
    }

    fn write(&mut self, byte: u8, sink: &mut dyn DiagnosticSink, this_pc: u16, ir: u16) {
        let Some(out) = self.sink.as_mut() else {
            return;
        };
        match out.write_all(&[byte]) {
            Ok(()) => self.flag = true,
            Err(err) => sink.io_error(this_pc, ir, "paper tape punch", &err),
        }
    }

    pub fn iot(
        &mut self,
        function: u16,
        ctx: &mut IotContext<'_>,
        sink: &mut dyn DiagnosticSink,
    ) -> IotOutcome {
        match function {
            func::PSF => {
                if self.flag {
                    IotOutcome::SKIP
                } else {
                    IotOutcome::NONE
                }
            }
            func::PCF => {
                self.flag = false;
                IotOutcome::NONE
            }
            func::PPC => {
                let byte = (*ctx.ac & 0xFF) as u8;
                self.write(byte, sink, ctx.this_pc, ctx.ir);
                IotOutcome::NONE
            }
            func::PLS => {
                self.flag = false;
                let byte = (*ctx.ac & 0xFF) as u8;
                self.write(byte, sink, ctx.this_pc, ctx.ir);
                IotOutcome::NONE
            }
            _ => {
                sink.invalid_instruction(ctx.this_pc, ctx.ir);
                IotOutcome::NONE
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use pdp8_core::NullSink;

    use super::*;

    fn ctx<'a>(ac: &'a mut u16, ireq: &'a mut u64) -> IotContext<'a> {
        IotContext {
            ac,
            ireq,
            device_number: PunchDevice::DEVICE_NUMBER,
            this_pc: 0,
            ir: 0,
            idle_loop_hint: false,
        }
    }

    #[derive(Clone)]
    struct CapturingWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn ppc_writes_low_byte_and_sets_flag() {
        let mut dev = PunchDevice::new();
        let captured = Arc::new(Mutex::new(Vec::new()));
        dev.assign(Box::new(CapturingWriter(captured.clone())));
        let mut sink = NullSink;
        let (mut ac, mut ireq) = (0o401u16, 0u64);
        dev.iot(func::PPC, &mut ctx(&mut ac, &mut ireq), &mut sink);
        assert!(dev.flag());
        assert_eq!(*captured.lock().unwrap(), vec![0o401u16 as u8]);
    }

    #[test]
    fn psf_skips_only_once_flag_is_set() {
        let mut dev = PunchDevice::new();
        let mut sink = NullSink;
        let (mut ac, mut ireq) = (0u16, 0u64);
        let before = dev.iot(func::PSF, &mut ctx(&mut ac, &mut ireq), &mut sink);
        assert!(!before.skip);

        dev.assign(Box::new(std::io::sink()));
        dev.iot(func::PPC, &mut ctx(&mut ac, &mut ireq), &mut sink);
        let after = dev.iot(func::PSF, &mut ctx(&mut ac, &mut ireq), &mut sink);
        assert!(after.skip);
    }

    #[test]
    fn pcf_clears_flag() {
        let mut dev = PunchDevice::new();
        dev.assign(Box::new(std::io::sink()));
        let mut sink = NullSink;
        let (mut ac, mut ireq) = (0u16, 0u64);
        dev.iot(func::PPC, &mut ctx(&mut ac, &mut ireq), &mut sink);
        dev.iot(func::PCF, &mut ctx(&mut ac, &mut ireq), &mut sink);
        assert!(!dev.flag());
    }
}
