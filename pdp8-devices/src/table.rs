//! The fixed device table: every peripheral this crate models, plus the
//! match-based dispatch from a decoded IOT to the right one.
//!
//! A closed, small set of devices is better served by a concrete struct
//! and a `match` than by a `Vec<Box<dyn IoDevice>>`: device numbers are
//! compile-time constants, not data, and each device's `iot` signature
//! already differs just enough (the parity stub needs no host I/O, the
//! printer owns a `Write`) that a single trait object would need to paper
//! over those differences instead of expressing them.

use std::io::Write;
use std::time::Duration;

use pdp8_core::DiagnosticSink;

use crate::context::{IotContext, IotOutcome};
use crate::keyboard::{KeyboardDevice, KeyboardSource};
use crate::parity::ParityDevice;
use crate::printer::PrinterDevice;
use crate::punch::PunchDevice;
use crate::reader::ReaderDevice;

/// Every peripheral device, bundled for construction and dispatch together.
pub struct DeviceTable {
    pub reader: ReaderDevice,
    pub punch: PunchDevice,
    pub keyboard: KeyboardDevice,
    pub printer: PrinterDevice,
    pub parity: ParityDevice,
}

impl DeviceTable {
    #[must_use]
    pub fn new(keyboard_source: Box<dyn KeyboardSource>, printer_sink: Box<dyn Write>) -> Self {
        DeviceTable {
            reader: ReaderDevice::new(),
            punch: PunchDevice::new(),
            keyboard: KeyboardDevice::new(keyboard_source),
            printer: PrinterDevice::new(printer_sink),
            parity: ParityDevice::new(),
        }
    }

    #[must_use]
    pub fn keyboard_mut(&mut self) -> &mut KeyboardDevice {
        &mut self.keyboard
    }

    #[must_use]
    pub fn printer_mut(&mut self) -> &mut PrinterDevice {
        &mut self.printer
    }

    #[must_use]
    pub fn reader_mut(&mut self) -> &mut ReaderDevice {
        &mut self.reader
    }

    #[must_use]
    pub fn punch_mut(&mut self) -> &mut PunchDevice {
        &mut self.punch
    }

    /// Dispatch one decoded IOT to the addressed device. `idle_loop_hint`
    /// is only consulted by the keyboard's `KSF` handling; every other
    /// device ignores it.
    #[allow(clippy::too_many_arguments)]
    pub fn dispatch(
        &mut self,
        device_number: u16,
        function: u16,
        ac: &mut u16,
        ireq: &mut u64,
        this_pc: u16,
        ir: u16,
        idle_loop_hint: bool,
        sink: &mut dyn DiagnosticSink,
    ) -> IotOutcome {
        let mut ctx = IotContext {
            ac,
            ireq,
            device_number,
            this_pc,
            ir,
            idle_loop_hint,
        };
        match device_number {
            ReaderDevice::DEVICE_NUMBER => self.reader.iot(function, &mut ctx, sink),
            PunchDevice::DEVICE_NUMBER => self.punch.iot(function, &mut ctx, sink),
            KeyboardDevice::DEVICE_NUMBER => self.keyboard.iot(function, &mut ctx, sink),
            PrinterDevice::DEVICE_NUMBER => self.printer.iot(function, &mut ctx, sink),
            ParityDevice::DEVICE_NUMBER => self.parity.iot(function, &mut ctx, sink),
            _ => {
                sink.invalid_instruction(this_pc, ir);
                IotOutcome::NONE
            }
        }
    }

    /// Background non-blocking keyboard poll, run once per `KEYB_DELAY`
    /// main-loop iterations regardless of what the program executes.
    pub fn periodic_poll(&mut self, ireq: &mut u64, sink: &mut dyn DiagnosticSink) {
        let mut dummy_ac = 0;
        let mut ctx = IotContext {
            ac: &mut dummy_ac,
            ireq,
            device_number: KeyboardDevice::DEVICE_NUMBER,
            this_pc: 0,
            ir: 0,
            idle_loop_hint: false,
        };
        self.keyboard.periodic_poll(&mut ctx, sink);
    }

    /// The generic `JMP`-based idle-loop detector's bounded blocking read.
    pub fn timed_idle_poll(&mut self, timeout: Duration, ireq: &mut u64, sink: &mut dyn DiagnosticSink) {
        let mut dummy_ac = 0;
        let mut ctx = IotContext {
            ac: &mut dummy_ac,
            ireq,
            device_number: KeyboardDevice::DEVICE_NUMBER,
            this_pc: 0,
            ir: 0,
            idle_loop_hint: false,
        };
        self.keyboard.timed_idle_poll(timeout, &mut ctx, sink);
    }
}
