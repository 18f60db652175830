//! Device 3: ASR-33 keyboard / low-speed paper-tape reader.

use std::time::Duration;

use pdp8_core::DiagnosticSink;

use crate::context::{IotContext, IotOutcome};

mod func {
    pub const KCF: u16 = 0;
    pub const KSF: u16 = 1;
    pub const KCC: u16 = 2;
    pub const KRS: u16 = 4;
    pub const KIE: u16 = 5;
    pub const KRB: u16 = 6;
}

/// Where keyboard bytes come from.
///
/// `pdp8-console` implements this over a raw-mode stdin; tests implement it
/// over a canned byte queue. The three read modes mirror `tty.c`'s
/// `tty_keyb_get_flag`/`tty_keyb_wait1`/`tty_keyb_timed_wait1`: non-blocking
/// poll, blocking read, and a timed blocking read.
pub trait KeyboardSource {
    /// Non-blocking: `Ok(Some(byte))` if one is already available.
    fn poll(&mut self) -> std::io::Result<Option<u8>>;

    /// Block until exactly one byte is available, no timeout. Used by the
    /// `KSF`-lookahead idle-loop detector (spec.md §4.5).
    fn read_blocking(&mut self) -> std::io::Result<u8>;

    /// Block until one byte is available or `timeout` elapses. Used by the
    /// generic `JMP`-based idle-loop detector (spec.md §4.1).
    fn read_timeout(&mut self, timeout: Duration) -> std::io::Result<Option<u8>>;
}

/// A keyboard source with no input; every read reports nothing available.
/// Used when the console has no real terminal attached (e.g. unit tests).
#[derive(Debug, Default)]
pub struct NullKeyboardSource;

impl KeyboardSource for NullKeyboardSource {
    fn poll(&mut self) -> std::io::Result<Option<u8>> {
        Ok(None)
    }

    fn read_blocking(&mut self) -> std::io::Result<u8> {
        Ok(0)
    }

    fn read_timeout(&mut self, _timeout: Duration) -> std::io::Result<Option<u8>> {
        Ok(None)
    }
}

/// ASR-33 keyboard / low-speed reader (device 3).
pub struct KeyboardDevice {
    source: Box<dyn KeyboardSource>,
    flag: bool,
    buffer: u8,
    /// Set by the interpreter when it sees `SIGINT` landed on a byte equal
    /// to Ctrl-C while blocked reading (`tty.c`'s `cpu_stop()` call).
    stop_on_next: bool,
}

impl KeyboardDevice {
    pub const DEVICE_NUMBER: u16 = 3;
    const CTRL_C: u8 = 0x03;

    #[must_use]
    pub fn new(source: Box<dyn KeyboardSource>) -> Self {
        KeyboardDevice {
            source,
            flag: false,
            buffer: 0,
            stop_on_next: false,
        }
    }

    #[must_use]
    pub fn flag(&self) -> bool {
        self.flag
    }

    /// Replace the underlying input source.
    pub fn set_source(&mut self, source: Box<dyn KeyboardSource>) {
        self.source = source;
    }

    /// True if the last byte observed was Ctrl-C; cleared after being read.
    #[must_use]
    pub fn take_stop_request(&mut self) -> bool {
        std::mem::take(&mut self.stop_on_next)
    }

    fn accept(&mut self, byte: u8) {
        self.buffer = byte;
        self.flag = true;
        if byte == Self::CTRL_C {
            self.stop_on_next = true;
        }
    }

    /// Periodic non-blocking poll (spec.md §4.1's `KEYB_DELAY` check).
    pub fn periodic_poll(&mut self, ctx: &mut IotContext<'_>, sink: &mut dyn DiagnosticSink) {
        if self.flag {
            return;
        }
        match self.source.poll() {
            Ok(Some(byte)) => {
                self.accept(byte);
                ctx.raise_request();
            }
            Ok(None) => ctx.clear_request(),
            Err(err) => sink.io_error(ctx.this_pc, ctx.ir, "keyboard", &err),
        }
    }

    /// The `JMP`-based generic idle-loop poll (spec.md §4.1): a bounded
    /// blocking read, used when the interpreter detects a software poll
    /// loop that isn't the `KSF; JMP .-1` pattern `iot` already handles.
    pub fn timed_idle_poll(
        &mut self,
        timeout: Duration,
        ctx: &mut IotContext<'_>,
        sink: &mut dyn DiagnosticSink,
    ) {
        if self.flag {
            return;
        }
        match self.source.read_timeout(timeout) {
            Ok(Some(byte)) => {
                self.accept(byte);
                ctx.raise_request();
            }
            Ok(None) => ctx.clear_request(),
            Err(err) => sink.io_error(ctx.this_pc, ctx.ir, "keyboard", &err),
        }
    }

    pub fn iot(
        &mut self,
        function: u16,
        ctx: &mut IotContext<'_>,
        sink: &mut dyn DiagnosticSink,
    ) -> IotOutcome {
        match function {
            func::KCF => {
                self.flag = false;
                ctx.clear_request();
                IotOutcome::NONE
            }
            func::KSF => {
                if self.flag {
                    return IotOutcome::SKIP;
                }
                // `ctx.idle_loop_hint` is set by the interpreter when the word
                // right after this KSF is `JMP .-1` targeting this instruction
                // (tty.c's `cpu_is_jmpm1`): block for a key rather than polling.
                let result = if ctx.idle_loop_hint {
                    self.source.read_blocking().map(Some)
                } else {
                    self.source.poll()
                };
                match result {
                    Ok(Some(byte)) => {
                        self.accept(byte);
                        ctx.raise_request();
                        IotOutcome::SKIP
                    }
                    Ok(None) => {
                        ctx.clear_request();
                        IotOutcome::NONE
                    }
                    Err(err) => {
                        sink.io_error(ctx.this_pc, ctx.ir, "keyboard", &err);
                        IotOutcome::NONE
                    }
                }
            }
            func::KCC => {
                *ctx.ac = 0;
                self.flag = false;
                ctx.clear_request();
                IotOutcome::NONE
            }
            func::KRS => {
                // Read buffer static: leave the flag and interrupt request
                // untouched, unlike KRB.
                *ctx.ac |= u16::from(self.buffer) | 0o200;
                IotOutcome::NONE
            }
            func::KIE => IotOutcome::NONE,
            func::KRB => {
                *ctx.ac = u16::from(self.buffer) | 0o200;
                self.flag = false;
                ctx.clear_request();
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
    use std::collections::VecDeque;

    use pdp8_core::NullSink;

    use super::*;

    struct QueueSource(VecDeque<u8>);

    impl KeyboardSource for QueueSource {
        fn poll(&mut self) -> std::io::Result<Option<u8>> {
            Ok(self.0.pop_front())
        }

        fn read_blocking(&mut self) -> std::io::Result<u8> {
            Ok(self.0.pop_front().unwrap_or(0))
        }

        fn read_timeout(&mut self, _timeout: Duration) -> std::io::Result<Option<u8>> {
            Ok(self.0.pop_front())
        }
    }

    fn ctx<'a>(ac: &'a mut u16, ireq: &'a mut u64, idle_loop_hint: bool) -> IotContext<'a> {
        IotContext {
            ac,
            ireq,
            device_number: KeyboardDevice::DEVICE_NUMBER,
            this_pc: 0,
            ir: 0,
            idle_loop_hint,
        }
    }

    #[test]
    fn ksf_polls_without_idle_hint_and_sets_flag_on_byte() {
        let mut dev = KeyboardDevice::new(Box::new(QueueSource(VecDeque::from([b'A']))));
        let mut sink = NullSink;
        let (mut ac, mut ireq) = (0u16, 0u64);
        let outcome = dev.iot(func::KSF, &mut ctx(&mut ac, &mut ireq, false), &mut sink);
        assert!(outcome.skip);
        assert!(dev.flag());
        assert_eq!(ireq, 1 << KeyboardDevice::DEVICE_NUMBER);
    }

    #[test]
    fn ksf_with_idle_hint_blocks_for_a_byte() {
        let mut dev = KeyboardDevice::new(Box::new(QueueSource(VecDeque::from([b'Z']))));
        let mut sink = NullSink;
        let (mut ac, mut ireq) = (0u16, 0u64);
        let outcome = dev.iot(func::KSF, &mut ctx(&mut ac, &mut ireq, true), &mut sink);
        assert!(outcome.skip);
        assert!(dev.flag());
    }

    #[test]
    fn krb_clears_ac_then_loads_buffer_with_high_bit_and_clears_flag() {
        let mut dev = KeyboardDevice::new(Box::new(QueueSource(VecDeque::from([b'X']))));
        let mut sink = NullSink;
        let (mut ac, mut ireq) = (0o7777u16, 0u64);
        dev.iot(func::KSF, &mut ctx(&mut ac, &mut ireq, false), &mut sink);
        let outcome = dev.iot(func::KRB, &mut ctx(&mut ac, &mut ireq, false), &mut sink);
        assert!(!outcome.skip);
        assert_eq!(ac, u16::from(b'X') | 0o200);
        assert!(!dev.flag());
        assert_eq!(ireq, 0);
    }

    #[test]
    fn krs_leaves_flag_and_request_untouched() {
        let mut dev = KeyboardDevice::new(Box::new(QueueSource(VecDeque::from([b'Y']))));
        let mut sink = NullSink;
        let (mut ac, mut ireq) = (0u16, 0u64);
        dev.iot(func::KSF, &mut ctx(&mut ac, &mut ireq, false), &mut sink);
        ac = 0;
        dev.iot(func::KRS, &mut ctx(&mut ac, &mut ireq, false), &mut sink);
        assert_eq!(ac, u16::from(b'Y') | 0o200);
        assert!(dev.flag());
        assert_eq!(ireq, 1 << KeyboardDevice::DEVICE_NUMBER);
    }

    #[test]
    fn ctrl_c_requests_stop() {
        let mut dev = KeyboardDevice::new(Box::new(QueueSource(VecDeque::from([
            KeyboardDevice::CTRL_C,
        ]))));
        let mut sink = NullSink;
        let (mut ac, mut ireq) = (0u16, 0u64);
        dev.iot(func::KSF, &mut ctx(&mut ac, &mut ireq, false), &mut sink);
        assert!(dev.take_stop_request());
        assert!(!dev.take_stop_request());
    }
}
