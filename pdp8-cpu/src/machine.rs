//! The fetch/decode/execute interpreter and the `Machine` that owns every
//! piece of simulated state: registers, memory, breakpoints, and devices.

use std::collections::HashMap;
use std::time::Duration;

use pdp8_core::{opcode, DiagnosticSink, Observable, Value, HALT, KEYB_DELAY, WORD_MASK};
use pdp8_devices::DeviceTable;

use crate::breakpoint::BreakpointTable;
use crate::eadd;
use crate::interrupt;
use crate::iot;
use crate::memory::Memory;
use crate::opr;
use crate::registers::Registers;

const PAGE_BIT: u16 = 0o0200;
const PAGE_MASK: u16 = 0o7600;
/// 0.5s read timeout for the generic `JMP`-self idle-loop heuristic.
const IDLE_POLL_TIMEOUT: Duration = Duration::from_millis(500);

/// What happened during the last call to [`Machine::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The interpreter is still running.
    Continued,
    /// An un-breakpointed `HLT` stopped the machine.
    Halted,
    /// A breakpointed `HLT` stopped the machine; memory already holds the
    /// real instruction and `regs.bp_num` names which breakpoint fired.
    Breakpoint(u16),
}

/// Every piece of simulated state, and the interpreter loop over it.
pub struct Machine {
    pub regs: Registers,
    pub memory: Memory,
    pub breakpoints: BreakpointTable,
    pub devices: DeviceTable,
    /// Address of a breakpoint consumed last step, re-armed with `HALT`
    /// once the real instruction there has executed exactly once.
    rearm_addr: Option<u16>,
    /// Counts down to the next background keyboard poll.
    keyb_countdown: u64,
}

impl Machine {
    #[must_use]
    pub fn new(memory: Memory, devices: DeviceTable) -> Self {
        Machine {
            regs: Registers::new(),
            memory,
            breakpoints: BreakpointTable::new(),
            devices,
            rearm_addr: None,
            keyb_countdown: KEYB_DELAY,
        }
    }

    /// Install a breakpoint at `addr`, saving whatever word is there and
    /// overwriting it with `HALT`.
    pub fn set_breakpoint(&mut self, addr: u16) -> pdp8_core::Result<u16> {
        let original = self.memory.read(u32::from(addr));
        let num = self.breakpoints.set(addr, original)?;
        self.memory.write(u32::from(addr), HALT);
        Ok(num)
    }

    /// Remove breakpoint `num`. Only rewrites memory if it still holds the
    /// planted `HALT` — if the breakpoint already fired and was resumed
    /// past, the real instruction is already back in place.
    pub fn clear_breakpoint(&mut self, num: u16) -> pdp8_core::Result<()> {
        let bp = self.breakpoints.clear(num)?;
        if self.memory.read(u32::from(bp.addr)) == HALT {
            self.memory.write(u32::from(bp.addr), bp.saved);
        }
        if self.rearm_addr == Some(bp.addr) {
            self.rearm_addr = None;
        }
        Ok(())
    }

    /// Run from `start` for up to `count` instructions (0 = until halted),
    /// returning why the machine stopped.
    pub fn run(&mut self, start: u16, count: u16, sink: &mut dyn DiagnosticSink) -> StepOutcome {
        self.regs.pc = start;
        self.regs.run = true;
        self.regs.bp_num = 0;
        let mut remaining = count;
        loop {
            let outcome = self.step(sink);
            if !self.regs.run {
                return outcome;
            }
            if count != 0 {
                remaining -= 1;
                if remaining == 0 {
                    self.regs.run = false;
                    return StepOutcome::Continued;
                }
            }
        }
    }

    /// Execute exactly one instruction, including interrupt delivery and
    /// breakpoint housekeeping at the boundary.
    pub fn step(&mut self, sink: &mut dyn DiagnosticSink) -> StepOutcome {
        if self.regs.ion_delay {
            self.regs.ien = true;
            self.regs.ion_delay = false;
        }

        let thispc = self.regs.pc;
        let phys = self.phys_addr(thispc);
        self.regs.ma = thispc;
        self.regs.ir = self.memory.read(phys);
        self.regs.mb = self.regs.ir;
        self.regs.thispc = thispc;
        self.regs.inc_pc();

        match opcode(self.regs.ir) {
            0 => self.and(thispc),
            1 => self.tad(thispc),
            2 => self.isz(thispc),
            3 => self.dca(thispc),
            4 => self.jms(thispc),
            5 => self.jmp(thispc, sink),
            6 => self.do_iot(thispc, sink),
            _ => {
                let memory = &self.memory;
                opr::execute(&mut self.regs, |r| {
                    memory.read(u32::from(r.if_reg) | u32::from(r.pc & WORD_MASK))
                });
            }
        }

        let mut outcome = StepOutcome::Continued;

        // Re-arm a breakpoint consumed by a previous step, now that the
        // real instruction sitting there has executed exactly once.
        if let Some(addr) = self.rearm_addr.take() {
            self.memory.write(u32::from(addr), HALT);
        }

        if !self.regs.run && self.regs.ir == HALT {
            if let Some(num) = self.breakpoints.check(thispc) {
                let bp = self.breakpoints.get(num).expect("check() just found it");
                self.memory.write(u32::from(thispc), bp.saved);
                self.regs.pc = thispc;
                self.regs.bp_num = num;
                self.rearm_addr = Some(thispc);
                outcome = StepOutcome::Breakpoint(num);
            } else {
                outcome = StepOutcome::Halted;
            }
        }

        if self.regs.stop {
            self.regs.run = false;
            self.regs.stop = false;
            if outcome == StepOutcome::Continued {
                outcome = StepOutcome::Halted;
            }
        }

        self.keyb_countdown -= 1;
        if self.keyb_countdown == 0 {
            self.devices.periodic_poll(&mut self.regs.ireq, sink);
            self.keyb_countdown = KEYB_DELAY;
        }
        if self.devices.keyboard_mut().take_stop_request() {
            self.regs.stop = true;
        }

        if interrupt::is_pending(&self.regs) {
            interrupt::service(&mut self.regs, &mut self.memory);
        }

        outcome
    }

    fn phys_addr(&self, pc: u16) -> u32 {
        u32::from(self.regs.if_reg) | u32::from(pc & WORD_MASK)
    }

    fn and(&mut self, thispc: u16) {
        let addr = eadd::resolve(&self.regs, &mut self.memory, thispc);
        self.regs.ac &= self.memory.read(addr);
    }

    fn tad(&mut self, thispc: u16) {
        let addr = eadd::resolve(&self.regs, &mut self.memory, thispc);
        let sum = self.regs.ac + self.memory.read(addr);
        self.regs.l ^= sum >> 12;
        self.regs.ac = sum & WORD_MASK;
    }

    fn isz(&mut self, thispc: u16) {
        let addr = eadd::resolve(&self.regs, &mut self.memory, thispc);
        let bumped = (self.memory.read(addr).wrapping_add(1)) & WORD_MASK;
        self.memory.write(addr, bumped);
        if bumped == 0 {
            self.regs.inc_pc();
        }
    }

    fn dca(&mut self, thispc: u16) {
        let addr = eadd::resolve(&self.regs, &mut self.memory, thispc);
        self.memory.write(addr, self.regs.ac);
        self.regs.ac = 0;
    }

    /// `CIF_delay` gates interrupt recognition until the next `JMP`/`JMS`
    /// commits `IF <- IB`; both always perform the commit (a no-op when no
    /// `CIF` is pending), and both clear the delay once committed so
    /// interrupts resume being recognized.
    fn jms(&mut self, thispc: u16) {
        let addr = eadd::resolve(&self.regs, &mut self.memory, thispc);
        self.regs.if_reg = self.regs.ib;
        self.regs.cif_delay = false;
        let offset = (addr as u16) & WORD_MASK;
        let target = self.regs.if_reg | offset;
        self.memory.write(u32::from(self.regs.if_reg) | u32::from(offset), self.regs.pc & WORD_MASK);
        self.regs.pc = (target & !WORD_MASK) | ((target.wrapping_add(1)) & WORD_MASK);
    }

    fn jmp(&mut self, thispc: u16, sink: &mut dyn DiagnosticSink) {
        let addr = eadd::resolve(&self.regs, &mut self.memory, thispc);
        self.regs.if_reg = self.regs.ib;
        self.regs.cif_delay = false;
        let offset = (addr as u16) & WORD_MASK;
        self.regs.pc = self.regs.if_reg | offset;

        // Idle-loop heuristic: a JMP landing two words before itself, whose
        // middle word is some group-2/3 OPR skip, is almost certainly
        // spinning on an external event. Block briefly instead of burning
        // the host CPU busy-waiting.
        if self.regs.pc == thispc.wrapping_sub(2) {
            let prev = self.memory.read(self.phys_addr(thispc.wrapping_sub(1)));
            if prev & 0o7400 == 0o7400 {
                self.devices
                    .timed_idle_poll(IDLE_POLL_TIMEOUT, &mut self.regs.ireq, sink);
                if self.devices.keyboard_mut().take_stop_request() {
                    self.regs.stop = true;
                }
            }
        }
    }

    fn do_iot(&mut self, thispc: u16, sink: &mut dyn DiagnosticSink) {
        let idle_loop_hint = self.next_instruction_is_jmp_to(thispc);
        iot::execute(
            &mut self.regs,
            &mut self.devices,
            self.memory.nfields(),
            idle_loop_hint,
            sink,
        );
    }

    /// True if the word immediately following `this_pc` is a current-page
    /// `JMP` targeting `this_pc` itself — the classic `KSF`/`JMP .-1` spin.
    fn next_instruction_is_jmp_to(&self, this_pc: u16) -> bool {
        let expected = 0o5000 | PAGE_BIT | (this_pc & PAGE_MASK);
        self.memory.read(self.phys_addr(self.regs.pc)) == expected
    }
}

const OBSERVABLE_PATHS: &[&str] = &[
    "ac", "l", "mq", "sc", "pc", "sr", "ir", "ma", "mb", "if", "df", "ib", "sf", "run", "stop",
    "ien", "ion_delay", "cif_delay", "ireq", "bp_num", "reader.flag", "reader.eot", "punch.flag",
    "keyboard.flag", "printer.flag",
];

impl Observable for Machine {
    fn query(&self, path: &str) -> Option<Value> {
        Some(match path {
            "ac" => Value::from(self.regs.ac),
            "l" => Value::from(self.regs.l != 0),
            "mq" => Value::from(self.regs.mq),
            "sc" => Value::from(self.regs.sc),
            "pc" => Value::from(self.regs.pc),
            "sr" => Value::from(self.regs.sr),
            "ir" => Value::from(self.regs.ir),
            "ma" => Value::from(self.regs.ma),
            "mb" => Value::from(self.regs.mb),
            "if" => Value::from(self.regs.if_reg >> 12),
            "df" => Value::from(self.regs.df >> 12),
            "ib" => Value::from(self.regs.ib >> 12),
            "sf" => Value::from(self.regs.sf),
            "run" => Value::from(self.regs.run),
            "stop" => Value::from(self.regs.stop),
            "ien" => Value::from(self.regs.ien),
            "ion_delay" => Value::from(self.regs.ion_delay),
            "cif_delay" => Value::from(self.regs.cif_delay),
            "ireq" => Value::from(self.regs.ireq),
            "bp_num" => Value::from(self.regs.bp_num),
            "reader.flag" => Value::from(self.devices.reader.flag()),
            "reader.eot" => Value::from(self.devices.reader.eot()),
            "punch.flag" => Value::from(self.devices.punch.flag()),
            "keyboard.flag" => Value::from(self.devices.keyboard.flag()),
            "printer.flag" => Value::from(self.devices.printer.flag()),
            _ => return None,
        })
    }

    fn query_paths(&self) -> &'static [&'static str] {
        OBSERVABLE_PATHS
    }
}

/// All register/flag state as a single snapshot map, for the `shregs`
/// console command.
#[must_use]
pub fn snapshot(machine: &Machine) -> HashMap<String, Value> {
    OBSERVABLE_PATHS
        .iter()
        .filter_map(|path| machine.query(path).map(|v| ((*path).to_string(), v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use pdp8_core::NullSink;
    use pdp8_devices::NullKeyboardSource;

    use super::*;

    fn machine(kwords: usize) -> Machine {
        let memory = Memory::new(kwords).unwrap();
        let devices = DeviceTable::new(Box::new(NullKeyboardSource), Box::new(std::io::sink()));
        Machine::new(memory, devices)
    }

    #[test]
    fn tad_adds_with_carry_into_link() {
        let mut m = machine(4);
        m.memory.write(0o0100, 1);
        m.regs.ac = WORD_MASK;
        m.memory.write(0o0200, 0o1100); // TAD 0100, direct, page zero
        m.regs.pc = 0o0200;
        m.step(&mut NullSink);
        assert_eq!(m.regs.ac, 0);
        assert_eq!(m.regs.l, 1);
    }

    #[test]
    fn dca_deposits_and_clears_accumulator() {
        let mut m = machine(4);
        m.regs.ac = 0o4321;
        m.memory.write(0o0200, 0o3100); // DCA 0100
        m.regs.pc = 0o0200;
        m.step(&mut NullSink);
        assert_eq!(m.memory.read(0o0100), 0o4321);
        assert_eq!(m.regs.ac, 0);
    }

    #[test]
    fn jms_saves_return_address_and_jumps_past_it() {
        let mut m = machine(4);
        m.memory.write(0o0200, 0o4277); // JMS 0277, page zero
        m.regs.pc = 0o0200;
        m.step(&mut NullSink);
        assert_eq!(m.memory.read(0o0277), 0o0201);
        assert_eq!(m.regs.pc, 0o0300);
    }

    #[test]
    fn breakpoint_restores_memory_then_rearms_after_one_instruction() {
        let mut m = machine(4);
        m.memory.write(0o0200, 0o7300); // CLA CLL
        m.memory.write(0o0201, 0o1000); // AND 0 (harmless probe)
        let num = m.set_breakpoint(0o0200).unwrap();
        assert_eq!(m.memory.read(0o0200), HALT);

        m.regs.pc = 0o0200;
        m.regs.run = true;
        let outcome = m.step(&mut NullSink);
        assert_eq!(outcome, StepOutcome::Breakpoint(num));
        assert_eq!(m.memory.read(0o0200), 0o7300, "real instruction restored for inspection");
        assert_eq!(m.regs.pc, 0o0200);

        m.regs.run = true;
        m.step(&mut NullSink);
        assert_eq!(m.regs.ac, 0, "the real CLA actually executed");
        assert_eq!(m.memory.read(0o0200), HALT, "breakpoint re-armed after one pass");
    }

    #[test]
    fn isz_of_all_ones_wraps_to_zero_and_skips() {
        let mut m = machine(4);
        m.memory.write(0o0100, 0o7777);
        m.memory.write(0o0200, 0o2100); // ISZ 0100
        m.memory.write(0o0202, 0o7402); // HLT (would be skipped to)
        m.regs.pc = 0o0200;
        m.step(&mut NullSink);
        assert_eq!(m.memory.read(0o0100), 0);
        assert_eq!(m.regs.pc, 0o0202);
    }

    #[test]
    fn ion_delays_interrupt_recognition_by_exactly_one_instruction() {
        let mut m = machine(4);
        m.memory.write(0o0200, 0o6001); // ION
        m.memory.write(0o0201, 0o7000); // the one instruction ION lets through
        m.regs.pc = 0o0200;
        m.regs.ireq = 1;

        m.step(&mut NullSink); // executes ION itself: arms ion_delay, no service yet
        assert!(m.regs.ion_delay);
        assert!(!m.regs.ien);
        assert_eq!(m.regs.pc, 0o0201);

        m.step(&mut NullSink); // ion_delay resolves to ien, the next instruction runs, then service fires
        assert_eq!(m.regs.pc, 1, "interrupt vectored through location 0");
        assert!(!m.regs.ien, "ien cleared by the vector");
    }
}
