//! The virtual console: command REPL, the run/continue/single-step
//! driver, and the always-printed next-instruction preview.
//!
//! Grounded on `console()`/`con_trace`/`con_trace_next`/`con_stop` in
//! `console.c`.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use pdp8_core::HALT;
use pdp8_cpu::{decode, Machine, StepOutcome};
use pdp8_devices::DeviceTable;

use crate::logger::Logger;
use crate::terminal::TerminalKeyboard;
use crate::trace::Tracer;
use pdp8_asm::Assembler;

pub struct Console {
    pub machine: Machine,
    pub assembler: Assembler,
    pub logger: Logger,
    pub tracer: Tracer,
    pub stop: Arc<AtomicBool>,
    pub bp_num: u16,
}

impl Console {
    pub fn new(kwords: usize) -> io::Result<Self> {
        let memory = pdp8_cpu::Memory::new(kwords)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
        let keyboard = TerminalKeyboard::new()?;
        let devices = DeviceTable::new(Box::new(keyboard), Box::new(io::stdout()));
        let stop = Arc::new(AtomicBool::new(false));
        signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&stop))?;

        Ok(Console {
            machine: Machine::new(memory, devices),
            assembler: Assembler::new(),
            logger: Logger::new(),
            tracer: Tracer::new(),
            stop,
            bp_num: 0,
        })
    }

    /// The REPL: read a command line, dispatch it, repeat until `quit`.
    pub fn run(&mut self) {
        println!("\nVirtual console");

        loop {
            print!("\nPC={:05o}> ", self.machine.regs.pc);
            let _ = io::stdout().flush();

            let mut line = String::new();
            if io::stdin().read_line(&mut line).unwrap_or(0) == 0 {
                if self.stop.swap(false, Ordering::SeqCst) {
                    continue; // Ctrl-C at the prompt: ignore, re-prompt.
                }
                return; // EOF
            }

            let Some(argv) = crate::commands::make_argv(&line) else {
                continue;
            };
            if argv.is_empty() {
                continue;
            }

            match crate::commands::find_command(&argv[0]) {
                crate::commands::Lookup::None => println!("Unknown command"),
                crate::commands::Lookup::Ambiguous => println!("Ambiguous command"),
                crate::commands::Lookup::Found(cmd) => {
                    if (cmd.handler)(self, &argv) {
                        return;
                    }
                }
            }
        }
    }

    /// Run from `start` for up to `count` instructions (0 = until
    /// stopped), tracing each one when `regs.trace` is set. Mirrors
    /// `Machine::run` but adds the trace-file hook the library has no
    /// reason to know about.
    pub fn run_machine(&mut self, start: u16, count: u16) -> StepOutcome {
        self.machine.regs.pc = start;
        self.machine.regs.run = true;
        self.machine.regs.bp_num = 0;
        let mut remaining = count;

        loop {
            if self.stop.swap(false, Ordering::SeqCst) {
                self.machine.regs.stop = true;
            }
            let outcome = self.machine.step(&mut self.logger);
            if self.machine.regs.trace {
                let addr = self.machine.regs.thispc;
                let code = self.machine.regs.ir;
                self.tracer.trace(addr, code, &self.machine.regs);
            }
            if !self.machine.regs.run {
                return outcome;
            }
            if count != 0 {
                remaining -= 1;
                if remaining == 0 {
                    self.machine.regs.run = false;
                    return StepOutcome::Continued;
                }
            }
        }
    }

    /// After a `cont`/`run` stops, print breakpoint/halt status the way
    /// the reference console does.
    pub fn report_stop(&mut self, outcome: StepOutcome) {
        match outcome {
            StepOutcome::Breakpoint(num) => {
                let pc = self.machine.regs.pc;
                println!("\nBreakpoint {num:o} @ {pc:05o}");
                self.trace_next();
            }
            StepOutcome::Halted if self.machine.regs.ir == HALT => {
                let pc = self.machine.regs.pc.wrapping_sub(1);
                println!(
                    "\n\nHALT @ {:05o}  L={}  AC={:04o}",
                    pc, self.machine.regs.l, self.machine.regs.ac
                );
            }
            _ => {}
        }
    }

    /// Print the disassembly of the *next* instruction plus the register
    /// file, the way `con_trace_next`/`single_step` do after stepping.
    pub fn trace_next(&self) {
        let regs = &self.machine.regs;
        let addr = regs.pc & pdp8_core::WORD_MASK;
        let code = self.machine.memory.read(u32::from(regs.if_reg) | u32::from(addr));
        let inst = decode(addr, code);
        println!("\nPC={addr:05o} [{code:04o}] {}\t{}", inst.mnemonic, inst.args);
        println!(
            "         L={}  AC={:04o}  MQ={:04o}  IF={}  DF={}  IB={}  IEN={}  IREQ={:08x}",
            regs.l,
            regs.ac,
            regs.mq,
            regs.if_reg >> 12,
            regs.df >> 12,
            regs.ib >> 12,
            u8::from(regs.ien),
            regs.ireq,
        );
    }

    /// Notify the operator a host Ctrl-C reached the prompt while a
    /// program was not running; mirrors `con_stop`, a no-op unless `STOP`
    /// is actually set.
    pub fn announce_stop_if_pending(&self) {
        if self.machine.regs.stop {
            let pc = self.machine.regs.pc.wrapping_sub(1);
            println!(
                "\n\nINTERRUPT @ {:05o}  L={}  AC={:04o}",
                pc, self.machine.regs.l, self.machine.regs.ac
            );
        }
    }
}
