//! Instruction trace writer, grounded on `con_trace`: one line per traced
//! instruction, written to a file or, absent one, to stdout. A trace file
//! past 10 MiB is closed and tracing falls back to stdout, matching the
//! reference console's `traceb` byte counter.

use std::fs::File;
use std::io::{self, Write};

use pdp8_cpu::{decode, Registers};

const ROTATE_BYTES: u64 = 10 * 1024 * 1024;

enum Sink {
    Stdout,
    File(File, u64),
}

pub struct Tracer {
    sink: Sink,
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracer {
    #[must_use]
    pub fn new() -> Self {
        Tracer { sink: Sink::Stdout }
    }

    /// Direct tracing to `path`, falling back to stdout if it can't be
    /// opened (the caller is told which happened via the `Result`).
    pub fn open_file(&mut self, path: &str) -> io::Result<()> {
        let file = File::create(path)?;
        self.sink = Sink::File(file, 0);
        Ok(())
    }

    pub fn use_stdout(&mut self) {
        self.sink = Sink::Stdout;
    }

    /// Emit one trace line for the instruction just executed at `addr`.
    pub fn trace(&mut self, addr: u16, code: u16, regs: &Registers) {
        let inst = decode(addr, code);
        let line = if inst.args.is_empty() {
            format!(
                "PC={addr:05o} [{code:04o}] {:<16} L={} AC={:04o} IF={} DF={} IB={} MA={:05o} IEN={} IREQ={:08x}",
                inst.mnemonic,
                regs.l,
                regs.ac,
                regs.if_reg >> 12,
                regs.df >> 12,
                regs.ib >> 12,
                regs.ma,
                u8::from(regs.ien),
                regs.ireq,
            )
        } else {
            format!(
                "PC={addr:05o} [{code:04o}] {:<8} {:<8} L={} AC={:04o} IF={} DF={} IB={} MA={:05o} IEN={} IREQ={:08x}",
                inst.mnemonic,
                inst.args,
                regs.l,
                regs.ac,
                regs.if_reg >> 12,
                regs.df >> 12,
                regs.ib >> 12,
                regs.ma,
                u8::from(regs.ien),
                regs.ireq,
            )
        };

        match &mut self.sink {
            Sink::Stdout => println!("{line}"),
            Sink::File(file, written) => {
                if let Err(err) = writeln!(file, "{line}") {
                    eprintln!("Trace write failed, falling back to stdout: {err}");
                    self.sink = Sink::Stdout;
                    println!("{line}");
                    return;
                }
                *written += line.len() as u64 + 1;
                if *written > ROTATE_BYTES {
                    self.sink = Sink::Stdout;
                }
            }
        }
    }
}
