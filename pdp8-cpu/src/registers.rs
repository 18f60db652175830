//! The processor's register file and the flip-flops governing interrupt
//! and field-switching delivery.

use pdp8_core::WORD_MASK;

/// Architectural registers plus the shadow fields the interpreter and
/// console use for diagnostics and breakpoint bookkeeping.
///
/// Bundled into one record (rather than free-standing globals, as the
/// reference implementation has it) so a process can host more than one
/// simulator instance — useful for running tests in parallel.
#[derive(Debug, Clone)]
pub struct Registers {
    /// Accumulator (12 bits).
    pub ac: u16,
    /// Link (1 bit), the ALU's carry-out/shift-in bit.
    pub l: u16,
    /// Multiplier-quotient register (12 bits), used by the EAE.
    pub mq: u16,
    /// Step counter (5 bits), used by EAE shift counts.
    pub sc: u16,
    /// Program counter. Low 12 bits are the in-field offset; `if_reg`
    /// supplies the field.
    pub pc: u16,
    /// Switch register, set from the console and OR'd in by OSR.
    pub sr: u16,
    /// Instruction register: the word just fetched.
    pub ir: u16,
    /// Memory address register (scratch, exposed for `examine`/trace).
    pub ma: u16,
    /// Memory buffer register (scratch, exposed for `examine`/trace).
    pub mb: u16,

    /// Instruction field, left-justified at bits 12-14.
    pub if_reg: u16,
    /// Data field, left-justified at bits 12-14.
    pub df: u16,
    /// Instruction-field buffer: staged by CIF, committed to `if_reg` by
    /// the next JMP/JMS.
    pub ib: u16,
    /// Save-field register: high 3 bits = saved IF, low 3 = saved DF.
    pub sf: u16,

    /// Interpreter is running.
    pub run: bool,
    /// Host requested a stop (Ctrl-C) at the next instruction boundary.
    pub stop: bool,
    /// Interrupts enabled.
    pub ien: bool,
    /// ION takes effect one instruction after being issued.
    pub ion_delay: bool,
    /// Defer interrupt recognition until the next JMP/JMS commits
    /// `if_reg <- ib`.
    pub cif_delay: bool,

    /// One bit per device number (0-63); devices raise/lower their own bit.
    pub ireq: u64,

    /// PC of the instruction currently executing, captured before the
    /// fetch increment.
    pub thispc: u16,
    /// Number (1-based) of the breakpoint whose HLT was just consumed, or
    /// 0 if none.
    pub bp_num: u16,

    /// Instruction tracing is enabled.
    pub trace: bool,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    #[must_use]
    pub fn new() -> Self {
        Registers {
            ac: 0,
            l: 0,
            mq: 0,
            sc: 0,
            pc: 0,
            sr: 0,
            ir: 0,
            ma: 0,
            mb: 0,
            if_reg: 0,
            df: 0,
            ib: 0,
            sf: 0,
            run: false,
            stop: false,
            ien: false,
            ion_delay: false,
            cif_delay: false,
            ireq: 0,
            thispc: 0,
            bp_num: 0,
            trace: false,
        }
    }

    /// Increment PC within the current field, wrapping at the 12-bit
    /// offset boundary without touching the field bits.
    pub fn inc_pc(&mut self) {
        self.pc = (self.pc & !WORD_MASK) | ((self.pc.wrapping_add(1)) & WORD_MASK);
    }
}
