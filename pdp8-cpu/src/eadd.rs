//! Effective-address resolution for the memory-reference opcodes
//! (AND, TAD, ISZ, DCA, JMS, JMP).

use pdp8_core::{FIELD_OFFSET_MASK, OFFSET_MASK, WORD_MASK};

use crate::memory::Memory;
use crate::registers::Registers;

const INDIRECT_BIT: u16 = 0o0400;
const PAGE_BIT: u16 = 0o0200;
const PAGE_MASK: u16 = 0o7600;
/// Addresses 0010-0017 of the current field are auto-increment registers:
/// indirecting through one bumps it before dereference.
const AUTO_INDEX_MASK: u16 = 0o7770;
const AUTO_INDEX_PATTERN: u16 = 0o0010;

/// Resolve `IR`'s operand to a full physical address (`if_reg | offset`
/// for direct, `df | MP[pointer]` for indirect), mutating memory for the
/// auto-increment side effect.
pub fn resolve(regs: &Registers, memory: &mut Memory, thispc: u16) -> u32 {
    let in_field_offset = if regs.ir & PAGE_BIT != 0 {
        (thispc & PAGE_MASK) | (regs.ir & OFFSET_MASK)
    } else {
        regs.ir & OFFSET_MASK
    };
    // if_reg is already left-justified at bits 12-14, so OR it in directly.
    let mut addr = u32::from(regs.if_reg) | u32::from(in_field_offset);

    if regs.ir & INDIRECT_BIT != 0 {
        if (in_field_offset & AUTO_INDEX_MASK) == AUTO_INDEX_PATTERN {
            let bumped = (memory.read(addr).wrapping_add(1)) & WORD_MASK;
            memory.write(addr, bumped);
        }
        let pointer = memory.read(addr);
        addr = u32::from(regs.df) | (u32::from(pointer) & FIELD_OFFSET_MASK);
    }
    addr
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regs_with_ir(ir: u16) -> Registers {
        let mut regs = Registers::new();
        regs.ir = ir;
        regs
    }

    #[test]
    fn direct_page_zero() {
        let regs = regs_with_ir(0o0077);
        let mut mem = Memory::new(4).unwrap();
        assert_eq!(resolve(&regs, &mut mem, 0o0200), 0o0077);
    }

    #[test]
    fn direct_current_page() {
        let regs = regs_with_ir(PAGE_BIT | 0o0077);
        let mut mem = Memory::new(4).unwrap();
        assert_eq!(resolve(&regs, &mut mem, 0o0300), 0o0377);
    }

    #[test]
    fn auto_increment_on_indirect_through_0010_0017() {
        let regs = regs_with_ir(INDIRECT_BIT | 0o0010);
        let mut mem = Memory::new(4).unwrap();
        mem.write(0o0010, 0o0777);
        let addr = resolve(&regs, &mut mem, 0o0200);
        assert_eq!(mem.read(0o0010), 0o1000);
        assert_eq!(addr, 0o1000);
    }

    #[test]
    fn indirect_crosses_into_data_field() {
        let mut regs = regs_with_ir(INDIRECT_BIT | 0o0020);
        regs.df = 0o20000;
        let mut mem = Memory::new(8).unwrap();
        mem.write(0o0020, 0o3456);
        let addr = resolve(&regs, &mut mem, 0o0200);
        assert_eq!(addr, 0o20000 + 0o3456);
    }
}
