//! Interrupt delivery: the JMS-to-field-0-location-0 vector serviced
//! between instructions.

use crate::memory::Memory;
use crate::registers::Registers;

/// True when an interrupt should be serviced at this instruction boundary.
#[must_use]
pub fn is_pending(regs: &Registers) -> bool {
    regs.ireq != 0 && regs.ien && !regs.ion_delay && !regs.cif_delay
}

/// Vector through location 0 of field 0, saving field state into `SF` and
/// clearing `IEN` so the handler runs until it re-arms via RTF/ION.
pub fn service(regs: &mut Registers, memory: &mut Memory) {
    memory.write(0, regs.pc & pdp8_core::WORD_MASK);
    regs.pc = 1;
    regs.ien = false;
    regs.sf = (regs.if_reg >> 9) | (regs.df >> 12);
    regs.if_reg = 0;
    regs.df = 0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_vectors_through_zero_and_packs_save_field() {
        let mut regs = Registers::new();
        regs.pc = 0o0345;
        regs.if_reg = 0o20000;
        regs.df = 0o30000;
        regs.ien = true;
        let mut mem = Memory::new(8).unwrap();
        service(&mut regs, &mut mem);
        assert_eq!(mem.read(0), 0o0345);
        assert_eq!(regs.pc, 1);
        assert!(!regs.ien);
        assert_eq!(regs.if_reg, 0);
        assert_eq!(regs.df, 0);
        assert_eq!(regs.sf, (0o20000u16 >> 9) | (0o30000u16 >> 12));
    }
}
