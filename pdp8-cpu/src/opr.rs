//! The operate instruction (opcode 7): three microcoded groups selected by
//! bits 8 and 0 of `IR`.

use pdp8_core::isa::{group1, group2, group3};
use pdp8_core::WORD_MASK;

use crate::registers::Registers;

const SIGN_BIT: u16 = 0o4000;
const LINK_BIT: u16 = 1 << 12;
const BYTE_MASK: u16 = 0o77;
const BYTE_BITS: u32 = 6;

/// Group 3's s2/s3 subfields each occupy three bits of `IR`.
const S2_MASK: u16 = 0o160;
const S3_MASK: u16 = 0o016;

/// Dispatch a decoded OPR instruction to its group.
pub fn execute(regs: &mut Registers, memory_operand: impl FnOnce(&Registers) -> u16) {
    if regs.ir & 0o400 == 0 {
        group_1(regs);
    } else if regs.ir & 1 == 0 {
        group_2(regs);
    } else {
        group_3(regs, memory_operand);
    }
}

fn rotate_left(ac: &mut u16, l: &mut u16) {
    let combined = (*ac << 1) | *l;
    *l = (combined & LINK_BIT) >> 12;
    *ac = combined & WORD_MASK;
}

fn rotate_right(ac: &mut u16, l: &mut u16) {
    let combined = *ac | (*l << 12);
    *l = combined & 1;
    *ac = combined >> 1;
}

fn group_1(regs: &mut Registers) {
    let ir = regs.ir;
    if ir & group1::CLA != 0 {
        regs.ac = 0;
    }
    if ir & group1::CLL != 0 {
        regs.l = 0;
    }
    if ir & group1::CMA != 0 {
        regs.ac = !regs.ac & WORD_MASK;
    }
    if ir & group1::CML != 0 {
        regs.l ^= 1;
    }
    if ir & group1::IAC != 0 {
        let sum = regs.ac + 1;
        regs.l ^= sum >> 12;
        regs.ac = sum & WORD_MASK;
    }

    let rotate_twice = ir & group1::RTWICE != 0;
    let ral = ir & group1::RAL != 0;
    let rar = ir & group1::RAR != 0;

    if rotate_twice {
        if ral {
            rotate_left(&mut regs.ac, &mut regs.l);
        }
        if rar {
            rotate_right(&mut regs.ac, &mut regs.l);
        }
    }
    if ral {
        rotate_left(&mut regs.ac, &mut regs.l);
    }
    if rar {
        rotate_right(&mut regs.ac, &mut regs.l);
    }
    // RT and BSW share a bit: byte swap only when neither rotate fired.
    if rotate_twice && !ral && !rar {
        regs.ac = ((regs.ac & BYTE_MASK) << BYTE_BITS) | (regs.ac >> BYTE_BITS);
    }
}

fn group_2(regs: &mut Registers) {
    let ir = regs.ir;
    let sign_set = regs.ac & SIGN_BIT != 0;
    let skip = if ir & group2::RSS == 0 {
        (ir & group2::SNL != 0 && regs.l != 0)
            || (ir & group2::SZA != 0 && regs.ac == 0)
            || (ir & group2::SMA != 0 && sign_set)
    } else {
        let mut skip = true;
        if ir & group2::SNL != 0 && regs.l != 0 {
            skip = false;
        }
        if ir & group2::SZA != 0 && regs.ac == 0 {
            skip = false;
        }
        if ir & group2::SMA != 0 && sign_set {
            skip = false;
        }
        skip
    };
    if skip {
        regs.inc_pc();
    }
    if ir & group2::CLA != 0 {
        regs.ac = 0;
    }
    if ir & group2::OSR != 0 {
        regs.ac |= regs.sr;
    }
    if ir & group2::HLT != 0 {
        regs.run = false;
    }
}

/// `memory_operand` supplies `MP[PC]`, the in-line operand s3 EAE ops
/// consume; the caller owns memory so this stays a pure register function.
fn group_3(regs: &mut Registers, memory_operand: impl FnOnce(&Registers) -> u16) {
    let ir = regs.ir;
    if ir & group3::CLA != 0 {
        regs.ac = 0;
    }

    match ir & S2_MASK {
        group3::MQL => regs.mq = regs.ac,
        group3::SCA => regs.ac |= regs.sc,
        group3::MQA => regs.ac |= regs.mq,
        group3::SWP => std::mem::swap(&mut regs.ac, &mut regs.mq),
        _ => {} // remaining codes are NOP
    }

    match ir & S3_MASK {
        group3::SCL => {
            let operand = memory_operand(regs);
            regs.sc = !operand & 0o37;
            regs.inc_pc();
        }
        group3::MUY => {
            let operand = u32::from(memory_operand(regs));
            let product = operand * u32::from(regs.mq);
            regs.ac = (product >> 12) as u16;
            regs.mq = (product & u32::from(WORD_MASK)) as u16;
            regs.inc_pc();
        }
        group3::DVI => {
            let divisor = memory_operand(regs);
            regs.inc_pc();
            if divisor == 0 {
                return;
            }
            let dividend = (u32::from(regs.ac) << 12) | u32::from(regs.mq);
            regs.mq = (dividend / u32::from(divisor)) as u16 & WORD_MASK;
            regs.ac = (dividend % u32::from(divisor)) as u16;
            regs.l = 0;
        }
        group3::SHL => {
            let count = u32::from(memory_operand(regs)) + 1;
            regs.inc_pc();
            let mut temp = (u64::from(regs.ac) << 12) | u64::from(regs.mq);
            temp <<= count;
            regs.ac = ((temp >> 12) & u64::from(WORD_MASK)) as u16;
            regs.mq = (temp & u64::from(WORD_MASK)) as u16;
            regs.l = ((temp & (1 << 12)) >> 12) as u16;
        }
        group3::ASR => {
            const ACMQ_SIGN_BIT: u64 = 1 << 23;
            const ACMQ_MASK: u64 = (1 << 24) - 1;
            let mut count = u32::from(memory_operand(regs)) + 1;
            regs.inc_pc();
            if count > 24 {
                count = 24;
            }
            let mut temp = (u64::from(regs.ac) << 12) | u64::from(regs.mq);
            temp = temp.wrapping_add(ACMQ_SIGN_BIT) & ACMQ_MASK;
            temp = temp.wrapping_sub(ACMQ_SIGN_BIT);
            temp >>= count;
            regs.ac = ((temp >> 12) & u64::from(WORD_MASK)) as u16;
            regs.mq = (temp & u64::from(WORD_MASK)) as u16;
        }
        group3::LSR => {
            let count = u32::from(memory_operand(regs)) + 1;
            regs.inc_pc();
            let temp = ((u64::from(regs.ac) << 12) | u64::from(regs.mq)) >> count;
            regs.ac = ((temp >> 12) & u64::from(WORD_MASK)) as u16;
            regs.mq = (temp & u64::from(WORD_MASK)) as u16;
        }
        _ => {} // NMI and the unnamed NOP slots consume no operand
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_operand(_regs: &Registers) -> u16 {
        0
    }

    #[test]
    fn cla_cll_clear_ac_and_link() {
        let mut regs = Registers::new();
        regs.ac = 0o1234;
        regs.l = 1;
        regs.ir = group1::BASE | group1::CLA | group1::CLL;
        execute(&mut regs, no_operand);
        assert_eq!(regs.ac, 0);
        assert_eq!(regs.l, 0);
    }

    #[test]
    fn iac_carries_into_link() {
        let mut regs = Registers::new();
        regs.ac = WORD_MASK;
        regs.ir = group1::BASE | group1::IAC;
        execute(&mut regs, no_operand);
        assert_eq!(regs.ac, 0);
        assert_eq!(regs.l, 1);
    }

    #[test]
    fn rar_rotates_link_into_sign_bit() {
        let mut regs = Registers::new();
        regs.ac = 0;
        regs.l = 1;
        regs.ir = group1::BASE | group1::RAR;
        execute(&mut regs, no_operand);
        assert_eq!(regs.ac, SIGN_BIT);
        assert_eq!(regs.l, 0);
    }

    #[test]
    fn byte_swap_exchanges_halves() {
        let mut regs = Registers::new();
        regs.ac = 0o1234;
        regs.ir = group1::BASE | group1::RTWICE;
        execute(&mut regs, no_operand);
        assert_eq!(regs.ac, 0o3412);
    }

    #[test]
    fn group2_skips_on_zero_accumulator() {
        let mut regs = Registers::new();
        regs.ac = 0;
        regs.pc = 0o0200;
        regs.ir = group2::BASE | group2::SZA;
        execute(&mut regs, no_operand);
        assert_eq!(regs.pc, 0o0201);
    }

    #[test]
    fn group2_reverse_sense_skips_unless_condition_holds() {
        let mut regs = Registers::new();
        regs.ac = 1;
        regs.pc = 0o0200;
        regs.ir = group2::BASE | group2::RSS | group2::SZA;
        execute(&mut regs, no_operand);
        assert_eq!(regs.pc, 0o0201, "AC != 0 so SZA's complement does not suppress the skip");
    }

    #[test]
    fn hlt_clears_run() {
        let mut regs = Registers::new();
        regs.run = true;
        regs.ir = group2::BASE | group2::HLT;
        execute(&mut regs, no_operand);
        assert!(!regs.run);
    }

    #[test]
    fn osr_ors_switch_register() {
        let mut regs = Registers::new();
        regs.sr = 0o07;
        regs.ir = group2::BASE | group2::OSR;
        execute(&mut regs, no_operand);
        assert_eq!(regs.ac, 0o07);
    }

    #[test]
    fn mql_then_mqa_moves_ac_through_mq() {
        let mut regs = Registers::new();
        regs.ac = 0o4321;
        regs.ir = group3::BASE | group3::MQL;
        execute(&mut regs, no_operand);
        assert_eq!(regs.mq, 0o4321);

        regs.ac = 0;
        regs.ir = group3::BASE | group3::MQA;
        execute(&mut regs, no_operand);
        assert_eq!(regs.ac, 0o4321);
    }

    #[test]
    fn muy_multiplies_operand_by_mq() {
        let mut regs = Registers::new();
        regs.mq = 6;
        regs.pc = 0o0300;
        regs.ir = group3::BASE | group3::MUY;
        execute(&mut regs, |_| 7);
        assert_eq!(regs.ac, 0);
        assert_eq!(regs.mq, 42);
        assert_eq!(regs.pc, 0o0301);
    }

    #[test]
    fn dvi_divides_24_bit_dividend() {
        let mut regs = Registers::new();
        regs.ac = 0;
        regs.mq = 100;
        regs.ir = group3::BASE | group3::DVI;
        execute(&mut regs, |_| 7);
        assert_eq!(regs.mq, 14);
        assert_eq!(regs.ac, 2);
        assert_eq!(regs.l, 0);
    }
}
