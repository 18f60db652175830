//! IOT (opcode 6) dispatch: the CPU self-IOT group, the memory-extension
//! family, and delegation to the peripheral device table.

use pdp8_core::isa::{dev0, is_mex};
use pdp8_core::DiagnosticSink;
use pdp8_devices::DeviceTable;

use crate::registers::Registers;

/// Execute one decoded IOT instruction (`regs.ir`), mutating registers and
/// the peripheral device table as needed.
///
/// `idle_loop_hint` is only meaningful to the keyboard's `KSF` handling;
/// every other device and the CPU self-IOT group ignore it.
pub fn execute(
    regs: &mut Registers,
    devices: &mut DeviceTable,
    nfields: usize,
    idle_loop_hint: bool,
    sink: &mut dyn DiagnosticSink,
) {
    let ir = regs.ir;

    if is_mex(ir) {
        memory_extension(regs, ir, nfields);
        return;
    }

    let device = (ir >> 3) & 0o77;
    if device == 0 {
        self_iot(regs, ir);
        return;
    }

    let function = ir & 0o7;
    let outcome = devices.dispatch(
        device,
        function,
        &mut regs.ac,
        &mut regs.ireq,
        regs.thispc,
        ir,
        idle_loop_hint,
        sink,
    );
    if outcome.skip {
        regs.inc_pc();
    }
    // A Ctrl-C typed into the simulated keyboard stops the run the same
    // way a host SIGINT does.
    if devices.keyboard_mut().take_stop_request() {
        regs.stop = true;
    }
}

fn memory_extension(regs: &mut Registers, ir: u16, nfields: usize) {
    let field = usize::from((ir & 0o070) >> 3);
    match ir & 0o7 {
        1 => {
            // CDF
            if field < nfields {
                regs.df = (field as u16) << 12;
            }
        }
        2 => {
            // CIF
            if field < nfields {
                regs.ib = (field as u16) << 12;
                regs.cif_delay = true;
            }
        }
        3 => {
            // CDI = CDF | CIF
            if field < nfields {
                regs.df = (field as u16) << 12;
                regs.ib = (field as u16) << 12;
                regs.cif_delay = true;
            }
        }
        4 => match field {
            1 => regs.ac = (regs.ac & 0o7707) | (regs.df >> 9), // RDF
            2 => regs.ac = (regs.ac & 0o7707) | (regs.if_reg >> 9), // RIF
            3 => regs.ac = (regs.ac & 0o7700) | regs.sf,         // RIB
            4 => {
                // RMF
                regs.ib = (regs.sf & 0o070) << 9;
                regs.df = (regs.sf & 0o7) << 12;
            }
            _ => {}
        },
        _ => {}
    }
}

fn self_iot(regs: &mut Registers, ir: u16) {
    match ir {
        dev0::SKON => {
            if regs.ien {
                regs.inc_pc();
            }
            regs.ien = false;
            regs.ion_delay = false;
        }
        dev0::ION => regs.ion_delay = true,
        dev0::IOF => {
            regs.ien = false;
            regs.ion_delay = false;
        }
        dev0::SRQ => {
            if regs.ireq != 0 {
                regs.inc_pc();
            }
        }
        dev0::GTF => {
            regs.ac = (regs.l << 11) | (u16::from(regs.ien) << 7) | (regs.sf & 0o77);
        }
        dev0::RTF => {
            regs.l = (regs.ac >> 11) & 1;
            regs.sf = regs.ac & 0o77;
            regs.ion_delay = regs.ac & 0o200 != 0;
        }
        dev0::SGT | dev0::CAF => {} // stubs, no modeled effect
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use pdp8_core::{NullSink, WORD_MASK};
    use pdp8_devices::{DeviceTable, NullKeyboardSource};

    use super::*;

    fn devices() -> DeviceTable {
        DeviceTable::new(Box::new(NullKeyboardSource), Box::new(std::io::sink()))
    }

    #[test]
    fn cdf_sets_data_field_when_in_range() {
        let mut regs = Registers::new();
        regs.ir = 0o6202; // CDF field 1
        let mut sink = NullSink;
        execute(&mut regs, &mut devices(), 2, false, &mut sink);
        assert_eq!(regs.df, 0o20000);
    }

    #[test]
    fn cdf_ignored_when_field_out_of_range() {
        let mut regs = Registers::new();
        regs.ir = 0o6232; // CDF field 3, but only 2 fields configured
        let mut sink = NullSink;
        execute(&mut regs, &mut devices(), 2, false, &mut sink);
        assert_eq!(regs.df, 0);
    }

    #[test]
    fn cif_arms_delay_and_stages_ib() {
        let mut regs = Registers::new();
        regs.ir = 0o6204; // CIF field 2
        let mut sink = NullSink;
        execute(&mut regs, &mut devices(), 4, false, &mut sink);
        assert_eq!(regs.ib, 0o40000);
        assert!(regs.cif_delay);
    }

    #[test]
    fn ion_arms_one_instruction_delay() {
        let mut regs = Registers::new();
        regs.ir = dev0::ION;
        let mut sink = NullSink;
        execute(&mut regs, &mut devices(), 4, false, &mut sink);
        assert!(regs.ion_delay);
        assert!(!regs.ien);
    }

    #[test]
    fn gtf_packs_link_ien_and_save_field() {
        let mut regs = Registers::new();
        regs.l = 1;
        regs.ien = true;
        regs.sf = 0o17;
        regs.ir = dev0::GTF;
        let mut sink = NullSink;
        execute(&mut regs, &mut devices(), 4, false, &mut sink);
        assert_eq!(regs.ac, (1 << 11) | (1 << 7) | 0o17);
        assert_eq!(regs.ac & !WORD_MASK, 0);
    }

    #[test]
    fn rtf_unpacks_ac_into_link_and_save_field() {
        let mut regs = Registers::new();
        regs.ac = (1 << 11) | 0o200 | 0o23;
        regs.ir = dev0::RTF;
        let mut sink = NullSink;
        execute(&mut regs, &mut devices(), 4, false, &mut sink);
        assert_eq!(regs.l, 1);
        assert_eq!(regs.sf, 0o23);
        assert!(regs.ion_delay);
    }
}
