//! Single-instruction disassembler, used by the console's trace output and
//! its memory-examine command.

use pdp8_core::isa::{dev0, group1, group2, group3, is_mex, MRI_MNEMONICS};
use pdp8_core::OFFSET_MASK;
use pdp8_devices::{KeyboardDevice, ParityDevice, PrinterDevice, PunchDevice, ReaderDevice};

const PAGE_BIT: u16 = 0o0200;
const INDIRECT_BIT: u16 = 0o0400;
const PAGE_MASK: u16 = 0o7600;

/// One disassembled instruction: address, mnemonic, operand text, and the
/// instruction word reinterpreted as two six-bit printable characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DInstr {
    pub addr: u16,
    pub mnemonic: String,
    pub args: String,
    pub ascii: String,
}

/// Disassemble one instruction word, `addr` giving the page the current-page
/// bit (if set) resolves against.
#[must_use]
pub fn decode(addr: u16, inst: u16) -> DInstr {
    DInstr {
        addr,
        mnemonic: mnemonic(addr, inst),
        args: args(addr, inst),
        ascii: ascii(inst),
    }
}

fn mnemonic(addr: u16, inst: u16) -> String {
    let _ = addr; // current-page resolution only affects `args`, not the name
    let opcode = inst >> 9;
    if opcode < 6 {
        MRI_MNEMONICS[opcode as usize].to_string()
    } else if opcode == 6 {
        iot_mnemonic(inst)
    } else if inst & 0o400 == 0 {
        group1_mnemonic(inst)
    } else if inst & 1 == 0 {
        group2_mnemonic(inst)
    } else {
        group3_mnemonic(inst)
    }
}

fn iot_mnemonic(inst: u16) -> String {
    let dev = (inst >> 3) & 0o77;
    let fun = inst & 0o7;

    if is_mex(inst) {
        return match fun {
            1 => "CDF".to_string(),
            2 => "CIF".to_string(),
            3 => "CDI".to_string(),
            4 => match (inst >> 3) & 7 {
                1 => "RDF".to_string(),
                2 => "RIF".to_string(),
                3 => "RIB".to_string(),
                4 => "RMF".to_string(),
                _ => generic_iot(dev, fun),
            },
            _ => generic_iot(dev, fun),
        };
    }

    if dev == 0 {
        return match inst {
            dev0::SKON => "SKON".to_string(),
            dev0::ION => "ION".to_string(),
            dev0::IOF => "IOF".to_string(),
            dev0::SRQ => "SRQ".to_string(),
            dev0::GTF => "GTF".to_string(),
            dev0::RTF => "RTF".to_string(),
            dev0::SGT => "SGT".to_string(),
            dev0::CAF => "CAF".to_string(),
            _ => generic_iot(dev, fun),
        };
    }

    let name = match dev {
        ReaderDevice::DEVICE_NUMBER => reader_name(fun),
        PunchDevice::DEVICE_NUMBER => punch_name(fun),
        KeyboardDevice::DEVICE_NUMBER => keyboard_name(fun),
        PrinterDevice::DEVICE_NUMBER => printer_name(fun),
        ParityDevice::DEVICE_NUMBER => parity_name(fun),
        _ => None,
    };
    name.unwrap_or_else(|| generic_iot(dev, fun))
}

fn generic_iot(dev: u16, fun: u16) -> String {
    format!("IOT D={dev:02o} F={fun}")
}

// The function-code-to-mnemonic tables below mirror each device's own
// private `func` constants in `pdp8-devices`; duplicated here rather than
// exposed publicly since disassembly is the only outside consumer.

fn reader_name(fun: u16) -> Option<String> {
    Some(
        match fun {
            1 => "RSF",
            2 => "RRB",
            4 => "RFC",
            6 => "RFC RRB",
            _ => return None,
        }
        .to_string(),
    )
}

fn punch_name(fun: u16) -> Option<String> {
    Some(
        match fun {
            1 => "PSF",
            2 => "PCF",
            4 => "PPC",
            6 => "PLS",
            _ => return None,
        }
        .to_string(),
    )
}

fn keyboard_name(fun: u16) -> Option<String> {
    Some(
        match fun {
            0 => "KCF",
            1 => "KSF",
            2 => "KCC",
            4 => "KRS",
            5 => "KIE",
            6 => "KRB",
            _ => return None,
        }
        .to_string(),
    )
}

fn printer_name(fun: u16) -> Option<String> {
    Some(
        match fun {
            0 => "SPF",
            1 => "TSF",
            2 => "TCF",
            4 => "TPC",
            6 => "TLS",
            _ => return None,
        }
        .to_string(),
    )
}

fn parity_name(fun: u16) -> Option<String> {
    Some(
        match fun {
            1 => "SMP",
            2 => "SPL",
            4 => "CMP",
            _ => return None,
        }
        .to_string(),
    )
}

fn group1_mnemonic(inst: u16) -> String {
    let mut name = String::new();
    if inst & group1::CLA != 0 {
        name.push_str("CLA ");
    }
    if inst & group1::CLL != 0 {
        name.push_str("CLL ");
    }
    if inst & group1::CMA != 0 {
        name.push_str("CMA ");
    }
    if inst & group1::CML != 0 {
        name.push_str("CML ");
    }
    if inst & group1::IAC != 0 {
        name.push_str("IAC ");
    }
    let rar = inst & group1::RAR != 0;
    let ral = inst & group1::RAL != 0;
    if inst & group1::RTWICE != 0 {
        if rar {
            name.push_str("RTR ");
        }
        if ral {
            name.push_str("RTL ");
        }
        if !rar && !ral {
            name.push_str("BSW");
        }
    } else {
        if rar {
            name.push_str("RAR ");
        }
        if ral {
            name.push_str("RAL ");
        }
    }
    name.trim_end().to_string()
}

fn group2_mnemonic(inst: u16) -> String {
    let mut name = String::new();
    if inst & group2::RSS == 0 {
        if inst & group2::SMA != 0 {
            name.push_str("SMA ");
        }
        if inst & group2::SZA != 0 {
            name.push_str("SZA ");
        }
        if inst & group2::SNL != 0 {
            name.push_str("SNL ");
        }
    } else {
        if inst & (group2::SMA | group2::SZA | group2::SNL) == 0 {
            name.push_str("SKP ");
        }
        if inst & group2::SMA != 0 {
            name.push_str("SPA ");
        }
        if inst & group2::SZA != 0 {
            name.push_str("SNA ");
        }
        if inst & group2::SNL != 0 {
            name.push_str("SZL ");
        }
    }
    if inst & group2::CLA != 0 {
        name.push_str("CLA ");
    }
    if inst & group2::OSR != 0 {
        name.push_str("OSR ");
    }
    if inst & group2::HLT != 0 {
        name.push_str("HLT ");
    }
    name.trim_end().to_string()
}

fn group3_mnemonic(inst: u16) -> String {
    let mut name = String::new();
    if inst & group3::CLA != 0 {
        name.push_str("CLA ");
    }
    match inst & 0o160 {
        group3::MQL => name.push_str("MQL "),
        group3::SCA => name.push_str("SCA "),
        group3::MQA => name.push_str("MQA "),
        group3::SWP => name.push_str("SWP "),
        _ => {}
    }
    match inst & 0o016 {
        group3::SCL => name.push_str("SCL"),
        group3::MUY => name.push_str("MUY"),
        group3::DVI => name.push_str("DVI"),
        group3::NMI => name.push_str("NMI"),
        group3::SHL => name.push_str("SHL"),
        group3::ASR => name.push_str("ASR"),
        group3::LSR => name.push_str("LSR"),
        _ => name.push_str("NOP"),
    }
    name.trim_end().to_string()
}

fn args(addr: u16, inst: u16) -> String {
    let opcode = inst >> 9;
    if opcode < 6 {
        let offset = if inst & PAGE_BIT != 0 {
            (addr & PAGE_MASK) | (inst & OFFSET_MASK)
        } else {
            inst & OFFSET_MASK
        };
        let indirect = if inst & INDIRECT_BIT != 0 { "I " } else { "" };
        format!("{indirect}{offset:04o}")
    } else if opcode == 6 && is_mex(inst) && matches!(inst & 0o7, 1 | 2 | 3) {
        format!("{:02o}", inst & 0o070)
    } else {
        String::new()
    }
}

/// Render `inst` as a mark-sense-style ASCII annotation, the same heuristic
/// applied to raw data words in a memory listing.
fn ascii(inst: u16) -> String {
    if inst < 0o400 && inst & 0o200 != 0 {
        let code = (inst - 0o200) as u8;
        match code {
            127 => "'RO".to_string(),
            b'\t' => "'\\t'".to_string(),
            b'\x0c' => "'\\f'".to_string(),
            b'\n' => "'\\n'".to_string(),
            b'\r' => "'\\r'".to_string(),
            0..=31 => format!("'^{}", (code + 64) as char),
            c => format!("'{}' ", c as char),
        }
    } else {
        let byte1 = ((inst >> 6) & 0o77) as u8;
        let byte2 = (inst & 0o77) as u8;
        format!("\"{}{}\"", sixbit_char(byte1), sixbit_char(byte2))
    }
}

fn sixbit_char(code: u8) -> char {
    if code <= 0o32 {
        (code + b'@') as char
    } else if code <= 0o37 {
        (code + b'[') as char
    } else {
        code as char
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_memory_reference_current_page_indirect() {
        let d = decode(0o0300, INDIRECT_BIT | PAGE_BIT | 0o0045);
        assert_eq!(d.mnemonic, "AND");
        assert_eq!(d.args, "I 0345");
    }

    #[test]
    fn decodes_group1_rotate_twice_as_bsw() {
        let d = decode(0, group1::BASE | group1::RTWICE | group1::CLA);
        assert_eq!(d.mnemonic, "CLA BSW");
    }

    #[test]
    fn decodes_group2_reverse_sense() {
        let d = decode(0, group2::BASE | group2::RSS | group2::SZA);
        assert_eq!(d.mnemonic, "SNA");
    }

    #[test]
    fn decodes_group3_muy() {
        let d = decode(0, group3::BASE | group3::MUY);
        assert_eq!(d.mnemonic, "MUY");
    }

    #[test]
    fn decodes_cif_with_field_operand() {
        let d = decode(0, 0o6202);
        assert_eq!(d.mnemonic, "CIF");
        assert_eq!(d.args, "00");
    }

    #[test]
    fn decodes_device_iot_by_mnemonic() {
        let d = decode(0, 0o6031); // KSF: device 3, function 1
        assert_eq!(d.mnemonic, "KSF");
    }

    #[test]
    fn falls_back_to_generic_iot_for_unmapped_device() {
        let d = decode(0, 0o6150);
        assert_eq!(d.mnemonic, "IOT D=15 F=0");
    }
}
