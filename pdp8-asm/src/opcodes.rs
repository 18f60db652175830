//! Static mnemonic tables used only to seed the assembler's symbol table.
//!
//! These mirror the reference assembler's per-device opcode tables; they are
//! distinct from `pdp8_core::isa`'s bit-flag constants, which describe how
//! the interpreter decodes an already-assembled word rather than how the
//! assembler looks a mnemonic up by name.

pub struct Opcode {
    pub name: &'static str,
    pub value: u16,
}

pub const MAIN_OPCODES: &[Opcode] = &[
    Opcode { name: "AND", value: 0o0000 },
    Opcode { name: "TAD", value: 0o1000 },
    Opcode { name: "ISZ", value: 0o2000 },
    Opcode { name: "DCA", value: 0o3000 },
    Opcode { name: "JMS", value: 0o4000 },
    Opcode { name: "JMP", value: 0o5000 },
    Opcode { name: "IOT", value: 0o6000 },
    Opcode { name: "OPR", value: 0o7000 },
];

pub const GROUP1_OPR: &[Opcode] = &[
    Opcode { name: "NOP", value: 0o7000 },
    Opcode { name: "IAC", value: 0o7001 },
    Opcode { name: "RAL", value: 0o7004 },
    Opcode { name: "RTL", value: 0o7006 },
    Opcode { name: "RAR", value: 0o7010 },
    Opcode { name: "RTR", value: 0o7012 },
    Opcode { name: "CML", value: 0o7020 },
    Opcode { name: "CMA", value: 0o7040 },
    Opcode { name: "CIA", value: 0o7041 },
    Opcode { name: "CLL", value: 0o7100 },
    Opcode { name: "STL", value: 0o7120 },
    Opcode { name: "CLA", value: 0o7200 },
    Opcode { name: "GLK", value: 0o7204 },
    Opcode { name: "STA", value: 0o7240 },
];

pub const GROUP2_OPR: &[Opcode] = &[
    Opcode { name: "HLT", value: 0o7402 },
    Opcode { name: "OSR", value: 0o7404 },
    Opcode { name: "SKP", value: 0o7410 },
    Opcode { name: "SNL", value: 0o7420 },
    Opcode { name: "SZL", value: 0o7430 },
    Opcode { name: "SZA", value: 0o7440 },
    Opcode { name: "SNA", value: 0o7450 },
    Opcode { name: "SMA", value: 0o7500 },
    Opcode { name: "SPA", value: 0o7510 },
    Opcode { name: "LAS", value: 0o7604 },
];

pub const EAE_OPR: &[Opcode] = &[
    Opcode { name: "MUY", value: 0o7405 },
    Opcode { name: "DVI", value: 0o7407 },
    Opcode { name: "NMI", value: 0o7411 },
    Opcode { name: "SHL", value: 0o7413 },
    Opcode { name: "ASR", value: 0o7415 },
    Opcode { name: "LSR", value: 0o7417 },
    Opcode { name: "MQL", value: 0o7421 },
    Opcode { name: "SCA", value: 0o7441 },
    Opcode { name: "SCL", value: 0o7403 },
    Opcode { name: "MQA", value: 0o7501 },
    Opcode { name: "CAM", value: 0o7621 },
];

pub const EMEM_IOT: &[Opcode] = &[
    Opcode { name: "CDF", value: 0o6201 },
    Opcode { name: "CIF", value: 0o6202 },
    Opcode { name: "CDI", value: 0o6203 },
    Opcode { name: "RDF", value: 0o6214 },
    Opcode { name: "RIF", value: 0o6224 },
    Opcode { name: "RIB", value: 0o6234 },
    Opcode { name: "RMF", value: 0o6244 },
];

pub const DEV00: &[Opcode] = &[
    Opcode { name: "SKON", value: 0o6000 },
    Opcode { name: "ION", value: 0o6001 },
    Opcode { name: "IOF", value: 0o6002 },
    Opcode { name: "SRQ", value: 0o6003 },
    Opcode { name: "GTF", value: 0o6004 },
    Opcode { name: "RTF", value: 0o6005 },
    Opcode { name: "SGT", value: 0o6006 },
    Opcode { name: "CAF", value: 0o6007 },
];

pub const DEV01: &[Opcode] = &[
    Opcode { name: "RSF", value: 0o6011 },
    Opcode { name: "RRB", value: 0o6012 },
    Opcode { name: "RFC", value: 0o6014 },
];

pub const DEV02: &[Opcode] = &[
    Opcode { name: "PSF", value: 0o6021 },
    Opcode { name: "PCF", value: 0o6022 },
    Opcode { name: "PPC", value: 0o6024 },
    Opcode { name: "PLS", value: 0o6026 },
];

pub const DEV03: &[Opcode] = &[
    Opcode { name: "KCF", value: 0o6030 },
    Opcode { name: "KSF", value: 0o6031 },
    Opcode { name: "KCC", value: 0o6032 },
    Opcode { name: "KRS", value: 0o6034 },
    Opcode { name: "KIE", value: 0o6035 },
    Opcode { name: "KRB", value: 0o6036 },
];

pub const DEV04: &[Opcode] = &[
    Opcode { name: "SPF", value: 0o6040 },
    Opcode { name: "TSF", value: 0o6041 },
    Opcode { name: "TCF", value: 0o6042 },
    Opcode { name: "TPC", value: 0o6044 },
    Opcode { name: "SPI", value: 0o6045 },
    Opcode { name: "TLS", value: 0o6046 },
];

pub const DEV10: &[Opcode] = &[
    Opcode { name: "SMP", value: 0o6101 },
    Opcode { name: "SPL", value: 0o6102 },
    Opcode { name: "CMP", value: 0o6104 },
];

/// All opcode groups, in the order the reference assembler seeds them.
pub const ALL_GROUPS: &[&[Opcode]] = &[
    MAIN_OPCODES,
    GROUP1_OPR,
    GROUP2_OPR,
    EAE_OPR,
    EMEM_IOT,
    DEV00,
    DEV01,
    DEV02,
    DEV03,
    DEV04,
    DEV10,
];
