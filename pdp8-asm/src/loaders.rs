//! RIM, BIN, and plain-text binary loaders.
//!
//! A PDP-8 paper tape punches a 12-bit word as two 8-bit bytes,
//! `word<abcdefghijkl>` -> `byte<00abcdef> byte<00ghijkl>`. A byte of
//! `0x80` fills leaders and trailers and is skipped; `0x9A` (Ctrl-Z) marks
//! EOF. RIM is a flat sequence of `<addr> <value>` pairs, each pair's
//! address byte or-ed with `0x40`. BIN is the same idea but a block of
//! consecutive data words can follow one address mark, auto-incrementing.
//! Grounded directly on `load_bin`/`load_rim`/`load_txt`.

use pdp8_core::{Pdp8Error, Result};

use crate::image::Image;

const LEADER: u8 = 0x80;
const EOF_MARK: u8 = 0x9a;
const ADDR_MARK: u8 = 0x40;

/// Read a RIM-format tape: every pair is `<addr> <value>`, so a run of
/// consecutive locations still carries an address mark on each pair.
pub fn load_rim(data: &[u8]) -> Image {
    let mut image = Image::new();
    let mut pos = skip_leader(data, 0);

    while pos < data.len() {
        let byte1 = data[pos];
        if byte1 == LEADER || byte1 == EOF_MARK {
            break;
        }
        let Some(byte2) = data.get(pos + 1).copied() else { break };
        let addr = (u32::from(byte1 & 0x3f) << 6) | u32::from(byte2);
        pos += 2;

        let Some(byte1) = data.get(pos).copied() else { break };
        let Some(byte2) = data.get(pos + 1).copied() else { break };
        let word = (u16::from(byte1) << 6) | u16::from(byte2);
        image.set(addr, word);
        pos += 2;
    }
    image
}

/// Read a BIN-format tape: an address-marked byte sets the location for
/// whatever data words follow, and the address auto-advances with each
/// unmarked word until the next address mark.
pub fn load_bin(data: &[u8]) -> Image {
    let mut image = Image::new();
    let mut pos = skip_leader(data, 0);
    let mut addr: u32 = 0;

    while pos < data.len() {
        let byte1 = data[pos];
        if byte1 == LEADER || byte1 == EOF_MARK {
            break;
        }
        let Some(byte2) = data.get(pos + 1).copied() else { break };
        if byte1 & ADDR_MARK != 0 {
            addr = (u32::from(byte1 & 0x3f) << 6) | u32::from(byte2);
        } else {
            let word = (u16::from(byte1) << 6) | u16::from(byte2);
            image.set(addr, word);
            addr += 1;
        }
        pos += 2;
    }
    image
}

fn skip_leader(data: &[u8], mut pos: usize) -> usize {
    while data.get(pos).copied() == Some(LEADER) {
        pos += 1;
    }
    pos
}

/// Read the plain-text `<octal-addr> <octal-word>` loader format, one
/// pair per line, blank lines and `/`-led comment lines ignored, and
/// anything past the second field on a line discarded.
pub fn load_txt(text: &str) -> Result<Image> {
    let mut image = Image::new();

    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim_end();
        if line.is_empty() || line.starts_with('/') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(addr_field), Some(data_field)) = (fields.next(), fields.next()) else {
            return Err(Pdp8Error::Load(format!(
                "error at line {}: '{}'",
                lineno + 1,
                line
            )));
        };
        let addr = u32::from_str_radix(addr_field, 8)
            .map_err(|_| Pdp8Error::Load(format!("error at line {}: '{}'", lineno + 1, line)))?;
        let data = u32::from_str_radix(data_field, 8)
            .map_err(|_| Pdp8Error::Load(format!("error at line {}: '{}'", lineno + 1, line)))?;
        if addr >= 0o10000 {
            return Err(Pdp8Error::Load(format!(
                "line {}: address field too big: {:o}",
                lineno + 1,
                addr
            )));
        }
        if data >= 0o10000 {
            return Err(Pdp8Error::Load(format!(
                "line {}: data field too big: {:o}",
                lineno + 1,
                data
            )));
        }
        image.set(addr, data as u16);
    }

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rim_decodes_one_address_value_pair() {
        // addr 0o0200 = 0b00_000010_000000, value 0o1234 = 0b00_001010_011100
        let tape = [0x40 | 0b000010, 0b000000, 0b001010, 0b011100];
        let image = load_rim(&tape);
        assert_eq!(image.get(0o0200), Some(0o1234));
    }

    #[test]
    fn rim_skips_leader_and_stops_at_eof_mark() {
        let tape = [LEADER, LEADER, 0x40, 0x00, 0x00, 0x01, EOF_MARK, 0xff, 0xff];
        let image = load_rim(&tape);
        assert_eq!(image.get(0), Some(1));
        assert_eq!(image.len(), 1);
    }

    #[test]
    fn bin_auto_advances_address_across_a_data_block() {
        let tape = [
            0x40, 0x00, // address mark -> addr 0
            0x00, 0x05, // data -> addr 0, value 5
            0x00, 0x06, // data -> addr 1, value 6
        ];
        let image = load_bin(&tape);
        assert_eq!(image.get(0), Some(5));
        assert_eq!(image.get(1), Some(6));
    }

    #[test]
    fn txt_parses_address_value_pairs_and_skips_comments() {
        let image = load_txt("/ a comment\n0200 1234\n\n0201 4567\n").unwrap();
        assert_eq!(image.get(0o0200), Some(0o1234));
        assert_eq!(image.get(0o0201), Some(0o4567));
    }

    #[test]
    fn txt_rejects_an_address_field_that_is_too_big() {
        let err = load_txt("17777 0000\n").unwrap_err();
        assert!(matches!(err, Pdp8Error::Load(_)));
    }

    #[test]
    fn txt_rejects_a_malformed_line() {
        let err = load_txt("not-octal\n").unwrap_err();
        assert!(matches!(err, Pdp8Error::Load(_)));
    }
}
