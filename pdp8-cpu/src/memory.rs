//! Flat core memory: a field-extensible array of 12-bit words.

use pdp8_core::{Pdp8Error, Result, DEFAULT_KWORDS, FIELD_OFFSET_MASK, HALT, MAX_KWORDS, MIN_KWORDS, WORD_MASK};

/// `MP[0..memwords)`, indexed by a 15-bit physical address
/// (`field << 12 | offset`). `memwords = kwords * 1024`.
#[derive(Debug, Clone)]
pub struct Memory {
    words: Vec<u16>,
    kwords: usize,
    nfields: usize,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new(DEFAULT_KWORDS).expect("default kwords is always valid")
    }
}

impl Memory {
    /// Allocate `kwords` Ki-words of memory (4-32, a multiple of 4),
    /// pre-filled with HLT (`07402`) as the reference implementation does.
    pub fn new(kwords: usize) -> Result<Self> {
        if kwords < MIN_KWORDS || kwords > MAX_KWORDS || kwords % MIN_KWORDS != 0 {
            return Err(Pdp8Error::Configuration(format!(
                "memory size must be a multiple of {MIN_KWORDS} between {MIN_KWORDS} and {MAX_KWORDS}, got {kwords}"
            )));
        }
        let memwords = kwords * 1024;
        Ok(Memory {
            words: vec![HALT; memwords],
            kwords,
            nfields: kwords / MIN_KWORDS,
        })
    }

    #[must_use]
    pub fn kwords(&self) -> usize {
        self.kwords
    }

    /// Number of 4K fields this configuration supports. A CDF/CIF/CDI
    /// naming a field `>= nfields` is silently ignored (no trap).
    #[must_use]
    pub fn nfields(&self) -> usize {
        self.nfields
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Read the word at a full physical address (`field | offset`,
    /// already combined). Panics if out of bounds: every caller resolves
    /// addresses through a field known to be `< nfields`, so an
    /// out-of-range index means a bug upstream, not operator input.
    #[must_use]
    pub fn read(&self, addr: u32) -> u16 {
        self.words[addr as usize]
    }

    pub fn write(&mut self, addr: u32, value: u16) {
        let index = addr as usize;
        self.words[index] = value & WORD_MASK;
    }

    /// The field-and-offset decomposition of a full physical address.
    #[must_use]
    pub fn field_of(addr: u32) -> u32 {
        (addr >> 12) & 0b111
    }

    #[must_use]
    pub fn offset_of(addr: u32) -> u32 {
        addr & FIELD_OFFSET_MASK
    }
}
