//! A sparse memory image produced by the assembler or a binary loader.
//!
//! Decoupled from `pdp8_cpu::Memory` so this crate doesn't need to depend on
//! the interpreter just to describe "these words go at these addresses";
//! the console applies an `Image` to a running `Machine`.

use std::collections::BTreeMap;

#[derive(Debug, Default, Clone)]
pub struct Image {
    words: BTreeMap<u32, u16>,
}

impl Image {
    #[must_use]
    pub fn new() -> Self {
        Image::default()
    }

    pub fn set(&mut self, addr: u32, word: u16) {
        self.words.insert(addr, word & 0o7777);
    }

    #[must_use]
    pub fn get(&self, addr: u32) -> Option<u16> {
        self.words.get(&addr).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u16)> + '_ {
        self.words.iter().map(|(&a, &w)| (a, w))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The lowest and highest addresses written, if any.
    #[must_use]
    pub fn bounds(&self) -> Option<(u32, u32)> {
        let first = *self.words.keys().next()?;
        let last = *self.words.keys().next_back()?;
        Some((first, last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_bounds_across_out_of_order_writes() {
        let mut img = Image::new();
        img.set(0o0300, 1);
        img.set(0o0200, 2);
        assert_eq!(img.bounds(), Some((0o0200, 0o0300)));
    }

    #[test]
    fn masks_words_to_twelve_bits() {
        let mut img = Image::new();
        img.set(0, 0xFFFF);
        assert_eq!(img.get(0), Some(0o7777));
    }
}
