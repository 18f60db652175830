//! The breakpoint table: up to `MAX_BREAKPOINTS` address/saved-word pairs.
//!
//! This struct only tracks bookkeeping; installing `HALT` into memory and
//! restoring the saved word on a hit is `Machine`'s job, since only it can
//! touch memory.

use pdp8_core::{Pdp8Error, Result, MAX_BREAKPOINTS};

#[derive(Debug, Clone, Copy)]
pub struct Breakpoint {
    pub addr: u16,
    pub saved: u16,
}

#[derive(Debug, Clone, Default)]
pub struct BreakpointTable {
    slots: [Option<Breakpoint>; MAX_BREAKPOINTS],
}

impl BreakpointTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a breakpoint at `addr`, saving `original` for later
    /// restoration. Returns the 1-based breakpoint number.
    pub fn set(&mut self, addr: u16, original: u16) -> Result<u16> {
        if self.slots.iter().flatten().any(|bp| bp.addr == addr) {
            return Err(Pdp8Error::Command(format!(
                "breakpoint already exists at {addr:05o}"
            )));
        }
        let Some(slot) = self.slots.iter_mut().position(Option::is_none) else {
            return Err(Pdp8Error::Command(format!(
                "maximum of {MAX_BREAKPOINTS} breakpoints allowed"
            )));
        };
        self.slots[slot] = Some(Breakpoint {
            addr,
            saved: original,
        });
        Ok((slot + 1) as u16)
    }

    /// Remove breakpoint `num` (1-based), returning its saved word so the
    /// caller can restore memory.
    pub fn clear(&mut self, num: u16) -> Result<Breakpoint> {
        let index = Self::slot_index(num)?;
        self.slots[index]
            .take()
            .ok_or_else(|| Pdp8Error::Command(format!("breakpoint {num} does not exist")))
    }

    /// The breakpoint number active at `addr`, if any.
    #[must_use]
    pub fn check(&self, addr: u16) -> Option<u16> {
        self.slots.iter().enumerate().find_map(|(i, slot)| {
            slot.and_then(|bp| (bp.addr == addr).then_some((i + 1) as u16))
        })
    }

    #[must_use]
    pub fn get(&self, num: u16) -> Option<Breakpoint> {
        Self::slot_index(num).ok().and_then(|i| self.slots[i])
    }

    /// All active breakpoints as `(number, entry)`, in table order.
    pub fn list(&self) -> impl Iterator<Item = (u16, Breakpoint)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|bp| ((i + 1) as u16, bp)))
    }

    fn slot_index(num: u16) -> Result<usize> {
        if num < 1 || usize::from(num) > MAX_BREAKPOINTS {
            return Err(Pdp8Error::Command(format!(
                "valid breakpoint numbers are between 1 and {MAX_BREAKPOINTS}"
            )));
        }
        Ok(usize::from(num) - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_check_roundtrips() {
        let mut table = BreakpointTable::new();
        let num = table.set(0o200, 0o7300).unwrap();
        assert_eq!(table.check(0o200), Some(num));
        assert_eq!(table.get(num).unwrap().saved, 0o7300);
    }

    #[test]
    fn duplicate_address_rejected() {
        let mut table = BreakpointTable::new();
        table.set(0o200, 0).unwrap();
        assert!(table.set(0o200, 0).is_err());
    }

    #[test]
    fn clear_frees_the_slot() {
        let mut table = BreakpointTable::new();
        let num = table.set(0o200, 0o1234).unwrap();
        let removed = table.clear(num).unwrap();
        assert_eq!(removed.saved, 0o1234);
        assert_eq!(table.check(0o200), None);
    }

    #[test]
    fn table_is_bounded() {
        let mut table = BreakpointTable::new();
        for addr in 0..MAX_BREAKPOINTS as u16 {
            table.set(addr + 1, 0).unwrap();
        }
        assert!(table.set(0o7777, 0).is_err());
    }
}
