//! Assembler symbol table.
//!
//! The reference assembler hashes into a 32-bucket chained table and
//! truncates names to six characters; a `HashMap` keyed by the same
//! truncated name reproduces that collision behavior (two names sharing a
//! truncation collide here exactly as they would there) without carrying
//! over the hand-rolled chaining.

use std::collections::HashMap;

use crate::opcodes::ALL_GROUPS;
use crate::pseudo::Pseudo;

pub const SYMBOL_NAME_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// A built-in instruction mnemonic.
    Opcode,
    /// A directive recognized by `asm_pseudo`.
    Pseudo(Pseudo),
    /// A label or `symb=expr` definition from the source being assembled.
    User,
}

#[derive(Debug, Clone, Copy)]
pub struct Symbol {
    pub value: u16,
    pub kind: SymbolKind,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    table: HashMap<String, Symbol>,
}

/// Truncate `name` to the six characters the table keys on.
pub fn truncate(name: &str) -> String {
    name.chars().take(SYMBOL_NAME_LEN).collect()
}

impl SymbolTable {
    /// A table pre-seeded with every instruction mnemonic and pseudo-op,
    /// matching `symb_init`'s one-time population of `hash_table`.
    #[must_use]
    pub fn new() -> Self {
        let mut table = HashMap::new();
        for group in ALL_GROUPS {
            for op in *group {
                table.insert(
                    truncate(op.name),
                    Symbol { value: op.value, kind: SymbolKind::Opcode },
                );
            }
        }
        for (name, pseudo) in Pseudo::ALL {
            table.insert(
                truncate(name),
                Symbol { value: 0, kind: SymbolKind::Pseudo(*pseudo) },
            );
        }
        SymbolTable { table }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.table.get(&truncate(name))
    }

    /// Insert or update a user symbol. Mirrors `symb_insert`: an existing
    /// entry of the *same kind* is overwritten (used for forward references
    /// resolved between pass 1 and a redefinition within pass 1 itself);
    /// an entry of a different kind (e.g. a name that collides with a
    /// built-in mnemonic) is left alone.
    pub fn define(&mut self, name: &str, value: u16) {
        let key = truncate(name);
        match self.table.get_mut(&key) {
            Some(sym) if sym.kind == SymbolKind::User => sym.value = value,
            Some(_) => {}
            None => {
                self.table.insert(key, Symbol { value, kind: SymbolKind::User });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_instruction_mnemonics() {
        let t = SymbolTable::new();
        assert_eq!(t.get("TAD").unwrap().value, 0o1000);
        assert_eq!(t.get("TAD").unwrap().kind, SymbolKind::Opcode);
    }

    #[test]
    fn truncates_long_names_to_six_characters() {
        let mut t = SymbolTable::new();
        t.define("FOOBARBAZ", 0o1234);
        assert_eq!(t.get("FOOBAR").unwrap().value, 0o1234);
        // A different long name sharing the same 6-char prefix collides,
        // same as the reference implementation's truncated comparison.
        assert_eq!(t.get("FOOBARQUX").unwrap().value, 0o1234);
    }

    #[test]
    fn user_definition_does_not_shadow_a_builtin_mnemonic() {
        let mut t = SymbolTable::new();
        t.define("TAD", 0o777);
        assert_eq!(t.get("TAD").unwrap().value, 0o1000);
    }
}
