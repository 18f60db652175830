//! The two-pass statement processor: expression evaluation, literal pools,
//! pseudo-op dispatch, and the pass-1/pass-2 driver.
//!
//! Grounded directly on `asm_line`/`asm_expr`/`asm_elem`/`asm_pseudo` and the
//! `macro_asm` pass driver, including several of their less obvious
//! quirks (a `symb=expr` statement is skipped wholesale on pass 2; the
//! indirect-bit marker `I` must be a bare one-character symbol token).

use pdp8_core::{OFFSET_MASK, WORD_MASK};
use pdp8_core::{Pdp8Error, Result};

use crate::image::Image;
use crate::lexer::{Lexer, Tok};
use crate::literal::LiteralPool;
use crate::pseudo::Pseudo;
use crate::symtab::{Symbol, SymbolKind, SymbolTable};

const INDIRECT_BIT: u16 = 0o0400;
const PAGE_BIT: u16 = 0o0200;
const PAGE_SHIFT: u16 = 7;
const DEFAULT_ORIGIN: u16 = 0o0200;

struct Line<'a> {
    lexer: Lexer<'a>,
    tok: Tok,
    adjacent: Option<char>,
}

impl<'a> Line<'a> {
    fn new(text: &'a str, radix: u32) -> Self {
        let mut lexer = Lexer::new(text, radix);
        let (tok, adjacent) = lexer.next();
        Line { lexer, tok, adjacent }
    }

    fn advance(&mut self) {
        let (tok, adjacent) = self.lexer.next();
        self.tok = tok;
        self.adjacent = adjacent;
    }

    /// Skip the adjacent `=` or `,` (already peeked, never re-lexed as its
    /// own token) and advance to the token after it.
    fn advance_past_adjacent(&mut self) {
        self.lexer.skip_one();
        self.advance();
    }

    fn set_radix(&mut self, radix: u32) {
        self.lexer.set_radix(radix);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActivePool {
    Page0,
    NonZero,
}

/// Everything a single assembly pass, or an inline deposit statement,
/// needs: the symbol table, the current location counter and radix, and
/// the page-0/current-page literal pools.
pub struct Assembler {
    symtab: SymbolTable,
    radix: u32,
    pass: u8,
    clc: u16,
    page0: LiteralPool,
    pagen: LiteralPool,
    active: ActivePool,
}

/// Output of a full two-pass `assemble()` call: the resulting image plus
/// any non-fatal diagnostics gathered along the way (undefined symbols
/// encountered on pass 2, literal pool overflow, malformed statements).
/// Matching the reference assembler's error policy (spec.md §7 kind 3),
/// these never abort assembly — the image holds whatever was produced.
pub struct AssembleReport {
    pub image: Image,
    pub diagnostics: Vec<String>,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembler {
    #[must_use]
    pub fn new() -> Self {
        Assembler {
            symtab: SymbolTable::new(),
            radix: 8,
            pass: 1,
            clc: DEFAULT_ORIGIN,
            page0: LiteralPool::new(0),
            pagen: LiteralPool::new(DEFAULT_ORIGIN >> PAGE_SHIFT),
            active: ActivePool::NonZero,
        }
    }

    #[must_use]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symtab
    }

    /// The current location counter, advanced past whatever
    /// [`Assembler::deposit_statement`] last emitted — the console's
    /// inline deposit dialog prompts at this address next.
    #[must_use]
    pub fn location(&self) -> u16 {
        self.clc
    }

    /// Run both passes of `source`, returning the resulting image and any
    /// diagnostics. `self`'s symbol table retains whatever user symbols
    /// got defined, so the same `Assembler` can go on to serve
    /// [`Assembler::deposit_statement`] calls afterward.
    pub fn assemble(&mut self, source: &str) -> AssembleReport {
        let mut image = Image::new();
        let mut diagnostics = Vec::new();

        self.pass = 1;
        self.reset_location();
        self.run_source(source, &mut image, &mut diagnostics);

        self.pass = 2;
        self.reset_location();
        self.run_source(source, &mut image, &mut diagnostics);
        self.finish_pass(&mut image);

        AssembleReport { image, diagnostics }
    }

    /// Assemble one statement at `addr`, pass-2 only, for the console's
    /// inline deposit dialog. Unlike [`Assembler::assemble`], an undefined
    /// symbol here is a hard error — the dialog requires forward
    /// references be absent, since there is no pass 1 to resolve them.
    /// Returns the generated `(addr, word)`, or `None` for a pure
    /// label/definition/origin-setting statement.
    pub fn deposit_statement(&mut self, addr: u16, text: &str) -> Result<Option<(u16, u16)>> {
        self.pass = 2;
        self.clc = addr;
        let mut image = Image::new();
        let mut diagnostics = Vec::new();

        let mut line = Line::new(text, self.radix);
        if line.tok == Tok::End {
            return Ok(None);
        }
        loop {
            self.asm_line(&mut line, &mut image, &mut diagnostics);
            if line.tok == Tok::Char(';') {
                line.advance();
            }
            if line.tok == Tok::End {
                break;
            }
        }
        if let Some(msg) = diagnostics.into_iter().next() {
            return Err(Pdp8Error::Load(msg));
        }
        Ok(image.get(u32::from(addr)).map(|word| (addr, word)))
    }

    fn reset_location(&mut self) {
        self.clc = DEFAULT_ORIGIN;
        self.page0 = LiteralPool::new(0);
        self.pagen = LiteralPool::new(DEFAULT_ORIGIN >> PAGE_SHIFT);
        self.active = ActivePool::NonZero;
    }

    fn run_source(&mut self, source: &str, image: &mut Image, diagnostics: &mut Vec<String>) {
        for physical_line in source.lines() {
            let mut line = Line::new(physical_line, self.radix);
            if line.tok == Tok::End {
                continue;
            }
            loop {
                self.asm_line(&mut line, image, diagnostics);
                if line.tok == Tok::Char(';') {
                    line.advance();
                }
                if line.tok == Tok::End {
                    break;
                }
            }
        }
    }

    fn finish_pass(&mut self, image: &mut Image) {
        if self.pass != 2 {
            return;
        }
        self.flush_active(image);
        if self.active != ActivePool::Page0 {
            let entries: Vec<_> = self.page0.entries().collect();
            for (addr, word) in entries {
                image.set(u32::from(addr), word);
            }
        }
    }

    fn current_active_page(&self) -> u16 {
        match self.active {
            ActivePool::Page0 => 0,
            ActivePool::NonZero => self.pagen.page,
        }
    }

    fn flush_active(&self, image: &mut Image) {
        let pool = match self.active {
            ActivePool::Page0 => &self.page0,
            ActivePool::NonZero => &self.pagen,
        };
        for (addr, word) in pool.entries() {
            image.set(u32::from(addr), word);
        }
    }

    fn set_page(&mut self, image: &mut Image) {
        let new_page = self.clc >> PAGE_SHIFT;
        if new_page == self.current_active_page() {
            return;
        }
        if self.pass == 2 {
            self.flush_active(image);
        }
        if new_page == 0 {
            self.active = ActivePool::Page0;
        } else {
            self.pagen = LiteralPool::new(new_page);
            self.active = ActivePool::NonZero;
        }
    }

    fn intern_current(&mut self, value: u16) -> u16 {
        match self.active {
            ActivePool::Page0 => self.page0.intern(value),
            ActivePool::NonZero => self.pagen.intern(value),
        }
    }

    fn asm_line(&mut self, line: &mut Line, image: &mut Image, diagnostics: &mut Vec<String>) {
        let mut gencode = true;
        let mut code = 0u16;

        match line.tok.clone() {
            Tok::Char('*') => {
                line.advance();
                self.clc = self.expr(line, diagnostics);
                self.set_page(image);
                gencode = false;
            }
            Tok::Char('.') => {
                code = self.expr(line, diagnostics);
            }
            Tok::Symbol(name) => {
                if line.adjacent == Some('=') {
                    if self.pass == 1 {
                        line.advance_past_adjacent();
                        let value = self.expr(line, diagnostics);
                        self.symtab.define(&name, value);
                    } else {
                        // Pass 2 never needs definitions; the reference
                        // assembler skips the rest of the physical line
                        // outright rather than re-parsing the expression.
                        line.tok = Tok::End;
                    }
                    gencode = false;
                } else if line.adjacent == Some(',') {
                    if self.pass == 1 {
                        self.symtab.define(&name, self.clc);
                    }
                    line.advance_past_adjacent();
                    code = self.expr(line, diagnostics);
                } else if matches!(self.symtab.get(&name).map(|s| s.kind), Some(SymbolKind::Pseudo(_))) {
                    self.asm_pseudo(line, &name);
                    gencode = false;
                } else {
                    code = self.expr(line, diagnostics);
                }
            }
            Tok::Number(_) => {
                code = self.expr(line, diagnostics);
            }
            Tok::End => {
                gencode = false;
            }
            Tok::Char(_) => {
                gencode = false;
                diagnostics.push("invalid expression".to_string());
            }
        }

        if gencode {
            if self.pass == 2 {
                image.set(u32::from(self.clc), code);
            }
            self.clc = self.clc.wrapping_add(1) & WORD_MASK;
            self.set_page(image);
        }
    }

    fn asm_pseudo(&mut self, line: &mut Line, name: &str) {
        if let Some(Symbol { kind: SymbolKind::Pseudo(p), .. }) = self.symtab.get(name).copied() {
            match p {
                Pseudo::Decimal => self.radix = 10,
                Pseudo::Octal => self.radix = 8,
                _ => {}
            }
        }
        line.set_radix(self.radix);
        line.advance();
    }

    fn expr(&mut self, line: &mut Line, diagnostics: &mut Vec<String>) -> u16 {
        let mut value = self.elem(line, diagnostics);

        let first_is_opcode = matches!(
            &line.tok,
            Tok::Symbol(name) if matches!(self.symtab.get(name).map(|s| s.kind), Some(SymbolKind::Opcode))
        );

        if first_is_opcode {
            if (value >> 9) < 6 {
                line.advance();
                if matches!(&line.tok, Tok::Symbol(s) if s == "I") {
                    value |= INDIRECT_BIT;
                    line.advance();
                }
                let addr = self.expr(line, diagnostics);
                if addr > OFFSET_MASK {
                    value |= PAGE_BIT;
                }
                value |= addr & OFFSET_MASK;
            } else {
                line.advance();
                loop {
                    if matches!(line.tok, Tok::End | Tok::Char(';')) {
                        break;
                    }
                    value |= self.elem(line, diagnostics);
                    line.advance();
                }
            }
            return value;
        }

        line.advance();
        loop {
            match line.tok {
                Tok::End | Tok::Char(')') | Tok::Char(']') | Tok::Char(';') => break,
                Tok::Char(opr @ ('+' | '-' | '!' | '&')) => {
                    line.advance();
                    let value2 = self.elem(line, diagnostics);
                    value = match opr {
                        '+' => value.wrapping_add(value2),
                        '-' => value.wrapping_sub(value2),
                        '!' => value | value2,
                        '&' => value & value2,
                        _ => unreachable!(),
                    } & WORD_MASK;
                    line.advance();
                }
                _ => {
                    diagnostics.push("invalid operator".to_string());
                    return 0;
                }
            }
        }
        value
    }

    fn elem(&mut self, line: &mut Line, diagnostics: &mut Vec<String>) -> u16 {
        match line.tok.clone() {
            Tok::Char('(') => {
                line.advance();
                let v = self.expr(line, diagnostics);
                let addr = self.intern_current(v);
                if line.tok == Tok::Char(')') {
                    line.advance();
                }
                addr
            }
            Tok::Char('[') => {
                line.advance();
                let v = self.expr(line, diagnostics);
                let addr = self.page0.intern(v);
                if line.tok == Tok::Char(']') {
                    line.advance();
                }
                addr
            }
            Tok::Char('.') => self.clc,
            Tok::Char('-') => {
                line.advance();
                let v = self.elem(line, diagnostics);
                (!v).wrapping_add(1) & WORD_MASK
            }
            Tok::Number(n) => n,
            Tok::Symbol(name) => match self.symtab.get(&name) {
                Some(sym) => sym.value,
                None => {
                    if self.pass == 2 {
                        diagnostics.push(format!("undefined symbol: {name}"));
                    }
                    0
                }
            },
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembles_memory_reference_with_current_page_bit() {
        let mut asm = Assembler::new();
        let report = asm.assemble("*0300\nTAD 0345\nHLT\n");
        assert_eq!(report.image.get(0o0300), Some(0o1345));
    }

    #[test]
    fn label_then_forward_reference_resolves_on_pass_two() {
        let mut asm = Assembler::new();
        let report = asm.assemble("*0200\nLOOP, JMP LOOP\n");
        assert_eq!(report.image.get(0o0200), Some(0o5000 | 0o0200));
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn symbol_definition_is_not_emitted_as_code() {
        let mut asm = Assembler::new();
        let report = asm.assemble("FOO=0123\n*0200\nTAD FOO\n");
        assert_eq!(report.image.get(0o0200), Some(0o1000 | 0o0123));
    }

    #[test]
    fn current_page_literal_is_placed_at_top_of_page_and_deduplicated() {
        let mut asm = Assembler::new();
        let report = asm.assemble("*0200\nTAD (1234)\nTAD (1234)\nHLT\n");
        let first = report.image.get(0o0200).unwrap();
        let second = report.image.get(0o0201).unwrap();
        assert_eq!(first, second);
        assert_eq!(report.image.get((first & OFFSET_MASK) as u32 | 0o0200), Some(0o1234));
    }

    #[test]
    fn microcoded_operands_are_ored_together() {
        let mut asm = Assembler::new();
        let report = asm.assemble("*0200\nCLA CLL CMA\n");
        assert_eq!(report.image.get(0o0200), Some(0o7000 | 0o200 | 0o100 | 0o040));
    }

    #[test]
    fn indirect_operand_sets_indirect_bit() {
        let mut asm = Assembler::new();
        let report = asm.assemble("*0200\nDCA I 0010\n");
        assert_eq!(report.image.get(0o0200), Some(0o3000 | 0o0400 | 0o0010));
    }

    #[test]
    fn undefined_symbol_on_pass_two_is_a_diagnostic_not_a_hard_error() {
        let mut asm = Assembler::new();
        let report = asm.assemble("*0200\nTAD NOPE\n");
        assert!(!report.diagnostics.is_empty());
    }

    #[test]
    fn deposit_statement_rejects_undefined_symbols() {
        let mut asm = Assembler::new();
        let err = asm.deposit_statement(0o0200, "TAD NOPE\n");
        assert!(err.is_err());
    }

    #[test]
    fn deposit_statement_resolves_symbols_from_a_prior_assemble() {
        let mut asm = Assembler::new();
        asm.assemble("FOO=0123\n");
        let (addr, word) = asm.deposit_statement(0o0400, "TAD FOO\n").unwrap().unwrap();
        assert_eq!(addr, 0o0400);
        assert_eq!(word, 0o1000 | 0o0123);
    }

    #[test]
    fn decimal_pseudo_op_changes_subsequent_number_radix() {
        let mut asm = Assembler::new();
        let report = asm.assemble("*0200\nDECIMAL\n10\n");
        assert_eq!(report.image.get(0o0200), Some(10));
    }
}
