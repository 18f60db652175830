//! Two-pass MACRO-8 subset assembler and the RIM/BIN/text binary loaders.
//!
//! Produces an [`Image`] — a sparse map from address to 12-bit word — that
//! the console loads into a running machine. Deliberately has no
//! dependency on `pdp8-cpu`: assembly and loading only need to describe
//! "this word goes at this address".

mod assembler;
mod image;
mod lexer;
mod literal;
mod loaders;
mod opcodes;
mod pseudo;
mod symtab;

pub use assembler::{AssembleReport, Assembler};
pub use image::Image;
pub use loaders::{load_bin, load_rim, load_txt};
pub use symtab::{Symbol, SymbolKind, SymbolTable};
