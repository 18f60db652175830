//! Observability trait for inspecting machine state.
//!
//! The console's `examine`/`shregs` commands and the trace-file writer
//! inspect processor and device state without affecting it. Rather than
//! hand-writing a formatter per command, components expose named state
//! through [`Observable::query`], in the spirit of `emu-core`'s component
//! inspector but with a narrower value set, since PDP-8 registers are all
//! at most 15 bits wide.

use std::collections::HashMap;
use std::fmt;

/// A dynamically-typed value returned from a state query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Boolean flip-flop (RUN, IEN, STOP, ...).
    Bool(bool),
    /// A register value, always stored widened to `u16` regardless of its
    /// architectural width (AC and PC are both 12 bits; SF is 6).
    Word(u16),
    /// A 64-bit bitmap (IREQ).
    Bitmap(u64),
    /// Free-form text (mnemonics, file names).
    String(String),
    /// Nested state, e.g. a device's own register set.
    Map(HashMap<String, Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Word(v) => write!(f, "{v:04o}"),
            Value::Bitmap(v) => write!(f, "{v:#018x}"),
            Value::String(v) => write!(f, "{v}"),
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::Word(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Bitmap(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

/// A component whose state can be inspected by dotted path.
///
/// Queries never mutate state. `examine`/`shregs`/the trace writer are
/// all built on top of this rather than poking at fields directly, so a
/// new device or register can be made visible without touching the
/// console's formatting code.
pub trait Observable {
    /// Query a specific property by path, e.g. `"ac"`, `"if"`, `"reader.flag"`.
    /// Returns `None` if the path is not recognized.
    fn query(&self, path: &str) -> Option<Value>;

    /// List every path this component recognizes, for `shregs`-style
    /// dumps that want to enumerate everything.
    fn query_paths(&self) -> &'static [&'static str];
}
