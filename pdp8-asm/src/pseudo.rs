//! Pseudo-instruction (directive) recognition.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pseudo {
    Continue,
    Decimal,
    Define,
    Dubl,
    Expunge,
    Field,
    Fixtab,
    Fltg,
    Octal,
    Page,
    Pause,
    Text,
}

impl Pseudo {
    /// Directive name/variant pairs, in the order `symb_init` inserts them.
    pub const ALL: &'static [(&'static str, Pseudo)] = &[
        ("CONTINUE", Pseudo::Continue),
        ("DECIMAL", Pseudo::Decimal),
        ("DEFINE", Pseudo::Define),
        ("DUBL", Pseudo::Dubl),
        ("EXPUNGE", Pseudo::Expunge),
        ("FIELD", Pseudo::Field),
        ("FIXTAB", Pseudo::Fixtab),
        ("FLTG", Pseudo::Fltg),
        ("OCTAL", Pseudo::Octal),
        ("PAGE", Pseudo::Page),
        ("PAUSE", Pseudo::Pause),
        ("TEXT", Pseudo::Text),
    ];
}
