//! Aztec character tables.
//!
//! Each table maps a 5-bit (4-bit for DIGIT) code to either literal text or a
//! control action. The encoder derives its character map from the same
//! tables, so every entry decodes to exactly what it encodes.

/// Compaction modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Space and capital letters
    Upper,
    /// Space and lowercase letters
    Lower,
    /// Control characters and the remaining ASCII symbols
    Mixed,
    /// Digits, space, comma and period in 4-bit codes
    Digit,
    /// Punctuation, CR and two-byte pairs
    Punct,
    /// Raw bytes with a length prefix
    Binary,
}

/// What a single code means in a given table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    /// One or two literal bytes
    Text(&'static str),
    /// Switch modes until the next latch
    Latch(Mode),
    /// Switch modes for one character (or one binary run)
    Shift(Mode),
    /// FLG(n): FNC1 or an ECI designator
    Flag,
}

use Code::{Flag, Latch, Shift, Text};
use Mode::*;

#[rustfmt::skip]
const UPPER_TABLE: [Code; 32] = [
    Shift(Punct), Text(" "), Text("A"), Text("B"), Text("C"), Text("D"), Text("E"), Text("F"),
    Text("G"), Text("H"), Text("I"), Text("J"), Text("K"), Text("L"), Text("M"), Text("N"),
    Text("O"), Text("P"), Text("Q"), Text("R"), Text("S"), Text("T"), Text("U"), Text("V"),
    Text("W"), Text("X"), Text("Y"), Text("Z"), Latch(Lower), Latch(Mixed), Latch(Digit), Shift(Binary),
];

#[rustfmt::skip]
const LOWER_TABLE: [Code; 32] = [
    Shift(Punct), Text(" "), Text("a"), Text("b"), Text("c"), Text("d"), Text("e"), Text("f"),
    Text("g"), Text("h"), Text("i"), Text("j"), Text("k"), Text("l"), Text("m"), Text("n"),
    Text("o"), Text("p"), Text("q"), Text("r"), Text("s"), Text("t"), Text("u"), Text("v"),
    Text("w"), Text("x"), Text("y"), Text("z"), Shift(Upper), Latch(Mixed), Latch(Digit), Shift(Binary),
];

#[rustfmt::skip]
const MIXED_TABLE: [Code; 32] = [
    Shift(Punct), Text(" "), Text("\x01"), Text("\x02"), Text("\x03"), Text("\x04"), Text("\x05"), Text("\x06"),
    Text("\x07"), Text("\x08"), Text("\t"), Text("\n"), Text("\x0b"), Text("\x0c"), Text("\r"), Text("\x1b"),
    Text("\x1c"), Text("\x1d"), Text("\x1e"), Text("\x1f"), Text("@"), Text("\\"), Text("^"), Text("_"),
    Text("`"), Text("|"), Text("~"), Text("\x7f"), Latch(Lower), Latch(Upper), Latch(Punct), Shift(Binary),
];

#[rustfmt::skip]
const PUNCT_TABLE: [Code; 32] = [
    Flag, Text("\r"), Text("\r\n"), Text(". "), Text(", "), Text(": "), Text("!"), Text("\""),
    Text("#"), Text("$"), Text("%"), Text("&"), Text("'"), Text("("), Text(")"), Text("*"),
    Text("+"), Text(","), Text("-"), Text("."), Text("/"), Text(":"), Text(";"), Text("<"),
    Text("="), Text(">"), Text("?"), Text("["), Text("]"), Text("{"), Text("}"), Latch(Upper),
];

#[rustfmt::skip]
const DIGIT_TABLE: [Code; 16] = [
    Shift(Punct), Text(" "), Text("0"), Text("1"), Text("2"), Text("3"), Text("4"), Text("5"),
    Text("6"), Text("7"), Text("8"), Text("9"), Text(","), Text("."), Latch(Upper), Shift(Upper),
];

impl Mode {
    /// Width of one code in this mode
    pub fn code_bits(self) -> usize {
        match self {
            Digit => 4,
            Binary => 8,
            _ => 5,
        }
    }

    /// Code table for a character mode; empty for binary
    pub fn table(self) -> &'static [Code] {
        match self {
            Upper => &UPPER_TABLE,
            Lower => &LOWER_TABLE,
            Mixed => &MIXED_TABLE,
            Digit => &DIGIT_TABLE,
            Punct => &PUNCT_TABLE,
            Binary => &[],
        }
    }

    /// The five character modes in encoder preference order
    pub const CHARACTER_MODES: [Mode; 5] = [Upper, Lower, Digit, Mixed, Punct];
}

/// Look up a code in a table; `None` for codes past the table end
pub fn code_meaning(mode: Mode, code: u32) -> Option<Code> {
    mode.table().get(code as usize).copied()
}

/// Code for a single byte in `mode`, if the table has one
pub fn char_code(mode: Mode, byte: u8) -> Option<u32> {
    mode.table().iter().position(|c| match c {
        Text(s) => s.len() == 1 && s.as_bytes()[0] == byte,
        _ => false,
    })
    .map(|p| p as u32)
}

/// PUNCT code for a two-byte pair ("\r\n", ". ", ", ", ": ")
pub fn pair_code(first: u8, second: u8) -> Option<u32> {
    PUNCT_TABLE.iter().position(|c| match c {
        Text(s) => s.len() == 2 && s.as_bytes() == [first, second],
        _ => false,
    })
    .map(|p| p as u32)
}

fn control_code(from: Mode, action: Code) -> Option<u32> {
    from.table().iter().position(|&c| c == action).map(|p| p as u32)
}

/// Bits that latch from one character mode to another: (value, bit count).
///
/// Some transitions need two or three codes (LOWER to UPPER goes through
/// DIGIT); the codes are concatenated into one value.
pub fn latch_sequence(from: Mode, to: Mode) -> (u32, usize) {
    if from == to {
        return (0, 0);
    }
    if let Some(code) = control_code(from, Latch(to)) {
        return (code, from.code_bits());
    }
    let via = match (from, to) {
        (Lower, Upper) => Digit,
        (Punct, _) | (Digit, _) => Upper,
        (Mixed, Digit) => Upper,
        (_, Punct) => Mixed,
        _ => Upper,
    };
    let (first, first_bits) = latch_sequence(from, via);
    let (rest, rest_bits) = latch_sequence(via, to);
    ((first << rest_bits) | rest, first_bits + rest_bits)
}

/// Code that shifts from `from` to `to` for one character, if one exists
pub fn shift_code(from: Mode, to: Mode) -> Option<u32> {
    control_code(from, Shift(to))
}
