//! PDF417, codeword level
//!
//! Decoding starts from the codeword stream a row/column reader produces:
//! index 0 is the symbol length descriptor, followed by data codewords, pad
//! codewords and finally `2^(level+1)` check codewords. Encoding produces the
//! same stream together with the row and column counts it was laid out for.

pub mod decoder;
pub mod encoder;
pub mod numeric;

pub use decoder::{decode, decode_codewords, decode_with_pool};
pub use encoder::{encode, encode_bytes};

use crate::config;
use crate::models::MacroMetadata;
use crate::utils::charset::CharacterSetEci;

pub(crate) const TEXT_COMPACTION_LATCH: u32 = 900;
pub(crate) const BYTE_COMPACTION_LATCH: u32 = 901;
pub(crate) const NUMERIC_COMPACTION_LATCH: u32 = 902;
pub(crate) const BYTE_SHIFT: u32 = 913;
pub(crate) const MACRO_TERMINATOR: u32 = 922;
pub(crate) const MACRO_OPTIONAL_FIELD: u32 = 923;
pub(crate) const BYTE_COMPACTION_LATCH_6: u32 = 924;
pub(crate) const ECI_USER_DEFINED: u32 = 925;
pub(crate) const ECI_GENERAL_PURPOSE: u32 = 926;
pub(crate) const ECI_CHARSET: u32 = 927;
pub(crate) const MACRO_BLOCK: u32 = 928;

pub(crate) const FIELD_FILE_NAME: u32 = 0;
pub(crate) const FIELD_SEGMENT_COUNT: u32 = 1;
pub(crate) const FIELD_TIME_STAMP: u32 = 2;
pub(crate) const FIELD_SENDER: u32 = 3;
pub(crate) const FIELD_ADDRESSEE: u32 = 4;
pub(crate) const FIELD_FILE_SIZE: u32 = 5;
pub(crate) const FIELD_CHECKSUM: u32 = 6;

/// Text sub-mode switch values
pub(crate) const PL: u32 = 25;
pub(crate) const LL: u32 = 27;
pub(crate) const AS: u32 = 27;
pub(crate) const ML: u32 = 28;
pub(crate) const AL: u32 = 28;
pub(crate) const PS: u32 = 29;
pub(crate) const PAL: u32 = 29;

pub(crate) const PUNCT_CHARS: &[u8; 29] = b";<>@[\\]_`~!\r\t,:\n-.$/\"|*()?{}'";
pub(crate) const MIXED_CHARS: &[u8; 25] = b"0123456789&\r\t,:#-.$/+%*=^";

/// Highest error-correction level
pub const MAX_EC_LEVEL: u8 = 8;
/// A symbol never holds more codewords than this
pub const MAX_CODEWORDS: usize = 929;

/// Number of check codewords for an error-correction level
pub fn ec_codeword_count(level: u8) -> usize {
    1 << (level as usize + 1)
}

/// Compaction strategy for the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compaction {
    /// Switch between text, byte and numeric runs
    #[default]
    Auto,
    /// Text compaction only; every byte must be printable ASCII, TAB, LF or CR
    Text,
    /// Byte compaction only
    Byte,
    /// Numeric compaction only; every byte must be a digit
    Numeric,
}

/// Encoder settings
#[derive(Debug, Clone)]
pub struct Pdf417Options {
    /// Compaction strategy
    pub compaction: Compaction,
    /// Error-correction level (0-8)
    pub ec_level: u8,
    /// Fewest data columns (at least 1)
    pub min_columns: usize,
    /// Most data columns (at most 30)
    pub max_columns: usize,
    /// Fewest rows (at least 3)
    pub min_rows: usize,
    /// Most rows (at most 90)
    pub max_rows: usize,
    /// Character set for the text; emits an ECI designator when set
    pub charset: Option<CharacterSetEci>,
    /// Structured-append block appended after the data. Only the file id,
    /// segment index, terminator flag and named optional fields are written;
    /// `optional_data` is ignored.
    pub macro_block: Option<MacroMetadata>,
}

impl Default for Pdf417Options {
    fn default() -> Self {
        Self {
            compaction: Compaction::Auto,
            ec_level: config::pdf417_ec_level(),
            min_columns: 1,
            max_columns: config::pdf417_max_columns(),
            min_rows: 3,
            max_rows: config::pdf417_max_rows(),
            charset: None,
            macro_block: None,
        }
    }
}

/// An encoded symbol at codeword level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdf417Code {
    /// Length descriptor, data, padding and check codewords
    pub codewords: Vec<u32>,
    /// Data columns
    pub columns: usize,
    /// Rows
    pub rows: usize,
    /// Error-correction level the check codewords were built for
    pub ec_level: u8,
}
