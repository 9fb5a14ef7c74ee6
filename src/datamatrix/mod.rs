//! Data Matrix (ECC 200)
//!
//! The decoder takes the full module matrix, finder and timing borders
//! included, and infers the symbol size from its dimensions. The encoder
//! chooses the smallest symbol that satisfies the shape and size hints.

pub mod decoder;
pub mod encoder;
pub mod placement;
pub mod symbol_info;

pub use decoder::{decode, decode_codewords, decode_with_pool};
pub use encoder::{encode, encode_bytes};
pub use symbol_info::{SymbolInfo, SymbolShape};

use crate::models::BitMatrix;
use crate::utils::charset::CharacterSetEci;

/// Header replaced by the Macro 05 codeword
pub const MACRO_05_HEADER: &str = "[)>\u{1E}05\u{1D}";
/// Header replaced by the Macro 06 codeword
pub const MACRO_06_HEADER: &str = "[)>\u{1E}06\u{1D}";
/// Trailer implied by either macro codeword
pub const MACRO_TRAILER: &str = "\u{1E}\u{04}";

/// Encoder settings
#[derive(Debug, Clone, Default)]
pub struct DataMatrixOptions {
    /// Square, rectangular or either
    pub shape: SymbolShape,
    /// Smallest acceptable symbol, as (width, height) in modules
    pub min_size: Option<(usize, usize)>,
    /// Largest acceptable symbol, as (width, height) in modules
    pub max_size: Option<(usize, usize)>,
    /// Encode the whole message in C40, using shifts for characters
    /// outside the basic set
    pub force_c40: bool,
    /// Prefix FNC1 and encode GS (0x1D) as FNC1
    pub gs1: bool,
    /// Character set for the text; emits an ECI designator when set
    pub charset: Option<CharacterSetEci>,
    /// Requested output width in pixels; 0 keeps one pixel per module
    pub width: usize,
    /// Requested output height in pixels; 0 keeps one pixel per module
    pub height: usize,
}

/// An encoded symbol
#[derive(Debug, Clone)]
pub struct DataMatrixCode {
    /// Modules, borders included, scaled when a size was requested
    pub matrix: BitMatrix,
    /// Size the encoder settled on
    pub info: &'static SymbolInfo,
    /// Data codewords followed by interleaved check words
    pub codewords: Vec<u8>,
}
