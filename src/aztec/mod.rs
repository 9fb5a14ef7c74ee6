//! Aztec Code
//!
//! Decoding takes a rectified module matrix plus the structural parameters a
//! detector reads from the mode message (compactness, layer count, data-word
//! count). [`read_symbol_parameters`] recovers those parameters from the
//! matrix itself when the caller only knows the symbol is compact or full.
//!
//! Encoding produces the module matrix together with the same parameters, so
//! the output of [`encode`] can be fed straight back into [`decode`].

pub mod decoder;
pub mod encoder;
pub mod layout;
pub mod tables;

pub use decoder::{decode, decode_with_pool, high_level_decode, read_symbol_parameters};
pub use encoder::{encode, encode_bytes};

use crate::config;
use crate::error::{Error, Result};
use crate::models::BitMatrix;
use crate::utils::charset::CharacterSetEci;

/// Largest compact symbol
pub const MAX_LAYERS_COMPACT: usize = 4;
/// Largest full-range symbol
pub const MAX_LAYERS: usize = 32;

/// Structural parameters of a detected symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AztecSymbol {
    /// Compact (single-ring finder) rather than full-range
    pub compact: bool,
    /// Number of data layers
    pub layers: usize,
    /// Number of data codewords declared by the mode message
    pub data_words: usize,
}

impl AztecSymbol {
    pub(crate) fn validate(&self) -> Result<()> {
        let max_layers = if self.compact { MAX_LAYERS_COMPACT } else { MAX_LAYERS };
        if self.layers == 0 || self.layers > max_layers {
            return Err(Error::Format("layer count out of range"));
        }
        if self.data_words == 0 {
            return Err(Error::Format("symbol declares no data words"));
        }
        Ok(())
    }
}

/// Encoder settings
#[derive(Debug, Clone)]
pub struct AztecOptions {
    /// Minimum share of the symbol spent on check words, in percent
    pub min_ecc_percent: usize,
    /// 0 picks the smallest symbol; negative values request a compact
    /// symbol with that many layers, positive values a full-range one
    pub layers: i32,
    /// Character set for the text; emits an ECI designator when set
    pub charset: Option<CharacterSetEci>,
    /// Prefix the message with FLG(0) (FNC1)
    pub gs1: bool,
}

impl Default for AztecOptions {
    fn default() -> Self {
        Self {
            min_ecc_percent: config::aztec_min_ecc_percent(),
            layers: 0,
            charset: None,
            gs1: false,
        }
    }
}

/// An encoded symbol
#[derive(Debug, Clone)]
pub struct AztecCode {
    /// Modules, no quiet zone
    pub matrix: BitMatrix,
    /// Compact rather than full-range
    pub compact: bool,
    /// Number of data layers
    pub layers: usize,
    /// Data codewords written to the mode message
    pub data_words: usize,
}

impl AztecCode {
    /// Parameters the decoder needs to read this symbol back
    pub fn symbol(&self) -> AztecSymbol {
        AztecSymbol {
            compact: self.compact,
            layers: self.layers,
            data_words: self.data_words,
        }
    }

    /// Side length in modules
    pub fn size(&self) -> usize {
        self.matrix.width()
    }
}
