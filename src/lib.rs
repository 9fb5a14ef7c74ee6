//! rust_barcode - Aztec, Data Matrix and PDF417 codec with QR mask scoring
//!
//! A pure Rust implementation of the hard middle of a barcode reader/writer:
//! everything between a rectified module matrix (or a raw codeword stream)
//! and the payload text. Image acquisition, binarization and detection are
//! left to the caller.
//!
//! Decoding is all-or-nothing per symbol: every failure is a typed [`Error`]
//! and no partial text is ever returned. Callers that are unsure what they
//! are looking at hand several [`Symbology`] hypotheses to [`decode_first`].

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Aztec Code encoder and decoder
pub mod aztec;
/// Environment-backed defaults for encoder options
pub mod config;
/// Data Matrix (ECC 200) encoder and decoder
pub mod datamatrix;
/// Galois fields and Reed-Solomon coding
pub mod ec;
/// Error type shared by every codec
pub mod error;
/// Core data structures (BitMatrix, DecoderResult, MacroMetadata)
pub mod models;
/// PDF417 codeword-level encoder and decoder
pub mod pdf417;
/// QR function patterns, placement and mask selection
pub mod qr;
/// Utility functions (bit cursors, character sets, buffer pools, rendering)
pub mod utils;

pub use aztec::{AztecCode, AztecOptions, AztecSymbol};
pub use datamatrix::{DataMatrixCode, DataMatrixOptions, SymbolShape};
pub use error::{Error, Result};
pub use models::{BitMatrix, DecoderResult, MacroMetadata};
pub use pdf417::{Compaction, Pdf417Code, Pdf417Options};
pub use qr::{EcLevel, MaskPattern, QrSymbol};
pub use utils::charset::CharacterSetEci;
pub use utils::memory_pool::BufferPool;

use tracing::trace;

/// One decode hypothesis: a symbology plus the inputs its decoder needs
#[derive(Debug, Clone, Copy)]
pub enum Symbology<'a> {
    /// Rectified Aztec matrix with the parameters read from its mode message
    Aztec {
        /// Module matrix, bullseye centred
        matrix: &'a BitMatrix,
        /// Compactness, layer count and data-word count
        symbol: AztecSymbol,
    },
    /// Complete Data Matrix symbol including finder and timing borders
    DataMatrix {
        /// Module matrix; its dimensions select the symbol size
        matrix: &'a BitMatrix,
    },
    /// PDF417 codeword stream as read from the rows
    Pdf417 {
        /// Length descriptor, data, padding and check codewords
        codewords: &'a [u32],
        /// Error-correction level from the row indicators
        ec_level: u8,
    },
}

impl Symbology<'_> {
    /// Short human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Symbology::Aztec { .. } => "aztec",
            Symbology::DataMatrix { .. } => "datamatrix",
            Symbology::Pdf417 { .. } => "pdf417",
        }
    }
}

/// Decode a single hypothesis
pub fn decode(hypothesis: &Symbology) -> Result<DecoderResult> {
    decode_with_pool(hypothesis, &mut BufferPool::new())
}

/// Decode a single hypothesis using scratch storage from `pool`
pub fn decode_with_pool(hypothesis: &Symbology, pool: &mut BufferPool) -> Result<DecoderResult> {
    match *hypothesis {
        Symbology::Aztec { matrix, symbol } => aztec::decode_with_pool(matrix, &symbol, pool),
        Symbology::DataMatrix { matrix } => datamatrix::decode_with_pool(matrix, pool),
        Symbology::Pdf417 {
            codewords,
            ec_level,
        } => pdf417::decode_with_pool(codewords, ec_level, pool),
    }
}

/// Try each hypothesis in order and return the first that decodes.
///
/// Failed hypotheses are logged at `trace` and discarded. When every one
/// fails the last error is returned.
pub fn decode_first(hypotheses: &[Symbology]) -> Result<DecoderResult> {
    let mut pool = BufferPool::new();
    let mut last_error = Error::Format("no decode hypotheses");
    for (index, hypothesis) in hypotheses.iter().enumerate() {
        match decode_with_pool(hypothesis, &mut pool) {
            Ok(result) => return Ok(result),
            Err(e) => {
                trace!(index, symbology = hypothesis.name(), error = %e, "hypothesis rejected");
                last_error = e;
            }
        }
    }
    Err(last_error)
}
