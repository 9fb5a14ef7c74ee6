//! Error correction shared by every symbology
//!
//! - Galois fields (binary GF(2^m) and the prime field GF(929))
//! - Reed-Solomon encoding and decoding over any of them

pub mod galois;
pub mod reed_solomon;

pub use galois::GaloisField;
pub use reed_solomon::{ReedSolomonDecoder, ReedSolomonEncoder};
