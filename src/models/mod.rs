/// Packed module matrix
pub mod matrix;
/// Decode output and macro metadata
pub mod result;

pub use matrix::BitMatrix;
pub use result::{DecoderResult, MacroMetadata};
