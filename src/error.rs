//! Error types shared by every codec in the crate.
//!
//! Decode failures are always "this hypothesis did not hold": the caller is
//! expected to try another symbology or another binarization rather than
//! treat them as application errors. [`Error::is_format`] groups them.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure a decode or encode call can report
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The bit supply ran out in the middle of a read
    #[error("insufficient data: requested {requested} bits, {available} available")]
    InsufficientData {
        /// Number of bits the read asked for
        requested: usize,
        /// Number of bits that were left
        available: usize,
    },

    /// Structurally invalid input (illegal codeword, bad table entry, bad macro block)
    #[error("format error: {0}")]
    Format(&'static str),

    /// An ECI designator that is not in the character-set registry
    #[error("unsupported ECI value {0}")]
    UnsupportedEci(u32),

    /// Reed-Solomon decoding did not converge
    #[error("uncorrectable error: too many damaged codewords")]
    Uncorrectable,

    /// Encode-side input the codec cannot represent
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Creates an invalid-argument error
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// True for every failure that invalidates a decode attempt.
    ///
    /// `InsufficientData` counts as a format failure once it escapes a
    /// decoder: a symbol whose stream ends mid-code is malformed.
    pub fn is_format(&self) -> bool {
        !matches!(self, Self::InvalidArgument(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InsufficientData {
            requested: 8,
            available: 3,
        };
        assert!(err.to_string().contains("requested 8 bits"));
        assert!(Error::UnsupportedEci(999).to_string().contains("999"));
    }

    #[test]
    fn test_is_format() {
        assert!(Error::Format("bad codeword").is_format());
        assert!(Error::Uncorrectable.is_format());
        assert!(Error::UnsupportedEci(5000).is_format());
        assert!(!Error::invalid("empty contents").is_format());
    }
}
