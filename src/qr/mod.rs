//! QR symbol assembly and mask selection.
//!
//! Only the placement end of the QR pipeline lives here: given the final
//! interleaved data and EC bit stream for a version and EC level, lay out the
//! function patterns, place the bits under each of the eight masks, score
//! every candidate and keep the cheapest. Text encoding into that bit stream
//! is left to the caller.

pub mod format;
/// Function-pattern reservation per version
pub mod function_mask;
pub mod mask;
pub mod placement;

pub use function_mask::FunctionMask;
pub use mask::{MaskPattern, mask_penalty};

use crate::config;
use crate::error::{Error, Result};
use crate::models::BitMatrix;
use rayon::prelude::*;
use tracing::{debug, trace};

/// Error correction level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcLevel {
    /// Low (~7% recovery)
    L,
    /// Medium (~15% recovery)
    M,
    /// Quartile (~25% recovery)
    Q,
    /// High (~30% recovery)
    H,
}

impl EcLevel {
    /// Every level in recovery order
    pub const ALL: [EcLevel; 4] = [EcLevel::L, EcLevel::M, EcLevel::Q, EcLevel::H];

    /// Two-bit value carried in the format information
    pub fn format_bits(self) -> u32 {
        match self {
            EcLevel::L => 0b01,
            EcLevel::M => 0b00,
            EcLevel::Q => 0b11,
            EcLevel::H => 0b10,
        }
    }

    /// Inverse of [`EcLevel::format_bits`]
    pub fn from_format_bits(bits: u32) -> Self {
        match bits & 0b11 {
            0b01 => EcLevel::L,
            0b00 => EcLevel::M,
            0b11 => EcLevel::Q,
            _ => EcLevel::H,
        }
    }
}

/// A finished symbol and the mask it was built with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrSymbol {
    /// Modules, quiet zone excluded
    pub matrix: BitMatrix,
    /// Version 1..=40
    pub version: u8,
    /// Error correction level written to the format information
    pub ec_level: EcLevel,
    /// Selected mask
    pub mask: MaskPattern,
    /// Total penalty of the selected rendering
    pub penalty: u32,
}

struct Layout {
    function: FunctionMask,
    base: BitMatrix,
}

fn layout(data_bits: &[bool], version: u8) -> Result<Layout> {
    if !(1..=40).contains(&version) {
        return Err(Error::invalid(format!("invalid QR version: {version}")));
    }
    let function = FunctionMask::new(version);
    let capacity = function.data_modules_count();
    if data_bits.len() > capacity {
        return Err(Error::invalid(format!(
            "data bits exceed version {version} capacity: {} > {capacity}",
            data_bits.len()
        )));
    }
    let mut base = function_mask::draw_function_patterns(version);
    format::embed_version(&mut base, version);
    Ok(Layout { function, base })
}

fn render(layout: &Layout, data_bits: &[bool], ec_level: EcLevel, mask: MaskPattern) -> BitMatrix {
    let mut matrix = layout.base.clone();
    format::embed_format(&mut matrix, ec_level, mask);
    placement::place_data(&mut matrix, &layout.function, data_bits, mask);
    matrix
}

/// Build the symbol for `data_bits` under one specific mask.
///
/// `data_bits` is the final codeword stream, MSB first; modules past its end
/// (remainder bits) are left light before masking.
pub fn build_symbol(
    data_bits: &[bool],
    version: u8,
    ec_level: EcLevel,
    mask: MaskPattern,
) -> Result<BitMatrix> {
    let layout = layout(data_bits, version)?;
    Ok(render(&layout, data_bits, ec_level, mask))
}

/// Build all eight candidates and keep the one with the lowest penalty, ties
/// going to the lowest mask index.
///
/// Candidates are scored on the rayon pool unless `BARCODE_MASK_PARALLEL=0`;
/// both paths reduce on `(penalty, index)` and so agree bit for bit.
pub fn select_mask(data_bits: &[bool], version: u8, ec_level: EcLevel) -> Result<QrSymbol> {
    select_mask_with(data_bits, version, ec_level, config::mask_parallel())
}

fn select_mask_with(
    data_bits: &[bool],
    version: u8,
    ec_level: EcLevel,
    parallel: bool,
) -> Result<QrSymbol> {
    let layout = layout(data_bits, version)?;
    let score = |&mask: &MaskPattern| {
        let matrix = render(&layout, data_bits, ec_level, mask);
        let penalty = mask_penalty(&matrix);
        trace!(mask = mask as u8, penalty, "mask candidate");
        (penalty, mask, matrix)
    };

    let best = if parallel {
        MaskPattern::ALL
            .par_iter()
            .map(score)
            .min_by_key(|(penalty, mask, _)| (*penalty, *mask))
    } else {
        MaskPattern::ALL
            .iter()
            .map(score)
            .min_by_key(|(penalty, mask, _)| (*penalty, *mask))
    };
    let (penalty, mask, matrix) = best.ok_or(Error::Format("no mask candidates"))?;
    debug!(version, ?ec_level, mask = mask as u8, penalty, "selected QR mask");
    Ok(QrSymbol {
        matrix,
        version,
        ec_level,
        mask,
        penalty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bits(len: usize) -> Vec<bool> {
        // Deterministic bit stream with some structure
        (0..len).map(|i| (i * 7 + i / 3) % 5 < 2).collect()
    }

    #[test]
    fn test_ec_level_bits() {
        for level in EcLevel::ALL {
            assert_eq!(EcLevel::from_format_bits(level.format_bits()), level);
        }
    }

    #[test]
    fn test_build_symbol_round_trip() {
        let bits = sample_bits(208);
        let matrix = build_symbol(&bits, 1, EcLevel::M, MaskPattern::Pattern4).unwrap();
        assert_eq!(matrix.width(), 21);
        assert_eq!(format::read_format(&matrix), Some((EcLevel::M, MaskPattern::Pattern4)));
        let function = FunctionMask::new(1);
        assert_eq!(placement::read_data(&matrix, &function, MaskPattern::Pattern4), bits);
    }

    #[test]
    fn test_build_symbol_with_version_info() {
        let bits = sample_bits(1568);
        let matrix = build_symbol(&bits, 7, EcLevel::L, MaskPattern::Pattern2).unwrap();
        assert_eq!(format::read_version(&matrix), Some(7));
        let function = FunctionMask::new(7);
        assert_eq!(placement::read_data(&matrix, &function, MaskPattern::Pattern2), bits);
    }

    #[test]
    fn test_select_mask_is_minimal() {
        let bits = sample_bits(359);
        let symbol = select_mask_with(&bits, 2, EcLevel::Q, false).unwrap();
        for mask in MaskPattern::ALL {
            let candidate = build_symbol(&bits, 2, EcLevel::Q, mask).unwrap();
            let penalty = mask_penalty(&candidate);
            assert!(
                penalty > symbol.penalty || (penalty == symbol.penalty && mask >= symbol.mask),
                "mask {mask:?} scored {penalty}, selected {:?} scored {}",
                symbol.mask,
                symbol.penalty
            );
        }
        assert_eq!(mask_penalty(&symbol.matrix), symbol.penalty);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        for version in [1u8, 5, 10] {
            let capacity = FunctionMask::new(version).data_modules_count();
            let bits = sample_bits(capacity);
            let a = select_mask_with(&bits, version, EcLevel::H, true).unwrap();
            let b = select_mask_with(&bits, version, EcLevel::H, false).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            build_symbol(&[], 0, EcLevel::L, MaskPattern::Pattern0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            select_mask(&sample_bits(209), 1, EcLevel::L),
            Err(Error::InvalidArgument(_))
        ));
    }
}
