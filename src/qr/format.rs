//! Format and version information.
//!
//! Both are BCH-protected words written twice into the symbol. Decoding
//! picks the valid word at minimum Hamming distance across both copies.

use super::EcLevel;
use super::mask::MaskPattern;
use crate::models::BitMatrix;

const FORMAT_POLY: u32 = 0x537;
const FORMAT_MASK: u32 = 0x5412;
const VERSION_POLY: u32 = 0x1F25;

/// Words further than this from every valid one are rejected
const MAX_FORMAT_DISTANCE: u32 = 3;

/// `(x, y)` of format bit `i` (LSB first) around the top-left finder
const FORMAT_COORDINATES: [(usize, usize); 15] = [
    (8, 0),
    (8, 1),
    (8, 2),
    (8, 3),
    (8, 4),
    (8, 5),
    (8, 7),
    (8, 8),
    (7, 8),
    (5, 8),
    (4, 8),
    (3, 8),
    (2, 8),
    (1, 8),
    (0, 8),
];

fn msb_position(value: u32) -> u32 {
    32 - value.leading_zeros()
}

/// Remainder of `value` shifted past the polynomial degree
fn bch_code(value: u32, poly: u32) -> u32 {
    let degree = msb_position(poly);
    let mut value = value << (degree - 1);
    while msb_position(value) >= degree {
        value ^= poly << (msb_position(value) - degree);
    }
    value
}

/// 15-bit masked format word for `ec_level` and `mask`
pub fn format_bits(ec_level: EcLevel, mask: MaskPattern) -> u32 {
    let data = (ec_level.format_bits() << 3) | mask as u32;
    ((data << 10) | bch_code(data, FORMAT_POLY)) ^ FORMAT_MASK
}

/// 18-bit version word, defined for versions 7 and up
pub fn version_bits(version: u8) -> u32 {
    let v = version as u32;
    (v << 12) | bch_code(v, VERSION_POLY)
}

/// Write both format copies
pub fn embed_format(matrix: &mut BitMatrix, ec_level: EcLevel, mask: MaskPattern) {
    let bits = format_bits(ec_level, mask);
    let size = matrix.width();
    for (i, &(x, y)) in FORMAT_COORDINATES.iter().enumerate() {
        let bit = (bits >> i) & 1 == 1;
        matrix.set(x, y, bit);
        if i < 8 {
            matrix.set(size - 1 - i, 8, bit);
        } else {
            matrix.set(8, size - 7 + (i - 8), bit);
        }
    }
}

/// Write both version copies (no-op below version 7)
pub fn embed_version(matrix: &mut BitMatrix, version: u8) {
    if version < 7 {
        return;
    }
    let bits = version_bits(version);
    let size = matrix.width();
    for i in 0..6 {
        for j in 0..3 {
            let bit = (bits >> (i * 3 + j)) & 1 == 1;
            // Bottom-left block
            matrix.set(i, size - 11 + j, bit);
            // Top-right block
            matrix.set(size - 11 + j, i, bit);
        }
    }
}

/// Decode a raw format word to the nearest valid `(EcLevel, MaskPattern)`
pub fn decode_format(raw: u32) -> Option<(EcLevel, MaskPattern)> {
    decode_format_pair(raw, raw)
}

fn decode_format_pair(first: u32, second: u32) -> Option<(EcLevel, MaskPattern)> {
    let mut best: Option<(u32, EcLevel, MaskPattern)> = None;
    for ec_level in EcLevel::ALL {
        for mask in MaskPattern::ALL {
            let target = format_bits(ec_level, mask);
            let distance = (first ^ target).count_ones().min((second ^ target).count_ones());
            if best.is_none_or(|(d, _, _)| distance < d) {
                best = Some((distance, ec_level, mask));
            }
        }
    }
    best.filter(|&(d, _, _)| d <= MAX_FORMAT_DISTANCE)
        .map(|(_, ec_level, mask)| (ec_level, mask))
}

/// Read both format copies from a symbol and decode them
pub fn read_format(matrix: &BitMatrix) -> Option<(EcLevel, MaskPattern)> {
    let size = matrix.width();
    let mut first = 0u32;
    let mut second = 0u32;
    for (i, &(x, y)) in FORMAT_COORDINATES.iter().enumerate() {
        first |= (matrix.get(x, y) as u32) << i;
        let bit = if i < 8 {
            matrix.get(size - 1 - i, 8)
        } else {
            matrix.get(8, size - 7 + (i - 8))
        };
        second |= (bit as u32) << i;
    }
    decode_format_pair(first, second)
}

/// Read the version from a symbol of version 7 or greater.
///
/// Both copies are tried against every valid version word; the closest
/// within three bit errors wins. Smaller symbols derive it from their size.
pub fn read_version(matrix: &BitMatrix) -> Option<u8> {
    let size = matrix.width();
    if size < 21 || (size - 17) % 4 != 0 {
        return None;
    }
    let provisional = ((size - 17) / 4) as u8;
    if provisional < 7 {
        return Some(provisional);
    }
    let mut bottom_left = 0u32;
    let mut top_right = 0u32;
    for i in 0..6 {
        for j in 0..3 {
            bottom_left |= (matrix.get(i, size - 11 + j) as u32) << (i * 3 + j);
            top_right |= (matrix.get(size - 11 + j, i) as u32) << (i * 3 + j);
        }
    }
    (7..=40u8)
        .map(|v| {
            let target = version_bits(v);
            let d = (bottom_left ^ target).count_ones().min((top_right ^ target).count_ones());
            (d, v)
        })
        .min()
        .filter(|&(d, _)| d <= 3)
        .map(|(_, v)| v)
}
