//! Data masks and the penalty score used to choose between them.

use crate::models::BitMatrix;

// Penalty weights
const N1: u32 = 3;
const N2: u32 = 3;
const N3: u32 = 40;
const N4: u32 = 10;

/// The eight QR data masks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MaskPattern {
    /// (i + j) % 2 == 0
    Pattern0 = 0,
    /// i % 2 == 0
    Pattern1 = 1,
    /// j % 3 == 0
    Pattern2 = 2,
    /// (i + j) % 3 == 0
    Pattern3 = 3,
    /// (i/2 + j/3) % 2 == 0
    Pattern4 = 4,
    /// (i*j)%2 + (i*j)%3 == 0
    Pattern5 = 5,
    /// ((i*j)%2 + (i*j)%3) % 2 == 0
    Pattern6 = 6,
    /// ((i+j)%2 + (i*j)%3) % 2 == 0
    Pattern7 = 7,
}

impl MaskPattern {
    /// Every mask in index order
    pub const ALL: [MaskPattern; 8] = [
        MaskPattern::Pattern0,
        MaskPattern::Pattern1,
        MaskPattern::Pattern2,
        MaskPattern::Pattern3,
        MaskPattern::Pattern4,
        MaskPattern::Pattern5,
        MaskPattern::Pattern6,
        MaskPattern::Pattern7,
    ];

    /// Get mask pattern from its 3-bit index
    pub fn from_bits(bits: u8) -> Option<Self> {
        Self::ALL.get(bits as usize).copied()
    }

    /// Whether the module at row `i`, column `j` is inverted
    pub fn is_masked(&self, i: usize, j: usize) -> bool {
        match self {
            MaskPattern::Pattern0 => (i + j) % 2 == 0,
            MaskPattern::Pattern1 => i % 2 == 0,
            MaskPattern::Pattern2 => j % 3 == 0,
            MaskPattern::Pattern3 => (i + j) % 3 == 0,
            MaskPattern::Pattern4 => (i / 2 + j / 3) % 2 == 0,
            MaskPattern::Pattern5 => ((i * j) % 2 + (i * j) % 3) == 0,
            MaskPattern::Pattern6 => (((i * j) % 2) + ((i * j) % 3)) % 2 == 0,
            MaskPattern::Pattern7 => (((i + j) % 2) + ((i * j) % 3)) % 2 == 0,
        }
    }
}

/// Total penalty of a finished symbol (lower is better)
pub fn mask_penalty(matrix: &BitMatrix) -> u32 {
    penalty_rule1(matrix) + penalty_rule2(matrix) + penalty_rule3(matrix) + penalty_rule4(matrix)
}

/// Runs of five or more same-coloured modules in a row or column
pub fn penalty_rule1(matrix: &BitMatrix) -> u32 {
    run_penalty(matrix, true) + run_penalty(matrix, false)
}

fn run_penalty(matrix: &BitMatrix, horizontal: bool) -> u32 {
    let (outer, inner) = if horizontal {
        (matrix.height(), matrix.width())
    } else {
        (matrix.width(), matrix.height())
    };
    let module = |a: usize, b: usize| {
        if horizontal { matrix.get(b, a) } else { matrix.get(a, b) }
    };

    let mut penalty = 0;
    for a in 0..outer {
        let mut run = 0u32;
        let mut prev = None;
        for b in 0..inner {
            let bit = module(a, b);
            if prev == Some(bit) {
                run += 1;
            } else {
                if run >= 5 {
                    penalty += N1 + (run - 5);
                }
                run = 1;
                prev = Some(bit);
            }
        }
        if run >= 5 {
            penalty += N1 + (run - 5);
        }
    }
    penalty
}

/// Every 2x2 block of one colour, overlaps counted
pub fn penalty_rule2(matrix: &BitMatrix) -> u32 {
    let mut blocks = 0;
    for y in 0..matrix.height().saturating_sub(1) {
        for x in 0..matrix.width().saturating_sub(1) {
            let v = matrix.get(x, y);
            if v == matrix.get(x + 1, y) && v == matrix.get(x, y + 1) && v == matrix.get(x + 1, y + 1)
            {
                blocks += 1;
            }
        }
    }
    N2 * blocks
}

/// Finder-like 1:1:3:1:1 runs with four light modules on either side
pub fn penalty_rule3(matrix: &BitMatrix) -> u32 {
    const FINDER: [bool; 7] = [true, false, true, true, true, false, true];
    let (width, height) = (matrix.width(), matrix.height());

    let mut hits = 0;
    for y in 0..height {
        for x in 0..width {
            if x + 6 < width
                && (0..7).all(|k| matrix.get(x + k, y) == FINDER[k])
                && (light_row(matrix, y, x.checked_sub(4), x)
                    || light_row(matrix, y, Some(x + 7), x + 11))
            {
                hits += 1;
            }
            if y + 6 < height
                && (0..7).all(|k| matrix.get(x, y + k) == FINDER[k])
                && (light_column(matrix, x, y.checked_sub(4), y)
                    || light_column(matrix, x, Some(y + 7), y + 11))
            {
                hits += 1;
            }
        }
    }
    N3 * hits
}

// A margin that would leave the symbol never counts as light
fn light_row(matrix: &BitMatrix, y: usize, from: Option<usize>, to: usize) -> bool {
    match from {
        Some(from) if to <= matrix.width() => (from..to).all(|x| !matrix.get(x, y)),
        _ => false,
    }
}

fn light_column(matrix: &BitMatrix, x: usize, from: Option<usize>, to: usize) -> bool {
    match from {
        Some(from) if to <= matrix.height() => (from..to).all(|y| !matrix.get(x, y)),
        _ => false,
    }
}

/// Deviation of the dark ratio from one half, in 5% steps
pub fn penalty_rule4(matrix: &BitMatrix) -> u32 {
    let total = matrix.width() * matrix.height();
    if total == 0 {
        return 0;
    }
    let dark = matrix.count_dark();
    let k = (dark * 2).abs_diff(total) * 10 / total;
    k as u32 * N4
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(bits: &str) -> BitMatrix {
        let bits: Vec<bool> = bits.bytes().map(|b| b == b'1').collect();
        BitMatrix::from_rows(&[bits])
    }

    #[test]
    fn test_rule1_runs() {
        assert_eq!(penalty_rule1(&row("0000")), 0);
        assert_eq!(penalty_rule1(&row("000001")), N1);
        assert_eq!(penalty_rule1(&row("0000000")), N1 + 2);
        assert_eq!(penalty_rule1(&row("00000111111")), N1 + N1 + 1);
    }

    #[test]
    fn test_rule2_blocks() {
        assert_eq!(penalty_rule2(&BitMatrix::square(2)), N2);
        assert_eq!(penalty_rule2(&BitMatrix::square(3)), 4 * N2);
        let checker = BitMatrix::from_rows(&[[true, false], [false, true]]);
        assert_eq!(penalty_rule2(&checker), 0);
    }

    #[test]
    fn test_rule3_finder_like() {
        assert_eq!(penalty_rule3(&row("00001011101")), N3);
        assert_eq!(penalty_rule3(&row("10111010000")), N3);
        // The light margin must lie inside the symbol
        assert_eq!(penalty_rule3(&row("1011101")), 0);
        assert_eq!(penalty_rule3(&row("0001011101")), 0);
        assert_eq!(penalty_rule3(&row("1011101000")), 0);
        // Vertical runs are scored the same way
        let column: Vec<[bool; 1]> = "00001011101".bytes().map(|b| [b == b'1']).collect();
        assert_eq!(penalty_rule3(&BitMatrix::from_rows(&column)), N3);
        assert_eq!(penalty_rule3(&row("110111011")), 0);
    }

    #[test]
    fn test_rule4_balance() {
        assert_eq!(penalty_rule4(&row("01")), 0);
        // 4 of 6 dark: |8 - 6| * 10 / 6 = 3
        assert_eq!(penalty_rule4(&row("011110")), 3 * N4);
        assert_eq!(penalty_rule4(&BitMatrix::square(4)), 10 * N4);
    }

    #[test]
    fn test_masks() {
        assert_eq!(MaskPattern::from_bits(5), Some(MaskPattern::Pattern5));
        assert_eq!(MaskPattern::from_bits(8), None);
        assert!(MaskPattern::Pattern0.is_masked(0, 0));
        assert!(!MaskPattern::Pattern1.is_masked(1, 0));
        assert!(MaskPattern::Pattern2.is_masked(1, 3));
        assert!(!MaskPattern::Pattern4.is_masked(2, 0));
    }
}
