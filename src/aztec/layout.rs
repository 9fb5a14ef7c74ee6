//! Aztec symbol geometry.
//!
//! Data bits spiral inward in concentric two-module-wide layers. Within each
//! layer the walk covers the left column (top to bottom), the bottom row
//! (left to right), the right column (bottom to top) and the top row (right to
//! left), two modules at a time. Full-range symbols interleave a reference
//! grid every 16 modules, which the alignment map skips over. Encoder and
//! decoder both use [`Layout::walk`], so placement and extraction cannot
//! disagree.

use crate::models::BitMatrix;

/// Bits available in the data layers of a symbol
pub fn total_bits_in_layers(layers: usize, compact: bool) -> usize {
    ((if compact { 88 } else { 112 }) + 16 * layers) * layers
}

/// Codeword width for a layer count
pub fn word_size(layers: usize) -> usize {
    match layers {
        0..=2 => 6,
        3..=8 => 8,
        9..=22 => 10,
        _ => 12,
    }
}

/// Visit the mode-message ring of a symbol centred at `(center, center)`
pub fn walk_mode_message(center: usize, compact: bool, mut visit: impl FnMut(usize, usize, usize)) {
    if compact {
        for i in 0..7 {
            let offset = center - 3 + i;
            visit(i, offset, center - 5);
            visit(i + 7, center + 5, offset);
            visit(20 - i, offset, center + 5);
            visit(27 - i, center - 5, offset);
        }
    } else {
        for i in 0..10 {
            let offset = center - 5 + i + i / 5;
            visit(i, offset, center - 7);
            visit(i + 10, center + 7, offset);
            visit(29 - i, offset, center + 7);
            visit(39 - i, center - 7, offset);
        }
    }
}

/// Geometry of one symbol
#[derive(Debug, Clone)]
pub struct Layout {
    compact: bool,
    layers: usize,
    base_size: usize,
    matrix_size: usize,
    alignment_map: Vec<usize>,
}

impl Layout {
    /// Geometry for a compact or full-range symbol with `layers` data layers
    pub fn new(compact: bool, layers: usize) -> Self {
        // Not including reference grid lines
        let base_size = (if compact { 11 } else { 14 }) + layers * 4;
        let (matrix_size, alignment_map) = if compact {
            (base_size, (0..base_size).collect())
        } else {
            let matrix_size = base_size + 1 + 2 * ((base_size / 2 - 1) / 15);
            let orig_center = base_size / 2;
            let center = matrix_size / 2;
            let mut map = vec![0usize; base_size];
            for i in 0..orig_center {
                let new_offset = i + i / 15;
                map[orig_center - i - 1] = center - new_offset - 1;
                map[orig_center + i] = center + new_offset + 1;
            }
            (matrix_size, map)
        };
        Self {
            compact,
            layers,
            base_size,
            matrix_size,
            alignment_map,
        }
    }

    /// Side length of the whole symbol in modules
    pub fn matrix_size(&self) -> usize {
        self.matrix_size
    }

    /// Data-layer capacity in bits
    pub fn total_bits(&self) -> usize {
        total_bits_in_layers(self.layers, self.compact)
    }

    /// Visit every data module: `visit(bit_index, x, y)`
    pub fn walk(&self, mut visit: impl FnMut(usize, usize, usize)) {
        let map = &self.alignment_map;
        let mut row_offset = 0;
        for i in 0..self.layers {
            let row_size = (self.layers - i) * 4 + if self.compact { 9 } else { 12 };
            // Top-left corner of this layer is <low, low>, bottom-right <high, high>
            let low = i * 2;
            let high = self.base_size - 1 - low;
            for j in 0..row_size {
                let column_offset = j * 2;
                for k in 0..2 {
                    // left column
                    visit(row_offset + column_offset + k, map[low + k], map[low + j]);
                    // bottom row
                    visit(
                        row_offset + 2 * row_size + column_offset + k,
                        map[low + j],
                        map[high - k],
                    );
                    // right column
                    visit(
                        row_offset + 4 * row_size + column_offset + k,
                        map[high - k],
                        map[high - j],
                    );
                    // top row
                    visit(
                        row_offset + 6 * row_size + column_offset + k,
                        map[high - j],
                        map[low + k],
                    );
                }
            }
            row_offset += row_size * 8;
        }
    }

    /// Visit every mode-message module around the bullseye: `visit(bit_index, x, y)`
    pub fn walk_mode_message(&self, visit: impl FnMut(usize, usize, usize)) {
        walk_mode_message(self.matrix_size / 2, self.compact, visit);
    }

    /// Draw the bullseye, orientation marks and (full symbols) reference grid
    pub fn draw_finder(&self, matrix: &mut BitMatrix) {
        let center = self.matrix_size / 2;
        let size = if self.compact { 5 } else { 7 };
        for i in (0..size).step_by(2) {
            for j in center - i..=center + i {
                matrix.set(j, center - i, true);
                matrix.set(j, center + i, true);
                matrix.set(center - i, j, true);
                matrix.set(center + i, j, true);
            }
        }
        // Orientation marks
        matrix.set(center - size, center - size, true);
        matrix.set(center - size + 1, center - size, true);
        matrix.set(center - size, center - size + 1, true);
        matrix.set(center + size, center - size, true);
        matrix.set(center + size, center - size + 1, true);
        matrix.set(center + size, center + size - 1, true);

        if self.compact {
            return;
        }
        let mut i = 0;
        let mut j = 0;
        while i < self.base_size / 2 - 1 {
            let mut k = center & 1;
            while k < self.matrix_size {
                matrix.set(center - j, k, true);
                matrix.set(center + j, k, true);
                matrix.set(k, center - j, true);
                matrix.set(k, center + j, true);
                k += 2;
            }
            i += 15;
            j += 16;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_matrix_sizes() {
        assert_eq!(Layout::new(true, 1).matrix_size(), 15);
        assert_eq!(Layout::new(true, 4).matrix_size(), 27);
        assert_eq!(Layout::new(false, 1).matrix_size(), 19);
        assert_eq!(Layout::new(false, 4).matrix_size(), 31);
        assert_eq!(Layout::new(false, 32).matrix_size(), 151);
    }

    #[test]
    fn test_walk_covers_each_bit_once() {
        for (compact, layers) in [(true, 1), (true, 4), (false, 3), (false, 12)] {
            let layout = Layout::new(compact, layers);
            let mut indices = vec![0u8; layout.total_bits()];
            let mut cells = HashSet::new();
            layout.walk(|idx, x, y| {
                indices[idx] += 1;
                assert!(x < layout.matrix_size() && y < layout.matrix_size());
                assert!(cells.insert((x, y)), "module visited twice");
            });
            assert!(indices.iter().all(|&n| n == 1));
        }
    }

    #[test]
    fn test_walk_avoids_finder_and_grid() {
        let layout = Layout::new(false, 10);
        let mut finder = BitMatrix::square(layout.matrix_size());
        layout.draw_finder(&mut finder);
        let mut reserved = HashSet::new();
        layout.walk_mode_message(|_, x, y| {
            reserved.insert((x, y));
        });
        let center = layout.matrix_size() / 2;
        layout.walk(|_, x, y| {
            assert!(!reserved.contains(&(x, y)));
            // Reference grid lines sit at multiples of 16 from the centre
            assert_ne!(x.abs_diff(center) % 16, 0);
            assert_ne!(y.abs_diff(center) % 16, 0);
        });
    }

    #[test]
    fn test_word_sizes() {
        assert_eq!(word_size(1), 6);
        assert_eq!(word_size(2), 6);
        assert_eq!(word_size(3), 8);
        assert_eq!(word_size(8), 8);
        assert_eq!(word_size(9), 10);
        assert_eq!(word_size(22), 10);
        assert_eq!(word_size(23), 12);
    }
}
