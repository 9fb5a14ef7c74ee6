use crate::models::BitMatrix;

/// Function module mask for a specific QR version.
/// true = function module (not data), false = data module.
pub struct FunctionMask {
    mask: BitMatrix,
    version: u8,
}

impl FunctionMask {
    /// Mask for `version` (1..=40)
    pub fn new(version: u8) -> Self {
        let size = symbol_size(version);
        let mut mask = BitMatrix::new(size, size);

        // Finder patterns + separators (8x8 areas, clipped to bounds)
        Self::mark_finder_area(&mut mask, 0, 0);
        Self::mark_finder_area(&mut mask, size - 7, 0);
        Self::mark_finder_area(&mut mask, 0, size - 7);

        // Timing patterns (row 6 and column 6)
        for i in 0..size {
            mask.set(6, i, true);
            mask.set(i, 6, true);
        }

        for (cx, cy) in alignment_pattern_centers(version) {
            mask.set_region(cx - 2, cy - 2, 5, 5);
        }

        // Format info areas
        for i in 0..9 {
            mask.set(8, i, true);
            mask.set(i, 8, true);
        }
        for i in 0..8 {
            mask.set(size - 1 - i, 8, true);
            mask.set(8, size - 1 - i, true);
        }

        // Version info (v7+): 3x6 above the bottom-left finder, 6x3 left
        // of the top-right one
        if version >= 7 {
            for i in 0..6 {
                for j in 0..3 {
                    mask.set(size - 11 + j, i, true);
                    mask.set(i, size - 11 + j, true);
                }
            }
        }

        Self { mask, version }
    }

    /// Side length in modules
    pub fn size(&self) -> usize {
        self.mask.width()
    }

    /// QR version
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Whether (x, y) is reserved for a function pattern
    pub fn is_function(&self, x: usize, y: usize) -> bool {
        self.mask.get(x, y)
    }

    /// Modules left for data and EC bits
    pub fn data_modules_count(&self) -> usize {
        let size = self.size();
        size * size - self.mask.count_dark()
    }

    fn mark_finder_area(mask: &mut BitMatrix, x: usize, y: usize) {
        let size = mask.width();
        let start_x = x.saturating_sub(1);
        let start_y = y.saturating_sub(1);
        let end_x = (x + 8).min(size);
        let end_y = (y + 8).min(size);
        mask.set_region(start_x, start_y, end_x - start_x, end_y - start_y);
    }
}

/// Side length in modules
pub fn symbol_size(version: u8) -> usize {
    17 + 4 * version as usize
}

/// Alignment pattern centers for a given version.
pub fn alignment_pattern_positions(version: u8) -> Vec<usize> {
    if version == 1 {
        return Vec::new();
    }
    let num_align = (version as usize / 7) + 2;
    let size = symbol_size(version);
    let step = if version == 32 {
        26
    } else {
        (version as usize * 4 + num_align * 2 + 1) / (num_align * 2 - 2) * 2
    };

    let mut positions = vec![0usize; num_align];
    positions[0] = 6;
    let mut pos = size - 7;
    for i in (1..num_align).rev() {
        positions[i] = pos;
        pos = pos.saturating_sub(step);
    }
    positions
}

/// Every alignment pattern center, skipping the three that would overlap a
/// finder pattern
pub fn alignment_pattern_centers(version: u8) -> Vec<(usize, usize)> {
    let size = symbol_size(version);
    let align = alignment_pattern_positions(version);
    let mut centers = Vec::with_capacity(align.len() * align.len());
    for &cy in &align {
        for &cx in &align {
            let in_tl = cx <= 8 && cy <= 8;
            let in_tr = cx >= size - 9 && cy <= 8;
            let in_bl = cx <= 8 && cy >= size - 9;
            if !(in_tl || in_tr || in_bl) {
                centers.push((cx, cy));
            }
        }
    }
    centers
}

/// Dark modules of every function pattern except format and version info:
/// finders, timing, alignment patterns and the dark module
pub fn draw_function_patterns(version: u8) -> BitMatrix {
    let size = symbol_size(version);
    let mut matrix = BitMatrix::new(size, size);

    for (x, y) in [(0, 0), (size - 7, 0), (0, size - 7)] {
        matrix.set_region(x, y, 7, 7);
        for i in 1..6 {
            matrix.set(x + i, y + 1, false);
            matrix.set(x + i, y + 5, false);
            matrix.set(x + 1, y + i, false);
            matrix.set(x + 5, y + i, false);
        }
    }

    for i in (8..size - 8).step_by(2) {
        matrix.set(i, 6, true);
        matrix.set(6, i, true);
    }

    for (cx, cy) in alignment_pattern_centers(version) {
        matrix.set_region(cx - 2, cy - 2, 5, 5);
        for i in 0..3 {
            matrix.set(cx - 1 + i, cy - 1, false);
            matrix.set(cx - 1 + i, cy + 1, false);
        }
        matrix.set(cx - 1, cy, false);
        matrix.set(cx + 1, cy, false);
    }

    matrix.set(8, size - 8, true);
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_positions() {
        assert!(alignment_pattern_positions(1).is_empty());
        assert_eq!(alignment_pattern_positions(2), vec![6, 18]);
        assert_eq!(alignment_pattern_positions(7), vec![6, 22, 38]);
        assert_eq!(alignment_pattern_positions(32), vec![6, 34, 60, 86, 112, 138]);
        assert_eq!(alignment_pattern_positions(36), vec![6, 24, 50, 76, 102, 128, 154]);
        assert_eq!(alignment_pattern_centers(7).len(), 6);
    }

    #[test]
    fn test_data_module_counts() {
        // 26 codewords, no remainder
        assert_eq!(FunctionMask::new(1).data_modules_count(), 208);
        // 44 codewords + 7 remainder bits
        assert_eq!(FunctionMask::new(2).data_modules_count(), 359);
        // 196 codewords, version info present
        assert_eq!(FunctionMask::new(7).data_modules_count(), 1568);
        // 3706 codewords + 0 remainder bits
        assert_eq!(FunctionMask::new(40).data_modules_count(), 29648);
    }

    #[test]
    fn test_function_patterns() {
        let m = draw_function_patterns(1);
        // Finder ring and centre
        assert!(m.get(0, 0) && !m.get(1, 1) && m.get(3, 3));
        // Timing alternates
        assert!(m.get(8, 6) && !m.get(9, 6) && m.get(10, 6));
        // Dark module
        assert!(m.get(8, 13));
        let m = draw_function_patterns(2);
        assert!(m.get(18, 18) && !m.get(17, 18) && m.get(16, 18));
    }
}
