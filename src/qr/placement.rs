//! Zig-zag data placement.
//!
//! Bits run in two-module columns from the bottom-right corner, alternating
//! upward and downward, skipping the vertical timing column and every
//! function module. The mask is applied as each bit is written.

use super::function_mask::FunctionMask;
use super::mask::MaskPattern;
use crate::models::BitMatrix;

/// Data module coordinates `(x, y)` in placement order
pub fn data_positions(function: &FunctionMask) -> Vec<(usize, usize)> {
    let size = function.size();
    let mut positions = Vec::with_capacity(function.data_modules_count());
    let mut upward = true;
    let mut x = size as isize - 1;
    while x > 0 {
        if x == 6 {
            x -= 1;
        }
        for step in 0..size {
            let y = if upward { size - 1 - step } else { step };
            for dx in 0..2 {
                let xx = x as usize - dx;
                if !function.is_function(xx, y) {
                    positions.push((xx, y));
                }
            }
        }
        upward = !upward;
        x -= 2;
    }
    positions
}

/// Write `bits` into the data modules under `mask`; missing bits are light
pub fn place_data(matrix: &mut BitMatrix, function: &FunctionMask, bits: &[bool], mask: MaskPattern) {
    for (i, (x, y)) in data_positions(function).into_iter().enumerate() {
        let bit = bits.get(i).copied().unwrap_or(false);
        matrix.set(x, y, bit ^ mask.is_masked(y, x));
    }
}

/// Read the data modules back, removing `mask`
pub fn read_data(matrix: &BitMatrix, function: &FunctionMask, mask: MaskPattern) -> Vec<bool> {
    data_positions(function)
        .into_iter()
        .map(|(x, y)| matrix.get(x, y) ^ mask.is_masked(y, x))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_order() {
        let function = FunctionMask::new(1);
        let positions = data_positions(&function);
        assert_eq!(positions.len(), 208);
        // Bottom-right pair first, then up the column
        assert_eq!(&positions[..4], &[(20, 20), (19, 20), (20, 19), (19, 19)]);
        // The timing column never holds data
        assert!(positions.iter().all(|&(x, _)| x != 6));
    }

    #[test]
    fn test_mask_applied_on_write() {
        let function = FunctionMask::new(1);
        let mut matrix = BitMatrix::square(21);
        place_data(&mut matrix, &function, &[], MaskPattern::Pattern1);
        // Row 20 is even, so every data module there is inverted
        assert!(matrix.get(20, 20));
        assert!(!matrix.get(20, 19));
        assert!(read_data(&matrix, &function, MaskPattern::Pattern1).iter().all(|&b| !b));
    }
}
