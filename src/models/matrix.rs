use std::fmt;

/// Compact module matrix (true = dark module)
///
/// Coordinates are `(x, y)` = `(column, row)` with the origin at the top-left
/// module. Reads outside the matrix return `false`; writes outside it are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl BitMatrix {
    /// Create a new, all-light bit matrix with given dimensions
    pub fn new(width: usize, height: usize) -> Self {
        let bytes_needed = (width * height).div_ceil(8);
        Self {
            width,
            height,
            data: vec![0; bytes_needed],
        }
    }

    /// Create a square matrix
    pub fn square(size: usize) -> Self {
        Self::new(size, size)
    }

    /// Build a matrix from row-major boolean rows. Rows must share one length.
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> Self {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut matrix = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, &bit) in row.as_ref().iter().enumerate().take(width) {
                matrix.set(x, y, bit);
            }
        }
        matrix
    }

    /// Get matrix width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get matrix height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get bit at (x, y)
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = y * self.width + x;
        (self.data[index / 8] >> (index % 8)) & 1 == 1
    }

    /// Set bit at (x, y)
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y * self.width + x;
        if value {
            self.data[index / 8] |= 1 << (index % 8);
        } else {
            self.data[index / 8] &= !(1 << (index % 8));
        }
    }

    /// Toggle bit at (x, y)
    pub fn toggle(&mut self, x: usize, y: usize) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y * self.width + x;
        self.data[index / 8] ^= 1 << (index % 8);
    }

    /// Darken a `width` x `height` rectangle whose top-left corner is (left, top)
    pub fn set_region(&mut self, left: usize, top: usize, width: usize, height: usize) {
        for y in top..(top + height).min(self.height) {
            for x in left..(left + width).min(self.width) {
                self.set(x, y, true);
            }
        }
    }

    /// Clear all bits to 0
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Number of dark modules
    pub fn count_dark(&self) -> usize {
        let mut count = 0;
        for y in 0..self.height {
            for x in 0..self.width {
                count += self.get(x, y) as usize;
            }
        }
        count
    }

    /// One row as a vector of bits
    pub fn row(&self, y: usize) -> Vec<bool> {
        (0..self.width).map(|x| self.get(x, y)).collect()
    }

    /// Get raw data as bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Scale to a requested output size.
    ///
    /// Each module becomes an integral `multiple` x `multiple` block, centred
    /// in the output. When the request is smaller than the natural size in
    /// either direction the natural-size matrix is returned unpadded.
    pub fn scale_to(&self, req_width: usize, req_height: usize) -> BitMatrix {
        if self.width == 0 || self.height == 0 {
            return self.clone();
        }
        if req_width < self.width || req_height < self.height {
            return self.clone();
        }
        let multiple = (req_width / self.width).min(req_height / self.height);
        let left = (req_width - self.width * multiple) / 2;
        let top = (req_height - self.height * multiple) / 2;

        let mut output = BitMatrix::new(req_width, req_height);
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) {
                    output.set_region(left + x * multiple, top + y * multiple, multiple, multiple);
                }
            }
        }
        output
    }
}

impl Default for BitMatrix {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl fmt::Display for BitMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                f.write_str(if self.get(x, y) { "X " } else { "  " })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_matrix() {
        let mut matrix = BitMatrix::new(8, 8);
        assert_eq!(matrix.width(), 8);
        assert_eq!(matrix.height(), 8);

        matrix.set(3, 4, true);
        assert!(matrix.get(3, 4));
        assert!(!matrix.get(3, 3));

        matrix.toggle(3, 4);
        assert!(!matrix.get(3, 4));

        matrix.set(1, 1, true);
        matrix.clear();
        assert!(!matrix.get(1, 1));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut matrix = BitMatrix::new(8, 8);
        matrix.set(10, 10, true); // Should not panic
        assert!(!matrix.get(10, 10));
    }

    #[test]
    fn test_from_rows_and_count() {
        let m = BitMatrix::from_rows(&[[true, false, true], [false, false, true]]);
        assert_eq!(m.width(), 3);
        assert_eq!(m.height(), 2);
        assert!(m.get(2, 1));
        assert!(!m.get(0, 1));
        assert_eq!(m.count_dark(), 3);
        assert_eq!(m.row(0), vec![true, false, true]);
    }

    #[test]
    fn test_scale_to_centres_modules() {
        let m = BitMatrix::from_rows(&[[true, false], [false, true]]);
        let scaled = m.scale_to(7, 6);
        assert_eq!(scaled.width(), 7);
        assert_eq!(scaled.height(), 6);
        // multiple = min(7/2, 6/2) = 3, left padding 0, top padding 0
        assert!(scaled.get(0, 0) && scaled.get(2, 2));
        assert!(!scaled.get(3, 0));
        assert!(scaled.get(3, 3) && scaled.get(5, 5));
        assert!(!scaled.get(6, 5));
    }

    #[test]
    fn test_scale_to_smaller_request_keeps_natural_size() {
        let m = BitMatrix::square(10);
        let scaled = m.scale_to(4, 40);
        assert_eq!((scaled.width(), scaled.height()), (10, 10));
    }
}
