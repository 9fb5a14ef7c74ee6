//! ECC 200 module placement.
//!
//! Codewords are laid into the data area along diagonal sweeps, each codeword
//! occupying a "utah"-shaped group of eight modules, with four special corner
//! shapes where the sweep meets the symbol edge. The walk depends only on the
//! data-area dimensions, so it is computed once and used to both place and
//! read codewords. Border modules are added and stripped separately.

use super::symbol_info::SymbolInfo;
use crate::models::BitMatrix;

/// Module positions `(row, col)` of each codeword, most significant bit first
#[derive(Debug, Clone)]
pub struct Placement {
    num_rows: usize,
    num_cols: usize,
    positions: Vec<[(usize, usize); 8]>,
    /// Lower-right 2x2 corner untouched by the walk
    fixed_corner: bool,
}

struct Walker {
    num_rows: isize,
    num_cols: isize,
    used: Vec<bool>,
    positions: Vec<[(usize, usize); 8]>,
}

impl Walker {
    fn cell(&self, mut row: isize, mut col: isize) -> (usize, usize) {
        if row < 0 {
            row += self.num_rows;
            col += 4 - ((self.num_rows + 4) % 8);
        }
        if col < 0 {
            col += self.num_cols;
            row += 4 - ((self.num_cols + 4) % 8);
        }
        (row as usize, col as usize)
    }

    fn no_bit(&self, row: isize, col: isize) -> bool {
        if row < 0 || col < 0 || row >= self.num_rows || col >= self.num_cols {
            return false;
        }
        !self.used[(row * self.num_cols + col) as usize]
    }

    fn codeword(&mut self, cells: [(isize, isize); 8]) {
        let mut out = [(0, 0); 8];
        for (slot, (r, c)) in out.iter_mut().zip(cells) {
            let (row, col) = self.cell(r, c);
            self.used[row * self.num_cols as usize + col] = true;
            *slot = (row, col);
        }
        self.positions.push(out);
    }

    fn utah(&mut self, row: isize, col: isize) {
        self.codeword([
            (row - 2, col - 2),
            (row - 2, col - 1),
            (row - 1, col - 2),
            (row - 1, col - 1),
            (row - 1, col),
            (row, col - 2),
            (row, col - 1),
            (row, col),
        ]);
    }

    fn corner1(&mut self) {
        let (r, c) = (self.num_rows, self.num_cols);
        self.codeword([
            (r - 1, 0),
            (r - 1, 1),
            (r - 1, 2),
            (0, c - 2),
            (0, c - 1),
            (1, c - 1),
            (2, c - 1),
            (3, c - 1),
        ]);
    }

    fn corner2(&mut self) {
        let (r, c) = (self.num_rows, self.num_cols);
        self.codeword([
            (r - 3, 0),
            (r - 2, 0),
            (r - 1, 0),
            (0, c - 4),
            (0, c - 3),
            (0, c - 2),
            (0, c - 1),
            (1, c - 1),
        ]);
    }

    fn corner3(&mut self) {
        let (r, c) = (self.num_rows, self.num_cols);
        self.codeword([
            (r - 3, 0),
            (r - 2, 0),
            (r - 1, 0),
            (0, c - 2),
            (0, c - 1),
            (1, c - 1),
            (2, c - 1),
            (3, c - 1),
        ]);
    }

    fn corner4(&mut self) {
        let (r, c) = (self.num_rows, self.num_cols);
        self.codeword([
            (r - 1, 0),
            (r - 1, c - 1),
            (0, c - 3),
            (0, c - 2),
            (0, c - 1),
            (1, c - 3),
            (1, c - 2),
            (1, c - 1),
        ]);
    }
}

impl Placement {
    /// Walk a data area of `num_cols` x `num_rows` modules
    pub fn new(num_cols: usize, num_rows: usize) -> Self {
        let mut w = Walker {
            num_rows: num_rows as isize,
            num_cols: num_cols as isize,
            used: vec![false; num_rows * num_cols],
            positions: Vec::new(),
        };
        let (nr, nc) = (w.num_rows, w.num_cols);
        let mut row: isize = 4;
        let mut col: isize = 0;
        loop {
            // Corner cases first
            if row == nr && col == 0 {
                w.corner1();
            }
            if row == nr - 2 && col == 0 && nc % 4 != 0 {
                w.corner2();
            }
            if row == nr - 2 && col == 0 && nc % 8 == 4 {
                w.corner3();
            }
            if row == nr + 4 && col == 2 && nc % 8 == 0 {
                w.corner4();
            }
            // Sweep upward diagonally
            loop {
                if row < nr && col >= 0 && w.no_bit(row, col) {
                    w.utah(row, col);
                }
                row -= 2;
                col += 2;
                if !(row >= 0 && col < nc) {
                    break;
                }
            }
            row += 1;
            col += 3;
            // Then downward
            loop {
                if row >= 0 && col < nc && w.no_bit(row, col) {
                    w.utah(row, col);
                }
                row += 2;
                col -= 2;
                if !(row < nr && col >= 0) {
                    break;
                }
            }
            row += 3;
            col += 1;
            if !(row < nr || col < nc) {
                break;
            }
        }
        let fixed_corner = !w.used[num_rows * num_cols - 1];
        Self {
            num_rows,
            num_cols,
            positions: w.positions,
            fixed_corner,
        }
    }

    /// Number of codewords the area holds
    pub fn capacity(&self) -> usize {
        self.positions.len()
    }

    /// Lay `codewords` into a fresh data-area matrix
    pub fn place(&self, codewords: &[u8]) -> BitMatrix {
        let mut area = BitMatrix::new(self.num_cols, self.num_rows);
        for (cells, &cw) in self.positions.iter().zip(codewords) {
            for (bit, &(row, col)) in cells.iter().enumerate() {
                area.set(col, row, cw & (0x80 >> bit) != 0);
            }
        }
        if self.fixed_corner {
            area.set(self.num_cols - 1, self.num_rows - 1, true);
            area.set(self.num_cols - 2, self.num_rows - 2, true);
        }
        area
    }

    /// Read every codeword back out of a data-area matrix
    pub fn read(&self, area: &BitMatrix, out: &mut [u32]) {
        for (cells, slot) in self.positions.iter().zip(out.iter_mut()) {
            *slot = cells
                .iter()
                .fold(0u32, |acc, &(row, col)| (acc << 1) | area.get(col, row) as u32);
        }
    }
}

/// Wrap a data area with finder (solid left/bottom) and timing (alternating
/// top/right) borders around every data region
pub fn add_borders(area: &BitMatrix, info: &SymbolInfo) -> BitMatrix {
    let mut matrix = BitMatrix::new(info.symbol_width(), info.symbol_height());
    let mut matrix_y = 0;
    for y in 0..info.symbol_data_height() {
        if y % info.matrix_height == 0 {
            for x in 0..info.symbol_width() {
                matrix.set(x, matrix_y, x % 2 == 0);
            }
            matrix_y += 1;
        }
        let mut matrix_x = 0;
        for x in 0..info.symbol_data_width() {
            if x % info.matrix_width == 0 {
                matrix.set(matrix_x, matrix_y, true);
                matrix_x += 1;
            }
            matrix.set(matrix_x, matrix_y, area.get(x, y));
            matrix_x += 1;
            if x % info.matrix_width == info.matrix_width - 1 {
                matrix.set(matrix_x, matrix_y, y % 2 == 0);
                matrix_x += 1;
            }
        }
        matrix_y += 1;
        if y % info.matrix_height == info.matrix_height - 1 {
            for x in 0..info.symbol_width() {
                matrix.set(x, matrix_y, true);
            }
            matrix_y += 1;
        }
    }
    matrix
}

/// Strip the borders of every data region, leaving the bare data area
pub fn extract_data_region(matrix: &BitMatrix, info: &SymbolInfo) -> BitMatrix {
    let region_rows = info.matrix_height;
    let region_cols = info.matrix_width;
    let mut area = BitMatrix::new(info.symbol_data_width(), info.symbol_data_height());
    for region_row in 0..info.vertical_data_regions() {
        for region_col in 0..info.horizontal_data_regions() {
            for i in 0..region_rows {
                let read_row = region_row * (region_rows + 2) + 1 + i;
                let write_row = region_row * region_rows + i;
                for j in 0..region_cols {
                    let read_col = region_col * (region_cols + 2) + 1 + j;
                    if matrix.get(read_col, read_row) {
                        area.set(region_col * region_cols + j, write_row, true);
                    }
                }
            }
        }
    }
    area
}
