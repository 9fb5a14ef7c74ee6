//! ECC 200 symbol sizes.

use crate::error::{Error, Result};

/// Shape constraint for symbol selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymbolShape {
    /// Square or rectangular, whichever is smallest
    #[default]
    Any,
    /// Square sizes only
    Square,
    /// Rectangular sizes only
    Rectangle,
}

/// One production symbol size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolInfo {
    /// Rectangular rather than square
    pub rectangular: bool,
    /// Data codewords the symbol holds
    pub data_capacity: usize,
    /// Total Reed-Solomon check codewords across all blocks
    pub error_codewords: usize,
    /// Data-region width in modules, borders excluded
    pub matrix_width: usize,
    /// Data-region height in modules, borders excluded
    pub matrix_height: usize,
    /// Number of data regions (1, 2, 4, 16 or 36)
    pub data_regions: usize,
    rs_block_data: usize,
    rs_block_error: usize,
}

const fn info(
    rectangular: bool,
    data_capacity: usize,
    error_codewords: usize,
    matrix_width: usize,
    matrix_height: usize,
    data_regions: usize,
) -> SymbolInfo {
    interleaved(
        rectangular,
        data_capacity,
        error_codewords,
        matrix_width,
        matrix_height,
        data_regions,
        data_capacity,
        error_codewords,
    )
}

#[allow(clippy::too_many_arguments)]
const fn interleaved(
    rectangular: bool,
    data_capacity: usize,
    error_codewords: usize,
    matrix_width: usize,
    matrix_height: usize,
    data_regions: usize,
    rs_block_data: usize,
    rs_block_error: usize,
) -> SymbolInfo {
    SymbolInfo {
        rectangular,
        data_capacity,
        error_codewords,
        matrix_width,
        matrix_height,
        data_regions,
        rs_block_data,
        rs_block_error,
    }
}

/// Production sizes in ascending capacity order
pub const SYMBOLS: [SymbolInfo; 30] = [
    info(false, 3, 5, 8, 8, 1),
    info(false, 5, 7, 10, 10, 1),
    info(true, 5, 7, 16, 6, 1),
    info(false, 8, 10, 12, 12, 1),
    info(true, 10, 11, 14, 6, 2),
    info(false, 12, 12, 14, 14, 1),
    info(true, 16, 14, 24, 10, 1),
    info(false, 18, 14, 16, 16, 1),
    info(false, 22, 18, 18, 18, 1),
    info(true, 22, 18, 16, 10, 2),
    info(false, 30, 20, 20, 20, 1),
    info(true, 32, 24, 16, 14, 2),
    info(false, 36, 24, 22, 22, 1),
    info(false, 44, 28, 24, 24, 1),
    info(true, 49, 28, 22, 14, 2),
    info(false, 62, 36, 14, 14, 4),
    info(false, 86, 42, 16, 16, 4),
    info(false, 114, 48, 18, 18, 4),
    info(false, 144, 56, 20, 20, 4),
    info(false, 174, 68, 22, 22, 4),
    interleaved(false, 204, 84, 24, 24, 4, 102, 42),
    interleaved(false, 280, 112, 14, 14, 16, 140, 56),
    interleaved(false, 368, 144, 16, 16, 16, 92, 36),
    interleaved(false, 456, 192, 18, 18, 16, 114, 48),
    interleaved(false, 576, 224, 20, 20, 16, 144, 56),
    interleaved(false, 696, 272, 22, 22, 16, 174, 68),
    interleaved(false, 816, 336, 24, 24, 16, 136, 56),
    interleaved(false, 1050, 408, 18, 18, 36, 175, 68),
    interleaved(false, 1304, 496, 20, 20, 36, 163, 62),
    // 144x144: ten blocks, the first eight carry 156 data words, the last two 155
    interleaved(false, 1558, 620, 22, 22, 36, 0, 62),
];

impl SymbolInfo {
    fn is_144(&self) -> bool {
        self.data_capacity == 1558
    }

    /// Data regions across
    pub fn horizontal_data_regions(&self) -> usize {
        match self.data_regions {
            1 => 1,
            2 | 4 => 2,
            16 => 4,
            _ => 6,
        }
    }

    /// Data regions down
    pub fn vertical_data_regions(&self) -> usize {
        match self.data_regions {
            1 | 2 => 1,
            4 => 2,
            16 => 4,
            _ => 6,
        }
    }

    /// Width of the placement area (all data regions, no borders)
    pub fn symbol_data_width(&self) -> usize {
        self.horizontal_data_regions() * self.matrix_width
    }

    /// Height of the placement area
    pub fn symbol_data_height(&self) -> usize {
        self.vertical_data_regions() * self.matrix_height
    }

    /// Full symbol width including finder and timing borders
    pub fn symbol_width(&self) -> usize {
        self.symbol_data_width() + self.horizontal_data_regions() * 2
    }

    /// Full symbol height including borders
    pub fn symbol_height(&self) -> usize {
        self.symbol_data_height() + self.vertical_data_regions() * 2
    }

    /// Data plus error codewords
    pub fn total_codewords(&self) -> usize {
        self.data_capacity + self.error_codewords
    }

    /// Reed-Solomon blocks the codewords are interleaved over
    pub fn interleaved_block_count(&self) -> usize {
        if self.is_144() {
            10
        } else {
            self.data_capacity / self.rs_block_data
        }
    }

    /// Data words in block `index` (zero-based)
    pub fn data_length_for_block(&self, index: usize) -> usize {
        if self.is_144() {
            if index < 8 { 156 } else { 155 }
        } else {
            self.rs_block_data
        }
    }

    /// Error words in every block
    pub fn error_length_for_block(&self) -> usize {
        self.rs_block_error
    }

    /// Smallest symbol that holds `data_codewords` within the constraints
    pub fn lookup(
        data_codewords: usize,
        shape: SymbolShape,
        min_size: Option<(usize, usize)>,
        max_size: Option<(usize, usize)>,
    ) -> Result<&'static SymbolInfo> {
        SYMBOLS
            .iter()
            .filter(|s| match shape {
                SymbolShape::Square => !s.rectangular,
                SymbolShape::Rectangle => s.rectangular,
                SymbolShape::Any => true,
            })
            .filter(|s| min_size.is_none_or(|(w, h)| s.symbol_width() >= w && s.symbol_height() >= h))
            .filter(|s| max_size.is_none_or(|(w, h)| s.symbol_width() <= w && s.symbol_height() <= h))
            .find(|s| data_codewords <= s.data_capacity)
            .ok_or_else(|| {
                Error::invalid(format!(
                    "can't find a symbol arrangement that matches the message, data codewords: {data_codewords}"
                ))
            })
    }

    /// Symbol whose full dimensions are `width` x `height`
    pub fn for_dimensions(width: usize, height: usize) -> Option<&'static SymbolInfo> {
        SYMBOLS
            .iter()
            .find(|s| s.symbol_width() == width && s.symbol_height() == height)
    }
}
