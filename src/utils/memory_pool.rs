//! Reusable scratch buffers for decode calls
//!
//! Provides pre-allocated storage for:
//! - Raw bit sequences read from a module matrix
//! - Codeword arrays handed to the Reed-Solomon stage
//!
//! Buffers are lent to one call at a time through `&mut`; anything a decoder
//! returns is copied out, so results never alias pool storage.

/// Scratch storage that survives between decode calls
pub struct BufferPool {
    bits: Vec<bool>,
    codewords: Vec<u32>,
}

impl BufferPool {
    /// Create a new buffer pool sized for the largest Aztec symbol
    pub fn new() -> Self {
        // 32-layer full-range Aztec carries 19,968 data bits
        Self::with_capacity(19_968)
    }

    /// Create a pool with custom bit capacity
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bits: Vec::with_capacity(bits),
            codewords: Vec::with_capacity(bits / 6 + 1),
        }
    }

    /// Get a zeroed bit buffer of the required length (reuses capacity)
    pub fn bit_buffer(&mut self, len: usize) -> &mut [bool] {
        self.bits.clear();
        self.bits.resize(len, false);
        &mut self.bits[..len]
    }

    /// Get a zeroed codeword buffer of the required length (reuses capacity)
    pub fn codeword_buffer(&mut self, len: usize) -> &mut [u32] {
        self.codewords.clear();
        self.codewords.resize(len, 0);
        &mut self.codewords[..len]
    }

    /// Borrow both buffers at once
    pub fn split(&mut self, bits: usize, codewords: usize) -> (&mut [bool], &mut [u32]) {
        self.bits.clear();
        self.bits.resize(bits, false);
        self.codewords.clear();
        self.codewords.resize(codewords, 0);
        (&mut self.bits[..bits], &mut self.codewords[..codewords])
    }

    /// Current bit capacity
    pub fn bit_capacity(&self) -> usize {
        self.bits.capacity()
    }

    /// Clear all buffers (resets lengths but keeps capacity)
    pub fn clear(&mut self) {
        self.bits.clear();
        self.codewords.clear();
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}
