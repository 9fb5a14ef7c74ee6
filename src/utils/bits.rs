//! Sequential bit reading and writing, most-significant bit first.

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy)]
enum Source<'a> {
    Bits(&'a [bool]),
    Bytes(&'a [u8]),
}

/// Read-only cursor over caller-owned bits
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    source: Source<'a>,
    len: usize,
    position: usize,
}

impl<'a> BitReader<'a> {
    /// Cursor over a slice of individual bits
    pub fn new(bits: &'a [bool]) -> Self {
        Self {
            source: Source::Bits(bits),
            len: bits.len(),
            position: 0,
        }
    }

    /// Cursor over bytes, each read MSB first
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        Self {
            source: Source::Bytes(bytes),
            len: bytes.len() * 8,
            position: 0,
        }
    }

    fn bit(&self, index: usize) -> bool {
        match self.source {
            Source::Bits(bits) => bits[index],
            Source::Bytes(bytes) => (bytes[index / 8] >> (7 - index % 8)) & 1 == 1,
        }
    }

    /// Consume the next `n` bits (n <= 32) as an unsigned integer
    pub fn read_bits(&mut self, n: usize) -> Result<u32> {
        debug_assert!(n <= 32, "read_bits supports at most 32 bits");
        if n > self.available() {
            return Err(Error::InsufficientData {
                requested: n,
                available: self.available(),
            });
        }
        let mut value = 0u32;
        for i in 0..n {
            value = (value << 1) | self.bit(self.position + i) as u32;
        }
        self.position += n;
        Ok(value)
    }

    /// Bits left to read
    pub fn available(&self) -> usize {
        self.len - self.position
    }

    /// Bits consumed so far
    pub fn position(&self) -> usize {
        self.position
    }

    /// Offset of the cursor inside the current byte (0-7)
    pub fn bit_offset(&self) -> usize {
        self.position % 8
    }

    /// Index of the byte the cursor is in
    pub fn byte_offset(&self) -> usize {
        self.position / 8
    }
}

/// Append-only bit buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitWriter {
    bits: Vec<bool>,
}

impl BitWriter {
    /// Empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty buffer with room for `bits` bits
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bits: Vec::with_capacity(bits),
        }
    }

    /// Append the low `n` bits of `value`, MSB first
    pub fn append_bits(&mut self, value: u32, n: usize) {
        debug_assert!(n <= 32, "append_bits supports at most 32 bits");
        for i in (0..n).rev() {
            self.bits.push((value >> i) & 1 == 1);
        }
    }

    /// Append a single bit
    pub fn append_bit(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    /// Append every bit of another buffer
    pub fn append_writer(&mut self, other: &BitWriter) {
        self.bits.extend_from_slice(&other.bits);
    }

    /// Number of bits written
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// True when nothing has been written
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Bit at `index`; positions past the end read as `false`
    pub fn get(&self, index: usize) -> bool {
        self.bits.get(index).copied().unwrap_or(false)
    }

    /// Borrow the written bits
    pub fn as_bits(&self) -> &[bool] {
        &self.bits
    }

    /// Take ownership of the written bits
    pub fn into_bits(self) -> Vec<bool> {
        self.bits
    }

    /// Pack into bytes MSB first; a short final byte is zero padded
    pub fn to_bytes(&self) -> Vec<u8> {
        pack_bits(&self.bits)
    }
}

/// Pack bits into bytes MSB first, zero padding the final byte
pub fn pack_bits(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, &b)| acc | ((b as u8) << (7 - i)))
        })
        .collect()
}

/// Read `length` bits starting at `start` as an unsigned integer
pub fn read_code(bits: &[bool], start: usize, length: usize) -> u32 {
    bits[start..start + length]
        .iter()
        .fold(0u32, |acc, &b| (acc << 1) | b as u32)
}
