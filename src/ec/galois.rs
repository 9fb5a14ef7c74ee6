//! Finite fields for Reed-Solomon arithmetic.
//!
//! Binary fields GF(2^m) are generated from a primitive polynomial; the prime
//! field GF(929) used by PDF417 is generated from the primitive element 3.
//! Both share the same log/antilog representation, so multiplication,
//! inversion and exponentiation are identical table lookups; only addition
//! differs (XOR versus modular addition).

use std::sync::OnceLock;

/// A finite field with precomputed log/antilog tables
#[derive(Debug)]
pub struct GaloisField {
    size: usize,
    modulus: u32,
    generator_base: usize,
    prime: bool,
    exp: Vec<u32>,
    log: Vec<u32>,
}

impl GaloisField {
    /// GF(2^m) with `size` = 2^m elements and the given primitive polynomial
    pub fn binary(primitive: u32, size: usize, generator_base: usize) -> Self {
        assert!(size.is_power_of_two() && size >= 4, "binary field size must be 2^m");
        let mut exp = vec![0u32; size];
        let mut log = vec![0u32; size];
        let mut x = 1u32;
        for e in exp.iter_mut() {
            *e = x;
            x <<= 1;
            if x as usize >= size {
                x ^= primitive;
                x &= (size - 1) as u32;
            }
        }
        for (i, &e) in exp.iter().enumerate().take(size - 1) {
            log[e as usize] = i as u32;
        }
        Self {
            size,
            modulus: primitive,
            generator_base,
            prime: false,
            exp,
            log,
        }
    }

    /// GF(p) for prime `modulus`, generated by the primitive element `generator`
    pub fn prime(modulus: u32, generator: u32, generator_base: usize) -> Self {
        let size = modulus as usize;
        let mut exp = vec![0u32; size];
        let mut log = vec![0u32; size];
        let mut x = 1u32;
        for e in exp.iter_mut() {
            *e = x;
            x = (x * generator) % modulus;
        }
        for (i, &e) in exp.iter().enumerate().take(size - 1) {
            log[e as usize] = i as u32;
        }
        Self {
            size,
            modulus,
            generator_base,
            prime: true,
            exp,
            log,
        }
    }

    /// Number of elements
    pub fn size(&self) -> usize {
        self.size
    }

    /// Exponent of the first generator-polynomial root (alpha^base)
    pub fn generator_base(&self) -> usize {
        self.generator_base
    }

    /// True when `value` is an element of this field
    pub fn contains(&self, value: u32) -> bool {
        (value as usize) < self.size
    }

    /// Field addition (XOR in characteristic 2)
    pub fn add(&self, a: u32, b: u32) -> u32 {
        if self.prime {
            (a + b) % self.modulus
        } else {
            a ^ b
        }
    }

    /// Field subtraction
    pub fn sub(&self, a: u32, b: u32) -> u32 {
        if self.prime {
            (self.modulus + a - b) % self.modulus
        } else {
            a ^ b
        }
    }

    /// Additive inverse
    pub fn negate(&self, a: u32) -> u32 {
        self.sub(0, a)
    }

    /// Field multiplication via log/antilog tables
    pub fn mul(&self, a: u32, b: u32) -> u32 {
        if a == 0 || b == 0 {
            return 0;
        }
        let order = self.size - 1;
        self.exp[(self.log[a as usize] as usize + self.log[b as usize] as usize) % order]
    }

    /// Multiply by a small integer (repeated addition)
    pub fn mul_int(&self, n: usize, a: u32) -> u32 {
        if self.prime {
            ((n % self.size) as u64 * a as u64 % self.modulus as u64) as u32
        } else if n % 2 == 1 {
            a
        } else {
            0
        }
    }

    /// Multiplicative inverse; zero has none
    pub fn inverse(&self, a: u32) -> u32 {
        assert!(a != 0, "zero has no multiplicative inverse");
        let order = self.size - 1;
        self.exp[(order - self.log[a as usize] as usize) % order]
    }

    /// `a / b`; panics when `b` is zero
    pub fn div(&self, a: u32, b: u32) -> u32 {
        self.mul(a, self.inverse(b))
    }

    /// alpha^n, any integer exponent
    pub fn exp(&self, n: i64) -> u32 {
        let order = (self.size - 1) as i64;
        self.exp[n.rem_euclid(order) as usize]
    }

    /// Discrete logarithm base alpha; zero has none
    pub fn log(&self, a: u32) -> usize {
        assert!(a != 0, "zero has no logarithm");
        self.log[a as usize] as usize
    }

    /// Evaluate a polynomial given highest-degree coefficient first
    pub fn eval_descending(&self, coeffs: &[u32], x: u32) -> u32 {
        coeffs
            .iter()
            .fold(0, |acc, &c| self.add(self.mul(acc, x), c))
    }

    /// Evaluate a polynomial given lowest-degree coefficient first
    pub fn eval_ascending(&self, coeffs: &[u32], x: u32) -> u32 {
        coeffs
            .iter()
            .rev()
            .fold(0, |acc, &c| self.add(self.mul(acc, x), c))
    }

    /// QR Code: x^8 + x^4 + x^3 + x^2 + 1, roots from alpha^0
    pub fn qr() -> &'static Self {
        static F: OnceLock<GaloisField> = OnceLock::new();
        F.get_or_init(|| Self::binary(0x011D, 256, 0))
    }

    /// Data Matrix and 8-bit Aztec words: x^8 + x^5 + x^3 + x^2 + 1
    pub fn data_matrix() -> &'static Self {
        static F: OnceLock<GaloisField> = OnceLock::new();
        F.get_or_init(|| Self::binary(0x012D, 256, 1))
    }

    /// Aztec 6-bit words: x^6 + x + 1
    pub fn aztec_data_6() -> &'static Self {
        static F: OnceLock<GaloisField> = OnceLock::new();
        F.get_or_init(|| Self::binary(0x43, 64, 1))
    }

    /// Aztec 10-bit words: x^10 + x^3 + 1
    pub fn aztec_data_10() -> &'static Self {
        static F: OnceLock<GaloisField> = OnceLock::new();
        F.get_or_init(|| Self::binary(0x409, 1024, 1))
    }

    /// Aztec 12-bit words: x^12 + x^6 + x^5 + x^3 + 1
    pub fn aztec_data_12() -> &'static Self {
        static F: OnceLock<GaloisField> = OnceLock::new();
        F.get_or_init(|| Self::binary(0x1069, 4096, 1))
    }

    /// Aztec mode message: x^4 + x + 1
    pub fn aztec_param() -> &'static Self {
        static F: OnceLock<GaloisField> = OnceLock::new();
        F.get_or_init(|| Self::binary(0x13, 16, 1))
    }

    /// Aztec data field for a codeword width. Panics on a width Aztec never uses.
    pub fn aztec_for_word_size(word_size: usize) -> &'static Self {
        match word_size {
            4 => Self::aztec_param(),
            6 => Self::aztec_data_6(),
            8 => Self::data_matrix(),
            10 => Self::aztec_data_10(),
            12 => Self::aztec_data_12(),
            _ => panic!("no Aztec field for {word_size}-bit codewords"),
        }
    }

    /// PDF417: integers modulo 929, generator 3
    pub fn pdf417() -> &'static Self {
        static F: OnceLock<GaloisField> = OnceLock::new();
        F.get_or_init(|| Self::prime(929, 3, 1))
    }
}
