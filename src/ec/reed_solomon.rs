//! Reed-Solomon error correction over any [`GaloisField`].
//!
//! Codeword arrays are stored highest-degree first: `received[j]` is the
//! coefficient of x^(n-1-j), so the check words sit at the end. Decoding is
//! syndrome computation, Berlekamp-Massey, Chien search and Forney's formula,
//! followed by a syndrome recheck.

use super::galois::GaloisField;
use crate::error::{Error, Result};
use tracing::trace;

/// Reed-Solomon decoder bound to one field
pub struct ReedSolomonDecoder<'f> {
    field: &'f GaloisField,
}

impl<'f> ReedSolomonDecoder<'f> {
    /// Decoder over `field`
    pub fn new(field: &'f GaloisField) -> Self {
        Self { field }
    }

    /// Correct `received` in place. `num_ec` trailing entries are check words.
    ///
    /// Returns the number of codewords that were repaired.
    pub fn decode(&self, received: &mut [u32], num_ec: usize) -> Result<usize> {
        if num_ec == 0 {
            return Ok(0);
        }
        if received.len() > self.field.size() - 1 || num_ec >= received.len() {
            return Err(Error::Format("codeword count does not fit the field"));
        }
        if received.iter().any(|&c| !self.field.contains(c)) {
            return Err(Error::Format("codeword value outside the field"));
        }

        // Calculate syndrome
        let syndrome = self.calculate_syndrome(received, num_ec);
        if syndrome.iter().all(|&s| s == 0) {
            return Ok(0);
        }

        // Find error locator polynomial using Berlekamp-Massey
        let sigma = self.find_error_locator(&syndrome)?;

        // Find error positions (Chien search)
        let positions = self.find_error_positions(&sigma, received.len())?;

        // Find error values (Forney algorithm)
        let values = self.find_error_values(&sigma, &syndrome, &positions, received.len())?;

        for (&pos, &value) in positions.iter().zip(&values) {
            received[pos] = self.field.sub(received[pos], value);
        }

        // Verify syndrome is now zero
        if self
            .calculate_syndrome(received, num_ec)
            .iter()
            .any(|&s| s != 0)
        {
            return Err(Error::Uncorrectable);
        }

        trace!(corrected = positions.len(), num_ec, "reed-solomon repaired codewords");
        Ok(positions.len())
    }

    fn calculate_syndrome(&self, received: &[u32], num_ec: usize) -> Vec<u32> {
        let base = self.field.generator_base() as i64;
        (0..num_ec as i64)
            .map(|i| {
                self.field
                    .eval_descending(received, self.field.exp(i + base))
            })
            .collect()
    }

    /// Berlekamp-Massey; returns the connection polynomial, lowest degree first
    fn find_error_locator(&self, syndrome: &[u32]) -> Result<Vec<u32>> {
        let f = self.field;
        let mut sigma = vec![1u32];
        let mut b = vec![1u32];
        let mut delta_b = 1u32;
        let mut l = 0usize;
        let mut m = 1usize;

        for i in 0..syndrome.len() {
            let mut delta = syndrome[i];
            for j in 1..=l.min(sigma.len() - 1) {
                delta = f.add(delta, f.mul(sigma[j], syndrome[i - j]));
            }

            if delta == 0 {
                m += 1;
                continue;
            }

            let previous = sigma.clone();
            let d = f.div(delta, delta_b);
            if sigma.len() < b.len() + m {
                sigma.resize(b.len() + m, 0);
            }
            // sigma = sigma - d * x^m * b
            for (j, &bj) in b.iter().enumerate() {
                sigma[j + m] = f.sub(sigma[j + m], f.mul(d, bj));
            }

            if 2 * l <= i {
                l = i + 1 - l;
                b = previous;
                delta_b = delta;
                m = 1;
            } else {
                m += 1;
            }
        }

        if 2 * l > syndrome.len() {
            return Err(Error::Uncorrectable);
        }
        sigma.truncate(l + 1);
        if sigma.len() != l + 1 || sigma[l] == 0 {
            return Err(Error::Uncorrectable);
        }
        Ok(sigma)
    }

    fn find_error_positions(&self, sigma: &[u32], n: usize) -> Result<Vec<usize>> {
        // sigma(x) = prod(1 - X_k * x) with X_k = alpha^(n-1-pos); roots at X_k^-1
        let positions: Vec<usize> = (0..n)
            .filter(|&pos| {
                let x_inv = self.field.exp(-((n - 1 - pos) as i64));
                self.field.eval_ascending(sigma, x_inv) == 0
            })
            .collect();

        if positions.len() != sigma.len() - 1 {
            return Err(Error::Uncorrectable);
        }
        Ok(positions)
    }

    fn find_error_values(
        &self,
        sigma: &[u32],
        syndrome: &[u32],
        positions: &[usize],
        n: usize,
    ) -> Result<Vec<u32>> {
        let f = self.field;

        // omega = syndrome * sigma mod x^(num_ec)
        let mut omega = vec![0u32; syndrome.len()];
        for (i, o) in omega.iter_mut().enumerate() {
            for j in 0..=i.min(sigma.len() - 1) {
                *o = f.add(*o, f.mul(sigma[j], syndrome[i - j]));
            }
        }

        // Formal derivative, lowest degree first
        let sigma_prime: Vec<u32> = sigma
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, &c)| f.mul_int(i, c))
            .collect();

        let exponent_scale = 1 - f.generator_base() as i64;
        positions
            .iter()
            .map(|&pos| {
                let log_x = (n - 1 - pos) as i64;
                let x_inv = f.exp(-log_x);
                let denominator = f.eval_ascending(&sigma_prime, x_inv);
                if denominator == 0 {
                    return Err(Error::Uncorrectable);
                }
                let numerator = f.mul(f.exp(log_x * exponent_scale), f.eval_ascending(&omega, x_inv));
                // Forney: e_k = -X_k^(1-b) * omega(X_k^-1) / sigma'(X_k^-1)
                Ok(f.negate(f.div(numerator, denominator)))
            })
            .collect()
    }
}

/// Reed-Solomon check-word generator bound to one field
pub struct ReedSolomonEncoder<'f> {
    field: &'f GaloisField,
}

impl<'f> ReedSolomonEncoder<'f> {
    /// Encoder over `field`
    pub fn new(field: &'f GaloisField) -> Self {
        Self { field }
    }

    /// Monic generator polynomial prod(x - alpha^(i+base)), highest degree first
    pub fn generator(&self, num_ec: usize) -> Vec<u32> {
        let f = self.field;
        let base = f.generator_base() as i64;
        let mut g = vec![1u32];
        for i in 0..num_ec as i64 {
            let root = f.exp(i + base);
            let mut next = vec![0u32; g.len() + 1];
            for (j, &c) in g.iter().enumerate() {
                next[j] = f.add(next[j], c);
                next[j + 1] = f.sub(next[j + 1], f.mul(c, root));
            }
            g = next;
        }
        g
    }

    /// Compute `num_ec` check words for `data`
    pub fn check_words(&self, data: &[u32], num_ec: usize) -> Vec<u32> {
        assert!(num_ec > 0, "at least one check word is required");
        let f = self.field;
        let g = self.generator(num_ec);
        let mut remainder = vec![0u32; num_ec];
        for &d in data {
            let factor = f.add(d, remainder[0]);
            remainder.rotate_left(1);
            remainder[num_ec - 1] = 0;
            for (r, &gj) in remainder.iter_mut().zip(&g[1..]) {
                *r = f.sub(*r, f.mul(factor, gj));
            }
        }
        remainder.iter().map(|&r| f.negate(r)).collect()
    }

    /// Fill the trailing `num_ec` entries of `codewords` with check words over the rest
    pub fn encode(&self, codewords: &mut [u32], num_ec: usize) {
        let split = codewords.len() - num_ec;
        let ec = self.check_words(&codewords[..split], num_ec);
        codewords[split..].copy_from_slice(&ec);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(field: &GaloisField, data: &[u32], num_ec: usize) -> Vec<u32> {
        let mut codeword = data.to_vec();
        codeword.extend(ReedSolomonEncoder::new(field).check_words(data, num_ec));
        codeword
    }

    #[test]
    fn test_rs_encode_decode_no_errors() {
        let data = vec![0x10, 0x20, 0x30, 0x40, 0x50, 0x60];
        let mut codeword = encode(GaloisField::qr(), &data, 10);
        let decoder = ReedSolomonDecoder::new(GaloisField::qr());
        assert_eq!(decoder.decode(&mut codeword, 10), Ok(0));
        assert_eq!(&codeword[..data.len()], &data);
    }

    #[test]
    fn test_rs_correct_single_error() {
        let data = vec![0x00; 10];
        let mut codeword = encode(GaloisField::qr(), &data, 10);

        // Corrupt one byte
        codeword[3] ^= 0xAB;

        let decoder = ReedSolomonDecoder::new(GaloisField::qr());
        assert_eq!(decoder.decode(&mut codeword, 10), Ok(1));
        assert_eq!(&codeword[..data.len()], &data);
    }

    #[test]
    fn test_rs_correct_multiple_errors() {
        let data = vec![0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88];
        let mut codeword = encode(GaloisField::data_matrix(), &data, 10);

        // Up to num_ec/2 = 5 errors are correctable
        codeword[0] ^= 0xFF;
        codeword[4] ^= 0x42;
        codeword[7] ^= 0x13;

        let decoder = ReedSolomonDecoder::new(GaloisField::data_matrix());
        assert_eq!(decoder.decode(&mut codeword, 10), Ok(3));
        assert_eq!(&codeword[..data.len()], &data);
    }

    #[test]
    fn test_rs_correct_errors_at_end() {
        let data = vec![0x01, 0x02, 0x03, 0x04, 0x05];
        let mut codeword = encode(GaloisField::data_matrix(), &data, 8);
        let total = codeword.len();

        // Corrupt check words at the end
        codeword[total - 1] ^= 0xFF;
        codeword[total - 2] ^= 0x33;

        let decoder = ReedSolomonDecoder::new(GaloisField::data_matrix());
        assert_eq!(decoder.decode(&mut codeword, 8), Ok(2));
        assert_eq!(&codeword[..data.len()], &data);
    }

    #[test]
    fn test_prime_field_corrects_errors() {
        let field = GaloisField::pdf417();
        let data = vec![5, 453, 178, 121, 239, 900, 0, 928];
        let mut codeword = encode(field, &data, 8);
        codeword[1] = (codeword[1] + 17) % 929;
        codeword[6] = 1;
        codeword[10] = 3;

        let decoder = ReedSolomonDecoder::new(field);
        let corrected = decoder.decode(&mut codeword, 8).unwrap();
        assert!(corrected >= 2);
        assert_eq!(&codeword[..data.len()], &data);
    }

    #[test]
    fn test_small_aztec_fields() {
        for (field, data) in [
            (GaloisField::aztec_data_6(), vec![1u32, 63, 17, 40]),
            (GaloisField::aztec_param(), vec![0u32, 9, 15]),
            (GaloisField::aztec_data_12(), vec![4095u32, 1, 2048, 77]),
        ] {
            let mut codeword = encode(field, &data, 4);
            codeword[2] ^= 1;
            let decoder = ReedSolomonDecoder::new(field);
            assert_eq!(decoder.decode(&mut codeword, 4), Ok(1));
            assert_eq!(&codeword[..data.len()], &data);
        }
    }

    #[test]
    fn test_too_many_errors_fail() {
        let field = GaloisField::data_matrix();
        let data: Vec<u32> = (1..=12).collect();
        let original = encode(field, &data, 4);
        let mut codeword = original.clone();
        for c in codeword.iter_mut().take(4) {
            *c ^= 0x5A;
        }
        let decoder = ReedSolomonDecoder::new(field);
        match decoder.decode(&mut codeword, 4) {
            Err(e) => assert!(e.is_format()),
            // Miscorrection to another valid codeword must not look like the original
            Ok(_) => assert_ne!(codeword, original),
        }
    }

    #[test]
    fn test_generator_matches_pdf417_level_zero() {
        // (x - 3)(x - 9) = x^2 - 12x + 27
        let g = ReedSolomonEncoder::new(GaloisField::pdf417()).generator(2);
        assert_eq!(g, vec![1, 917, 27]);
    }

    #[test]
    fn test_value_outside_field_rejected() {
        let mut codeword = vec![1, 2, 64, 3, 4];
        let decoder = ReedSolomonDecoder::new(GaloisField::aztec_data_6());
        assert!(decoder.decode(&mut codeword, 2).is_err());
    }
}
