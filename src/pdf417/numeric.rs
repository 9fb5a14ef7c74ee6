//! Base-900 conversion for numeric compaction.
//!
//! A group of up to 44 digits is prefixed with a `1` so leading zeros
//! survive, then written as base-900 codewords, most significant first.

use crate::error::{Error, Result};

/// Longest digit run one group carries
pub const MAX_GROUP_DIGITS: usize = 44;
/// Codewords a full group needs
pub const MAX_GROUP_CODEWORDS: usize = 15;

const LIMB: u64 = 1_000_000_000;

/// Convert ASCII digits (at most 44) to codewords
pub fn encode_group(digits: &[u8]) -> Vec<u32> {
    debug_assert!(digits.len() <= MAX_GROUP_DIGITS);
    let mut number: Vec<u32> = std::iter::once(1)
        .chain(digits.iter().map(|&d| (d - b'0') as u32))
        .collect();
    let mut codewords = Vec::with_capacity(MAX_GROUP_CODEWORDS);
    while !number.is_empty() {
        // Long division by 900, quotient digits replace the dividend
        let mut remainder = 0u32;
        let mut quotient = Vec::with_capacity(number.len());
        for &digit in &number {
            let current = remainder * 10 + digit;
            let q = current / 900;
            remainder = current % 900;
            if q != 0 || !quotient.is_empty() {
                quotient.push(q);
            }
        }
        codewords.push(remainder);
        number = quotient;
    }
    codewords.reverse();
    codewords
}

/// Convert a group of codewords back to digits, dropping the leading `1`
pub fn decode_group(codewords: &[u32]) -> Result<String> {
    // Little-endian base 10^9 limbs
    let mut limbs: Vec<u64> = Vec::new();
    for &cw in codewords {
        let mut carry = cw as u64;
        for limb in limbs.iter_mut() {
            let v = *limb * 900 + carry;
            *limb = v % LIMB;
            carry = v / LIMB;
        }
        while carry > 0 {
            limbs.push(carry % LIMB);
            carry /= LIMB;
        }
    }
    let mut text = match limbs.last() {
        Some(top) => top.to_string(),
        None => return Err(Error::Format("numeric group has no leading 1")),
    };
    for limb in limbs.iter().rev().skip(1) {
        text.push_str(&format!("{limb:09}"));
    }
    match text.strip_prefix('1') {
        Some(digits) => Ok(digits.to_string()),
        None => Err(Error::Format("numeric group has no leading 1")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifteen_digit_example() {
        let cw = encode_group(b"000213298174000");
        assert_eq!(cw, vec![1, 624, 434, 632, 282, 200]);
        assert_eq!(decode_group(&cw).unwrap(), "000213298174000");
    }

    #[test]
    fn test_full_group_uses_fifteen_codewords() {
        let digits = [b'9'; MAX_GROUP_DIGITS];
        let cw = encode_group(&digits);
        assert_eq!(cw.len(), MAX_GROUP_CODEWORDS);
        assert!(cw.iter().all(|&c| c < 900));
        assert_eq!(decode_group(&cw).unwrap().as_bytes(), &digits[..]);

        let zeros = [b'0'; MAX_GROUP_DIGITS];
        assert_eq!(encode_group(&zeros).len(), MAX_GROUP_CODEWORDS);
    }

    #[test]
    fn test_short_groups() {
        assert_eq!(encode_group(b""), vec![1]);
        assert_eq!(decode_group(&[1]).unwrap(), "");
        assert_eq!(decode_group(&encode_group(b"7")).unwrap(), "7");
    }

    #[test]
    fn test_missing_sentinel_is_format_error() {
        // 3 * 900 + 5 = 2705
        assert!(decode_group(&[3, 5]).unwrap_err().is_format());
        assert!(decode_group(&[]).is_err());
    }
}
