//! Environment-backed defaults for encoder tuning knobs.
//!
//! Each value is read once and cached; unset or unparsable variables fall
//! back to the built-in default, and parsed values are clamped to the range
//! the symbology allows.

use std::sync::OnceLock;

fn parse_env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn parse_env_u8(name: &str, default: u8) -> u8 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u8>().ok())
        .unwrap_or(default)
}

fn parse_env_bool_u8(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u8>().ok())
        .map(|v| v != 0)
        .unwrap_or(default)
}

static AZTEC_MIN_ECC_PERCENT: OnceLock<usize> = OnceLock::new();

/// Minimum share of an Aztec symbol spent on check words (percent)
pub fn aztec_min_ecc_percent() -> usize {
    *AZTEC_MIN_ECC_PERCENT
        .get_or_init(|| parse_env_usize("BARCODE_AZTEC_MIN_ECC_PERCENT", 33).clamp(5, 95))
}

static PDF417_EC_LEVEL: OnceLock<u8> = OnceLock::new();

/// PDF417 error-correction level (0-8)
pub fn pdf417_ec_level() -> u8 {
    *PDF417_EC_LEVEL.get_or_init(|| parse_env_u8("BARCODE_PDF417_EC_LEVEL", 2).min(8))
}

static PDF417_MAX_COLUMNS: OnceLock<usize> = OnceLock::new();

/// Upper bound on PDF417 data columns
pub fn pdf417_max_columns() -> usize {
    *PDF417_MAX_COLUMNS
        .get_or_init(|| parse_env_usize("BARCODE_PDF417_MAX_COLUMNS", 30).clamp(1, 30))
}

static PDF417_MAX_ROWS: OnceLock<usize> = OnceLock::new();

/// Upper bound on PDF417 rows
pub fn pdf417_max_rows() -> usize {
    *PDF417_MAX_ROWS.get_or_init(|| parse_env_usize("BARCODE_PDF417_MAX_ROWS", 90).clamp(3, 90))
}

static MASK_PARALLEL: OnceLock<bool> = OnceLock::new();

/// Whether QR mask candidates are scored on the rayon pool
pub fn mask_parallel() -> bool {
    *MASK_PARALLEL.get_or_init(|| parse_env_bool_u8("BARCODE_MASK_PARALLEL", true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_within_range() {
        assert!((5..=95).contains(&aztec_min_ecc_percent()));
        assert!(pdf417_ec_level() <= 8);
        assert!((1..=30).contains(&pdf417_max_columns()));
        assert!((3..=90).contains(&pdf417_max_rows()));
    }

    #[test]
    fn test_parse_fallback() {
        assert_eq!(parse_env_usize("BARCODE_TEST_UNSET_VARIABLE", 7), 7);
        assert!(parse_env_bool_u8("BARCODE_TEST_UNSET_VARIABLE", true));
    }
}
