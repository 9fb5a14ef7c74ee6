//! Data Matrix encoding: look-ahead high-level encoder, padding, per-block
//! Reed-Solomon, placement and borders.

use super::placement::{Placement, add_borders};
use super::symbol_info::SymbolInfo;
use super::{DataMatrixCode, DataMatrixOptions, MACRO_05_HEADER, MACRO_06_HEADER, MACRO_TRAILER};
use crate::ec::{GaloisField, ReedSolomonEncoder};
use crate::error::{Error, Result};
use crate::utils::charset::CharacterSetEci;
use tracing::{debug, trace};

const PAD: u8 = 129;
const LATCH_C40: u8 = 230;
const LATCH_BASE256: u8 = 231;
const FNC1: u8 = 232;
const UPPER_SHIFT: u8 = 235;
const MACRO_05: u8 = 236;
const MACRO_06: u8 = 237;
const LATCH_X12: u8 = 238;
const LATCH_TEXT: u8 = 239;
const LATCH_EDIFACT: u8 = 240;
const ECI: u8 = 241;
const UNLATCH: u8 = 254;

/// Shortest run worth a C40, Text or X12 latch
const MIN_TRIPLET_RUN: usize = 9;
/// Shortest run worth an EDIFACT latch
const MIN_EDIFACT_RUN: usize = 12;
/// Shortest run of extended bytes worth a Base 256 latch
const MIN_BASE256_RUN: usize = 3;
/// Longest Base 256 segment the two-byte length field can describe
const MAX_BASE256_RUN: usize = 1555;

const EDIFACT_UNLATCH: u32 = 0x1F;

/// Encode text. Without an explicit charset, text outside ISO-8859-1 is
/// carried as UTF-8 behind an ECI designator.
pub fn encode(text: &str, options: &DataMatrixOptions) -> Result<DataMatrixCode> {
    let (bytes, eci) = match options.charset {
        Some(charset) => (charset.encode(text)?, Some(charset.value())),
        None => match CharacterSetEci::Iso8859_1.encode(text) {
            Ok(bytes) => (bytes, None),
            Err(_) => (text.as_bytes().to_vec(), Some(CharacterSetEci::Utf8.value())),
        },
    };
    encode_with_eci(&bytes, eci, options)
}

/// Encode raw bytes; no ECI is emitted unless `options.charset` is set
pub fn encode_bytes(data: &[u8], options: &DataMatrixOptions) -> Result<DataMatrixCode> {
    encode_with_eci(data, options.charset.map(|c| c.value()), options)
}

fn encode_with_eci(data: &[u8], eci: Option<u32>, options: &DataMatrixOptions) -> Result<DataMatrixCode> {
    if data.is_empty() {
        return Err(Error::invalid("found empty contents"));
    }
    let encoded = high_level_encode(data, eci, options)?;
    let info = SymbolInfo::lookup(
        encoded.codewords.len().max(encoded.min_len),
        options.shape,
        options.min_size,
        options.max_size,
    )?;
    debug!(
        data_codewords = encoded.codewords.len(),
        width = info.symbol_width(),
        height = info.symbol_height(),
        "chose data matrix symbol"
    );

    let mut codewords = encoded.codewords;
    pad(&mut codewords, info.data_capacity);
    let codewords = append_error_correction(&codewords, info);

    let placement = Placement::new(info.symbol_data_width(), info.symbol_data_height());
    let mut matrix = add_borders(&placement.place(&codewords), info);
    if options.width > 0 || options.height > 0 {
        matrix = matrix.scale_to(options.width, options.height);
    }
    Ok(DataMatrixCode { matrix, info, codewords })
}

/// Data codewords produced by the high-level encoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighLevelEncoding {
    /// Codewords before padding
    pub codewords: Vec<u8>,
    /// Smallest data capacity that still decodes every EDIFACT segment
    pub min_len: usize,
}

/// Convert bytes to data codewords
pub fn high_level_encode(
    data: &[u8],
    eci: Option<u32>,
    options: &DataMatrixOptions,
) -> Result<HighLevelEncoding> {
    let mut enc = HighLevelEncoder {
        out: Vec::with_capacity(data.len() + 8),
        min_len: 0,
        gs1: options.gs1,
    };
    if let Some(value) = eci {
        enc.eci(value)?;
    }
    if options.gs1 {
        enc.out.push(FNC1);
    }

    let mut payload = data;
    for (header, codeword) in [(MACRO_05_HEADER, MACRO_05), (MACRO_06_HEADER, MACRO_06)] {
        if let Some(inner) = payload
            .strip_prefix(header.as_bytes())
            .and_then(|rest| rest.strip_suffix(MACRO_TRAILER.as_bytes()))
        {
            enc.out.push(codeword);
            payload = inner;
            break;
        }
    }

    if options.force_c40 {
        enc.forced_c40(payload);
    } else {
        enc.encode(payload);
    }
    Ok(HighLevelEncoding {
        codewords: enc.out,
        min_len: enc.min_len,
    })
}

struct HighLevelEncoder {
    out: Vec<u8>,
    min_len: usize,
    gs1: bool,
}

impl HighLevelEncoder {
    fn eci(&mut self, value: u32) -> Result<()> {
        self.out.push(ECI);
        match value {
            0..=126 => self.out.push(value as u8 + 1),
            127..=16382 => {
                let v = value - 127;
                self.out.push((v / 254 + 128) as u8);
                self.out.push((v % 254 + 1) as u8);
            }
            16383..=999_999 => {
                let v = value - 16383;
                self.out.push((v / 64516 + 192) as u8);
                self.out.push(((v / 254) % 254 + 1) as u8);
                self.out.push((v % 254 + 1) as u8);
            }
            _ => return Err(Error::UnsupportedEci(value)),
        }
        Ok(())
    }

    fn encode(&mut self, data: &[u8]) {
        let mut i = 0;
        while i < data.len() {
            if i + 1 < data.len() && data[i].is_ascii_digit() && data[i + 1].is_ascii_digit() {
                self.out.push(130 + (data[i] - b'0') * 10 + (data[i + 1] - b'0'));
                i += 2;
                continue;
            }

            let extended = run_len(data, i, |c| c >= 128);
            if extended >= MIN_BASE256_RUN {
                let n = extended.min(MAX_BASE256_RUN);
                self.base256(&data[i..i + n]);
                i += n;
                continue;
            }

            let x12 = run_len(data, i, is_x12);
            if x12 >= MIN_TRIPLET_RUN && data[i..i + x12].iter().any(|&c| matches!(c, b'\r' | b'*' | b'>')) {
                i += self.triplets(LATCH_X12, &data[i..i + x12], x12_value);
                continue;
            }
            let c40 = run_len(data, i, |c| c == b' ' || c.is_ascii_digit() || c.is_ascii_uppercase());
            if c40 >= MIN_TRIPLET_RUN {
                i += self.triplets(LATCH_C40, &data[i..i + c40], c40_value);
                continue;
            }
            let text = run_len(data, i, |c| c == b' ' || c.is_ascii_digit() || c.is_ascii_lowercase());
            if text >= MIN_TRIPLET_RUN {
                i += self.triplets(LATCH_TEXT, &data[i..i + text], text_value);
                continue;
            }
            let edifact = run_len(data, i, |c| (32..=94).contains(&c));
            if edifact >= MIN_EDIFACT_RUN {
                self.edifact(&data[i..i + edifact]);
                i += edifact;
                continue;
            }

            self.ascii(data[i]);
            i += 1;
        }
    }

    fn ascii(&mut self, c: u8) {
        if self.gs1 && c == 29 {
            self.out.push(FNC1);
        } else if c >= 128 {
            self.out.push(UPPER_SHIFT);
            self.out.push(c - 127);
        } else {
            self.out.push(c + 1);
        }
    }

    /// Pack whole triples of `run` behind `latch`; returns the bytes consumed
    fn triplets(&mut self, latch: u8, run: &[u8], value: fn(u8) -> u32) -> usize {
        let n = run.len() / 3 * 3;
        trace!(latch, chars = n, "triplet segment");
        let values: Vec<u32> = run[..n].iter().map(|&c| value(c)).collect();
        self.out.push(latch);
        self.pack_triples(&values);
        self.out.push(UNLATCH);
        n
    }

    fn pack_triples(&mut self, values: &[u32]) {
        for t in values.chunks_exact(3) {
            let v = 1600 * t[0] + 40 * t[1] + t[2] + 1;
            self.out.push((v >> 8) as u8);
            self.out.push(v as u8);
        }
    }

    fn edifact(&mut self, run: &[u8]) {
        trace!(chars = run.len(), "EDIFACT segment");
        self.out.push(LATCH_EDIFACT);
        let start = self.out.len();
        let mut acc = 0u32;
        let mut acc_bits = 0;
        let values = run.iter().map(|&c| c as u32 & 0x3F).chain(std::iter::once(EDIFACT_UNLATCH));
        for v in values {
            acc = (acc << 6) | v;
            acc_bits += 6;
            while acc_bits >= 8 {
                acc_bits -= 8;
                self.out.push((acc >> acc_bits) as u8);
            }
            acc &= (1 << acc_bits) - 1;
        }
        if acc_bits > 0 {
            self.out.push((acc << (8 - acc_bits)) as u8);
        }
        // The reader only starts a group of four with more than two
        // codewords left, so the symbol must extend past the last group
        self.min_len = self.min_len.max(start + 3 * (run.len() / 4) + 3);
    }

    fn base256(&mut self, run: &[u8]) {
        trace!(bytes = run.len(), "Base 256 segment");
        self.out.push(LATCH_BASE256);
        let n = run.len();
        let header: Vec<u8> = if n < 250 {
            vec![n as u8]
        } else {
            vec![(n / 250 + 249) as u8, (n % 250) as u8]
        };
        for &b in header.iter().chain(run) {
            let position = self.out.len() + 1;
            self.out.push(randomize_255_state(b, position));
        }
    }

    /// Everything in C40 with shift sets; the tail that does not fill a
    /// whole triple falls back to ASCII
    fn forced_c40(&mut self, data: &[u8]) {
        let mut values = Vec::with_capacity(data.len() * 2);
        let mut prefix_values = 0;
        let mut prefix_chars = 0;
        for (i, &c) in data.iter().enumerate() {
            c40_shifted_values(c, self.gs1, &mut values);
            if values.len() % 3 == 0 {
                prefix_values = values.len();
                prefix_chars = i + 1;
            }
        }
        if prefix_chars > 0 {
            self.out.push(LATCH_C40);
            self.pack_triples(&values[..prefix_values]);
            self.out.push(UNLATCH);
        }
        for &c in &data[prefix_chars..] {
            self.ascii(c);
        }
    }
}

fn run_len(data: &[u8], start: usize, pred: impl Fn(u8) -> bool) -> usize {
    data[start..].iter().take_while(|&&c| pred(c)).count()
}

fn is_x12(c: u8) -> bool {
    matches!(c, b'\r' | b'*' | b'>' | b' ') || c.is_ascii_digit() || c.is_ascii_uppercase()
}

fn x12_value(c: u8) -> u32 {
    match c {
        b'\r' => 0,
        b'*' => 1,
        b'>' => 2,
        b' ' => 3,
        b'0'..=b'9' => c as u32 - 44,
        _ => c as u32 - 51,
    }
}

fn c40_value(c: u8) -> u32 {
    match c {
        b' ' => 3,
        b'0'..=b'9' => c as u32 - 44,
        _ => c as u32 - 51,
    }
}

fn text_value(c: u8) -> u32 {
    match c {
        b' ' => 3,
        b'0'..=b'9' => c as u32 - 44,
        _ => c as u32 - 83,
    }
}

const C40_SHIFT2: &[u8; 27] = b"!\"#$%&'()*+,-./:;<=>?@[\\]^_";

fn c40_shifted_values(c: u8, gs1: bool, out: &mut Vec<u32>) {
    match c {
        b' ' | b'0'..=b'9' | b'A'..=b'Z' => out.push(c40_value(c)),
        29 if gs1 => out.extend([1, 27]),
        0..=31 => out.extend([0, c as u32]),
        96..=127 => out.extend([2, c as u32 - 96]),
        128..=255 => {
            out.extend([1, 30]);
            c40_shifted_values(c - 128, false, out);
        }
        _ => {
            let index = C40_SHIFT2.iter().position(|&p| p == c).unwrap_or(0);
            out.extend([1, index as u32]);
        }
    }
}

fn randomize_255_state(value: u8, position: usize) -> u8 {
    let pseudo_random = ((149 * position) % 255) + 1;
    ((value as usize + pseudo_random) % 256) as u8
}

/// Fill to `capacity`: one plain pad, then 253-state randomised pads
pub fn pad(codewords: &mut Vec<u8>, capacity: usize) {
    if codewords.len() < capacity {
        codewords.push(PAD);
    }
    while codewords.len() < capacity {
        let position = codewords.len() + 1;
        let pseudo_random = (149 * position) % 253 + 1;
        let mut v = PAD as usize + pseudo_random;
        if v > 254 {
            v -= 254;
        }
        codewords.push(v as u8);
    }
}

/// Append interleaved check words to the padded data codewords
pub fn append_error_correction(data: &[u8], info: &SymbolInfo) -> Vec<u8> {
    let blocks = info.interleaved_block_count();
    let ec_len = info.error_length_for_block();
    let rs = ReedSolomonEncoder::new(GaloisField::data_matrix());
    let mut out = Vec::with_capacity(info.total_codewords());
    out.extend_from_slice(data);
    out.resize(info.total_codewords(), 0);
    for b in 0..blocks {
        let block: Vec<u32> = (b..info.data_capacity)
            .step_by(blocks)
            .map(|i| data[i] as u32)
            .collect();
        let check = rs.check_words(&block, ec_len);
        for (k, &word) in check.iter().enumerate() {
            out[info.data_capacity + b + k * blocks] = word as u8;
        }
    }
    out
}
