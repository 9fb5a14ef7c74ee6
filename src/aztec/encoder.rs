//! Aztec encoding: greedy high-level encoder, bit stuffing, symbol sizing and
//! placement.

use super::layout::{Layout, total_bits_in_layers, word_size};
use super::tables::{Mode, char_code, latch_sequence, pair_code, shift_code};
use super::{AztecCode, AztecOptions, MAX_LAYERS, MAX_LAYERS_COMPACT};
use crate::ec::{GaloisField, ReedSolomonEncoder};
use crate::error::{Error, Result};
use crate::models::BitMatrix;
use crate::utils::bits::{BitWriter, read_code};
use crate::utils::charset::CharacterSetEci;
use tracing::{debug, trace};

/// Longest run one binary-shift header can announce
const MAX_BINARY_RUN: usize = 2047 + 31;

/// Encode text. Without an explicit charset, text outside ISO-8859-1 is
/// carried as UTF-8 behind an ECI designator.
pub fn encode(text: &str, options: &AztecOptions) -> Result<AztecCode> {
    let (bytes, eci) = match options.charset {
        Some(charset) => (charset.encode(text)?, Some(charset.value())),
        None => match CharacterSetEci::Iso8859_1.encode(text) {
            Ok(bytes) => (bytes, None),
            Err(_) => (text.as_bytes().to_vec(), Some(CharacterSetEci::Utf8.value())),
        },
    };
    encode_bytes_with_eci(&bytes, eci, options)
}

/// Encode raw bytes; no ECI is emitted unless `options.charset` is set
pub fn encode_bytes(data: &[u8], options: &AztecOptions) -> Result<AztecCode> {
    encode_bytes_with_eci(data, options.charset.map(|c| c.value()), options)
}

fn encode_bytes_with_eci(data: &[u8], eci: Option<u32>, options: &AztecOptions) -> Result<AztecCode> {
    let bits = high_level_encode(data, eci, options.gs1)?;
    encode_bits(&bits, options.min_ecc_percent, options.layers)
}

/// Size, stuff, protect and place an already high-level-encoded bit stream
pub fn encode_bits(bits: &BitWriter, min_ecc_percent: usize, user_layers: i32) -> Result<AztecCode> {
    let ecc_bits = bits.len() * min_ecc_percent / 100 + 11;
    let total_size_bits = bits.len() + ecc_bits;

    let (compact, layers, stuffed) = if user_layers != 0 {
        let compact = user_layers < 0;
        let layers = user_layers.unsigned_abs() as usize;
        let max = if compact { MAX_LAYERS_COMPACT } else { MAX_LAYERS };
        if layers > max {
            return Err(Error::invalid(format!("illegal value {user_layers} for layers")));
        }
        let total = total_bits_in_layers(layers, compact);
        let ws = word_size(layers);
        let usable = total - total % ws;
        let stuffed = stuff_bits(bits.as_bits(), ws);
        if stuffed.len() + ecc_bits > usable || (compact && stuffed.len() > ws * 64) {
            return Err(Error::invalid("data too large for the requested layer count"));
        }
        (compact, layers, stuffed)
    } else {
        choose_size(bits, ecc_bits, total_size_bits)?
    };

    let ws = word_size(layers);
    let total_bits = total_bits_in_layers(layers, compact);
    let data_words = stuffed.len() / ws;
    let message = generate_check_words(&stuffed, total_bits, ws);
    let mode_message = generate_mode_message(compact, layers, data_words);

    let layout = Layout::new(compact, layers);
    let mut matrix = BitMatrix::square(layout.matrix_size());
    layout.walk(|idx, x, y| {
        if message.get(idx) {
            matrix.set(x, y, true);
        }
    });
    layout.walk_mode_message(|idx, x, y| {
        if mode_message.get(idx) {
            matrix.set(x, y, true);
        }
    });
    layout.draw_finder(&mut matrix);

    debug!(compact, layers, data_words, size = layout.matrix_size(), "encoded aztec symbol");
    Ok(AztecCode {
        matrix,
        compact,
        layers,
        data_words,
    })
}

fn choose_size(bits: &BitWriter, ecc_bits: usize, total_size_bits: usize) -> Result<(bool, usize, Vec<bool>)> {
    let mut cached: Option<(usize, Vec<bool>)> = None;
    for i in 0..=MAX_LAYERS {
        let compact = i < MAX_LAYERS_COMPACT;
        let layers = if compact { i + 1 } else { i };
        let total = total_bits_in_layers(layers, compact);
        if total_size_bits > total {
            continue;
        }
        let ws = word_size(layers);
        let stuffed = match cached.take() {
            Some((size, stuffed)) if size == ws => stuffed,
            _ => stuff_bits(bits.as_bits(), ws),
        };
        let usable = total - total % ws;
        let fits = !(compact && stuffed.len() > ws * 64) && stuffed.len() + ecc_bits <= usable;
        if fits {
            return Ok((compact, layers, stuffed));
        }
        cached = Some((ws, stuffed));
    }
    Err(Error::invalid("data too large for an Aztec code"))
}

/// Pack bits into words of `word_size`, stuffing so that no word is all
/// zeros or all ones. The final word is padded with one bits.
pub fn stuff_bits(bits: &[bool], word_size: usize) -> Vec<bool> {
    let mut out = BitWriter::with_capacity(bits.len() + bits.len() / word_size + word_size);
    let n = bits.len();
    let mask = (1u32 << word_size) - 2;
    let mut i = 0;
    while i < n {
        let mut word = 0u32;
        for j in 0..word_size {
            if i + j >= n || bits[i + j] {
                word |= 1 << (word_size - 1 - j);
            }
        }
        if word & mask == mask {
            out.append_bits(word & mask, word_size);
            i += word_size - 1;
        } else if word & mask == 0 {
            out.append_bits(word | 1, word_size);
            i += word_size - 1;
        } else {
            out.append_bits(word, word_size);
            i += word_size;
        }
    }
    out.into_bits()
}

/// Append check words and left-pad to `total_bits`
fn generate_check_words(stuffed: &[bool], total_bits: usize, word_size: usize) -> BitWriter {
    let data_words = stuffed.len() / word_size;
    let total_words = total_bits / word_size;
    let mut words = vec![0u32; total_words];
    for (i, w) in words.iter_mut().take(data_words).enumerate() {
        *w = read_code(stuffed, i * word_size, word_size);
    }
    ReedSolomonEncoder::new(GaloisField::aztec_for_word_size(word_size))
        .encode(&mut words, total_words - data_words);

    let mut out = BitWriter::with_capacity(total_bits);
    out.append_bits(0, total_bits % word_size);
    for w in words {
        out.append_bits(w, word_size);
    }
    out
}

/// Layer count and data-word count, protected over GF(16)
pub fn generate_mode_message(compact: bool, layers: usize, data_words: usize) -> BitWriter {
    let mut message = BitWriter::new();
    if compact {
        message.append_bits((layers - 1) as u32, 2);
        message.append_bits((data_words - 1) as u32, 6);
        generate_check_words(message.as_bits(), 28, 4)
    } else {
        message.append_bits((layers - 1) as u32, 5);
        message.append_bits((data_words - 1) as u32, 11);
        generate_check_words(message.as_bits(), 40, 4)
    }
}

/// Greedy text-to-bits encoder.
///
/// Characters stay in the latched mode when possible; a character missing
/// from it is shifted in when the next character returns to the latched
/// mode, otherwise the encoder latches to the mode that covers the longest
/// upcoming run. Bytes no table holds travel in binary-shift runs.
pub fn high_level_encode(data: &[u8], eci: Option<u32>, gs1: bool) -> Result<BitWriter> {
    let mut enc = HighLevelEncoder {
        out: BitWriter::with_capacity(data.len() * 8),
        mode: Mode::Upper,
    };
    if gs1 {
        enc.flag(None);
    }
    if let Some(value) = eci {
        if value > 999_999 {
            return Err(Error::invalid("ECI value must be between 0 and 999999"));
        }
        enc.flag(Some(value));
    }

    let mut i = 0;
    while i < data.len() {
        let c = data[i];
        if let Some(&next) = data.get(i + 1) {
            if let Some(code) = pair_code(c, next) {
                let both_here = char_code(enc.mode, c).is_some() && char_code(enc.mode, next).is_some();
                if enc.mode == Mode::Punct || !both_here {
                    enc.shift_or_stay(Mode::Punct);
                    enc.out.append_bits(code, 5);
                    i += 2;
                    continue;
                }
            }
        }

        if let Some(code) = char_code(enc.mode, c) {
            enc.out.append_bits(code, enc.mode.code_bits());
            i += 1;
            continue;
        }

        match best_mode(data, i, enc.mode) {
            Some(target) => {
                let next_stays = data
                    .get(i + 1)
                    .is_none_or(|&n| char_code(enc.mode, n).is_some() || char_code(target, n).is_none());
                match shift_code(enc.mode, target) {
                    Some(shift) if next_stays => {
                        enc.out.append_bits(shift, enc.mode.code_bits());
                    }
                    _ => enc.latch(target),
                }
                let code = char_code(target, c).unwrap_or(0);
                enc.out.append_bits(code, target.code_bits());
                i += 1;
            }
            None => {
                let run = data[i..]
                    .iter()
                    .take(MAX_BINARY_RUN)
                    .take_while(|&&b| best_mode(&[b], 0, enc.mode).is_none())
                    .count();
                enc.binary_shift(&data[i..i + run]);
                i += run;
            }
        }
    }
    trace!(bits = enc.out.len(), "aztec high-level encode");
    Ok(enc.out)
}

/// Mode holding `data[i]` with the longest run of encodable characters
fn best_mode(data: &[u8], i: usize, current: Mode) -> Option<Mode> {
    let c = data[i];
    Mode::CHARACTER_MODES
        .iter()
        .copied()
        .filter(|&m| char_code(m, c).is_some())
        .map(|m| {
            let run = data[i..].iter().take_while(|&&b| char_code(m, b).is_some()).count();
            (m, run)
        })
        .fold(None, |best: Option<(Mode, usize)>, (m, run)| match best {
            Some((bm, brun))
                if brun > run
                    || (brun == run && latch_sequence(current, bm).1 <= latch_sequence(current, m).1) =>
            {
                Some((bm, brun))
            }
            _ => Some((m, run)),
        })
        .map(|(m, _)| m)
}

struct HighLevelEncoder {
    out: BitWriter,
    mode: Mode,
}

impl HighLevelEncoder {
    fn latch(&mut self, to: Mode) {
        let (value, bits) = latch_sequence(self.mode, to);
        self.out.append_bits(value, bits);
        trace!(from = ?self.mode, to = ?to, "aztec latch");
        self.mode = to;
    }

    /// Prepare to write one code of `to`: shift if possible, else latch
    fn shift_or_stay(&mut self, to: Mode) {
        if self.mode == to {
            return;
        }
        match shift_code(self.mode, to) {
            Some(code) => self.out.append_bits(code, self.mode.code_bits()),
            None => self.latch(to),
        }
    }

    /// FLG(n): FNC1 when `eci` is `None`, otherwise an ECI designator
    fn flag(&mut self, eci: Option<u32>) {
        self.shift_or_stay(Mode::Punct);
        self.out.append_bits(0, 5);
        match eci {
            None => self.out.append_bits(0, 3),
            Some(value) => {
                let digits = value.to_string();
                self.out.append_bits(digits.len() as u32, 3);
                for d in digits.bytes() {
                    self.out.append_bits((d - b'0' + 2) as u32, 4);
                }
            }
        }
    }

    fn binary_shift(&mut self, bytes: &[u8]) {
        // Binary shift is only reachable from UPPER, LOWER and MIXED
        if matches!(self.mode, Mode::Digit | Mode::Punct) {
            self.latch(Mode::Upper);
        }
        let count = bytes.len();
        let shift = shift_code(self.mode, Mode::Binary).unwrap_or(31);
        for (i, &b) in bytes.iter().enumerate() {
            if i == 0 || (i == 31 && count <= 62) {
                self.out.append_bits(shift, 5);
                if count > 62 {
                    self.out.append_bits((count - 31) as u32, 16);
                } else if i == 0 {
                    self.out.append_bits(count.min(31) as u32, 5);
                } else {
                    self.out.append_bits((count - 31) as u32, 5);
                }
            }
            self.out.append_bits(b as u32, 8);
        }
    }
}
