//! Aztec decoding: layer walk, Reed-Solomon correction, unstuffing and the
//! mode-switching text decoder.

use super::layout::{Layout, walk_mode_message, word_size};
use super::tables::{Code, Mode, code_meaning};
use super::AztecSymbol;
use crate::ec::{GaloisField, ReedSolomonDecoder};
use crate::error::{Error, Result};
use crate::models::{BitMatrix, DecoderResult};
use crate::utils::bits::{BitReader, pack_bits, read_code};
use crate::utils::charset::EciStringBuilder;
use crate::utils::memory_pool::BufferPool;
use tracing::debug;

/// FNC1 is reported as ASCII GS
const FNC1: u8 = 29;

/// Decode a rectified Aztec module matrix
pub fn decode(matrix: &BitMatrix, symbol: &AztecSymbol) -> Result<DecoderResult> {
    decode_with_pool(matrix, symbol, &mut BufferPool::new())
}

/// Decode using scratch storage from `pool`
pub fn decode_with_pool(
    matrix: &BitMatrix,
    symbol: &AztecSymbol,
    pool: &mut BufferPool,
) -> Result<DecoderResult> {
    symbol.validate()?;
    let layout = Layout::new(symbol.compact, symbol.layers);
    if matrix.width() != layout.matrix_size() || matrix.height() != layout.matrix_size() {
        return Err(Error::Format("matrix size does not match the layer count"));
    }

    let ws = word_size(symbol.layers);
    let total_bits = layout.total_bits();
    let num_codewords = total_bits / ws;
    if num_codewords < symbol.data_words {
        return Err(Error::Format("fewer codewords than declared data words"));
    }

    let (rawbits, codewords) = pool.split(total_bits, num_codewords);
    layout.walk(|idx, x, y| rawbits[idx] = matrix.get(x, y));

    let mut offset = total_bits % ws;
    for word in codewords.iter_mut() {
        *word = read_code(rawbits, offset, ws);
        offset += ws;
    }

    let num_ec = num_codewords - symbol.data_words;
    let errors_corrected = ReedSolomonDecoder::new(GaloisField::aztec_for_word_size(ws))
        .decode(codewords, num_ec)
        .map_err(|e| match e {
            Error::Format(_) => Error::Uncorrectable,
            other => other,
        })?;

    let corrected = unstuff(&codewords[..symbol.data_words], ws)?;
    let text = high_level_decode(&corrected)?;

    let ec_level = 100 * num_ec / num_codewords;
    debug!(
        compact = symbol.compact,
        layers = symbol.layers,
        word_size = ws,
        errors_corrected,
        "decoded aztec symbol"
    );

    let mut result = DecoderResult::new(pack_bits(&corrected), text);
    result.num_bits = corrected.len();
    result.ec_level = Some(format!("{ec_level}%"));
    result.errors_corrected = errors_corrected;
    Ok(result)
}

/// Expand data words into bits, removing stuffed bits.
///
/// Words of all zeros or all ones never occur in a valid symbol. Words `1`
/// and `max - 1` carry `word_size - 1` copies of one bit.
pub fn unstuff(data_words: &[u32], word_size: usize) -> Result<Vec<bool>> {
    let mask = (1u32 << word_size) - 1;
    let mut bits = Vec::with_capacity(data_words.len() * word_size);
    for &word in data_words {
        if word == 0 || word == mask {
            return Err(Error::Format("illegal all-zero or all-one data word"));
        }
        if word == 1 || word == mask - 1 {
            bits.extend(std::iter::repeat_n(word > 1, word_size - 1));
        } else {
            bits.extend((0..word_size).rev().map(|bit| word & (1 << bit) != 0));
        }
    }
    Ok(bits)
}

/// Decode corrected, unstuffed bits into text
pub fn high_level_decode(bits: &[bool]) -> Result<String> {
    let mut reader = BitReader::new(bits);
    // Mode most recently latched to, and mode used for the next read
    let mut latch_mode = Mode::Upper;
    let mut shift_mode = Mode::Upper;
    let mut out = EciStringBuilder::new();

    while reader.available() > 0 {
        if shift_mode == Mode::Binary {
            if reader.available() < 5 {
                break;
            }
            let mut length = reader.read_bits(5)? as usize;
            if length == 0 {
                if reader.available() < 11 {
                    break;
                }
                length = reader.read_bits(11)? as usize + 31;
            }
            for _ in 0..length {
                if reader.available() < 8 {
                    return Ok(out.finish());
                }
                out.append_byte(reader.read_bits(8)? as u8);
            }
            shift_mode = latch_mode;
            continue;
        }

        let size = shift_mode.code_bits();
        if reader.available() < size {
            break;
        }
        let code = reader.read_bits(size)?;
        match code_meaning(shift_mode, code) {
            Some(Code::Flag) => {
                if reader.available() < 3 {
                    break;
                }
                let n = reader.read_bits(3)?;
                match n {
                    0 => out.append_text(&char::from(FNC1).to_string()),
                    7 => return Err(Error::Format("FLG(7) is reserved")),
                    _ => {
                        if reader.available() < 4 * n as usize {
                            break;
                        }
                        let mut eci = 0u32;
                        for _ in 0..n {
                            let digit = reader.read_bits(4)?;
                            if !(2..=11).contains(&digit) {
                                return Err(Error::Format("ECI digit out of range"));
                            }
                            eci = eci * 10 + (digit - 2);
                        }
                        out.append_eci(eci)?;
                    }
                }
                shift_mode = latch_mode;
            }
            Some(Code::Latch(mode)) => {
                latch_mode = mode;
                shift_mode = mode;
            }
            Some(Code::Shift(mode)) => {
                // A shift returns to the mode it was invoked from, even when
                // that mode was itself a shift
                latch_mode = shift_mode;
                shift_mode = mode;
            }
            Some(Code::Text(s)) => {
                out.append_ascii(s);
                shift_mode = latch_mode;
            }
            None => return Err(Error::Format("code outside the mode table")),
        }
    }
    Ok(out.finish())
}

/// Read the layer count and data-word count from the mode message ring
pub fn read_symbol_parameters(matrix: &BitMatrix, compact: bool) -> Result<AztecSymbol> {
    let size = matrix.width().min(matrix.height());
    let (num_bits, data_nibbles) = if compact { (28, 2) } else { (40, 4) };
    let min_size = if compact { 15 } else { 19 };
    if size < min_size {
        return Err(Error::Format("matrix too small for an Aztec symbol"));
    }
    let mut bits = vec![false; num_bits];
    walk_mode_message(size / 2, compact, |idx, x, y| bits[idx] = matrix.get(x, y));

    let mut words: Vec<u32> = (0..num_bits / 4).map(|i| read_code(&bits, i * 4, 4)).collect();
    let num_ec = words.len() - data_nibbles;
    ReedSolomonDecoder::new(GaloisField::aztec_param())
        .decode(&mut words, num_ec)
        .map_err(|_| Error::Uncorrectable)?;

    let value = words[..data_nibbles]
        .iter()
        .fold(0u32, |acc, &w| (acc << 4) | w) as usize;
    let symbol = if compact {
        AztecSymbol {
            compact,
            layers: (value >> 6) + 1,
            data_words: (value & 0x3F) + 1,
        }
    } else {
        AztecSymbol {
            compact,
            layers: (value >> 11) + 1,
            data_words: (value & 0x7FF) + 1,
        }
    };
    symbol.validate()?;
    Ok(symbol)
}
