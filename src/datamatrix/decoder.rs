//! Data Matrix decoding: border stripping, placement read-back, per-block
//! Reed-Solomon correction and the encodation-scheme parser.

use super::placement::{Placement, extract_data_region};
use super::symbol_info::SymbolInfo;
use super::{MACRO_05_HEADER, MACRO_06_HEADER, MACRO_TRAILER};
use crate::ec::{GaloisField, ReedSolomonDecoder};
use crate::error::{Error, Result};
use crate::models::{BitMatrix, DecoderResult};
use crate::utils::bits::BitReader;
use crate::utils::charset::EciStringBuilder;
use crate::utils::memory_pool::BufferPool;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encodation {
    // Not really a mode
    Pad,
    Ascii,
    C40,
    Text,
    AnsiX12,
    Edifact,
    Base256,
    Eci,
}

/// C40 basic set; the first three values are shifts
const C40_BASIC_SET: &[u8; 40] = b"*** 0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
/// Text basic set; the first three values are shifts
const TEXT_BASIC_SET: &[u8; 40] = b"*** 0123456789abcdefghijklmnopqrstuvwxyz";
/// Shift 2 set, shared by C40 and Text
const SHIFT2_SET: &[u8; 27] = b"!\"#$%&'()*+,-./:;<=>?@[\\]^_";
const TEXT_SHIFT3_SET: &[u8; 32] = b"`ABCDEFGHIJKLMNOPQRSTUVWXYZ{|}~\x7f";

/// Decode a full symbol (finder and timing borders included)
pub fn decode(matrix: &BitMatrix) -> Result<DecoderResult> {
    decode_with_pool(matrix, &mut BufferPool::new())
}

/// Decode using scratch storage from `pool`
pub fn decode_with_pool(matrix: &BitMatrix, pool: &mut BufferPool) -> Result<DecoderResult> {
    let info = SymbolInfo::for_dimensions(matrix.width(), matrix.height())
        .ok_or(Error::Format("dimensions match no Data Matrix size"))?;
    let area = extract_data_region(matrix, info);
    let placement = Placement::new(info.symbol_data_width(), info.symbol_data_height());

    let codewords = pool.codeword_buffer(info.total_codewords());
    placement.read(&area, codewords);

    let blocks = info.interleaved_block_count();
    let ec_len = info.error_length_for_block();
    let rs = ReedSolomonDecoder::new(GaloisField::data_matrix());
    let mut data = vec![0u8; info.data_capacity];
    let mut errors_corrected = 0;
    let mut block = Vec::with_capacity(info.data_length_for_block(0) + ec_len);
    for b in 0..blocks {
        block.clear();
        block.extend((b..info.data_capacity).step_by(blocks).map(|i| codewords[i]));
        block.extend(
            (b..ec_len * blocks)
                .step_by(blocks)
                .map(|i| codewords[info.data_capacity + i]),
        );
        errors_corrected += rs.decode(&mut block, ec_len).map_err(|_| Error::Uncorrectable)?;
        for (k, i) in (b..info.data_capacity).step_by(blocks).enumerate() {
            data[i] = block[k] as u8;
        }
    }

    debug!(
        width = matrix.width(),
        height = matrix.height(),
        blocks,
        errors_corrected,
        "decoded data matrix symbol"
    );
    let mut result = decode_codewords(&data)?;
    result.errors_corrected = errors_corrected;
    Ok(result)
}

/// Parse corrected data codewords into text
pub fn decode_codewords(bytes: &[u8]) -> Result<DecoderResult> {
    let mut bits = BitReader::from_bytes(bytes);
    let mut session = Session::default();
    let mut mode = Encodation::Ascii;
    loop {
        mode = match mode {
            Encodation::Ascii => session.ascii(&mut bits)?,
            other => {
                match other {
                    Encodation::C40 => session.c40_or_text(&mut bits, false)?,
                    Encodation::Text => session.c40_or_text(&mut bits, true)?,
                    Encodation::AnsiX12 => session.ansi_x12(&mut bits)?,
                    Encodation::Edifact => session.edifact(&mut bits)?,
                    Encodation::Base256 => session.base256(&mut bits)?,
                    Encodation::Eci => {
                        session.eci(&mut bits)?;
                        session.eci_used = true;
                    }
                    Encodation::Ascii | Encodation::Pad => {
                        return Err(Error::Format("unexpected encodation"));
                    }
                }
                Encodation::Ascii
            }
        };
        if mode == Encodation::Pad || bits.available() == 0 {
            break;
        }
    }
    Ok(session.finish(bytes))
}

#[derive(Default)]
struct Session {
    out: EciStringBuilder,
    trailer: String,
    byte_segments: Vec<Vec<u8>>,
    fnc1_positions: Vec<usize>,
    eci_used: bool,
}

impl Session {
    fn fnc1(&mut self) {
        self.fnc1_positions.push(self.out.char_len());
        self.out.append_byte(29);
    }

    fn ascii(&mut self, bits: &mut BitReader) -> Result<Encodation> {
        let mut upper_shift = false;
        loop {
            let one = bits.read_bits(8)?;
            match one {
                0 => return Err(Error::Format("ASCII codeword 0")),
                1..=128 => {
                    let value = if upper_shift { one + 128 } else { one };
                    self.out.append_byte((value - 1) as u8);
                    return Ok(Encodation::Ascii);
                }
                129 => return Ok(Encodation::Pad),
                130..=229 => {
                    // 2-digit data 00-99
                    self.out.append_ascii(&format!("{:02}", one - 130));
                }
                230 => return Ok(Encodation::C40),
                231 => return Ok(Encodation::Base256),
                232 => self.fnc1(),
                // Structured append and reader programming are ignored
                233 | 234 => {}
                235 => upper_shift = true,
                236 => {
                    self.out.append_ascii(MACRO_05_HEADER);
                    self.trailer.insert_str(0, MACRO_TRAILER);
                }
                237 => {
                    self.out.append_ascii(MACRO_06_HEADER);
                    self.trailer.insert_str(0, MACRO_TRAILER);
                }
                238 => return Ok(Encodation::AnsiX12),
                239 => return Ok(Encodation::Text),
                240 => return Ok(Encodation::Edifact),
                241 => return Ok(Encodation::Eci),
                _ => {
                    // 254 is an unlatch with no meaning in ASCII; some encoders
                    // end the data with one, so accept it as the final codeword
                    if one != 254 || bits.available() != 0 {
                        return Err(Error::Format("codeword not valid in ASCII encodation"));
                    }
                }
            }
            if bits.available() == 0 {
                return Ok(Encodation::Ascii);
            }
        }
    }

    fn c40_or_text(&mut self, bits: &mut BitReader, text: bool) -> Result<()> {
        let basic = if text { TEXT_BASIC_SET } else { C40_BASIC_SET };
        let mut upper_shift = false;
        let mut shift = 0;
        loop {
            // A single remaining byte is ASCII
            if bits.available() == 8 {
                return Ok(());
            }
            let first = bits.read_bits(8)?;
            if first == 254 {
                return Ok(());
            }
            let values = parse_two_bytes(first, bits.read_bits(8)?)?;
            for c in values {
                let upper = if upper_shift { 128u32 } else { 0 };
                match shift {
                    0 => {
                        if c < 3 {
                            shift = c + 1;
                            continue;
                        }
                        let ch = *basic
                            .get(c as usize)
                            .ok_or(Error::Format("C40/Text value out of range"))?;
                        self.out.append_byte((ch as u32 + upper) as u8);
                        upper_shift = false;
                    }
                    1 => {
                        self.out.append_byte((c + upper) as u8);
                        upper_shift = false;
                        shift = 0;
                    }
                    2 => {
                        if let Some(&ch) = SHIFT2_SET.get(c as usize) {
                            self.out.append_byte((ch as u32 + upper) as u8);
                            upper_shift = false;
                        } else {
                            match c {
                                27 => self.fnc1(),
                                30 => upper_shift = true,
                                _ => return Err(Error::Format("invalid shift 2 value")),
                            }
                        }
                        shift = 0;
                    }
                    _ => {
                        let ch = if text {
                            *TEXT_SHIFT3_SET
                                .get(c as usize)
                                .ok_or(Error::Format("invalid shift 3 value"))? as u32
                        } else {
                            c + 96
                        };
                        self.out.append_byte(((ch + upper) & 0xFF) as u8);
                        upper_shift = false;
                        shift = 0;
                    }
                }
            }
            if bits.available() == 0 {
                return Ok(());
            }
        }
    }

    fn ansi_x12(&mut self, bits: &mut BitReader) -> Result<()> {
        loop {
            if bits.available() == 8 {
                return Ok(());
            }
            let first = bits.read_bits(8)?;
            if first == 254 {
                return Ok(());
            }
            for c in parse_two_bytes(first, bits.read_bits(8)?)? {
                let byte = match c {
                    0 => b'\r',
                    1 => b'*',
                    2 => b'>',
                    3 => b' ',
                    4..=13 => (c + 44) as u8,
                    14..=39 => (c + 51) as u8,
                    _ => return Err(Error::Format("X12 value out of range")),
                };
                self.out.append_byte(byte);
            }
            if bits.available() == 0 {
                return Ok(());
            }
        }
    }

    fn edifact(&mut self, bits: &mut BitReader) -> Result<()> {
        loop {
            // Two or fewer bytes left are ASCII
            if bits.available() <= 16 {
                return Ok(());
            }
            for _ in 0..4 {
                let mut value = bits.read_bits(6)?;
                if value == 0x1F {
                    // Unlatch; skip to the byte boundary
                    let left = 8 - bits.bit_offset();
                    if left != 8 {
                        bits.read_bits(left)?;
                    }
                    return Ok(());
                }
                if value & 0x20 == 0 {
                    value |= 0x40;
                }
                self.out.append_byte(value as u8);
            }
            if bits.available() == 0 {
                return Ok(());
            }
        }
    }

    fn base256(&mut self, bits: &mut BitReader) -> Result<()> {
        // Codeword positions are 1-indexed
        let mut position = 1 + bits.byte_offset();
        let d1 = unrandomize_255_state(bits.read_bits(8)?, position);
        position += 1;
        let count = match d1 {
            0 => bits.available() / 8,
            1..=249 => d1 as usize,
            _ => {
                let d2 = unrandomize_255_state(bits.read_bits(8)?, position);
                position += 1;
                250 * (d1 as usize - 249) + d2 as usize
            }
        };
        let mut bytes = Vec::with_capacity(count);
        for _ in 0..count {
            if bits.available() < 8 {
                return Err(Error::Format("Base 256 segment runs past the data"));
            }
            bytes.push(unrandomize_255_state(bits.read_bits(8)?, position) as u8);
            position += 1;
        }
        self.out.append_bytes(&bytes);
        self.byte_segments.push(bytes);
        Ok(())
    }

    fn eci(&mut self, bits: &mut BitReader) -> Result<()> {
        if bits.available() < 8 {
            return Err(Error::Format("ECI designator missing"));
        }
        let c1 = bits.read_bits(8)?;
        let value = match c1 {
            1..=127 => c1 - 1,
            128..=191 => {
                let c2 = read_nonzero(bits)?;
                (c1 - 128) * 254 + (c2 - 1) + 127
            }
            192..=207 => {
                let c2 = read_nonzero(bits)?;
                let c3 = read_nonzero(bits)?;
                (c1 - 192) * 64516 + (c2 - 1) * 254 + (c3 - 1) + 16383
            }
            _ => return Err(Error::Format("invalid ECI designator")),
        };
        self.out.append_eci(value)
    }

    fn finish(mut self, bytes: &[u8]) -> DecoderResult {
        if !self.trailer.is_empty() {
            self.out.append_text(&self.trailer);
        }
        let has = |p: usize| self.fnc1_positions.contains(&p);
        let gs1_first = has(0) || has(4);
        let aim_second = has(1) || has(5);
        let symbology_modifier = match (self.eci_used, gs1_first, aim_second) {
            (true, true, _) => 5,
            (true, false, true) => 6,
            (true, false, false) => 4,
            (false, true, _) => 2,
            (false, false, true) => 3,
            (false, false, false) => 1,
        };
        let mut result = DecoderResult::new(bytes.to_vec(), self.out.finish());
        result.byte_segments = self.byte_segments;
        result.symbology_modifier = symbology_modifier;
        result
    }
}

fn read_nonzero(bits: &mut BitReader) -> Result<u32> {
    match bits.read_bits(8)? {
        0 => Err(Error::Format("invalid ECI designator")),
        c => Ok(c),
    }
}

/// Three C40/Text/X12 values packed as 1600*c1 + 40*c2 + c3 + 1
fn parse_two_bytes(first: u32, second: u32) -> Result<[u32; 3]> {
    let full = ((first << 8) + second)
        .checked_sub(1)
        .ok_or(Error::Format("empty C40 value pair"))?;
    Ok([full / 1600, (full % 1600) / 40, full % 40])
}

fn unrandomize_255_state(codeword: u32, position: usize) -> u32 {
    let pseudo_random = ((149 * position) % 255) as u32 + 1;
    (codeword + 256 - pseudo_random) % 256
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_and_digit_pairs() {
        // "A", "12", "05", pad
        let r = decode_codewords(&[66, 142, 135, 129]).unwrap();
        assert_eq!(r.text, "A1205");
        assert_eq!(r.symbology_modifier, 1);
    }

    #[test]
    fn test_fnc1_first_sets_gs1_modifier() {
        let r = decode_codewords(&[232, 50, 49, 129]).unwrap();
        assert_eq!(r.text, "\u{1d}10");
        assert_eq!(r.symbology_modifier, 2);
    }

    #[test]
    fn test_fnc1_with_eci_modifier() {
        // ECI 3 (ISO-8859-1), FNC1, "A"
        let r = decode_codewords(&[241, 4, 232, 66]).unwrap();
        assert_eq!(r.text, "\u{1d}A");
        assert_eq!(r.symbology_modifier, 5);
    }

    #[test]
    fn test_upper_shift() {
        // Upper shift, 'A' + 128 = 0xC1
        let r = decode_codewords(&[235, 66]).unwrap();
        assert_eq!(r.text, "Á");
    }

    #[test]
    fn test_c40_segment() {
        // "IIM" then ASCII "A"
        let v: u32 = 1600 * 22 + 40 * 22 + 26 + 1;
        let r = decode_codewords(&[230, (v >> 8) as u8, v as u8, 254, 66]).unwrap();
        assert_eq!(r.text, "IIMA");
    }

    #[test]
    fn test_c40_space_and_digits() {
        // space (3), '0' (4), 'A' (14)
        let v: u32 = 1600 * 3 + 40 * 4 + 14 + 1;
        let r = decode_codewords(&[230, (v >> 8) as u8, v as u8, 254]).unwrap();
        assert_eq!(r.text, " 0A");
        // '9' (13), 'Z' (39), space
        let v: u32 = 1600 * 13 + 40 * 39 + 3 + 1;
        let r = decode_codewords(&[230, (v >> 8) as u8, v as u8, 254]).unwrap();
        assert_eq!(r.text, "9Z ");
    }

    #[test]
    fn test_text_space_and_digits() {
        let v: u32 = 1600 * 3 + 40 * 4 + 14 + 1;
        let r = decode_codewords(&[239, (v >> 8) as u8, v as u8, 254]).unwrap();
        assert_eq!(r.text, " 0a");
        let v: u32 = 1600 * 13 + 40 * 39 + 3 + 1;
        let r = decode_codewords(&[239, (v >> 8) as u8, v as u8, 254]).unwrap();
        assert_eq!(r.text, "9z ");
    }

    #[test]
    fn test_text_shift3_uppercase() {
        // shift 3, 'A' (1), space
        let v: u32 = 1600 * 2 + 40 + 3 + 1;
        let r = decode_codewords(&[239, (v >> 8) as u8, v as u8, 254]).unwrap();
        assert_eq!(r.text, "A ");
    }

    #[test]
    fn test_x12_segment() {
        // '*', '>', 'A'
        let v: u32 = 1600 + 40 * 2 + 14 + 1;
        let r = decode_codewords(&[238, (v >> 8) as u8, v as u8, 254]).unwrap();
        assert_eq!(r.text, "*>A");
    }

    #[test]
    fn test_edifact_segment() {
        // "AB" + unlatch: 000001 000010 011111 000000 + trailing ASCII 'C', 'D'
        let bits: u32 = (0b000001 << 18) | (0b000010 << 12) | (0b011111 << 6);
        let r = decode_codewords(&[240, (bits >> 16) as u8, (bits >> 8) as u8, bits as u8, 68, 69])
            .unwrap();
        assert_eq!(r.text, "ABCD");
    }

    #[test]
    fn test_base256_segment() {
        let payload = [0xFFu8, 0x00, 0x41];
        let mut cw = vec![231u8];
        let randomize = |v: u32, pos: usize| ((v + ((149 * pos) % 255) as u32 + 1) % 256) as u8;
        cw.push(randomize(payload.len() as u32, 2));
        for (i, &b) in payload.iter().enumerate() {
            cw.push(randomize(b as u32, 3 + i));
        }
        let r = decode_codewords(&cw).unwrap();
        assert_eq!(r.byte_segments, vec![payload.to_vec()]);
        assert_eq!(r.text, "\u{ff}\u{0}A");
    }

    #[test]
    fn test_macro_05_trailer() {
        let r = decode_codewords(&[236, 66, 129]).unwrap();
        assert_eq!(r.text, "[)>\u{1e}05\u{1d}A\u{1e}\u{4}");
    }

    #[test]
    fn test_trailing_unlatch_accepted_only_at_end() {
        assert_eq!(decode_codewords(&[66, 254]).unwrap().text, "A");
        assert!(decode_codewords(&[66, 254, 66]).is_err());
        assert!(decode_codewords(&[0]).is_err());
    }

    #[test]
    fn test_unknown_eci_rejected() {
        assert!(decode_codewords(&[241, 100, 66]).is_err());
    }
}
