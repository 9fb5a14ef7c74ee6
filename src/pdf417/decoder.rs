//! PDF417 codeword decoding: error correction, length-descriptor repair and
//! the text/byte/numeric compaction parser with macro blocks.

use super::*;
use crate::ec::{GaloisField, ReedSolomonDecoder};
use crate::error::{Error, Result};
use crate::models::{DecoderResult, MacroMetadata};
use crate::utils::charset::EciStringBuilder;
use crate::utils::memory_pool::BufferPool;
use std::fmt::Write;
use tracing::debug;

/// Segment index codewords at the start of a macro block
const SEGMENT_INDEX_CODEWORDS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubMode {
    Alpha,
    Lower,
    Mixed,
    Punct,
    AlphaShift,
    PunctShift,
}

#[derive(Debug, Clone, Copy)]
enum TextValue {
    Char(u32),
    Latch,
    ByteShift(u8),
}

/// Correct and decode a full codeword stream read at `ec_level`
pub fn decode(codewords: &[u32], ec_level: u8) -> Result<DecoderResult> {
    decode_with_pool(codewords, ec_level, &mut BufferPool::new())
}

/// Decode using scratch storage from `pool`
pub fn decode_with_pool(codewords: &[u32], ec_level: u8, pool: &mut BufferPool) -> Result<DecoderResult> {
    if ec_level > MAX_EC_LEVEL {
        return Err(Error::Format("error-correction level out of range"));
    }
    if codewords.len() < 4 || codewords.len() > MAX_CODEWORDS {
        return Err(Error::Format("codeword count out of range"));
    }
    let num_ec = ec_codeword_count(ec_level);
    if num_ec > codewords.len() / 2 + 3 {
        return Err(Error::Uncorrectable);
    }

    let buffer = pool.codeword_buffer(codewords.len());
    buffer.copy_from_slice(codewords);
    let errors_corrected = ReedSolomonDecoder::new(GaloisField::pdf417())
        .decode(buffer, num_ec)
        .map_err(|_| Error::Uncorrectable)?;

    let data_len = buffer.len() - num_ec;
    match buffer[0] as usize {
        // Some encoders leave the descriptor empty
        0 => buffer[0] = data_len as u32,
        n if n > data_len => return Err(Error::Format("length descriptor exceeds data codewords")),
        _ => {}
    }
    debug!(
        codewords = codewords.len(),
        ec_level,
        errors_corrected,
        "corrected pdf417 codewords"
    );

    let mut result = decode_codewords(&buffer[..buffer[0] as usize])?;
    result.ec_level = Some(ec_level.to_string());
    result.errors_corrected = errors_corrected;
    Ok(result)
}

/// Parse corrected data codewords; `data[0]` is the length descriptor
pub fn decode_codewords(data: &[u32]) -> Result<DecoderResult> {
    let end = match data.first() {
        Some(&n) if n >= 1 && n as usize <= data.len() => n as usize,
        _ => return Err(Error::Format("invalid length descriptor")),
    };
    let mut parser = Parser {
        codewords: data,
        end,
        pos: 1,
        byte_segments: Vec::new(),
    };
    let mut out = EciStringBuilder::new();
    let mut macro_metadata = None;

    parser.text_compaction(&mut out)?;
    while parser.pos < parser.end {
        let code = parser.next()?;
        match code {
            TEXT_COMPACTION_LATCH => parser.text_compaction(&mut out)?,
            BYTE_COMPACTION_LATCH | BYTE_COMPACTION_LATCH_6 => parser.byte_compaction(code, &mut out)?,
            BYTE_SHIFT => out.append_byte(parser.next()? as u8),
            NUMERIC_COMPACTION_LATCH => parser.numeric_compaction(&mut out)?,
            ECI_CHARSET => out.append_eci(parser.next()?)?,
            // General-purpose and user-defined ECIs carry no charset
            ECI_GENERAL_PURPOSE => parser.skip(2)?,
            ECI_USER_DEFINED => parser.skip(1)?,
            MACRO_BLOCK => macro_metadata = Some(parser.macro_block()?),
            MACRO_OPTIONAL_FIELD | MACRO_TERMINATOR => {
                return Err(Error::Format("macro field outside a macro block"));
            }
            _ => {
                // Symbols without an initial mode default to text
                parser.pos -= 1;
                parser.text_compaction(&mut out)?;
            }
        }
    }

    if out.is_empty() && macro_metadata.is_none() {
        return Err(Error::Format("symbol carries no data"));
    }
    let mut result = DecoderResult::new(Vec::new(), out.finish());
    result.byte_segments = parser.byte_segments;
    result.macro_metadata = macro_metadata;
    Ok(result)
}

struct Parser<'a> {
    codewords: &'a [u32],
    end: usize,
    pos: usize,
    byte_segments: Vec<Vec<u8>>,
}

impl Parser<'_> {
    fn next(&mut self) -> Result<u32> {
        if self.pos >= self.end {
            return Err(Error::Format("codeword stream ended inside a segment"));
        }
        self.pos += 1;
        Ok(self.codewords[self.pos - 1])
    }

    fn peek(&self) -> Option<u32> {
        (self.pos < self.end).then(|| self.codewords[self.pos])
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        if self.pos + n > self.end {
            return Err(Error::Format("codeword stream ended inside an ECI"));
        }
        self.pos += n;
        Ok(())
    }

    fn text_compaction(&mut self, out: &mut EciStringBuilder) -> Result<()> {
        let mut values = Vec::with_capacity((self.end - self.pos) * 2);
        let mut sub_mode = SubMode::Alpha;
        while let Some(code) = self.peek() {
            self.pos += 1;
            match code {
                0..=899 => {
                    values.push(TextValue::Char(code / 30));
                    values.push(TextValue::Char(code % 30));
                }
                TEXT_COMPACTION_LATCH => values.push(TextValue::Latch),
                BYTE_COMPACTION_LATCH
                | BYTE_COMPACTION_LATCH_6
                | NUMERIC_COMPACTION_LATCH
                | MACRO_BLOCK
                | MACRO_OPTIONAL_FIELD
                | MACRO_TERMINATOR => {
                    self.pos -= 1;
                    break;
                }
                // Only the next codeword is a byte; text resumes after it
                BYTE_SHIFT => values.push(TextValue::ByteShift(self.next()? as u8)),
                ECI_CHARSET => {
                    sub_mode = decode_text(&values, sub_mode, out);
                    values.clear();
                    out.append_eci(self.next()?)?;
                }
                _ => {}
            }
        }
        decode_text(&values, sub_mode, out);
        Ok(())
    }

    fn byte_compaction(&mut self, mode: u32, out: &mut EciStringBuilder) -> Result<()> {
        let mut segment = Vec::new();
        while self.pos < self.end {
            while self.peek() == Some(ECI_CHARSET) {
                self.pos += 1;
                out.append_eci(self.next()?)?;
            }
            match self.peek() {
                Some(code) if code < TEXT_COMPACTION_LATCH => {}
                _ => break,
            }

            // Five codewords carry six bytes
            let mut value = 0u64;
            let mut count = 0;
            while let Some(code) = self.peek().filter(|&c| c < TEXT_COMPACTION_LATCH) {
                value = 900 * value + code as u64;
                self.pos += 1;
                count += 1;
                if count == 5 {
                    break;
                }
            }
            let more_follow = self.peek().is_some_and(|c| c < TEXT_COMPACTION_LATCH);
            if count == 5 && (mode == BYTE_COMPACTION_LATCH_6 || more_follow) {
                let bytes: Vec<u8> = (0..6).map(|i| (value >> (8 * (5 - i))) as u8).collect();
                out.append_bytes(&bytes);
                segment.extend_from_slice(&bytes);
                continue;
            }

            // A short tail is one byte per codeword
            self.pos -= count;
            while let Some(code) = self.peek() {
                if code < TEXT_COMPACTION_LATCH {
                    self.pos += 1;
                    out.append_byte(code as u8);
                    segment.push(code as u8);
                } else if code == ECI_CHARSET {
                    self.pos += 1;
                    out.append_eci(self.next()?)?;
                } else {
                    break;
                }
            }
            break;
        }
        if !segment.is_empty() {
            self.byte_segments.push(segment);
        }
        Ok(())
    }

    fn numeric_compaction(&mut self, out: &mut EciStringBuilder) -> Result<()> {
        let mut group = Vec::with_capacity(numeric::MAX_GROUP_CODEWORDS);
        while let Some(code) = self.peek() {
            self.pos += 1;
            let mut finished = self.pos == self.end;
            if code < TEXT_COMPACTION_LATCH {
                group.push(code);
            } else if matches!(
                code,
                TEXT_COMPACTION_LATCH
                    | BYTE_COMPACTION_LATCH
                    | BYTE_COMPACTION_LATCH_6
                    | MACRO_BLOCK
                    | MACRO_OPTIONAL_FIELD
                    | MACRO_TERMINATOR
                    | ECI_CHARSET
            ) {
                self.pos -= 1;
                finished = true;
            }
            // A repeated numeric latch closes the current group
            let close = group.len() == numeric::MAX_GROUP_CODEWORDS
                || code == NUMERIC_COMPACTION_LATCH
                || finished;
            if close && !group.is_empty() {
                out.append_ascii(&numeric::decode_group(&group)?);
                group.clear();
            }
            if finished {
                break;
            }
        }
        Ok(())
    }

    fn text_field(&mut self) -> Result<String> {
        let mut field = EciStringBuilder::new();
        self.text_compaction(&mut field)?;
        Ok(field.finish())
    }

    fn numeric_field<T: std::str::FromStr>(&mut self) -> Result<T> {
        let mut field = EciStringBuilder::new();
        self.numeric_compaction(&mut field)?;
        field
            .finish()
            .parse()
            .map_err(|_| Error::Format("macro field is not a number"))
    }

    fn macro_block(&mut self) -> Result<MacroMetadata> {
        if self.pos + SEGMENT_INDEX_CODEWORDS > self.end {
            return Err(Error::Format("macro block too short for a segment index"));
        }
        let index_digits =
            numeric::decode_group(&self.codewords[self.pos..self.pos + SEGMENT_INDEX_CODEWORDS])?;
        self.pos += SEGMENT_INDEX_CODEWORDS;
        let segment_index = if index_digits.is_empty() {
            0
        } else {
            index_digits
                .parse()
                .map_err(|_| Error::Format("segment index out of range"))?
        };

        // File id codewords are written as zero-filled three-digit numbers
        let mut file_id = String::new();
        while let Some(code) = self
            .peek()
            .filter(|&c| c != MACRO_TERMINATOR && c != MACRO_OPTIONAL_FIELD)
        {
            let _ = write!(file_id, "{code:03}");
            self.pos += 1;
        }
        if file_id.is_empty() {
            return Err(Error::Format("macro block without a file id"));
        }

        let mut meta = MacroMetadata {
            segment_index,
            file_id,
            ..Default::default()
        };
        let optional_start = (self.peek() == Some(MACRO_OPTIONAL_FIELD)).then_some(self.pos + 1);

        while let Some(code) = self.peek() {
            self.pos += 1;
            match code {
                MACRO_OPTIONAL_FIELD => match self.next()? {
                    FIELD_FILE_NAME => meta.file_name = Some(self.text_field()?),
                    FIELD_SENDER => meta.sender = Some(self.text_field()?),
                    FIELD_ADDRESSEE => meta.addressee = Some(self.text_field()?),
                    FIELD_SEGMENT_COUNT => meta.segment_count = Some(self.numeric_field()?),
                    FIELD_TIME_STAMP => meta.timestamp = Some(self.numeric_field()?),
                    FIELD_CHECKSUM => meta.checksum = Some(self.numeric_field()?),
                    FIELD_FILE_SIZE => meta.file_size = Some(self.numeric_field()?),
                    _ => return Err(Error::Format("unknown macro optional field")),
                },
                MACRO_TERMINATOR => meta.last_segment = true,
                _ => return Err(Error::Format("unexpected codeword in macro block")),
            }
        }

        if let Some(start) = optional_start {
            let mut len = self.pos - start;
            if meta.last_segment {
                len = len.saturating_sub(1);
            }
            if len > 0 {
                meta.optional_data = Some(self.codewords[start..start + len].to_vec());
            }
        }
        Ok(meta)
    }
}

/// Expand text values into characters; returns the latched sub-mode so a
/// run interrupted by an ECI continues where it left off
fn decode_text(values: &[TextValue], start: SubMode, out: &mut EciStringBuilder) -> SubMode {
    let mut sub_mode = start;
    let mut prior = start;
    let mut latched = start;
    for &value in values {
        let c = match value {
            TextValue::ByteShift(byte) => {
                out.append_byte(byte);
                if matches!(sub_mode, SubMode::AlphaShift | SubMode::PunctShift) {
                    sub_mode = prior;
                }
                continue;
            }
            TextValue::Latch => {
                if !matches!(sub_mode, SubMode::AlphaShift | SubMode::PunctShift) {
                    latched = SubMode::Alpha;
                }
                sub_mode = SubMode::Alpha;
                continue;
            }
            TextValue::Char(c) => c,
        };

        let ch = match sub_mode {
            SubMode::Alpha | SubMode::Lower => {
                let base = if sub_mode == SubMode::Alpha { b'A' } else { b'a' };
                match c {
                    0..=25 => Some(base + c as u8),
                    26 => Some(b' '),
                    LL if sub_mode == SubMode::Alpha => {
                        sub_mode = SubMode::Lower;
                        latched = sub_mode;
                        None
                    }
                    AS => {
                        prior = sub_mode;
                        sub_mode = SubMode::AlphaShift;
                        None
                    }
                    ML => {
                        sub_mode = SubMode::Mixed;
                        latched = sub_mode;
                        None
                    }
                    _ => {
                        prior = sub_mode;
                        sub_mode = SubMode::PunctShift;
                        None
                    }
                }
            }
            SubMode::Mixed => match c {
                0..=24 => Some(MIXED_CHARS[c as usize]),
                PL => {
                    sub_mode = SubMode::Punct;
                    latched = sub_mode;
                    None
                }
                26 => Some(b' '),
                LL => {
                    sub_mode = SubMode::Lower;
                    latched = sub_mode;
                    None
                }
                AL => {
                    sub_mode = SubMode::Alpha;
                    latched = sub_mode;
                    None
                }
                _ => {
                    prior = sub_mode;
                    sub_mode = SubMode::PunctShift;
                    None
                }
            },
            SubMode::Punct => match c {
                0..=28 => Some(PUNCT_CHARS[c as usize]),
                _ => {
                    sub_mode = SubMode::Alpha;
                    latched = sub_mode;
                    None
                }
            },
            SubMode::AlphaShift => {
                sub_mode = prior;
                match c {
                    0..=25 => Some(b'A' + c as u8),
                    26 => Some(b' '),
                    _ => None,
                }
            }
            SubMode::PunctShift => {
                sub_mode = prior;
                match c {
                    0..=28 => Some(PUNCT_CHARS[c as usize]),
                    _ => {
                        sub_mode = SubMode::Alpha;
                        None
                    }
                }
            }
        };
        if let Some(ch) = ch {
            out.append_byte(ch);
        }
    }
    latched
}
