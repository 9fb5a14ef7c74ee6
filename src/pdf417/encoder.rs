//! PDF417 high-level encoding, macro blocks, dimension choice and check
//! codewords.

use super::*;
use crate::ec::{GaloisField, ReedSolomonEncoder};
use crate::error::{Error, Result};
use crate::models::MacroMetadata;
use tracing::{debug, trace};

/// Digit runs at least this long switch to numeric compaction
const MIN_NUMERIC_RUN: usize = 13;
/// Text runs at least this long switch to text compaction
const MIN_TEXT_RUN: usize = 5;

const PREFERRED_RATIO: f32 = 3.0;
const MODULE_WIDTH: f32 = 0.357;
const ROW_HEIGHT: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubMode {
    Alpha,
    Lower,
    Mixed,
    Punct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Text,
    Byte,
    Numeric,
}

/// Encode text. Without an explicit charset, text outside ISO-8859-1 is
/// carried as UTF-8 behind an ECI designator.
pub fn encode(text: &str, options: &Pdf417Options) -> Result<Pdf417Code> {
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
pub fn encode_bytes(data: &[u8], options: &Pdf417Options) -> Result<Pdf417Code> {
    encode_with_eci(data, options.charset.map(|c| c.value()), options)
}

fn encode_with_eci(data: &[u8], eci: Option<u32>, options: &Pdf417Options) -> Result<Pdf417Code> {
    if data.is_empty() && options.macro_block.is_none() {
        return Err(Error::invalid("found empty contents"));
    }
    if options.ec_level > MAX_EC_LEVEL {
        return Err(Error::invalid(format!(
            "error correction level must be between 0 and {MAX_EC_LEVEL}"
        )));
    }
    let message = high_level_encode(data, options.compaction, eci)?;
    let macro_block = match &options.macro_block {
        Some(meta) => macro_block_codewords(meta)?,
        None => Vec::new(),
    };

    let num_ec = ec_codeword_count(options.ec_level);
    let source = message.len() + macro_block.len();
    if source + num_ec + 1 > MAX_CODEWORDS {
        return Err(Error::invalid(
            "encoded message contains too many code words, message too big",
        ));
    }
    let (columns, rows) = determine_dimensions(source, num_ec, options)?;
    let pad = pad_codeword_count(source, num_ec, columns, rows);
    debug!(source, num_ec, columns, rows, pad, "chose pdf417 dimensions");

    // Padding goes between the data and the macro block, which must stay last
    let mut codewords = Vec::with_capacity(columns * rows);
    codewords.push((source + pad + 1) as u32);
    codewords.extend_from_slice(&message);
    codewords.extend(std::iter::repeat_n(TEXT_COMPACTION_LATCH, pad));
    codewords.extend_from_slice(&macro_block);
    let check = ReedSolomonEncoder::new(GaloisField::pdf417()).check_words(&codewords, num_ec);
    codewords.extend(check);

    Ok(Pdf417Code {
        codewords,
        columns,
        rows,
        ec_level: options.ec_level,
    })
}

/// Compact bytes into data codewords (no length descriptor)
pub fn high_level_encode(data: &[u8], compaction: Compaction, eci: Option<u32>) -> Result<Vec<u32>> {
    let mut out = Vec::with_capacity(data.len());
    if let Some(value) = eci {
        // Registry values all fit the single-codeword form
        if value >= 900 {
            return Err(Error::UnsupportedEci(value));
        }
        out.push(ECI_CHARSET);
        out.push(value);
    }

    match compaction {
        Compaction::Text => {
            encode_text(data, SubMode::Alpha, &mut out)?;
        }
        Compaction::Byte => encode_binary(data, Mode::Byte, &mut out),
        Compaction::Numeric => {
            if !data.iter().all(u8::is_ascii_digit) {
                return Err(Error::invalid("numeric compaction requires digits only"));
            }
            out.push(NUMERIC_COMPACTION_LATCH);
            encode_numeric(data, &mut out);
        }
        Compaction::Auto => encode_auto(data, &mut out)?,
    }
    Ok(out)
}

fn encode_auto(data: &[u8], out: &mut Vec<u32>) -> Result<()> {
    let mut mode = Mode::Text;
    let mut sub_mode = SubMode::Alpha;
    let mut p = 0;
    while p < data.len() {
        let digits = digit_run(data, p);
        if digits >= MIN_NUMERIC_RUN {
            trace!(at = p, digits, "numeric run");
            out.push(NUMERIC_COMPACTION_LATCH);
            mode = Mode::Numeric;
            sub_mode = SubMode::Alpha;
            encode_numeric(&data[p..p + digits], out);
            p += digits;
            continue;
        }

        let text = text_run(data, p);
        if text >= MIN_TEXT_RUN || digits == data.len() {
            if mode != Mode::Text {
                out.push(TEXT_COMPACTION_LATCH);
                mode = Mode::Text;
                sub_mode = SubMode::Alpha;
            }
            sub_mode = encode_text(&data[p..p + text], sub_mode, out)?;
            p += text;
            continue;
        }

        let bytes = binary_run(data, p).max(1);
        trace!(at = p, bytes, "byte run");
        if bytes == 1 && mode == Mode::Text {
            // Shifted byte; the text sub-mode survives
            encode_binary(&data[p..p + 1], Mode::Text, out);
        } else {
            encode_binary(&data[p..p + bytes], mode, out);
            mode = Mode::Byte;
            sub_mode = SubMode::Alpha;
        }
        p += bytes;
    }
    Ok(())
}

fn is_text(c: u8) -> bool {
    matches!(c, b'\t' | b'\n' | b'\r' | 32..=126)
}

fn is_alpha_upper(c: u8) -> bool {
    c == b' ' || c.is_ascii_uppercase()
}

fn is_alpha_lower(c: u8) -> bool {
    c == b' ' || c.is_ascii_lowercase()
}

fn mixed_value(c: u8) -> Option<u32> {
    if c == b' ' {
        return Some(26);
    }
    MIXED_CHARS.iter().position(|&m| m == c).map(|p| p as u32)
}

fn punct_value(c: u8) -> Option<u32> {
    PUNCT_CHARS.iter().position(|&m| m == c).map(|p| p as u32)
}

fn digit_run(data: &[u8], start: usize) -> usize {
    data[start..].iter().take_while(|c| c.is_ascii_digit()).count()
}

/// Text characters from `start`, stopping before a digit run long enough
/// for numeric compaction
fn text_run(data: &[u8], start: usize) -> usize {
    let mut idx = start;
    while idx < data.len() {
        let digits = data[idx..]
            .iter()
            .take(MIN_NUMERIC_RUN)
            .take_while(|c| c.is_ascii_digit())
            .count();
        if digits >= MIN_NUMERIC_RUN {
            return idx - start;
        }
        if digits > 0 {
            idx += digits;
            continue;
        }
        if !is_text(data[idx]) {
            break;
        }
        idx += 1;
    }
    idx - start
}

/// Bytes from `start` up to the next digit run long enough for numeric
/// compaction
fn binary_run(data: &[u8], start: usize) -> usize {
    (start..data.len())
        .find(|&idx| {
            data[idx..]
                .iter()
                .take(MIN_NUMERIC_RUN)
                .take_while(|c| c.is_ascii_digit())
                .count()
                >= MIN_NUMERIC_RUN
        })
        .unwrap_or(data.len())
        - start
}

/// Text compaction starting in `initial`; returns the sub-mode the decoder
/// will be in afterwards
fn encode_text(msg: &[u8], initial: SubMode, out: &mut Vec<u32>) -> Result<SubMode> {
    let not_text = |c: u8| Error::invalid(format!("byte {c:#04x} cannot be text compacted"));
    let mut values: Vec<u32> = Vec::with_capacity(msg.len() * 2);
    let mut sub_mode = initial;
    let mut idx = 0;
    while idx < msg.len() {
        let ch = msg[idx];
        if !is_text(ch) {
            return Err(not_text(ch));
        }
        match sub_mode {
            SubMode::Alpha => {
                if is_alpha_upper(ch) {
                    values.push(if ch == b' ' { 26 } else { (ch - b'A') as u32 });
                } else if is_alpha_lower(ch) {
                    sub_mode = SubMode::Lower;
                    values.push(LL);
                    continue;
                } else if mixed_value(ch).is_some() {
                    sub_mode = SubMode::Mixed;
                    values.push(ML);
                    continue;
                } else {
                    values.push(PS);
                    values.push(punct_value(ch).ok_or_else(|| not_text(ch))?);
                }
            }
            SubMode::Lower => {
                if is_alpha_lower(ch) {
                    values.push(if ch == b' ' { 26 } else { (ch - b'a') as u32 });
                } else if is_alpha_upper(ch) {
                    values.push(AS);
                    values.push((ch - b'A') as u32);
                } else if mixed_value(ch).is_some() {
                    sub_mode = SubMode::Mixed;
                    values.push(ML);
                    continue;
                } else {
                    values.push(PS);
                    values.push(punct_value(ch).ok_or_else(|| not_text(ch))?);
                }
            }
            SubMode::Mixed => {
                if let Some(v) = mixed_value(ch) {
                    values.push(v);
                } else if is_alpha_upper(ch) {
                    sub_mode = SubMode::Alpha;
                    values.push(AL);
                    continue;
                } else if is_alpha_lower(ch) {
                    sub_mode = SubMode::Lower;
                    values.push(LL);
                    continue;
                } else if msg.get(idx + 1).is_some_and(|&next| punct_value(next).is_some()) {
                    sub_mode = SubMode::Punct;
                    values.push(PL);
                    continue;
                } else {
                    values.push(PS);
                    values.push(punct_value(ch).ok_or_else(|| not_text(ch))?);
                }
            }
            SubMode::Punct => {
                if let Some(v) = punct_value(ch) {
                    values.push(v);
                } else {
                    sub_mode = SubMode::Alpha;
                    values.push(PAL);
                    continue;
                }
            }
        }
        idx += 1;
    }

    for pair in values.chunks(2) {
        match *pair {
            [high, low] => out.push(high * 30 + low),
            // An odd value count is filled with PS, which in punctuation
            // mode reads as a latch back to alpha
            [high] => {
                out.push(high * 30 + PS);
                if sub_mode == SubMode::Punct {
                    sub_mode = SubMode::Alpha;
                }
            }
            _ => {}
        }
    }
    Ok(sub_mode)
}

/// Byte compaction: six bytes per five codewords, then one codeword per
/// remaining byte. A single byte inside text uses the byte shift.
fn encode_binary(bytes: &[u8], start_mode: Mode, out: &mut Vec<u32>) {
    if bytes.len() == 1 && start_mode == Mode::Text {
        out.push(BYTE_SHIFT);
    } else if bytes.len() % 6 == 0 {
        out.push(BYTE_COMPACTION_LATCH_6);
    } else {
        out.push(BYTE_COMPACTION_LATCH);
    }
    let mut groups = bytes.chunks_exact(6);
    for group in &mut groups {
        let mut value = group.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64);
        let mut chars = [0u32; 5];
        for slot in chars.iter_mut().rev() {
            *slot = (value % 900) as u32;
            value /= 900;
        }
        out.extend_from_slice(&chars);
    }
    out.extend(groups.remainder().iter().map(|&b| b as u32));
}

fn encode_numeric(digits: &[u8], out: &mut Vec<u32>) {
    for group in digits.chunks(numeric::MAX_GROUP_DIGITS) {
        out.extend(numeric::encode_group(group));
    }
}

/// Macro PDF417 control block for `meta`
pub fn macro_block_codewords(meta: &MacroMetadata) -> Result<Vec<u32>> {
    if meta.segment_index > 99_999 {
        return Err(Error::invalid("segment index must be below 100000"));
    }
    let file_id = meta.file_id.as_bytes();
    if file_id.is_empty() || file_id.len() % 3 != 0 || !file_id.iter().all(u8::is_ascii_digit) {
        return Err(Error::invalid("file id must be groups of three digits"));
    }

    let mut out = vec![MACRO_BLOCK];
    out.extend(numeric::encode_group(format!("{:05}", meta.segment_index).as_bytes()));
    for triple in file_id.chunks(3) {
        let value = triple.iter().fold(0u32, |acc, &d| acc * 10 + (d - b'0') as u32);
        if value >= 900 {
            return Err(Error::invalid("file id groups must be below 900"));
        }
        out.push(value);
    }

    let text_field = |tag: u32, value: &Option<String>, out: &mut Vec<u32>| -> Result<()> {
        if let Some(text) = value {
            out.push(MACRO_OPTIONAL_FIELD);
            out.push(tag);
            encode_text(text.as_bytes(), SubMode::Alpha, out)?;
        }
        Ok(())
    };
    text_field(FIELD_FILE_NAME, &meta.file_name, &mut out)?;
    text_field(FIELD_SENDER, &meta.sender, &mut out)?;
    text_field(FIELD_ADDRESSEE, &meta.addressee, &mut out)?;

    let numeric_fields = [
        (FIELD_SEGMENT_COUNT, meta.segment_count.map(u64::from)),
        (FIELD_TIME_STAMP, meta.timestamp),
        (FIELD_FILE_SIZE, meta.file_size),
        (FIELD_CHECKSUM, meta.checksum.map(u64::from)),
    ];
    for (tag, value) in numeric_fields {
        if let Some(value) = value {
            out.push(MACRO_OPTIONAL_FIELD);
            out.push(tag);
            encode_numeric(value.to_string().as_bytes(), &mut out);
        }
    }

    if meta.last_segment {
        out.push(MACRO_TERMINATOR);
    }
    Ok(out)
}

fn rows_for(source: usize, num_ec: usize, columns: usize) -> usize {
    let total = source + 1 + num_ec;
    let mut rows = total / columns + 1;
    if columns * rows >= total + columns {
        rows -= 1;
    }
    rows
}

fn pad_codeword_count(source: usize, num_ec: usize, columns: usize, rows: usize) -> usize {
    let n = columns * rows - num_ec;
    n.saturating_sub(source + 1)
}

/// Columns and rows whose aspect ratio is closest to 3:1 within the limits
pub fn determine_dimensions(source: usize, num_ec: usize, options: &Pdf417Options) -> Result<(usize, usize)> {
    let mut best: Option<(f32, usize, usize)> = None;
    for columns in options.min_columns.max(1)..=options.max_columns {
        let rows = rows_for(source, num_ec, columns);
        if rows < options.min_rows {
            break;
        }
        if rows > options.max_rows {
            continue;
        }
        let ratio = (17 * columns + 69) as f32 * MODULE_WIDTH / (rows as f32 * ROW_HEIGHT);
        if let Some((best_ratio, _, _)) = best {
            if (ratio - PREFERRED_RATIO).abs() > (best_ratio - PREFERRED_RATIO).abs() {
                continue;
            }
        }
        best = Some((ratio, columns, rows));
    }

    if let Some((_, columns, rows)) = best {
        return Ok((columns, rows));
    }
    // Too little data for even the minimum row count
    let columns = options.min_columns.max(1);
    if rows_for(source, num_ec, columns) < options.min_rows {
        return Ok((columns, options.min_rows));
    }
    Err(Error::invalid("unable to fit message in columns"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf417::decoder::{decode, decode_codewords};

    fn data_codewords(text: &str) -> Vec<u32> {
        high_level_encode(text.as_bytes(), Compaction::Auto, None).unwrap()
    }

    fn with_descriptor(mut cw: Vec<u32>) -> Vec<u32> {
        cw.insert(0, cw.len() as u32 + 1);
        cw
    }

    #[test]
    fn test_text_compaction_pairs() {
        // "ABCDE" = (0,1) (2,3) (4,PS)
        assert_eq!(data_codewords("ABCDE"), vec![1, 2 * 30 + 3, 4 * 30 + 29]);
    }

    #[test]
    fn test_auto_picks_numeric_for_long_digit_runs() {
        let cw = data_codewords("000213298174000");
        assert_eq!(cw, vec![NUMERIC_COMPACTION_LATCH, 1, 624, 434, 632, 282, 200]);
        // Short digit-only messages stay in text
        assert_eq!(data_codewords("1234")[0] / 30, ML);
    }

    #[test]
    fn test_single_byte_uses_shift() {
        let cw = high_level_encode(b"ABCDE\xe9", Compaction::Auto, None).unwrap();
        assert_eq!(cw[3], BYTE_SHIFT);
        let r = decode_codewords(&with_descriptor(cw)).unwrap();
        assert_eq!(r.text, "ABCDEé");
    }

    #[test]
    fn test_auto_round_trips() {
        for text in [
            "Hello, World!",
            "PDF417 mixes: text, 1234567890123456 digits; and punctuation!!",
            "lower UPPER lower 42 @#$%",
            "tabs\tand\nnewlines\r",
            "odd punct run a;<>b",
        ] {
            let r = decode_codewords(&with_descriptor(data_codewords(text))).unwrap();
            assert_eq!(r.text, text, "{text}");
        }
    }

    #[test]
    fn test_byte_compaction_round_trip() {
        let data: Vec<u8> = (0u8..=255).collect();
        for len in [2, 6, 7, 11, 12, 256] {
            let cw = high_level_encode(&data[..len], Compaction::Byte, None).unwrap();
            let expected_latch = if len % 6 == 0 {
                BYTE_COMPACTION_LATCH_6
            } else {
                BYTE_COMPACTION_LATCH
            };
            assert_eq!(cw[0], expected_latch);
            let r = decode_codewords(&with_descriptor(cw)).unwrap();
            assert_eq!(r.byte_segments.concat(), data[..len].to_vec(), "len {len}");
        }
    }

    #[test]
    fn test_forced_modes_reject_bad_input() {
        assert!(high_level_encode(b"12a", Compaction::Numeric, None).is_err());
        assert!(high_level_encode(b"\x01", Compaction::Text, None).is_err());
        assert!(high_level_encode(b"x", Compaction::Text, Some(900)).is_err());
    }

    #[test]
    fn test_dimensions() {
        let options = Pdf417Options::default();
        let (columns, rows) = determine_dimensions(10, 8, &options).unwrap();
        assert!(columns * rows >= 19);
        assert!((3..=90).contains(&rows));

        let narrow = Pdf417Options {
            max_columns: 1,
            max_rows: 5,
            ..Default::default()
        };
        assert!(determine_dimensions(100, 8, &narrow).is_err());
    }

    #[test]
    fn test_full_encode_round_trip() {
        let options = Pdf417Options::default();
        let code = encode("Structured text 1234567890123 and more", &options).unwrap();
        assert_eq!(code.codewords.len(), code.columns * code.rows);
        let r = decode(&code.codewords, code.ec_level).unwrap();
        assert_eq!(r.text, "Structured text 1234567890123 and more");
        assert_eq!(r.ec_level.as_deref(), Some("2"));
    }

    #[test]
    fn test_utf8_fallback() {
        let code = encode("Ω ohm", &Pdf417Options::default()).unwrap();
        assert_eq!(&code.codewords[1..3], &[ECI_CHARSET, 26]);
        assert_eq!(decode(&code.codewords, code.ec_level).unwrap().text, "Ω ohm");
    }

    #[test]
    fn test_macro_round_trip() {
        let meta = MacroMetadata {
            segment_index: 3,
            file_id: "017053".into(),
            last_segment: true,
            segment_count: Some(4),
            file_name: Some("report.txt".into()),
            timestamp: Some(1_700_000_000),
            file_size: Some(123_456),
            checksum: Some(0xBEEF),
            ..Default::default()
        };
        let options = Pdf417Options {
            macro_block: Some(meta.clone()),
            ..Default::default()
        };
        let code = encode("part three", &options).unwrap();
        let r = decode(&code.codewords, code.ec_level).unwrap();
        assert_eq!(r.text, "part three");
        let got = r.macro_metadata.unwrap();
        assert_eq!(got.segment_index, 3);
        assert_eq!(got.file_id, "017053");
        assert_eq!(got.segment_count, Some(4));
        assert_eq!(got.file_name.as_deref(), Some("report.txt"));
        assert_eq!(got.timestamp, Some(1_700_000_000));
        assert_eq!(got.file_size, Some(123_456));
        assert_eq!(got.checksum, Some(0xBEEF));
        assert!(got.last_segment);
    }

    #[test]
    fn test_macro_validation() {
        let bad_id = MacroMetadata {
            file_id: "12".into(),
            ..Default::default()
        };
        assert!(macro_block_codewords(&bad_id).is_err());
        let big_group = MacroMetadata {
            file_id: "950".into(),
            ..Default::default()
        };
        assert!(macro_block_codewords(&big_group).is_err());
    }

    #[test]
    fn test_empty_and_bad_level() {
        assert!(encode("", &Pdf417Options::default()).is_err());
        let options = Pdf417Options {
            ec_level: 9,
            ..Default::default()
        };
        assert!(encode("x", &options).is_err());
    }
}
