//! Extended Channel Interpretation (ECI) character-set registry and the
//! byte buffer that turns decoded bytes into text.

use crate::error::{Error, Result};
use encoding_rs::Encoding;

/// Character sets reachable through an ECI designator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterSetEci {
    /// IBM code page 437
    Cp437,
    /// Latin-1
    Iso8859_1,
    /// Latin-2, Central European
    Iso8859_2,
    /// Latin-3, South European
    Iso8859_3,
    /// Latin-4, North European
    Iso8859_4,
    /// Cyrillic
    Iso8859_5,
    /// Arabic
    Iso8859_6,
    /// Greek
    Iso8859_7,
    /// Hebrew
    Iso8859_8,
    /// Latin-5, Turkish
    Iso8859_9,
    /// Latin-6, Nordic
    Iso8859_10,
    /// Thai
    Iso8859_11,
    /// Latin-7, Baltic Rim
    Iso8859_13,
    /// Latin-8, Celtic
    Iso8859_14,
    /// Latin-9
    Iso8859_15,
    /// Latin-10, South-Eastern European
    Iso8859_16,
    /// Shift JIS
    ShiftJis,
    /// windows-1250
    Cp1250,
    /// windows-1251
    Cp1251,
    /// windows-1252
    Cp1252,
    /// windows-1256
    Cp1256,
    /// UTF-16, big-endian
    Utf16Be,
    /// UTF-8
    Utf8,
    /// US-ASCII
    Ascii,
    /// Big5
    Big5,
    /// GB 18030
    Gb18030,
    /// EUC-KR
    EucKr,
}

use CharacterSetEci::*;

const REGISTRY: [(CharacterSetEci, &[u32], &[&str]); 27] = [
    (Cp437, &[0, 2], &["Cp437", "IBM437"]),
    (Iso8859_1, &[1, 3], &["ISO-8859-1", "ISO8859_1", "Latin1"]),
    (Iso8859_2, &[4], &["ISO-8859-2", "ISO8859_2"]),
    (Iso8859_3, &[5], &["ISO-8859-3", "ISO8859_3"]),
    (Iso8859_4, &[6], &["ISO-8859-4", "ISO8859_4"]),
    (Iso8859_5, &[7], &["ISO-8859-5", "ISO8859_5"]),
    (Iso8859_6, &[8], &["ISO-8859-6", "ISO8859_6"]),
    (Iso8859_7, &[9], &["ISO-8859-7", "ISO8859_7"]),
    (Iso8859_8, &[10], &["ISO-8859-8", "ISO8859_8"]),
    (Iso8859_9, &[11], &["ISO-8859-9", "ISO8859_9"]),
    (Iso8859_10, &[12], &["ISO-8859-10", "ISO8859_10"]),
    (Iso8859_11, &[13], &["ISO-8859-11", "ISO8859_11"]),
    (Iso8859_13, &[15], &["ISO-8859-13", "ISO8859_13"]),
    (Iso8859_14, &[16], &["ISO-8859-14", "ISO8859_14"]),
    (Iso8859_15, &[17], &["ISO-8859-15", "ISO8859_15"]),
    (Iso8859_16, &[18], &["ISO-8859-16", "ISO8859_16"]),
    (ShiftJis, &[20], &["Shift_JIS", "SJIS"]),
    (Cp1250, &[21], &["windows-1250", "Cp1250"]),
    (Cp1251, &[22], &["windows-1251", "Cp1251"]),
    (Cp1252, &[23], &["windows-1252", "Cp1252"]),
    (Cp1256, &[24], &["windows-1256", "Cp1256"]),
    (Utf16Be, &[25], &["UTF-16BE", "UnicodeBig", "UnicodeBigUnmarked"]),
    (Utf8, &[26], &["UTF-8", "UTF8"]),
    (Ascii, &[27, 170], &["US-ASCII", "ASCII"]),
    (Big5, &[28], &["Big5"]),
    (Gb18030, &[29], &["GB18030", "GB2312", "EUC_CN", "GBK"]),
    (EucKr, &[30], &["EUC-KR", "EUC_KR"]),
];

/// Cp437 code points for bytes 0x80-0xFF
const CP437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', //
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ', //
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»', //
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐', //
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧', //
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀', //
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩', //
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{a0}',
];

impl CharacterSetEci {
    /// Look up the character set designated by an ECI value
    pub fn from_value(value: u32) -> Option<Self> {
        REGISTRY
            .iter()
            .find(|(_, values, _)| values.contains(&value))
            .map(|(cs, _, _)| *cs)
    }

    /// Look up a character set by any of its names (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        REGISTRY
            .iter()
            .find(|(_, _, names)| names.iter().any(|n| n.eq_ignore_ascii_case(name)))
            .map(|(cs, _, _)| *cs)
    }

    fn entry(self) -> &'static (CharacterSetEci, &'static [u32], &'static [&'static str]) {
        REGISTRY
            .iter()
            .find(|(cs, _, _)| *cs == self)
            .unwrap_or(&REGISTRY[1])
    }

    /// Preferred ECI value for this character set
    pub fn value(self) -> u32 {
        self.entry().1[0]
    }

    /// Canonical name
    pub fn name(self) -> &'static str {
        self.entry().2[0]
    }

    fn encoding(self) -> Option<&'static Encoding> {
        Some(match self {
            Iso8859_2 => encoding_rs::ISO_8859_2,
            Iso8859_3 => encoding_rs::ISO_8859_3,
            Iso8859_4 => encoding_rs::ISO_8859_4,
            Iso8859_5 => encoding_rs::ISO_8859_5,
            Iso8859_6 => encoding_rs::ISO_8859_6,
            Iso8859_7 => encoding_rs::ISO_8859_7,
            Iso8859_8 => encoding_rs::ISO_8859_8,
            Iso8859_9 => encoding_rs::WINDOWS_1254,
            Iso8859_10 => encoding_rs::ISO_8859_10,
            Iso8859_11 => encoding_rs::WINDOWS_874,
            Iso8859_13 => encoding_rs::ISO_8859_13,
            Iso8859_14 => encoding_rs::ISO_8859_14,
            Iso8859_15 => encoding_rs::ISO_8859_15,
            Iso8859_16 => encoding_rs::ISO_8859_16,
            ShiftJis => encoding_rs::SHIFT_JIS,
            Cp1250 => encoding_rs::WINDOWS_1250,
            Cp1251 => encoding_rs::WINDOWS_1251,
            Cp1252 => encoding_rs::WINDOWS_1252,
            Cp1256 => encoding_rs::WINDOWS_1256,
            Big5 => encoding_rs::BIG5,
            Gb18030 => encoding_rs::GB18030,
            EucKr => encoding_rs::EUC_KR,
            Cp437 | Iso8859_1 | Utf16Be | Utf8 | Ascii => return None,
        })
    }

    /// Decode bytes into text; unmappable sequences become U+FFFD
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Iso8859_1 => bytes.iter().map(|&b| b as char).collect(),
            Ascii => bytes
                .iter()
                .map(|&b| if b < 0x80 { b as char } else { '\u{fffd}' })
                .collect(),
            Cp437 => bytes
                .iter()
                .map(|&b| {
                    if b < 0x80 {
                        b as char
                    } else {
                        CP437_HIGH[(b - 0x80) as usize]
                    }
                })
                .collect(),
            Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Utf16Be => encoding_rs::UTF_16BE
                .decode_without_bom_handling(bytes)
                .0
                .into_owned(),
            Iso8859_9 | Iso8859_11 => {
                let enc = self.encoding().unwrap_or(encoding_rs::WINDOWS_1252);
                let mut out = String::with_capacity(bytes.len());
                for run in bytes.chunk_by(|a, b| is_c1(*a) == is_c1(*b)) {
                    if is_c1(run[0]) {
                        out.extend(run.iter().map(|&b| b as char));
                    } else {
                        out.push_str(&enc.decode_without_bom_handling(run).0);
                    }
                }
                out
            }
            other => match other.encoding() {
                Some(enc) => enc.decode_without_bom_handling(bytes).0.into_owned(),
                None => String::from_utf8_lossy(bytes).into_owned(),
            },
        }
    }

    /// Encode text into this character set
    pub fn encode(self, text: &str) -> Result<Vec<u8>> {
        let unmappable = |c: char| Error::invalid(format!("'{c}' is not representable in {}", self.name()));
        match self {
            Iso8859_1 => text
                .chars()
                .map(|c| u8::try_from(c as u32).map_err(|_| unmappable(c)))
                .collect(),
            Ascii => text
                .chars()
                .map(|c| if c.is_ascii() { Ok(c as u8) } else { Err(unmappable(c)) })
                .collect(),
            Cp437 => text
                .chars()
                .map(|c| {
                    if c.is_ascii() {
                        Ok(c as u8)
                    } else {
                        CP437_HIGH
                            .iter()
                            .position(|&h| h == c)
                            .map(|p| 0x80 + p as u8)
                            .ok_or_else(|| unmappable(c))
                    }
                })
                .collect(),
            Utf8 => Ok(text.as_bytes().to_vec()),
            Utf16Be => Ok(text.encode_utf16().flat_map(|u| u.to_be_bytes()).collect()),
            Iso8859_9 | Iso8859_11 => {
                let enc = self.encoding().unwrap_or(encoding_rs::WINDOWS_1252);
                let mut out = Vec::with_capacity(text.len());
                let mut buf = [0u8; 4];
                for c in text.chars() {
                    if (0x80..=0x9F).contains(&(c as u32)) {
                        out.push(c as u8);
                        continue;
                    }
                    let (bytes, _, had_errors) = enc.encode(c.encode_utf8(&mut buf));
                    // The windows superset fills 0x80-0x9F with printable characters
                    if had_errors || bytes.iter().any(|&b| is_c1(b)) {
                        return Err(unmappable(c));
                    }
                    out.extend_from_slice(&bytes);
                }
                Ok(out)
            }
            other => {
                let enc = other.encoding().unwrap_or(encoding_rs::UTF_8);
                let (bytes, _, had_errors) = enc.encode(text);
                if had_errors {
                    return Err(Error::invalid(format!(
                        "text is not representable in {}",
                        other.name()
                    )));
                }
                Ok(bytes.into_owned())
            }
        }
    }
}

/// C1 control range. ISO-8859-9 and ISO-8859-11 keep it as controls; their
/// windows supersets put printable characters there.
fn is_c1(b: u8) -> bool {
    (0x80..=0x9F).contains(&b)
}

/// Text accumulator that defers byte-to-character conversion.
///
/// Bytes collect in a pending buffer and are converted with whichever
/// character set is active when the buffer is flushed, i.e. on an ECI change
/// or at the end of decoding.
#[derive(Debug, Clone)]
pub struct EciStringBuilder {
    pending: Vec<u8>,
    result: String,
    charset: CharacterSetEci,
}

impl Default for EciStringBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EciStringBuilder {
    /// Empty builder starting in ISO-8859-1
    pub fn new() -> Self {
        Self::with_charset(CharacterSetEci::Iso8859_1)
    }

    /// Empty builder with an explicit starting character set
    pub fn with_charset(charset: CharacterSetEci) -> Self {
        Self {
            pending: Vec::new(),
            result: String::new(),
            charset,
        }
    }

    /// Queue one byte
    pub fn append_byte(&mut self, byte: u8) {
        self.pending.push(byte);
    }

    /// Queue bytes
    pub fn append_bytes(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Queue an ASCII string as bytes
    pub fn append_ascii(&mut self, s: &str) {
        self.pending.extend_from_slice(s.as_bytes());
    }

    /// Flush and switch to the character set designated by `value`
    pub fn append_eci(&mut self, value: u32) -> Result<()> {
        let charset = CharacterSetEci::from_value(value).ok_or(Error::UnsupportedEci(value))?;
        self.flush();
        self.charset = charset;
        Ok(())
    }

    /// Flush, then append already-decoded text
    pub fn append_text(&mut self, text: &str) {
        self.flush();
        self.result.push_str(text);
    }

    /// Character set currently in effect
    pub fn charset(&self) -> CharacterSetEci {
        self.charset
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            let text = self.charset.decode(&self.pending);
            self.result.push_str(&text);
            self.pending.clear();
        }
    }

    /// Number of characters produced so far, pending bytes included
    pub fn char_len(&self) -> usize {
        self.result.chars().count() + self.charset.decode(&self.pending).chars().count()
    }

    /// True when nothing has been appended
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.result.is_empty()
    }

    /// Flush and return the text
    pub fn finish(mut self) -> String {
        self.flush();
        self.result
    }
}
