/// Outcome of a successful decode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecoderResult {
    /// Corrected payload bits/bytes as read from the symbol
    pub raw_bytes: Vec<u8>,
    /// Number of valid bits in `raw_bytes`
    pub num_bits: usize,
    /// Decoded text
    pub text: String,
    /// Byte segments that were carried verbatim (Base256 / byte compaction)
    pub byte_segments: Vec<Vec<u8>>,
    /// Error-correction level label ("23%" for Aztec, "2" for PDF417)
    pub ec_level: Option<String>,
    /// Number of codewords the Reed-Solomon stage repaired
    pub errors_corrected: usize,
    /// AIM symbology modifier derived from ECI / FNC1 usage (0 when unused)
    pub symbology_modifier: u8,
    /// Structured-append metadata when the symbol carried a macro block
    pub macro_metadata: Option<MacroMetadata>,
}

impl DecoderResult {
    /// Create a result carrying text and raw bytes
    pub fn new(raw_bytes: Vec<u8>, text: String) -> Self {
        let num_bits = raw_bytes.len() * 8;
        Self {
            raw_bytes,
            num_bits,
            text,
            ..Default::default()
        }
    }
}

/// Structured-append ("macro") metadata linking several symbols into one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroMetadata {
    /// Zero-based position of this symbol in the sequence
    pub segment_index: u32,
    /// File identifier shared by every symbol of the sequence
    pub file_id: String,
    /// Raw optional-field codewords, terminator excluded
    pub optional_data: Option<Vec<u32>>,
    /// Set when the terminator codeword was present
    pub last_segment: bool,
    /// Total number of symbols in the sequence
    pub segment_count: Option<u32>,
    /// Sender field
    pub sender: Option<String>,
    /// Addressee field
    pub addressee: Option<String>,
    /// File name field
    pub file_name: Option<String>,
    /// File size in bytes
    pub file_size: Option<u64>,
    /// CRC-16 checksum of the whole file
    pub checksum: Option<u32>,
    /// Seconds since the Unix epoch
    pub timestamp: Option<u64>,
}
