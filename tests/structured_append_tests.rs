//! Structured append across several PDF417 symbols and Data Matrix macro
//! headers

use rust_barcode::datamatrix::{self, MACRO_05_HEADER, MACRO_TRAILER};
use rust_barcode::{DataMatrixOptions, MacroMetadata, Pdf417Options, pdf417};

fn segment(index: u32, count: u32, last: bool) -> MacroMetadata {
    MacroMetadata {
        segment_index: index,
        file_id: "123456".to_string(),
        last_segment: last,
        segment_count: Some(count),
        file_name: Some("report.txt".to_string()),
        ..Default::default()
    }
}

#[test]
fn test_pdf417_segments_reassemble() {
    let parts = ["The first part, ", "the middle part ", "and the end."];
    let mut decoded = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        let options = Pdf417Options {
            macro_block: Some(segment(i as u32, 3, i == parts.len() - 1)),
            ..Default::default()
        };
        let code = pdf417::encode(part, &options).unwrap();
        decoded.push(pdf417::decode(&code.codewords, code.ec_level).unwrap());
    }

    decoded.sort_by_key(|r| r.macro_metadata.as_ref().map(|m| m.segment_index));
    let file: String = decoded.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(file, parts.concat());

    for (i, result) in decoded.iter().enumerate() {
        let meta = result.macro_metadata.as_ref().unwrap();
        assert_eq!(meta.segment_index, i as u32);
        assert_eq!(meta.file_id, "123456");
        assert_eq!(meta.segment_count, Some(3));
        assert_eq!(meta.file_name.as_deref(), Some("report.txt"));
        assert_eq!(meta.last_segment, i == 2);
    }
}

#[test]
fn test_pdf417_macro_survives_padding() {
    // A wide symbol forces padding; the macro block must still be found
    let options = Pdf417Options {
        min_columns: 20,
        macro_block: Some(MacroMetadata {
            segment_index: 7,
            file_id: "042899".to_string(),
            sender: Some("ACME".to_string()),
            file_size: Some(4096),
            timestamp: Some(1_700_000_000),
            checksum: Some(0xBEEF),
            ..Default::default()
        }),
        ..Default::default()
    };
    let code = pdf417::encode("payload", &options).unwrap();
    assert!(code.codewords.contains(&900));
    let result = pdf417::decode(&code.codewords, code.ec_level).unwrap();
    assert_eq!(result.text, "payload");
    let meta = result.macro_metadata.unwrap();
    assert_eq!(meta.segment_index, 7);
    assert_eq!(meta.file_id, "042899");
    assert_eq!(meta.sender.as_deref(), Some("ACME"));
    assert_eq!(meta.file_size, Some(4096));
    assert_eq!(meta.timestamp, Some(1_700_000_000));
    assert_eq!(meta.checksum, Some(0xBEEF));
    assert!(!meta.last_segment);
}

#[test]
fn test_pdf417_rejects_missing_file_id() {
    // Macro marker, segment index, then the terminator instead of a file id
    let err = pdf417::decode_codewords(&[7, 900, 1, 928, 111, 100, 922]).unwrap_err();
    assert!(err.is_format());
}

#[test]
fn test_data_matrix_macro_header() {
    let text = format!("{MACRO_05_HEADER}10ABC123{MACRO_TRAILER}");
    let code = datamatrix::encode(&text, &DataMatrixOptions::default()).unwrap();
    assert_eq!(code.codewords[0], 236);
    assert_eq!(datamatrix::decode(&code.matrix).unwrap().text, text);
}
