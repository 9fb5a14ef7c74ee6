//! Encode-then-decode tests across every symbology
//!
//! Each payload is encoded with default options, decoded from the produced
//! matrix (or codeword stream) and compared with the input text.

use rust_barcode::datamatrix::{self, SymbolShape};
use rust_barcode::pdf417::{self, Compaction};
use rust_barcode::{
    AztecOptions, CharacterSetEci, DataMatrixOptions, Pdf417Options, Symbology, aztec, decode,
};

const PAYLOADS: &[&str] = &[
    "A",
    "Hello, World!",
    "0123456789012345678901234567890",
    "lower case with UPPER and 12345 digits",
    "mixed: #$%&'()*+,-./:;<=>?@[\\]^_`{|}~",
    "line one\r\nline two\ttabbed",
    "Grüße aus Köln, ça va?",
    "Αθήνα και Москва",
    "ABCDEFGHIJKLMNOPQRSTUVWXYZABCDEFGHIJKLMNOPQRSTUVWXYZ",
];

#[test]
fn test_aztec_round_trip() {
    for &text in PAYLOADS {
        let code = aztec::encode(text, &AztecOptions::default()).unwrap();
        let result = aztec::decode(&code.matrix, &code.symbol()).unwrap();
        assert_eq!(result.text, text, "aztec payload {text:?}");
        assert_eq!(result.errors_corrected, 0);
        assert!(result.ec_level.is_some());
    }
}

#[test]
fn test_aztec_fixed_layers() {
    let options = AztecOptions {
        layers: -3,
        ..Default::default()
    };
    let code = aztec::encode("compact three", &options).unwrap();
    assert!(code.compact);
    assert_eq!(code.layers, 3);
    assert_eq!(code.size(), 23);
    let symbol = aztec::read_symbol_parameters(&code.matrix, true).unwrap();
    assert_eq!(symbol, code.symbol());
    assert_eq!(aztec::decode(&code.matrix, &symbol).unwrap().text, "compact three");
}

#[test]
fn test_data_matrix_round_trip() {
    for &text in PAYLOADS {
        for shape in [SymbolShape::Any, SymbolShape::Square, SymbolShape::Rectangle] {
            let options = DataMatrixOptions {
                shape,
                ..Default::default()
            };
            let code = match datamatrix::encode(text, &options) {
                Ok(code) => code,
                // Long payloads do not fit the largest rectangle
                Err(_) if shape == SymbolShape::Rectangle => continue,
                Err(e) => panic!("encode {text:?}: {e}"),
            };
            let result = datamatrix::decode(&code.matrix).unwrap();
            assert_eq!(result.text, text, "data matrix payload {text:?} {shape:?}");
        }
    }
}

#[test]
fn test_data_matrix_forced_c40() {
    let options = DataMatrixOptions {
        force_c40: true,
        ..Default::default()
    };
    for &text in &PAYLOADS[..6] {
        let code = datamatrix::encode(text, &options).unwrap();
        assert_eq!(datamatrix::decode(&code.matrix).unwrap().text, text);
    }
}

#[test]
fn test_data_matrix_binary() {
    let data: Vec<u8> = (0u16..400).map(|i| (i * 131 % 256) as u8).collect();
    let code = datamatrix::encode_bytes(&data, &DataMatrixOptions::default()).unwrap();
    let result = datamatrix::decode(&code.matrix).unwrap();
    // No ECI, so bytes read back as ISO-8859-1
    let expected: String = data.iter().map(|&b| b as char).collect();
    assert_eq!(result.text, expected);

    // All high bytes go out as one Base256 segment
    let data: Vec<u8> = (0u16..300).map(|i| 128 + (i % 128) as u8).collect();
    let code = datamatrix::encode_bytes(&data, &DataMatrixOptions::default()).unwrap();
    let result = datamatrix::decode(&code.matrix).unwrap();
    assert_eq!(result.byte_segments, vec![data]);
}

#[test]
fn test_pdf417_round_trip() {
    for &text in PAYLOADS {
        for compaction in [Compaction::Auto, Compaction::Byte] {
            let options = Pdf417Options {
                compaction,
                ..Default::default()
            };
            let code = pdf417::encode(text, &options).unwrap();
            assert_eq!(code.codewords.len(), code.columns * code.rows);
            let result = pdf417::decode(&code.codewords, code.ec_level).unwrap();
            assert_eq!(result.text, text, "pdf417 payload {text:?} {compaction:?}");
        }
    }
}

#[test]
fn test_explicit_charset() {
    let text = "Съешь же ещё";
    let charset = Some(CharacterSetEci::Iso8859_5);

    let code = aztec::encode(
        text,
        &AztecOptions {
            charset,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(aztec::decode(&code.matrix, &code.symbol()).unwrap().text, text);

    let code = datamatrix::encode(
        text,
        &DataMatrixOptions {
            charset,
            ..Default::default()
        },
    )
    .unwrap();
    let result = datamatrix::decode(&code.matrix).unwrap();
    assert_eq!(result.text, text);
    assert_eq!(result.symbology_modifier, 4);

    let code = pdf417::encode(
        text,
        &Pdf417Options {
            charset,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(pdf417::decode(&code.codewords, code.ec_level).unwrap().text, text);
}

#[test]
fn test_fnc1_marker_reports_gs1() {
    // FNC1, "01", "23", 'A', FNC1, 'B'
    let result = datamatrix::decode_codewords(&[232, 131, 153, 66, 232, 67]).unwrap();
    assert_eq!(result.text, "\u{1d}0123A\u{1d}B");
    assert_eq!(result.symbology_modifier, 2);

    let options = DataMatrixOptions {
        gs1: true,
        ..Default::default()
    };
    let code = datamatrix::encode("0112345678901231\u{1d}10LOT7", &options).unwrap();
    let result = decode(&Symbology::DataMatrix {
        matrix: &code.matrix,
    })
    .unwrap();
    assert_eq!(result.text, "\u{1d}0112345678901231\u{1d}10LOT7");
    assert_eq!(result.symbology_modifier, 2);
}

#[test]
fn test_numeric_fifteen_digits() {
    let codewords = pdf417::numeric::encode_group(b"000213298174000");
    assert_eq!(codewords, vec![1, 624, 434, 632, 282, 200]);
    assert_eq!(pdf417::numeric::decode_group(&codewords).unwrap(), "000213298174000");

    let options = Pdf417Options {
        compaction: Compaction::Numeric,
        ..Default::default()
    };
    let code = pdf417::encode("000213298174000", &options).unwrap();
    // Descriptor, numeric latch, then the six codewords of the group
    assert_eq!(&code.codewords[1..8], &[902, 1, 624, 434, 632, 282, 200]);
    assert_eq!(
        pdf417::decode(&code.codewords, code.ec_level).unwrap().text,
        "000213298174000"
    );
}

#[test]
fn test_scaled_output() {
    let options = DataMatrixOptions {
        width: 100,
        height: 100,
        ..Default::default()
    };
    let code = datamatrix::encode("scaled", &options).unwrap();
    assert_eq!((code.matrix.width(), code.matrix.height()), (100, 100));
}
