//! Seeded random payloads through every encoder and back
//!
//! Payloads mix printable ASCII with controls, raw bytes and long digit runs.
//! Data Matrix payloads are assembled from runs that each select one
//! encodation, so every latch is exercised on every seed.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_barcode::{
    AztecOptions, DataMatrixOptions, Pdf417Options, aztec, datamatrix,
    pdf417::{self, Compaction},
};

const SEEDS: u64 = 24;

const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";

const LATCH_C40: u8 = 230;
const LATCH_BASE256: u8 = 231;
const LATCH_X12: u8 = 238;
const LATCH_TEXT: u8 = 239;
const LATCH_EDIFACT: u8 = 240;

fn pick(rng: &mut StdRng, alphabet: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| *alphabet.choose(rng).unwrap() as char)
        .collect()
}

/// Printable ASCII plus CR, LF and TAB
fn mixed_ascii(rng: &mut StdRng, len: usize) -> String {
    let alphabet: Vec<u8> = (32u8..127).chain([b'\r', b'\n', b'\t']).collect();
    pick(rng, &alphabet, len)
}

fn random_bytes(rng: &mut StdRng, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.gen_range(0..=255u8)).collect()
}

/// Text wrapping a long digit run
fn numeric_run(rng: &mut StdRng) -> String {
    let len = rng.gen_range(30..160);
    format!(
        "{}{}{}",
        pick(rng, UPPER, 2),
        pick(rng, DIGITS, len),
        pick(rng, LOWER, 3)
    )
}

fn latin1(data: &[u8]) -> String {
    data.iter().map(|&b| b as char).collect()
}

#[test]
fn test_aztec_random_round_trip() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let len = rng.gen_range(1..200);
        for text in [mixed_ascii(&mut rng, len), numeric_run(&mut rng)] {
            let code = aztec::encode(&text, &AztecOptions::default()).unwrap();
            let result = aztec::decode(&code.matrix, &code.symbol()).unwrap();
            assert_eq!(result.text, text, "seed {seed}");
        }

        let data = random_bytes(&mut rng, len);
        let code = aztec::encode_bytes(&data, &AztecOptions::default()).unwrap();
        let result = aztec::decode(&code.matrix, &code.symbol()).unwrap();
        assert_eq!(result.text, latin1(&data), "seed {seed}");
    }
}

#[test]
fn test_data_matrix_random_round_trip() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let len = rng.gen_range(1..300);
        for text in [mixed_ascii(&mut rng, len), numeric_run(&mut rng)] {
            let code = datamatrix::encode(&text, &DataMatrixOptions::default()).unwrap();
            let result = datamatrix::decode(&code.matrix).unwrap();
            assert_eq!(result.text, text, "seed {seed}");
        }

        let data = random_bytes(&mut rng, len);
        let code = datamatrix::encode_bytes(&data, &DataMatrixOptions::default()).unwrap();
        let result = datamatrix::decode(&code.matrix).unwrap();
        assert_eq!(result.text, latin1(&data), "seed {seed}");
    }
}

/// One run per encodation, separated by '~' which belongs to none of them
fn encodation_runs(rng: &mut StdRng) -> String {
    let c40: Vec<u8> = [UPPER, DIGITS, b" "].concat();
    let text: Vec<u8> = [LOWER, DIGITS, b" "].concat();
    let x12: Vec<u8> = [UPPER, DIGITS, b" *>\r"].concat();
    let edifact: Vec<u8> = (32u8..=94).collect();

    let mut runs = vec![mixed_ascii(rng, 5)];
    let n = rng.gen_range(9..30);
    runs.push(format!("{}{}", pick(rng, UPPER, 1), pick(rng, &c40, n)));
    let n = rng.gen_range(9..30);
    runs.push(format!("{}{}", pick(rng, LOWER, 1), pick(rng, &text, n)));
    let n = rng.gen_range(9..30);
    runs.push(format!("{}*{}", pick(rng, UPPER, 1), pick(rng, &x12, n)));
    let n = rng.gen_range(12..30);
    runs.push(format!("!{}", pick(rng, &edifact, n)));
    runs.push(pick(rng, DIGITS, 2));
    runs.join("~")
}

#[test]
fn test_data_matrix_every_encodation() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let text = encodation_runs(&mut rng);
        let code = datamatrix::encode(&text, &DataMatrixOptions::default()).unwrap();
        let data = &code.codewords[..code.info.data_capacity];
        for latch in [LATCH_C40, LATCH_TEXT, LATCH_X12, LATCH_EDIFACT] {
            assert!(data.contains(&latch), "seed {seed}: no latch {latch} for {text:?}");
        }
        assert_eq!(datamatrix::decode(&code.matrix).unwrap().text, text, "seed {seed}");

        // ASCII, then a Base 256 run of high bytes, then ASCII again
        let high = rng.gen_range(3..40);
        let mut bytes = mixed_ascii(&mut rng, 6).into_bytes();
        bytes.extend((0..high).map(|_| rng.gen_range(128..=255u8)));
        bytes.extend(mixed_ascii(&mut rng, 6).into_bytes());
        let code = datamatrix::encode_bytes(&bytes, &DataMatrixOptions::default()).unwrap();
        assert!(code.codewords[..code.info.data_capacity].contains(&LATCH_BASE256));
        let result = datamatrix::decode(&code.matrix).unwrap();
        assert_eq!(result.text, latin1(&bytes), "seed {seed}");
        assert_eq!(result.byte_segments.len(), 1);
    }
}

#[test]
fn test_data_matrix_forced_c40_random() {
    let options = DataMatrixOptions {
        force_c40: true,
        ..Default::default()
    };
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let len = rng.gen_range(1..150);
        let text = mixed_ascii(&mut rng, len);
        let code = datamatrix::encode(&text, &options).unwrap();
        assert_eq!(datamatrix::decode(&code.matrix).unwrap().text, text, "seed {seed}");
    }
}

#[test]
fn test_pdf417_random_round_trip() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let len = rng.gen_range(1..250);
        for compaction in [Compaction::Auto, Compaction::Byte] {
            let options = Pdf417Options {
                compaction,
                ..Default::default()
            };
            for text in [mixed_ascii(&mut rng, len), numeric_run(&mut rng)] {
                let code = pdf417::encode(&text, &options).unwrap();
                let result = pdf417::decode(&code.codewords, code.ec_level).unwrap();
                assert_eq!(result.text, text, "seed {seed} {compaction:?}");
            }

            let data = random_bytes(&mut rng, len);
            let code = pdf417::encode_bytes(&data, &options).unwrap();
            let result = pdf417::decode(&code.codewords, code.ec_level).unwrap();
            assert_eq!(result.text, latin1(&data), "seed {seed} {compaction:?}");
        }
    }
}
