use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_barcode::qr::{self, FunctionMask};
use rust_barcode::utils::memory_pool::BufferPool;
use rust_barcode::{AztecOptions, DataMatrixOptions, EcLevel, Pdf417Options, aztec, datamatrix, pdf417};

const TEXT: &str = "The quick brown fox jumps over the lazy dog 0123456789 times.";

fn bench_aztec(c: &mut Criterion) {
    let options = AztecOptions::default();
    c.bench_function("aztec_encode", |b| {
        b.iter(|| aztec::encode(black_box(TEXT), &options))
    });
    let code = aztec::encode(TEXT, &options).unwrap();
    let symbol = code.symbol();
    let mut pool = BufferPool::new();
    c.bench_function("aztec_decode_with_pool", |b| {
        b.iter(|| aztec::decode_with_pool(black_box(&code.matrix), &symbol, &mut pool))
    });
}

fn bench_data_matrix(c: &mut Criterion) {
    let options = DataMatrixOptions::default();
    c.bench_function("datamatrix_encode", |b| {
        b.iter(|| datamatrix::encode(black_box(TEXT), &options))
    });
    let code = datamatrix::encode(TEXT, &options).unwrap();
    c.bench_function("datamatrix_decode_no_pool", |b| {
        b.iter(|| datamatrix::decode(black_box(&code.matrix)))
    });
    let mut pool = BufferPool::new();
    c.bench_function("datamatrix_decode_with_pool", |b| {
        b.iter(|| datamatrix::decode_with_pool(black_box(&code.matrix), &mut pool))
    });
}

fn bench_pdf417(c: &mut Criterion) {
    let options = Pdf417Options::default();
    c.bench_function("pdf417_encode", |b| {
        b.iter(|| pdf417::encode(black_box(TEXT), &options))
    });
    let code = pdf417::encode(TEXT, &options).unwrap();
    let mut pool = BufferPool::new();
    c.bench_function("pdf417_decode_with_pool", |b| {
        b.iter(|| pdf417::decode_with_pool(black_box(&code.codewords), code.ec_level, &mut pool))
    });
}

fn bench_mask_selection(c: &mut Criterion) {
    let capacity = FunctionMask::new(10).data_modules_count();
    let bits: Vec<bool> = (0..capacity).map(|i| (i * 13 + i / 7) % 3 == 0).collect();
    c.bench_function("qr_select_mask_v10", |b| {
        b.iter(|| qr::select_mask(black_box(&bits), 10, EcLevel::M))
    });
}

criterion_group!(benches, bench_aztec, bench_data_matrix, bench_pdf417, bench_mask_selection);
criterion_main!(benches);
