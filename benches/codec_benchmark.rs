//! Benchmark tests for the SBC codec
//!
//! These benchmarks measure the filter banks, bit allocation and full
//! frame encoding and decoding for the A2DP high quality and mSBC layouts.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sbc_rs::allocation::allocate_bits;
use sbc_rs::analysis::AnalysisState;
use sbc_rs::synthesis::SynthesisState;
use sbc_rs::{Decoder, Encoder, FrameDescriptor};

fn tone(len: usize) -> Vec<i16> {
    (0..len)
        .map(|n| (12000.0 * (2.0 * std::f64::consts::PI * 0.011 * n as f64).sin()) as i16)
        .collect()
}

fn benchmark_analysis(c: &mut Criterion) {
    let pcm = tone(8);

    c.bench_function("analysis_block_8", |b| {
        let mut state = AnalysisState::new();
        let mut out = [0i16; 8];
        b.iter(|| {
            state.process_block(black_box(&pcm), 8, &mut out);
            black_box(out);
        })
    });
}

fn benchmark_synthesis(c: &mut Criterion) {
    let samples = [1000i32, -2000, 500, 0, 300, -100, 50, 7];

    c.bench_function("synthesis_block_8", |b| {
        let mut state = SynthesisState::new();
        let mut out = [0i16; 8];
        b.iter(|| {
            state.process_block(black_box(&samples), 8, 2, &mut out);
            black_box(out);
        })
    });
}

fn benchmark_allocation(c: &mut Criterion) {
    let desc = FrameDescriptor::default();
    let scale_factors = [[9, 8, 7, 6, 5, 3, 1, 0], [10, 8, 6, 6, 4, 2, 0, 0]];

    c.bench_function("allocate_bits_joint", |b| {
        b.iter(|| black_box(allocate_bits(black_box(&desc), black_box(&scale_factors))))
    });
}

fn benchmark_encode_frame(c: &mut Criterion) {
    let desc = FrameDescriptor::default();
    let left = tone(128);
    let right: Vec<i16> = left.iter().map(|&s| s / 2).collect();

    c.bench_function("encode_frame_joint_stereo", |b| {
        let mut encoder = Encoder::new();
        b.iter(|| {
            let frame = encoder
                .encode(black_box(&left), Some(black_box(&right)), &desc)
                .unwrap();
            black_box(frame);
        })
    });

    let msbc = FrameDescriptor::msbc();
    let speech = tone(120);
    c.bench_function("encode_frame_msbc", |b| {
        let mut encoder = Encoder::new();
        b.iter(|| {
            let frame = encoder.encode(black_box(&speech), None, &msbc).unwrap();
            black_box(frame);
        })
    });
}

fn benchmark_decode_frame(c: &mut Criterion) {
    let desc = FrameDescriptor::default();
    let left = tone(128);
    let frame = Encoder::new().encode(&left, Some(&left), &desc).unwrap();

    c.bench_function("decode_frame_joint_stereo", |b| {
        let mut decoder = Decoder::new();
        b.iter(|| black_box(decoder.decode(black_box(&frame)).unwrap()))
    });

    let msbc = Encoder::new()
        .encode(&tone(120), None, &FrameDescriptor::msbc())
        .unwrap();
    c.bench_function("decode_frame_msbc", |b| {
        let mut decoder = Decoder::new();
        b.iter(|| black_box(decoder.decode(black_box(&msbc)).unwrap()))
    });
}

criterion_group!(
    benches,
    benchmark_analysis,
    benchmark_synthesis,
    benchmark_allocation,
    benchmark_encode_frame,
    benchmark_decode_frame
);
criterion_main!(benches);
