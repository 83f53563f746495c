//! Benchmarks for lz77kit encoding, decoding and framing throughput.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lz77kit::{decode, read_frame, write_frame, CodecConfig, Encoder, MatchSearch, Token};

/// Generate random (incompressible) data
fn generate_random_data(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut state = 0x2545_F491_4F6C_DD1Du64;
    for _ in 0..size {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        data.push((state & 0xFF) as u8);
    }
    data
}

/// Generate English-like text with frequent repeats
fn generate_text_data(size: usize) -> Vec<u8> {
    let words: [&[u8]; 12] = [
        b"the ", b"of ", b"and ", b"sliding ", b"window ", b"compression ", b"token ",
        b"match ", b"literal ", b"distance ", b"length, ", b"buffer.\n",
    ];
    let mut data = Vec::with_capacity(size);
    let mut state = 7u32;
    while data.len() < size {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12345);
        data.extend_from_slice(words[(state >> 16) as usize % words.len()]);
    }
    data.truncate(size);
    data
}

fn encode(data: &[u8], config: &CodecConfig) -> Vec<Token> {
    Encoder::new(config.clone()).unwrap().encode(data)
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_search");
    let size = 64 * 1024;
    let data = generate_text_data(size);
    group.throughput(Throughput::Bytes(size as u64));

    for window in [1024u32, 4096] {
        for search in [MatchSearch::Exhaustive, MatchSearch::HashChain] {
            let config = CodecConfig::new(window, 40).with_search(search);
            let id = BenchmarkId::new(search.name(), window);
            group.bench_with_input(id, &data, |b, data| {
                b.iter(|| encode(black_box(data), &config));
            });
        }
    }

    group.finish();
}

fn bench_data_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_patterns");
    let size = 256 * 1024;
    let config = CodecConfig::default();
    group.throughput(Throughput::Bytes(size as u64));

    for (name, data) in [("random", generate_random_data(size)), ("text", generate_text_data(size))] {
        group.bench_with_input(BenchmarkId::new("hash_chain", name), &data, |b, data| {
            b.iter(|| encode(black_box(data), &config));
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for size in [64 * 1024, 1024 * 1024] {
        let tokens = encode(&generate_text_data(size), &CodecConfig::default());
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("text", size), &tokens, |b, tokens| {
            b.iter(|| decode(black_box(tokens)).unwrap());
        });
    }

    group.finish();
}

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");
    let tokens = encode(&generate_text_data(256 * 1024), &CodecConfig::default());
    let mut frame = Vec::new();
    write_frame(&tokens, &mut frame).unwrap();
    group.throughput(Throughput::Bytes(frame.len() as u64));

    group.bench_function("write", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(frame.len());
            write_frame(black_box(&tokens), &mut out).unwrap();
            out
        });
    });
    group.bench_function("read", |b| {
        b.iter(|| read_frame(black_box(frame.as_slice())).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_search, bench_data_patterns, bench_decode, bench_frame);
criterion_main!(benches);
