//! Benchmarks for solid-color PNG encoding.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use swatch::compress::{crc32, deflate_zlib};
use swatch::png::{self, PngOptions};

fn png_encoding_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("PNG Encoding");

    for size in [64u32, 180, 192, 512] {
        let raw_bytes = size as u64 * (1 + 3 * size as u64);
        group.throughput(Throughput::Bytes(raw_bytes));

        for level in [1u8, 6, 9] {
            let options = PngOptions {
                compression_level: level,
            };
            let mut buf = Vec::new();
            group.bench_with_input(
                BenchmarkId::new(format!("level{level}"), format!("{size}x{size}")),
                &size,
                |b, &size| {
                    b.iter(|| {
                        png::encode_into(
                            &mut buf,
                            black_box(size),
                            black_box(size),
                            [37, 99, 235],
                            &options,
                        )
                        .unwrap()
                    })
                },
            );
        }
    }

    group.finish();
}

fn checksum_benchmark(c: &mut Criterion) {
    let data = png::raw_scanlines(512, 512, [37, 99, 235]);
    let mut group = c.benchmark_group("Primitives");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("crc32", |b| b.iter(|| crc32(black_box(&data))));
    group.bench_function("zlib level 9", |b| b.iter(|| deflate_zlib(black_box(&data), 9)));
    group.finish();
}

criterion_group!(benches, png_encoding_benchmark, checksum_benchmark);
criterion_main!(benches);
