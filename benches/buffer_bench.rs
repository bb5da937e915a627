// benches/buffer_bench.rs
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use seqbuf::chunked::write_in_chunks;
use seqbuf::prelude::*;
use std::hint::black_box;

fn bench_rolling_write_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("rolling_lines");

    let mut payload = Vec::new();
    for i in 0..256 {
        payload.extend_from_slice(format!("2024-01-01T00:00:00Z level=info seq={i}\n").as_bytes());
    }

    for capacity in [16, 256, 4096].iter() {
        group.bench_with_input(
            BenchmarkId::new("write_read", capacity),
            capacity,
            |b, &capacity| {
                let lines = RollingLineBuffer::new(capacity);
                let mut out = vec![0u8; 64 * 1024];
                b.iter(|| {
                    lines.write(black_box(&payload));
                    while lines.read(&mut out).unwrap() > 0 {}
                });
            },
        );
    }

    group.bench_function("split_writes", |b| {
        let lines = RollingLineBuffer::new(1024);
        b.iter(|| {
            for chunk in payload.chunks(black_box(7)) {
                lines.write(chunk);
            }
        });
    });

    group.finish();
}

fn bench_stream_reassembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_at_stream");
    let data = vec![0xA5u8; 256 * 1024];

    for chunk_size in [512, 4096, 65536].iter() {
        group.bench_with_input(
            BenchmarkId::new("reverse_order", chunk_size),
            chunk_size,
            |b, &chunk_size| {
                let mut out = vec![0u8; data.len()];
                b.iter(|| {
                    let stream = WriteAtStream::new();
                    let chunks: Vec<_> = data.chunks(chunk_size).enumerate().collect();
                    for (i, chunk) in chunks.into_iter().rev() {
                        stream.write_at(chunk, (i * chunk_size) as u64).unwrap();
                    }
                    black_box(stream.read(&mut out).unwrap());
                });
            },
        );
    }

    group.bench_function("interleaved_read", |b| {
        let mut out = vec![0u8; 4096];
        b.iter(|| {
            let stream = WriteAtStream::with_config(StreamConfig::chunked_download());
            for (i, chunk) in data.chunks(4096).enumerate() {
                stream.write_at(chunk, (i * 4096) as u64).unwrap();
                black_box(stream.read(&mut out).unwrap());
            }
        });
    });

    group.finish();
}

fn bench_growth_factor(c: &mut Criterion) {
    let mut group = c.benchmark_group("growth_factor");

    for factor in [1.0, 1.5, 2.0].iter() {
        group.bench_with_input(BenchmarkId::new("append", factor), factor, |b, &factor| {
            b.iter(|| {
                let stream = WriteAtStream::new();
                stream.set_growth_factor(factor);
                for i in 0..1024u64 {
                    stream.write_at(black_box(&[0u8; 64]), i * 64).unwrap();
                }
            });
        });
    }

    group.finish();
}

fn bench_parallel_chunks(c: &mut Criterion) {
    let data = vec![0x5Au8; 1024 * 1024];

    c.bench_function("parallel_chunks_1mb", |b| {
        b.iter(|| {
            let stream = WriteAtStream::with_capacity(data.len());
            write_in_chunks(&stream, black_box(&data), 0, 16 * 1024).unwrap();
            black_box(stream.ready());
        });
    });
}

criterion_group!(
    benches,
    bench_rolling_write_read,
    bench_stream_reassembly,
    bench_growth_factor,
    bench_parallel_chunks
);
criterion_main!(benches);
