//! Performance benchmarks for SSE decoding
//!
//! Measures line splitting and event decoding over bodies of different sizes
//! delivered in chunks of different sizes.
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sandbox_client::sse::{EventDecoder, LineBuffer, LineOutcome};

/// Generate an SSE body that looks like a code generation stream
fn generate_sse_body(events: usize) -> String {
    (0..events)
        .map(|i| {
            format!(
                "data: {{\"type\":\"stream\",\"text\":\"<div className=\\\"card-{}\\\">Item {}</div>\\n\",\"raw\":true}}\n\n",
                i, i
            )
        })
        .collect()
}

fn decode_body(body: &[u8], chunk_size: usize) -> usize {
    let mut buffer = LineBuffer::new();
    let mut decoder = EventDecoder::new();
    let mut events = 0;

    let lines = body
        .chunks(chunk_size)
        .flat_map(|chunk| buffer.push(chunk))
        .collect::<Vec<_>>();
    let tail = buffer.finish();
    for line in lines.iter().map(String::as_str).chain(tail.as_deref()) {
        if let Ok(LineOutcome::Event(_)) = decoder.decode_line(line) {
            events += 1;
        }
    }
    events
}

/// Benchmark decoding with a realistic network chunk size
fn bench_decode_by_body_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("sse_decode_body_size");

    for size in [10, 100, 1000].iter() {
        let body = generate_sse_body(*size);
        group.throughput(Throughput::Bytes(body.len() as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_events", size)),
            &body,
            |b, body| {
                b.iter(|| black_box(decode_body(black_box(body.as_bytes()), 1024)));
            },
        );
    }

    group.finish();
}

/// Benchmark the cost of pathological fragmentation
fn bench_decode_by_chunk_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("sse_decode_chunk_size");
    let body = generate_sse_body(200);
    group.throughput(Throughput::Bytes(body.len() as u64));

    for chunk in [1, 16, 256, 4096].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_byte_chunks", chunk)),
            chunk,
            |b, &chunk| {
                b.iter(|| black_box(decode_body(black_box(body.as_bytes()), chunk)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_decode_by_body_size, bench_decode_by_chunk_size);
criterion_main!(benches);
