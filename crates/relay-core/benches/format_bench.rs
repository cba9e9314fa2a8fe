//! Criterion benchmarks for log record rendering.
//!
//! Every forwarded chunk is formatted before it is written to the peer, so
//! rendering time sits directly on the forwarding path.
//!
//! Run with:
//! ```bash
//! cargo bench --package relay-core --bench format_bench
//! ```

use chrono::{FixedOffset, TimeZone};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use relay_core::{format_record, hex_dump, Direction, LogFormat, SessionId, BUFFER_CAPACITY};

// ── Fixtures ──────────────────────────────────────────────────────────────────

fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_hex_dump(c: &mut Criterion) {
    let mut group = c.benchmark_group("hex_dump");
    for len in [64usize, 1500, BUFFER_CAPACITY] {
        let data = payload(len);
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &data, |b, data| {
            b.iter(|| hex_dump(black_box(data)))
        });
    }
    group.finish();
}

fn bench_format_record(c: &mut Criterion) {
    let ts = FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .unwrap();
    let data = payload(1500);

    let mut group = c.benchmark_group("format_record");
    group.throughput(Throughput::Bytes(data.len() as u64));
    for selector in ["plain", "hex", "fhex", "all"] {
        let format = LogFormat::parse(selector).format;
        group.bench_with_input(BenchmarkId::from_parameter(selector), &format, |b, &format| {
            b.iter(|| {
                format_record(
                    SessionId(1),
                    &ts,
                    Direction::LocalToRemote,
                    black_box(&data),
                    format,
                )
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_hex_dump, bench_format_record);
criterion_main!(benches);
