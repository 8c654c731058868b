//! Criterion micro-benchmarks: GrowBuf against std::vec::Vec.
//!
//! Same workload on both containers so the column next door is the
//! standard library's number, not a guess.

use cairn_bench::{scrambled_u64s, LARGE, MEDIUM, SMALL};
use cairn_buf::GrowBuf;
use cairn_pool::BlockPool;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Push MEDIUM values from empty, letting growth do its thing.
fn bench_push_from_empty(c: &mut Criterion) {
    let values = scrambled_u64s(42, MEDIUM);

    let mut group = c.benchmark_group("push_from_empty");
    group.bench_function("growbuf", |b| {
        b.iter(|| {
            let mut buf = GrowBuf::new();
            for &v in &values {
                buf.push(v);
            }
            black_box(buf.len());
        });
    });
    group.bench_function("std_vec", |b| {
        b.iter(|| {
            let mut vec = Vec::new();
            for &v in &values {
                vec.push(v);
            }
            black_box(vec.len());
        });
    });
    group.finish();
}

/// Push MEDIUM values into pre-reserved storage: no growth on the path.
fn bench_push_reserved(c: &mut Criterion) {
    let values = scrambled_u64s(42, MEDIUM);

    let mut group = c.benchmark_group("push_reserved");
    group.bench_function("growbuf", |b| {
        b.iter(|| {
            let mut buf = GrowBuf::with_capacity(MEDIUM);
            for &v in &values {
                buf.push(v);
            }
            black_box(buf.len());
        });
    });
    group.bench_function("std_vec", |b| {
        b.iter(|| {
            let mut vec = Vec::with_capacity(MEDIUM);
            for &v in &values {
                vec.push(v);
            }
            black_box(vec.len());
        });
    });
    group.finish();
}

/// Large append run: the 1.5x growth policy's total relocation cost
/// against Vec's doubling, where amortization differences show up.
fn bench_amortized_growth_large(c: &mut Criterion) {
    let mut group = c.benchmark_group("amortized_growth_large");
    group.sample_size(10);
    group.bench_function("growbuf", |b| {
        b.iter(|| {
            let mut buf = GrowBuf::new();
            for v in 0..LARGE as u64 {
                buf.push(v);
            }
            black_box(buf.len());
        });
    });
    group.bench_function("std_vec", |b| {
        b.iter(|| {
            let mut vec = Vec::new();
            for v in 0..LARGE as u64 {
                vec.push(v);
            }
            black_box(vec.len());
        });
    });
    group.finish();
}

/// Sum via the pointer-cursor iterator against the slice iterator.
fn bench_iterate(c: &mut Criterion) {
    let buf: GrowBuf<u64> = scrambled_u64s(7, MEDIUM).into_iter().collect();
    let vec: Vec<u64> = scrambled_u64s(7, MEDIUM);

    let mut group = c.benchmark_group("iterate_sum");
    group.bench_function("growbuf", |b| {
        b.iter(|| black_box(buf.iter().copied().fold(0u64, u64::wrapping_add)));
    });
    group.bench_function("std_vec", |b| {
        b.iter(|| black_box(vec.iter().copied().fold(0u64, u64::wrapping_add)));
    });
    group.finish();
}

/// Checked access in a loop; the unchecked path is what `iterate_sum`
/// already measures.
fn bench_checked_access(c: &mut Criterion) {
    let buf: GrowBuf<u64> = scrambled_u64s(9, SMALL).into_iter().collect();

    c.bench_function("at_checked_small", |b| {
        b.iter(|| {
            let mut acc = 0u64;
            for i in 0..SMALL {
                acc = acc.wrapping_add(*buf.at(i).unwrap());
            }
            black_box(acc)
        });
    });
}

/// Repeated fill/clear cycles on a pool-backed buffer: after the first
/// cycle every range comes from the recycler rather than the system.
fn bench_pool_backed_refill(c: &mut Criterion) {
    let values = scrambled_u64s(3, MEDIUM);
    let pool = BlockPool::new().into_shared();

    let mut group = c.benchmark_group("refill_cycle");
    group.bench_function("growbuf_pooled", |b| {
        b.iter(|| {
            let mut buf = GrowBuf::with_pool(pool.clone());
            for &v in &values {
                buf.push(v);
            }
            black_box(buf.len());
        });
    });
    group.bench_function("growbuf_system", |b| {
        b.iter(|| {
            let mut buf = GrowBuf::new();
            for &v in &values {
                buf.push(v);
            }
            black_box(buf.len());
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_push_from_empty,
    bench_push_reserved,
    bench_amortized_growth_large,
    bench_iterate,
    bench_checked_access,
    bench_pool_backed_refill,
);
criterion_main!(benches);
