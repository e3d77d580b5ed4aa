//! Benchmarks for the attempt limiter and the paginator.

use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use skp_support::{MemoryStorage, Paginator, RateLimiter, StorageCounter, TagBag, VecSource};
use std::sync::Arc;
use tokio::runtime::Runtime;

fn bench_limiter(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let store = Arc::new(StorageCounter::new(MemoryStorage::new()));

    let mut group = c.benchmark_group("limiter");

    group.bench_function("must_lock", |b| {
        let mut limiter = RateLimiter::new(store.clone(), "10.0.0.1");
        limiter.init("bench_check", 5, 300);
        b.iter(|| {
            rt.block_on(async {
                black_box(limiter.must_lock().await)
            })
        })
    });

    group.bench_function("add_attempts", |b| {
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            let mut limiter = RateLimiter::new(store.clone(), format!("10.0.{}.{}", i % 256, i % 100));
            limiter.init("bench_hit", 1_000_000, 300);
            rt.block_on(async {
                black_box(limiter.add_attempts().await)
            })
        })
    });

    // Full login check: read state, then record the failure
    group.bench_function("check_then_hit", |b| {
        let mut limiter = RateLimiter::new(store.clone(), "10.0.0.2");
        limiter.init("bench_login", u64::MAX, 300);
        b.iter(|| {
            rt.block_on(async {
                if !limiter.must_lock().await.unwrap() {
                    black_box(limiter.add_attempts().await).unwrap();
                }
            })
        })
    });

    group.finish();
}

fn bench_paginator(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("paginator");

    for total in [100u32, 10_000].iter() {
        group.bench_with_input(BenchmarkId::new("to_json", total), total, |b, &total| {
            let source = VecSource::new((1..=total).collect::<Vec<u32>>());
            b.iter(|| {
                let mut paginator = Paginator::new(&[("page", "3"), ("limit", "25"), ("sort", "id")]);
                paginator.parse();
                paginator.set_query(source.clone());
                rt.block_on(async {
                    black_box(paginator.to_json(Default::default()).await)
                })
            })
        });
    }

    group.bench_function("decode_tags", |b| {
        let mut tags = TagBag::new();
        tags.insert("status", "open");
        tags.insert("pickedIds", (1..20).collect::<Vec<u32>>());
        let encoded = tags.encode();
        b.iter(|| black_box(TagBag::decode(&encoded)))
    });

    group.finish();
}

criterion_group!(benches, bench_limiter, bench_paginator);
criterion_main!(benches);
