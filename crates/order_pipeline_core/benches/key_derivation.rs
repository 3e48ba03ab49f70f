//! Key derivation and batch planning benchmarks using Criterion.rs.

use std::num::NonZeroU32;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use order_pipeline_core::batching::plan_batches;
use order_pipeline_core::contract::CanonicalOrder;
use order_pipeline_core::sharding::KeyDeriver;

fn sample_orders(count: usize) -> Vec<CanonicalOrder> {
    (0..count)
        .map(|index| CanonicalOrder {
            id: format!("5d0c9a6e-2f0b-4c56-8a8e-{index:012}"),
            email: format!("customer{}@example.com", index % 97),
            price: 19.99,
            products: vec!["sku-1".to_string(), "sku-2".to_string()],
            date: "2024-01-01".to_string(),
        })
        .collect()
}

fn bench_key_derivation(c: &mut Criterion) {
    let orders = sample_orders(1_000);

    let mut group = c.benchmark_group("key_derivation");
    for shard_count in [1u32, 5, 64] {
        let deriver = KeyDeriver::new(NonZeroU32::new(shard_count).expect("non-zero"));
        group.bench_with_input(
            BenchmarkId::from_parameter(shard_count),
            &deriver,
            |b, deriver| {
                b.iter(|| {
                    for order in &orders {
                        black_box(deriver.derive(order).expect("key should derive"));
                    }
                });
            },
        );
    }
    group.finish();
}

fn bench_batch_planning(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_planning");
    for total in [10usize, 1_000, 10_000] {
        let orders = sample_orders(total);
        group.bench_with_input(BenchmarkId::from_parameter(total), &orders, |b, orders| {
            b.iter(|| black_box(plan_batches(orders).expect("plan should build")));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_key_derivation, bench_batch_planning);
criterion_main!(benches);
