//! Clew extraction-cache benchmarks.
//! Target: cache hit well under the cost of a fresh extraction pass.

use std::num::NonZeroUsize;

use ananke_core::clew::cache::ExtractionCache;
use ananke_core::clew::{Clew, ClewConfig};
use ananke_core::model::ConstraintSet;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const SOURCE: &str = "pub async fn fetch(id: u64) -> Result<User, Error> { todo!() }\n// must never leak secrets\n";

fn bench_clew_cache_hit_vs_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("clew_extraction_cache");
    let rt = tokio::runtime::Runtime::new().unwrap();
    let clew = Clew::default();

    // Prime the cache.
    rt.block_on(async {
        let _ = clew.extract_from_code(SOURCE, "rust").await;
    });

    group.bench_function("hit", |b| {
        b.iter(|| {
            rt.block_on(async {
                let _ = clew.extract_from_code(black_box(SOURCE), "rust").await;
            });
        });
    });

    let uncached = Clew::new(ClewConfig {
        enable_cache: false,
        ..ClewConfig::default()
    });
    group.bench_function("miss", |b| {
        b.iter(|| {
            rt.block_on(async {
                let _ = uncached.extract_from_code(black_box(SOURCE), "rust").await;
            });
        });
    });

    group.finish();
}

fn bench_fingerprint_cache_direct(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction_cache_direct");

    for capacity in [8usize, 64, 512].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(capacity), capacity, |b, &capacity| {
            let mut cache = ExtractionCache::new(NonZeroUsize::new(capacity).unwrap());
            for i in 0..capacity {
                cache.put(format!("source-{i}").as_bytes(), "rust", "none", ConstraintSet::new(format!("s{i}")));
            }
            b.iter(|| {
                let _ = cache.get(black_box(b"source-0"), "rust", "none");
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_clew_cache_hit_vs_miss, bench_fingerprint_cache_direct);
criterion_main!(benches);
