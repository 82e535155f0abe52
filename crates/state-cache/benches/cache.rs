#![allow(missing_docs)]
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hearth_primitives::{Account, Address, B256, U256};
use hearth_state_cache::StateCache;

fn address(n: u64) -> Address {
    Address::from_word(B256::from(U256::from(n)))
}

fn filled_cache(reads: usize, writes: usize) -> StateCache {
    let mut cache = StateCache::new(reads, writes);
    for n in 0..reads as u64 {
        cache.set_account_read(address(n), Account { nonce: n, ..Default::default() });
    }
    cache
}

fn bench_read_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_insertion");

    for size in &[1_000usize, 10_000, 100_000] {
        group.bench_function(format!("steady_state_{size}"), |b| {
            let mut cache = filled_cache(*size, *size / 10);
            let mut n = *size as u64;
            // The cache stays at capacity, so every insertion evicts.
            b.iter(|| {
                cache.set_account_read(
                    black_box(address(n)),
                    Account { nonce: n, ..Default::default() },
                );
                n += 1;
            })
        });
    }

    group.finish();
}

fn bench_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("turn_writes_to_reads");

    for size in &[1_000usize, 10_000] {
        group.bench_function(format!("writes_{size}"), |b| {
            b.iter_with_setup(
                || {
                    let mut cache = StateCache::new(*size, *size);
                    for n in 0..*size as u64 {
                        cache.set_storage_write(
                            address(n),
                            1,
                            B256::from(U256::from(n)),
                            U256::from(n),
                        );
                    }
                    cache
                },
                |mut cache| {
                    cache.turn_writes_to_reads();
                    black_box(cache)
                },
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_read_insertion, bench_commit);
criterion_main!(benches);
