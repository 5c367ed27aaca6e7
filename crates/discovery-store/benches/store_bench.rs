// Benchmarks for local store write and read paths
// Measures uncontended puts, conflict-losing puts, and bulk reads

use std::{hint::black_box, sync::Arc, thread};

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use discovery_store::{Entry, InMemoryStore, LocalStore};

fn bench_put_distinct_keys(c: &mut Criterion) {
    let store = InMemoryStore::default();
    let mut ts = 0i64;

    c.bench_function("put_distinct_keys", |b| {
        b.iter(|| {
            ts += 1;
            store
                .put(Entry::new(format!("node-{}", ts), "payload", ts, None))
                .unwrap()
        })
    });
}

fn bench_put_same_key_newer(c: &mut Criterion) {
    let store = InMemoryStore::default();
    let mut ts = 0i64;

    c.bench_function("put_same_key_newer", |b| {
        b.iter(|| {
            ts += 1;
            store
                .put(Entry::new("node", "payload", black_box(ts), None))
                .unwrap()
        })
    });
}

fn bench_put_same_key_stale(c: &mut Criterion) {
    let store = InMemoryStore::default();
    store
        .put(Entry::new("node", "payload", i64::MAX, None))
        .unwrap();

    c.bench_function("put_same_key_stale", |b| {
        b.iter(|| {
            store
                .put(Entry::new("node", "payload", black_box(1), None))
                .unwrap()
        })
    });
}

fn bench_contended_puts(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended_puts");

    for threads in [2usize, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            b.iter(|| {
                let store = Arc::new(InMemoryStore::default());
                let handles: Vec<_> = (0..threads)
                    .map(|t| {
                        let store = store.clone();
                        thread::spawn(move || {
                            for i in 0..1000usize {
                                let ts = (i * threads + t) as i64;
                                let _ = store.put(Entry::new("node", "payload", ts, None));
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    let _ = handle.join();
                }
            })
        });
    }

    group.finish();
}

fn bench_get_all(c: &mut Criterion) {
    let store = InMemoryStore::default();
    for i in 0..10_000i64 {
        store
            .put(Entry::new(format!("node-{}", i), "payload", i, None))
            .unwrap();
    }

    c.bench_function("get_all_10k", |b| b.iter(|| black_box(store.get_all().len())));
}

criterion_group!(
    benches,
    bench_put_distinct_keys,
    bench_put_same_key_newer,
    bench_put_same_key_stale,
    bench_contended_puts,
    bench_get_all
);
criterion_main!(benches);
