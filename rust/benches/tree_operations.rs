use bplustree::BPlusTreeMap;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

const SIZE: i64 = 10_000;

fn shuffled_keys(seed: u64) -> Vec<i64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..SIZE).map(|_| rng.gen_range(0..SIZE * 4)).collect()
}

fn insert_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    let keys = shuffled_keys(1);

    for degree in [4usize, 16, 64, 128] {
        group.bench_with_input(BenchmarkId::new("bplustree", degree), &degree, |b, &degree| {
            b.iter(|| {
                let mut tree = BPlusTreeMap::new(degree).unwrap();
                for &k in &keys {
                    tree.insert(black_box(k), k);
                }
                black_box(tree.len())
            })
        });
    }

    group.bench_function("std_btreemap", |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for &k in &keys {
                map.insert(black_box(k), k);
            }
            black_box(map.len())
        })
    });

    group.finish();
}

fn search_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    let keys = shuffled_keys(2);
    let probes = shuffled_keys(3);

    for degree in [4usize, 16, 64, 128] {
        let tree: BPlusTreeMap<i64, i64> = {
            let mut tree = BPlusTreeMap::new(degree).unwrap();
            for &k in &keys {
                tree.insert(k, k);
            }
            tree
        };
        group.bench_with_input(BenchmarkId::new("bplustree", degree), &tree, |b, tree| {
            b.iter(|| {
                let mut hits = 0;
                for k in &probes {
                    if tree.get(black_box(k)).is_some() {
                        hits += 1;
                    }
                }
                black_box(hits)
            })
        });
    }

    let map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    group.bench_function("std_btreemap", |b| {
        b.iter(|| {
            let mut hits = 0;
            for k in &probes {
                if map.get(black_box(k)).is_some() {
                    hits += 1;
                }
            }
            black_box(hits)
        })
    });

    group.finish();
}

fn scan_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");

    let mut tree = BPlusTreeMap::new(64).unwrap();
    let mut map = BTreeMap::new();
    for i in 0..SIZE {
        tree.insert(i, i * 10);
        map.insert(i, i * 10);
    }

    group.bench_function("bplustree_full", |b| {
        b.iter(|| black_box(tree.items().map(|(_, v)| *v).sum::<i64>()))
    });
    group.bench_function("std_btreemap_full", |b| {
        b.iter(|| black_box(map.iter().map(|(_, v)| *v).sum::<i64>()))
    });

    group.bench_function("bplustree_range", |b| {
        b.iter(|| {
            let items: Vec<_> = tree.range(black_box(2000)..black_box(8000)).collect();
            black_box(items);
        })
    });
    group.bench_function("std_btreemap_range", |b| {
        b.iter(|| {
            let items: Vec<_> = map.range(black_box(2000)..black_box(8000)).collect();
            black_box(items);
        })
    });

    group.finish();
}

fn delete_benchmark(c: &mut Criterion) {
    let keys = shuffled_keys(4);

    c.bench_function("delete_half", |b| {
        b.iter_batched(
            || keys.iter().copied().map(|k| (k, k)).collect::<BPlusTreeMap<i64, i64>>(),
            |mut tree| {
                for k in keys.iter().step_by(2) {
                    let _ = tree.delete(black_box(k));
                }
                black_box(tree.len())
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    insert_benchmark,
    search_benchmark,
    scan_benchmark,
    delete_benchmark
);
criterion_main!(benches);
