//! Randomized operation streams checked against `std::collections::BTreeMap`.

mod common;

use std::collections::BTreeMap;

use bplustree::{BPlusTreeError, BPlusTreeMap};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const OPERATIONS: usize = 20_000;
const KEY_SPACE: i64 = 2_000;

fn run_random_ops(degree: usize, seed: u64) {
    common::init_tracing();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tree = BPlusTreeMap::new(degree).unwrap();
    let mut reference = BTreeMap::new();

    for step in 0..OPERATIONS {
        let key = rng.gen_range(0..KEY_SPACE);
        match rng.gen_range(0..10) {
            0..=5 => {
                let value = rng.gen::<u32>();
                assert_eq!(
                    tree.insert(key, value),
                    reference.insert(key, value),
                    "insert {} at step {}",
                    key,
                    step
                );
            }
            6..=7 => {
                let expected = reference
                    .remove(&key)
                    .map(|value| (key, value))
                    .ok_or(BPlusTreeError::KeyNotFound);
                assert_eq!(tree.delete(&key), expected, "delete {} at step {}", key, step);
            }
            _ => {
                assert_eq!(tree.get(&key), reference.get(&key), "get {} at step {}", key, step);
            }
        }

        if step % 1_000 == 0 {
            assert_eq!(tree.check_invariants_detailed(), Ok(()), "step {}", step);
        }
    }

    assert_eq!(tree.len(), reference.len());
    assert!(tree.items().eq(reference.iter()));
    assert!(tree.items_rev().eq(reference.iter().rev()));
    assert_eq!(tree.first(), reference.iter().next());
    assert_eq!(tree.last(), reference.iter().next_back());
    assert_eq!(tree.check_invariants_detailed(), Ok(()));
}

#[test]
fn test_random_ops_degree_4() {
    run_random_ops(4, 0x5eed);
}

#[test]
fn test_random_ops_degree_5() {
    run_random_ops(5, 7);
}

#[test]
fn test_random_ops_default_degree() {
    run_random_ops(bplustree::DEFAULT_DEGREE, 2024);
}

#[test]
fn test_random_ranges() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut tree = BPlusTreeMap::new(6).unwrap();
    let mut reference = BTreeMap::new();
    for _ in 0..3_000 {
        let key = rng.gen_range(0..KEY_SPACE);
        tree.insert(key, key * 2);
        reference.insert(key, key * 2);
    }
    for _ in 0..500 {
        let key = rng.gen_range(0..KEY_SPACE);
        tree.remove(&key);
        reference.remove(&key);
    }

    for _ in 0..200 {
        let lo = rng.gen_range(-10..KEY_SPACE + 10);
        let hi = lo + rng.gen_range(0..300);
        assert!(tree.range(lo..hi).eq(reference.range(lo..hi)), "{}..{}", lo, hi);
        assert!(tree.range(lo..=hi).eq(reference.range(lo..=hi)), "{}..={}", lo, hi);
        assert!(tree.range(..hi).eq(reference.range(..hi)), "..{}", hi);
        assert!(tree.range(lo..).eq(reference.range(lo..)), "{}..", lo);
    }
}

#[test]
fn test_bulk_build_from_iterator() {
    let mut rng = StdRng::seed_from_u64(1);
    let pairs: Vec<(u64, u64)> = (0..5_000).map(|_| (rng.gen(), rng.gen())).collect();

    let tree: BPlusTreeMap<u64, u64> = pairs.iter().copied().collect();
    let reference: BTreeMap<u64, u64> = pairs.iter().copied().collect();

    assert_eq!(tree.len(), reference.len());
    assert!(tree.items().eq(reference.iter()));
}
