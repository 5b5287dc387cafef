mod common;

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use bplustree::{BPlusTreeError, BPlusTreeMap};
use proptest::prelude::*;

fn arb_degree() -> impl Strategy<Value = usize> {
    prop_oneof![Just(4usize), Just(5usize), 6usize..=12, Just(32usize)]
}

fn arb_keys() -> impl Strategy<Value = Vec<i32>> {
    // Narrow key space so duplicates are common
    prop::collection::vec(-200i32..200, 0..400)
}

#[derive(Debug, Clone)]
enum Operation {
    Insert(i16, u32),
    Delete(i16),
    Search(i16),
}

fn arb_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        3 => (any::<i16>().prop_map(|k| k % 300), any::<u32>())
            .prop_map(|(k, v)| Operation::Insert(k, v)),
        1 => any::<i16>().prop_map(|k| Operation::Delete(k % 300)),
        1 => any::<i16>().prop_map(|k| Operation::Search(k % 300)),
    ]
}

proptest! {
    #[test]
    fn prop_count_equals_distinct_keys(degree in arb_degree(), keys in arb_keys()) {
        let mut tree = BPlusTreeMap::new(degree).unwrap();
        for &k in &keys {
            tree.insert(k, ());
        }
        let distinct: BTreeSet<i32> = keys.iter().copied().collect();
        prop_assert_eq!(tree.len(), distinct.len());
    }

    #[test]
    fn prop_last_write_wins(degree in arb_degree(), keys in arb_keys()) {
        let mut tree = BPlusTreeMap::new(degree).unwrap();
        let mut expected = BTreeMap::new();
        for (i, &k) in keys.iter().enumerate() {
            tree.insert(k, i);
            expected.insert(k, i);
        }
        for (k, v) in &expected {
            prop_assert_eq!(tree.search(k), Ok(v));
        }
    }

    #[test]
    fn prop_keys_strictly_ascending(degree in arb_degree(), keys in arb_keys()) {
        let mut tree = BPlusTreeMap::new(degree).unwrap();
        for &k in &keys {
            tree.insert(k, k);
        }
        let walked = tree.all_keys();
        prop_assert!(walked.windows(2).all(|pair| pair[0] < pair[1]));
        prop_assert_eq!(tree.check_invariants_detailed(), Ok(()));
    }

    #[test]
    fn prop_delete_removes_exactly_one(
        degree in arb_degree(),
        keys in arb_keys(),
        probes in prop::collection::vec(-250i32..250, 1..50),
    ) {
        let mut tree = BPlusTreeMap::new(degree).unwrap();
        for &k in &keys {
            tree.insert(k, k);
        }
        for probe in probes {
            let before = tree.len();
            if tree.contains_key(&probe) {
                prop_assert_eq!(tree.delete(&probe), Ok((probe, probe)));
                prop_assert_eq!(tree.len(), before - 1);
                prop_assert!(!tree.contains_key(&probe));
            } else {
                prop_assert_eq!(tree.delete(&probe), Err(BPlusTreeError::KeyNotFound));
                prop_assert_eq!(tree.len(), before);
            }
        }
        prop_assert_eq!(tree.check_invariants_detailed(), Ok(()));
    }

    #[test]
    fn prop_splits_never_overlap(degree in arb_degree(), keys in arb_keys()) {
        common::init_tracing();
        let problems = Rc::new(RefCell::new(Vec::new()));
        let mut tree: BPlusTreeMap<i32, ()> = BPlusTreeMap::new(degree).unwrap();

        let seen = Rc::clone(&problems);
        tree.on_before_split(move |node| {
            if node.len() != degree {
                seen.borrow_mut().push(format!("split of non-full node {:?}", node.keys()));
            }
        });
        let seen = Rc::clone(&problems);
        tree.on_after_split(move |lo, hi| {
            if lo.is_empty() || hi.is_empty() {
                seen.borrow_mut().push("split produced an empty half".to_string());
            }
            if lo.max_key() >= hi.min_key() {
                seen.borrow_mut().push(format!("{:?} overlaps {:?}", lo.keys(), hi.keys()));
            }
            if lo.parent() != hi.parent() {
                seen.borrow_mut().push("halves disagree on parent".to_string());
            }
        });

        for &k in &keys {
            tree.insert(k, ());
        }
        prop_assert!(problems.borrow().is_empty(), "{:?}", problems.borrow());
        prop_assert_eq!(tree.check_invariants_detailed(), Ok(()));
    }

    #[test]
    fn prop_matches_btreemap(
        degree in arb_degree(),
        ops in prop::collection::vec(arb_operation(), 1..300),
    ) {
        let mut tree = BPlusTreeMap::new(degree).unwrap();
        let mut model = BTreeMap::new();

        for op in ops {
            match op {
                Operation::Insert(k, v) => {
                    prop_assert_eq!(tree.insert(k, v), model.insert(k, v));
                }
                Operation::Delete(k) => {
                    let expected = model
                        .remove(&k)
                        .map(|v| (k, v))
                        .ok_or(BPlusTreeError::KeyNotFound);
                    prop_assert_eq!(tree.delete(&k), expected);
                }
                Operation::Search(k) => {
                    prop_assert_eq!(tree.get(&k), model.get(&k));
                }
            }
        }

        prop_assert_eq!(tree.len(), model.len());
        let pairs: Vec<(i16, u32)> = tree.items().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(i16, u32)> = model.into_iter().collect();
        prop_assert_eq!(pairs, expected);
        prop_assert_eq!(tree.check_invariants_detailed(), Ok(()));
    }

    #[test]
    fn prop_range_matches_btreemap(
        degree in arb_degree(),
        keys in arb_keys(),
        start in -250i32..250,
        width in 0i32..120,
    ) {
        let mut tree = BPlusTreeMap::new(degree).unwrap();
        let mut model = BTreeMap::new();
        for &k in &keys {
            tree.insert(k, k);
            model.insert(k, k);
        }
        let end = start + width;
        let got: Vec<i32> = tree.range(start..end).map(|(k, _)| *k).collect();
        let want: Vec<i32> = model.range(start..end).map(|(k, _)| *k).collect();
        prop_assert_eq!(got, want);

        let got: Vec<i32> = tree.range(start..=end).map(|(k, _)| *k).collect();
        let want: Vec<i32> = model.range(start..=end).map(|(k, _)| *k).collect();
        prop_assert_eq!(got, want);
    }
}
