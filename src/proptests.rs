use super::*;

use crate::node::Node;
use proptest::prelude::*;
use std::collections::BTreeMap;

fn validate_node<V>(node: &Node<V>, is_root: bool, value_count: &mut usize) {
    if !is_root {
        assert!(
            !node.prefix.is_empty(),
            "non-root node must have a non-empty prefix"
        );
        assert!(
            node.value.is_some() || node.children.len() >= 2,
            "valueless node with fewer than two children must have been merged"
        );
    }

    if node.value.is_some() {
        *value_count += 1;
    }

    assert_eq!(
        node.indices.len(),
        node.children.len(),
        "dispatch index must cover every child"
    );
    for (i, child) in node.children.iter().enumerate() {
        assert_eq!(
            node.indices[i], child.prefix[0],
            "dispatch index must mirror child order"
        );
    }
    for w in node.indices.windows(2) {
        assert!(
            w[0] < w[1],
            "children must be strictly ordered by first byte (no duplicates)"
        );
    }
    match node.bounds {
        Some((min, max)) => {
            assert_eq!(Some(&min), node.indices.first(), "stale min bound");
            assert_eq!(Some(&max), node.indices.last(), "stale max bound");
        }
        None => assert!(
            node.indices.is_empty(),
            "bounds may be unset only on a childless node"
        ),
    }

    for child in &node.children {
        validate_node(child, false, value_count);
    }
}

fn validate_tree<V>(t: &RadixTree<V>) {
    assert!(t.root.prefix.is_empty(), "root prefix must stay empty");
    let mut value_count = 0usize;
    validate_node(&t.root, true, &mut value_count);
    assert_eq!(
        value_count,
        t.len(),
        "reachable value count must match RadixTree::len"
    );
}

#[derive(Clone, Debug)]
enum Op {
    Insert(Vec<u8>, u64),
    Remove(Vec<u8>),
    RemovePrefix(Vec<u8>),
    Get(Vec<u8>),
    Scan(Vec<u8>),
}

fn key_strategy_dense() -> impl Strategy<Value = Vec<u8>> + Clone {
    // A four-letter alphabet and short keys make shared prefixes (and
    // thus splits, merges and covered-subtree deletions) the common case
    // instead of a rarity.
    prop::collection::vec((0u8..4).prop_map(|b| b'a' + b), 0..=8)
}

fn key_strategy_wide() -> impl Strategy<Value = Vec<u8>> + Clone {
    prop::collection::vec(1u8..=255, 0..=32)
}

fn ops_strategy(key: impl Strategy<Value = Vec<u8>> + Clone) -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        45 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::Insert(k, v)),
        20 => key.clone().prop_map(Op::Remove),
        10 => key.clone().prop_map(Op::RemovePrefix),
        15 => key.clone().prop_map(Op::Get),
        10 => key.clone().prop_map(Op::Scan),
    ];
    prop::collection::vec(op, 0..=400)
}

fn run_ops(ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut t: RadixTree<u64> = RadixTree::new();
    let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();

    for op in ops {
        match op {
            Op::Insert(key, value) => {
                let old_t = t.insert(&key, value);
                let old_m = m.insert(key, value);
                prop_assert_eq!(old_t, old_m);
            }
            Op::Remove(key) => {
                let old_t = t.remove(&key);
                let old_m = m.remove(key.as_slice());
                prop_assert_eq!(old_t, old_m);
            }
            Op::RemovePrefix(prefix) => {
                let covered: Vec<Vec<u8>> = m
                    .keys()
                    .filter(|k| k.starts_with(&prefix))
                    .cloned()
                    .collect();
                for k in &covered {
                    m.remove(k);
                }
                prop_assert_eq!(t.remove_prefix(&prefix), !covered.is_empty());
                // Immediately repeating the same prefix removal is a no-op.
                prop_assert!(!t.remove_prefix(&prefix));
            }
            Op::Get(key) => {
                let got_t = t.get(&key).copied();
                let got_m = m.get(key.as_slice()).copied();
                prop_assert_eq!(got_t, got_m);
            }
            Op::Scan(prefix) => {
                let got: Vec<(Vec<u8>, u64)> = t
                    .scan_prefix(&prefix)
                    .into_iter()
                    .map(|(k, v)| (k, *v))
                    .collect();
                let expected: Vec<(Vec<u8>, u64)> = m
                    .iter()
                    .filter(|(k, _)| k.starts_with(&prefix))
                    .map(|(k, v)| (k.clone(), *v))
                    .collect();
                prop_assert_eq!(got, expected);
            }
        }

        prop_assert_eq!(t.len(), m.len());
        validate_tree(&t);
    }

    let got: Vec<(Vec<u8>, u64)> = t.iter().map(|(k, v)| (k, *v)).collect();
    let expected: Vec<(Vec<u8>, u64)> = m.iter().map(|(k, v)| (k.clone(), *v)).collect();
    prop_assert_eq!(got, expected);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_dense_keys(ops in ops_strategy(key_strategy_dense())) {
        run_ops(ops)?;
    }

    #[test]
    fn prop_equivalence_wide_keys(ops in ops_strategy(key_strategy_wide())) {
        run_ops(ops)?;
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

fn small_key_set() -> Vec<Vec<u8>> {
    // Exercises the empty key, a key that is a strict prefix of another,
    // a shared mid-edge prefix, and an unrelated sibling.
    vec![
        b"".to_vec(),
        b"a".to_vec(),
        b"ab".to_vec(),
        b"abc".to_vec(),
        b"axe".to_vec(),
        b"b".to_vec(),
    ]
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys = small_key_set();

    for_each_permutation(&keys, |perm| {
        let mut t: RadixTree<u64> = RadixTree::new();
        let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();

        for (i, k) in perm.into_iter().enumerate() {
            let v = i as u64;
            assert_eq!(t.insert(&k, v), m.insert(k, v));
            validate_tree(&t);
        }

        let got: Vec<(Vec<u8>, u64)> = t.iter().map(|(k, v)| (k, *v)).collect();
        let expected: Vec<(Vec<u8>, u64)> = m.iter().map(|(k, v)| (k.clone(), *v)).collect();
        assert_eq!(got, expected);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys = small_key_set();

    // Insert in a fixed order, then remove in all permutations.
    let mut base_tree: RadixTree<u64> = RadixTree::new();
    let mut base_map: BTreeMap<Vec<u8>, u64> = BTreeMap::new();
    for (i, k) in keys.iter().enumerate() {
        let v = i as u64;
        assert_eq!(base_tree.insert(k, v), base_map.insert(k.clone(), v));
    }

    for_each_permutation(&keys, |perm| {
        let mut t = base_tree.clone();
        let mut m = base_map.clone();

        for k in perm {
            assert_eq!(t.remove(&k), m.remove(k.as_slice()));
            assert_eq!(t.len(), m.len());
            validate_tree(&t);
        }
        assert_eq!(t.len(), 0);
        assert!(t.root.value.is_none());
        assert!(t.root.children.is_empty());
    });
}

#[test]
fn exhaustive_remove_prefix_on_small_set() {
    let keys = small_key_set();

    let prefixes: Vec<Vec<u8>> = vec![
        b"".to_vec(),
        b"a".to_vec(),
        b"ab".to_vec(),
        b"abc".to_vec(),
        b"abcd".to_vec(),
        b"ax".to_vec(),
        b"b".to_vec(),
        b"c".to_vec(),
    ];

    for prefix in prefixes {
        let mut t: RadixTree<u64> = RadixTree::new();
        let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();
        for (i, k) in keys.iter().enumerate() {
            let v = i as u64;
            t.insert(k, v);
            m.insert(k.clone(), v);
        }

        let covered: Vec<Vec<u8>> = m
            .keys()
            .filter(|k| k.starts_with(&prefix))
            .cloned()
            .collect();
        for k in &covered {
            m.remove(k);
        }

        assert_eq!(
            t.remove_prefix(&prefix),
            !covered.is_empty(),
            "remove_prefix disagreed for {prefix:?}"
        );
        assert!(!t.remove_prefix(&prefix));
        validate_tree(&t);

        let got: Vec<(Vec<u8>, u64)> = t.iter().map(|(k, v)| (k, *v)).collect();
        let expected: Vec<(Vec<u8>, u64)> = m.iter().map(|(k, v)| (k.clone(), *v)).collect();
        assert_eq!(got, expected);
    }
}
