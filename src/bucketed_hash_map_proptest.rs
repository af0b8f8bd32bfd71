#![cfg(test)]

// Property tests for BucketedHashMap kept inside the crate so they can
// check bucket placement against the raw table.

use crate::bucketed_hash_map::{bucket_for, BucketedHashMap};
use crate::strategy::{BorrowEq, FnHasher, KeyHasher};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    IndexAdd(usize, i32),
    Remove(usize),
    Find(usize),
    Contains(String),
    Rehash(usize),
    Clear,
    Iterate,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => (idx.clone(), -100i32..100).prop_map(|(i, d)| OpI::IndexAdd(i, d)),
            3 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Find),
            1 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(OpI::Contains),
            1 => (0usize..40).prop_map(OpI::Rehash),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Structural invariants that must hold after every operation.
fn check_structure<H>(sut: &BucketedHashMap<Key, i32, H, BorrowEq>) -> Result<(), TestCaseError>
where
    H: KeyHasher<Key>,
{
    let n = sut.bucket_count();
    prop_assert!(n >= 1);
    let mut total = 0;
    for b in 0..n {
        for (k, _) in sut.bucket_iter(b) {
            prop_assert_eq!(bucket_for(sut.hasher().hash(k), n), b);
        }
        total += sut.bucket_size(b);
    }
    prop_assert_eq!(total, sut.len());
    prop_assert_eq!(sut.iter().count(), sut.len());
    let distinct: BTreeSet<&Key> = sut.keys().collect();
    prop_assert_eq!(distinct.len(), sut.len());
    Ok(())
}

// Drives the map and a std::collections::HashMap model through the same ops.
// Invariants exercised across random operation sequences:
// - insert never overwrites and reports `inserted` iff the key was absent.
// - index-style access inserts a default then mutates in place.
// - `remove` returns 1/0 matching model presence.
// - every entry sits in `hash % bucket_count`; bucket sizes sum to `len`.
// - explicit rehash and clear keep the pair set (or empty it) exactly.
fn run_state_machine<H>(
    mut sut: BucketedHashMap<Key, i32, H, BorrowEq>,
    pool: Vec<String>,
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    H: KeyHasher<Key> + KeyHasher<str>,
{
    let mut model: HashMap<Key, i32> = HashMap::new();
    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(&pool, i);
                let already = model.get(&k).copied();
                let (h, inserted) = sut.insert(k.clone(), v);
                prop_assert_eq!(inserted, already.is_none());
                model.entry(k.clone()).or_insert(v);
                prop_assert_eq!(h.key(&sut), Some(&k));
                prop_assert_eq!(h.value(&sut), model.get(&k));
            }
            OpI::IndexAdd(i, d) => {
                let k = key_from(&pool, i);
                let slot = sut.get_or_insert_default(k.clone());
                *slot = slot.wrapping_add(d);
                let m = model.entry(k).or_default();
                *m = m.wrapping_add(d);
            }
            OpI::Remove(i) => {
                let k = key_from(&pool, i);
                let expected = usize::from(model.remove(&k).is_some());
                prop_assert_eq!(sut.remove(&k), expected);
                prop_assert!(sut.get(&k).is_none());
            }
            OpI::Find(i) => {
                let k = key_from(&pool, i);
                prop_assert_eq!(sut.get(&k), model.get(&k));
                let h = sut.find(&k);
                prop_assert_eq!(h.is_some(), model.contains_key(&k));
                if let Some(h) = h {
                    prop_assert_eq!(h.value(&sut), model.get(&k));
                }
            }
            OpI::Contains(s) => {
                let has = sut.contains_key(s.as_str());
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(has, has_model);
            }
            OpI::Rehash(n) => {
                let before: BTreeMap<Key, i32> =
                    sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                sut.rehash(n);
                prop_assert_eq!(sut.bucket_count(), n.max(1));
                let after: BTreeMap<Key, i32> =
                    sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(before, after);
            }
            OpI::Clear => {
                let buckets = sut.bucket_count();
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.bucket_count(), buckets);
            }
            OpI::Iterate => {
                let s: BTreeMap<Key, i32> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                let m: BTreeMap<Key, i32> = model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(s, m);
            }
        }

        check_structure(&sut)?;
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario(), buckets in 0usize..8) {
        let sut: BucketedHashMap<Key, i32> = BucketedHashMap::with_buckets(buckets);
        run_state_machine(sut, pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution:
// every key lands in bucket 0 and lookups degrade to one long chain scan.
fn zero(_: &str) -> u64 {
    0
}

#[derive(Clone, Copy)]
struct ConstHasher;
impl KeyHasher<str> for ConstHasher {
    fn hash(&self, key: &str) -> u64 {
        zero(key)
    }
}
impl KeyHasher<Key> for ConstHasher {
    fn hash(&self, key: &Key) -> u64 {
        zero(&key.0)
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut = BucketedHashMap::with_strategies(4, ConstHasher, BorrowEq);
        run_state_machine(sut, pool, ops)?;
    }
}

proptest! {
    // Property: after any insert-only sequence the load factor stays at or
    // below the threshold, whatever the threshold and starting size.
    #[test]
    fn prop_load_factor_bound(
        keys in proptest::collection::vec(any::<u32>(), 0..300),
        buckets in 0usize..32,
        lf in 0.1f32..4.0,
    ) {
        let mut m: BucketedHashMap<u32, u32> = BucketedHashMap::with_buckets(buckets);
        m.set_max_load_factor(lf).unwrap();
        let distinct: BTreeSet<u32> = keys.iter().copied().collect();
        for k in keys {
            m.insert(k, k);
            prop_assert!(m.load_factor() <= m.max_load_factor());
        }
        prop_assert_eq!(m.len(), distinct.len());
        for k in &distinct {
            prop_assert_eq!(m.get(k), Some(k));
        }
    }

    // Property: bucket counts only ever change by doubling on the automatic path.
    #[test]
    fn prop_growth_is_doubling(count in 0u64..200, start in 1usize..16) {
        let mut m = BucketedHashMap::with_strategies(
            start,
            FnHasher(|k: &u64| *k),
            BorrowEq,
        );
        let mut last = m.bucket_count();
        for k in 0..count {
            m.insert(k, ());
            let now = m.bucket_count();
            prop_assert!(now == last || now == last * 2);
            last = now;
        }
    }
}
