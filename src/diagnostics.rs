//! Read-only views for inspecting bucket layout and hash collisions.

use crate::bucketed_hash_map::{bucket_for, BucketedHashMap};
use crate::strategy::KeyHasher;
use core::fmt;
use hashbrown::HashMap;

/// Printable snapshot of every bucket, returned by `BucketedHashMap::dump`.
///
/// ```text
/// BucketedHashMap (size: 2, buckets: 4, load factor: 0.50)
///   [0] empty
///   [1] {1: a} -> {5: b}
///   [2] empty
///   [3] empty
/// ```
pub struct BucketDump<'a, K, V, H, E> {
    map: &'a BucketedHashMap<K, V, H, E>,
}

impl<K, V, H, E> fmt::Display for BucketDump<'_, K, V, H, E>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.map;
        writeln!(
            f,
            "BucketedHashMap (size: {}, buckets: {}, load factor: {:.2})",
            m.len(),
            m.bucket_count(),
            m.load_factor()
        )?;
        for i in 0..m.bucket_count() {
            write!(f, "  [{i}] ")?;
            let mut chain = m.bucket_iter(i).peekable();
            if chain.peek().is_none() {
                f.write_str("empty")?;
            }
            let mut first = true;
            for (k, v) in chain {
                if !first {
                    f.write_str(" -> ")?;
                }
                write!(f, "{{{k}: {v}}}")?;
                first = false;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl<K, V, H, E> BucketedHashMap<K, V, H, E> {
    pub fn dump(&self) -> BucketDump<'_, K, V, H, E> {
        BucketDump { map: self }
    }
}

impl<K, V, H, E> BucketedHashMap<K, V, H, E>
where
    H: KeyHasher<K>,
{
    /// Entries grouped by raw hash, keeping only groups of two or more.
    /// Within a group, entries appear in iteration order.
    pub fn collisions(&self) -> HashMap<u64, Vec<(&K, &V)>> {
        let _g = self.reentrancy.enter();
        let mut groups: HashMap<u64, Vec<(&K, &V)>> = HashMap::new();
        for (k, v) in self.iter() {
            groups
                .entry(self.table.hasher.hash(k))
                .or_default()
                .push((k, v));
        }
        groups.retain(|_, items| items.len() > 1);
        groups
    }

    /// Entries whose raw hash is exactly `hash`. Only the bucket that hash
    /// maps to is scanned.
    pub fn entries_with_hash(&self, hash: u64) -> Vec<(&K, &V)> {
        let _g = self.reentrancy.enter();
        let bucket = bucket_for(hash, self.table.buckets.len());
        self.bucket_iter(bucket)
            .filter(|(k, _)| self.table.hasher.hash(*k) == hash)
            .collect()
    }
}
