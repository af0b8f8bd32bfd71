//! BucketedHashMap: separate-chaining map with injected hash/equality
//! strategies, grow-only rehashing and positional handles.

use crate::bucket::{empty_buckets, Bucket};
use crate::config::{check_max_load_factor, ConfigError, MapConfig, DEFAULT_BUCKETS};
use crate::iter::{BucketIter, IntoIter, Iter, IterMut, Keys, Position, Values, ValuesMut};
use crate::reentrancy::DebugReentrancy;
use crate::strategy::{BorrowEq, KeyEq, KeyHasher, StdHasher};
use core::fmt;
use core::mem;
use core::ops::Index;
use tracing::{debug, trace, warn};

/// Points at one entry by `(bucket, slot)`.
///
/// A handle is only as durable as the position it names: a rehash, or a
/// removal from the same bucket, can make it dangle (accessors return `None`)
/// or point at a different entry. Inserting unrelated keys without growth
/// never moves existing entries.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(Position);

impl Handle {
    pub fn position(&self) -> Position {
        self.0
    }

    pub fn key<'a, K, V, H, E>(&self, map: &'a BucketedHashMap<K, V, H, E>) -> Option<&'a K> {
        map.table.entry(self.0).map(|(k, _)| k)
    }

    pub fn value<'a, K, V, H, E>(&self, map: &'a BucketedHashMap<K, V, H, E>) -> Option<&'a V> {
        map.table.entry(self.0).map(|(_, v)| v)
    }

    pub fn value_mut<'a, K, V, H, E>(
        &self,
        map: &'a mut BucketedHashMap<K, V, H, E>,
    ) -> Option<&'a mut V> {
        map.table.value_mut(self.0)
    }
}

/// Raw table state. Methods here may call the strategies freely; the public
/// wrapper holds the reentrancy guard around them.
#[derive(Clone)]
pub(crate) struct Table<K, V, H, E> {
    pub(crate) buckets: Vec<Bucket<K, V>>,
    pub(crate) hasher: H,
    pub(crate) key_eq: E,
    pub(crate) max_load_factor: f32,
    pub(crate) len: usize,
}

#[inline]
pub(crate) fn bucket_for(hash: u64, bucket_count: usize) -> usize {
    (hash % bucket_count as u64) as usize
}

fn at_least_one(n: usize, what: &str) -> usize {
    if n == 0 {
        warn!(what, "bucket count 0 coerced to 1");
        1
    } else {
        n
    }
}

impl<K, V, H, E> Table<K, V, H, E> {
    fn new(bucket_count: usize, hasher: H, key_eq: E, max_load_factor: f32) -> Self {
        Self {
            buckets: empty_buckets(bucket_count),
            hasher,
            key_eq,
            max_load_factor,
            len: 0,
        }
    }

    fn exceeds(&self, len: usize, bucket_count: usize) -> bool {
        len as f32 / bucket_count as f32 > self.max_load_factor
    }

    /// Largest bucket array a `Vec` can hold.
    fn max_bucket_count() -> usize {
        isize::MAX as usize / mem::size_of::<Bucket<K, V>>().max(1)
    }

    /// Smallest doubling of the current bucket count that holds `len`
    /// entries within the max load factor, clamped to `max_bucket_count`.
    fn grown_bucket_count(&self, len: usize) -> usize {
        let cap = Self::max_bucket_count();
        let mut n = self.buckets.len();
        while n < cap && self.exceeds(len, n) {
            n = n.saturating_mul(2).min(cap);
        }
        n
    }

    fn entry(&self, pos: Position) -> Option<(&K, &V)> {
        self.buckets
            .get(pos.bucket)?
            .get(pos.slot)
            .map(|e| (&e.key, &e.value))
    }

    fn value_mut(&mut self, pos: Position) -> Option<&mut V> {
        self.buckets
            .get_mut(pos.bucket)?
            .get_mut(pos.slot)
            .map(|e| &mut e.value)
    }

    fn locate<Q>(&self, q: &Q) -> Option<Position>
    where
        Q: ?Sized,
        H: KeyHasher<Q>,
        E: KeyEq<K, Q>,
    {
        let bucket = bucket_for(self.hasher.hash(q), self.buckets.len());
        self.buckets[bucket]
            .position(&self.key_eq, q)
            .map(|slot| Position { bucket, slot })
    }

    fn remove_at(&mut self, pos: Position) -> (K, V) {
        let e = self.buckets[pos.bucket].remove(pos.slot);
        self.len -= 1;
        (e.key, e.value)
    }
}

impl<K, V, H, E> Table<K, V, H, E>
where
    H: KeyHasher<K>,
    E: KeyEq<K>,
{
    /// Redistribute every entry into `bucket_count` fresh buckets. All
    /// hashes are computed before anything moves, so a panicking hasher
    /// leaves the table untouched.
    fn rehash(&mut self, bucket_count: usize) {
        let targets: Vec<usize> = self
            .buckets
            .iter()
            .flat_map(|b| b.entries().iter())
            .map(|e| bucket_for(self.hasher.hash(&e.key), bucket_count))
            .collect();

        let mut fresh = empty_buckets(bucket_count);
        let mut targets = targets.into_iter();
        for bucket in &mut self.buckets {
            for (entry, target) in bucket.drain().zip(&mut targets) {
                fresh[target].push_entry(entry);
            }
        }
        self.buckets = fresh;
    }

    /// Grow (never shrink) until `len` entries fit under the threshold.
    fn grow_for(&mut self, len: usize, trigger: &'static str) {
        let target = self.grown_bucket_count(len);
        if target != self.buckets.len() {
            debug!(
                from = self.buckets.len(),
                to = target,
                len = self.len,
                trigger,
                "growing bucket array"
            );
            self.rehash(target);
        }
    }

    fn insert_with<F>(&mut self, key: K, make: F) -> (Position, bool)
    where
        F: FnOnce() -> V,
    {
        let hash = self.hasher.hash(&key);
        let bucket = bucket_for(hash, self.buckets.len());
        if let Some(slot) = self.buckets[bucket].position(&self.key_eq, &key) {
            return (Position { bucket, slot }, false);
        }

        // Growing before the append leaves the same table as growing right
        // after it, and keeps the new entry's position known.
        self.grow_for(self.len + 1, "insert");
        let bucket = bucket_for(hash, self.buckets.len());
        let slot = self.buckets[bucket].push(key, make());
        self.len += 1;
        (Position { bucket, slot }, true)
    }
}

/// Separate-chaining hash map.
///
/// Keys land in bucket `hash(key) % bucket_count`, each bucket being a chain
/// scanned linearly with the `KeyEq` strategy. When an insert would push
/// `len / bucket_count` above the max load factor, the bucket array doubles.
/// The table never shrinks on its own.
pub struct BucketedHashMap<K, V, H = StdHasher, E = BorrowEq> {
    pub(crate) table: Table<K, V, H, E>,
    pub(crate) reentrancy: DebugReentrancy,
}

impl<K, V> BucketedHashMap<K, V> {
    pub fn new() -> Self {
        Self::with_buckets(DEFAULT_BUCKETS)
    }

    /// `0` is coerced to a single bucket.
    pub fn with_buckets(bucket_count: usize) -> Self {
        Self::with_strategies(bucket_count, StdHasher::new(), BorrowEq)
    }

    /// Build from a config with the default strategies. An invalid load
    /// factor falls back to the default with a warning; use
    /// `try_with_config` to reject it instead.
    pub fn with_config(config: MapConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!(%e, "falling back to default max load factor");
                MapConfig {
                    max_load_factor: MapConfig::default().max_load_factor,
                    ..config
                }
            }
        };
        Self::from_parts(config, StdHasher::new(), BorrowEq)
    }
}

impl<K, V> Default for BucketedHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, H, E> BucketedHashMap<K, V, H, E> {
    pub fn with_strategies(bucket_count: usize, hasher: H, key_eq: E) -> Self {
        Self::from_parts(
            MapConfig::default().with_initial_buckets(bucket_count),
            hasher,
            key_eq,
        )
    }

    pub fn try_with_config(config: MapConfig, hasher: H, key_eq: E) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_parts(config, hasher, key_eq))
    }

    fn from_parts(config: MapConfig, hasher: H, key_eq: E) -> Self {
        let n = at_least_one(config.initial_buckets, "construct");
        Self {
            table: Table::new(n, hasher, key_eq, config.max_load_factor),
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len
    }

    pub fn is_empty(&self) -> bool {
        self.table.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.table.buckets.len()
    }

    /// Chain length of bucket `n`. Panics if `n >= bucket_count()`.
    pub fn bucket_size(&self, n: usize) -> usize {
        self.table.buckets[n].len()
    }

    /// Entries of bucket `n` in chain order. Panics if `n >= bucket_count()`.
    pub fn bucket_iter(&self, n: usize) -> BucketIter<'_, K, V> {
        BucketIter {
            inner: self.table.buckets[n].entries().iter(),
        }
    }

    pub fn load_factor(&self) -> f32 {
        self.table.len as f32 / self.table.buckets.len() as f32
    }

    pub fn max_load_factor(&self) -> f32 {
        self.table.max_load_factor
    }

    pub fn hasher(&self) -> &H {
        &self.table.hasher
    }

    pub fn key_eq(&self) -> &E {
        &self.table.key_eq
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.table.buckets, self.table.len)
    }

    /// An exhausted iterator, equal to any `Iter` of this map that has run out.
    pub fn iter_end(&self) -> Iter<'_, K, V> {
        let n = self.table.buckets.len();
        Iter::new(&self.table.buckets[n..], 0)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&mut self.table.buckets, self.table.len)
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Drop every entry; the bucket count is kept.
    pub fn clear(&mut self) {
        trace!(len = self.table.len, buckets = self.table.buckets.len(), "clear");
        for b in &mut self.table.buckets {
            b.clear();
        }
        self.table.len = 0;
    }

    /// Keep only the entries for which `keep` returns true. Never shrinks.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut removed = 0;
        for b in &mut self.table.buckets {
            removed += b.retain(&mut keep);
        }
        self.table.len -= removed;
    }

    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.table, &mut other.table);
    }

    /// Move the contents out, leaving `self` empty with a single bucket and
    /// copies of the strategies.
    pub fn take(&mut self) -> Self
    where
        H: Clone,
        E: Clone,
    {
        let empty = Table::new(
            1,
            self.table.hasher.clone(),
            self.table.key_eq.clone(),
            self.table.max_load_factor,
        );
        Self {
            table: mem::replace(&mut self.table, empty),
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        Q: ?Sized,
        H: KeyHasher<Q>,
        E: KeyEq<K, Q>,
    {
        self.get_key_value(q).map(|(_, v)| v)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        Q: ?Sized,
        H: KeyHasher<Q>,
        E: KeyEq<K, Q>,
    {
        let _g = self.reentrancy.enter();
        let pos = self.table.locate(q)?;
        self.table.entry(pos)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        Q: ?Sized,
        H: KeyHasher<Q>,
        E: KeyEq<K, Q>,
    {
        let _g = self.reentrancy.enter();
        let pos = self.table.locate(q)?;
        self.table.value_mut(pos)
    }

    /// Handle to the entry matching `q`, if any.
    pub fn find<Q>(&self, q: &Q) -> Option<Handle>
    where
        Q: ?Sized,
        H: KeyHasher<Q>,
        E: KeyEq<K, Q>,
    {
        let _g = self.reentrancy.enter();
        self.table.locate(q).map(Handle)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        Q: ?Sized,
        H: KeyHasher<Q>,
        E: KeyEq<K, Q>,
    {
        self.find(q).is_some()
    }

    /// Index of the bucket `q` maps to under the current bucket count.
    pub fn bucket<Q>(&self, q: &Q) -> usize
    where
        Q: ?Sized,
        H: KeyHasher<Q>,
    {
        let _g = self.reentrancy.enter();
        bucket_for(self.table.hasher.hash(q), self.table.buckets.len())
    }

    /// Remove the entry for `q`. Returns how many entries were removed (0 or 1).
    pub fn remove<Q>(&mut self, q: &Q) -> usize
    where
        Q: ?Sized,
        H: KeyHasher<Q>,
        E: KeyEq<K, Q>,
    {
        usize::from(self.remove_entry(q).is_some())
    }

    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        Q: ?Sized,
        H: KeyHasher<Q>,
        E: KeyEq<K, Q>,
    {
        let _g = self.reentrancy.enter();
        let pos = self.table.locate(q)?;
        Some(self.table.remove_at(pos))
    }
}

impl<K, V, H, E> BucketedHashMap<K, V, H, E>
where
    H: KeyHasher<K>,
    E: KeyEq<K>,
{
    /// Insert `key -> value` unless the key is already present.
    ///
    /// Returns a handle to the entry for `key` and whether a new entry was
    /// created. An existing value is never overwritten.
    pub fn insert(&mut self, key: K, value: V) -> (Handle, bool) {
        self.insert_with(key, || value)
    }

    /// Like `insert`, but `make` only runs when the key is absent.
    pub fn insert_with<F>(&mut self, key: K, make: F) -> (Handle, bool)
    where
        F: FnOnce() -> V,
    {
        let _g = self.reentrancy.enter();
        let (pos, inserted) = self.table.insert_with(key, make);
        (Handle(pos), inserted)
    }

    /// Find-or-insert: the value for `key`, inserting `make()` first if absent.
    pub fn get_or_insert_with<F>(&mut self, key: K, make: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let _g = self.reentrancy.enter();
        let (pos, _) = self.table.insert_with(key, make);
        &mut self.table.buckets[pos.bucket].entry_mut(pos.slot).value
    }

    /// Index-style access: inserts `V::default()` for a missing key.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    /// Rebuild with `bucket_count` buckets (0 is coerced to 1). May shrink;
    /// only the automatic growth path is grow-only.
    pub fn rehash(&mut self, bucket_count: usize) {
        let n = at_least_one(bucket_count, "rehash");
        let _g = self.reentrancy.enter();
        trace!(from = self.table.buckets.len(), to = n, len = self.table.len, "rehash");
        self.table.rehash(n);
    }

    /// Grow so that `additional` more entries fit without a further rehash.
    pub fn reserve(&mut self, additional: usize) {
        let _g = self.reentrancy.enter();
        let wanted = self.table.len.saturating_add(additional);
        self.table.grow_for(wanted, "reserve");
    }

    /// Set the growth threshold and grow right away if it is already exceeded.
    pub fn set_max_load_factor(&mut self, lf: f32) -> Result<(), ConfigError> {
        check_max_load_factor(lf)?;
        let _g = self.reentrancy.enter();
        self.table.max_load_factor = lf;
        self.table.grow_for(self.table.len, "max_load_factor");
        Ok(())
    }
}

impl<K, V, H, E> Clone for BucketedHashMap<K, V, H, E>
where
    K: Clone,
    V: Clone,
    H: Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            reentrancy: DebugReentrancy::new(),
        }
    }

    /// Copy first, then swap: a panicking `clone` leaves `self` untouched.
    fn clone_from(&mut self, source: &Self) {
        let mut fresh = source.clone();
        self.swap(&mut fresh);
    }
}

impl<K, V, H, E> fmt::Debug for BucketedHashMap<K, V, H, E>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, H, E> fmt::Display for BucketedHashMap<K, V, H, E>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dump())
    }
}

impl<K, V, H, E> PartialEq for BucketedHashMap<K, V, H, E>
where
    V: PartialEq,
    H: KeyHasher<K>,
    E: KeyEq<K>,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|ov| v == ov))
    }
}

impl<K, V, H, E> Eq for BucketedHashMap<K, V, H, E>
where
    V: Eq,
    H: KeyHasher<K>,
    E: KeyEq<K>,
{
}

impl<K, V, H, E, Q> Index<&Q> for BucketedHashMap<K, V, H, E>
where
    Q: ?Sized,
    H: KeyHasher<Q>,
    E: KeyEq<K, Q>,
{
    type Output = V;

    /// Panics if the key is absent.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

/// Bulk insert with `insert` semantics: the first value seen for a key wins.
impl<K, V, H, E> Extend<(K, V)> for BucketedHashMap<K, V, H, E>
where
    H: KeyHasher<K>,
    E: KeyEq<K>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, H, E> FromIterator<(K, V)> for BucketedHashMap<K, V, H, E>
where
    H: KeyHasher<K> + Default,
    E: KeyEq<K> + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut m = Self::with_strategies(DEFAULT_BUCKETS, H::default(), E::default());
        m.extend(iter);
        m
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for BucketedHashMap<K, V>
where
    StdHasher: KeyHasher<K>,
    BorrowEq: KeyEq<K>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K, V, H, E> IntoIterator for BucketedHashMap<K, V, H, E> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter::new(self.table.buckets, self.table.len)
    }
}

impl<'a, K, V, H, E> IntoIterator for &'a BucketedHashMap<K, V, H, E> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, H, E> IntoIterator for &'a mut BucketedHashMap<K, V, H, E> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}
