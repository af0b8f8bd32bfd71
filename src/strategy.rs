//! Hash and key-equality strategies injected into `BucketedHashMap`.
//!
//! The map never hashes or compares keys on its own; it asks a
//! `KeyHasher` for a raw `u64` and a `KeyEq` whether a stored key matches a
//! probe. Both traits are generic over the probe type so lookups can use a
//! borrowed form (`&str` for `String` keys) without building an owned key.
//!
//! Contract: for every stored key `k` and probe `q`,
//! `eq.eq(k, q)` implies `hasher.hash(k) == hasher.hash(q)`. Violating it is
//! a logic error; the map stays memory-safe but lookups may miss.

use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

/// Produces the raw hash of a key or probe.
pub trait KeyHasher<Q: ?Sized> {
    fn hash(&self, key: &Q) -> u64;
}

/// Compares a stored key against a probe.
pub trait KeyEq<K: ?Sized, Q: ?Sized = K> {
    fn eq(&self, stored: &K, probe: &Q) -> bool;

    /// Same relation with the operands swapped.
    #[inline]
    fn eq_rev(&self, probe: &Q, stored: &K) -> bool {
        self.eq(stored, probe)
    }
}

/// Hashes any `Q: Hash` through a `BuildHasher`.
#[derive(Clone, Debug, Default)]
pub struct StdHasher<S = RandomState> {
    build: S,
}

impl StdHasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: BuildHasher> StdHasher<S> {
    pub fn with_build_hasher(build: S) -> Self {
        Self { build }
    }
}

impl<S, Q> KeyHasher<Q> for StdHasher<S>
where
    S: BuildHasher,
    Q: ?Sized + Hash,
{
    #[inline]
    fn hash(&self, key: &Q) -> u64 {
        self.build.hash_one(key)
    }
}

/// Equality through `Borrow`: a `String` key matches a `&str` probe.
#[derive(Clone, Copy, Debug, Default)]
pub struct BorrowEq;

impl<K, Q> KeyEq<K, Q> for BorrowEq
where
    K: ?Sized + Borrow<Q>,
    Q: ?Sized + Eq,
{
    #[inline]
    fn eq(&self, stored: &K, probe: &Q) -> bool {
        stored.borrow() == probe
    }
}

/// Adapts a closure `Fn(&Q) -> u64` into a `KeyHasher`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FnHasher<F>(pub F);

impl<Q, F> KeyHasher<Q> for FnHasher<F>
where
    Q: ?Sized,
    F: Fn(&Q) -> u64,
{
    #[inline]
    fn hash(&self, key: &Q) -> u64 {
        (self.0)(key)
    }
}

/// Adapts a closure `Fn(&K, &Q) -> bool` into a `KeyEq`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FnEq<F>(pub F);

impl<K, Q, F> KeyEq<K, Q> for FnEq<F>
where
    K: ?Sized,
    Q: ?Sized,
    F: Fn(&K, &Q) -> bool,
{
    #[inline]
    fn eq(&self, stored: &K, probe: &Q) -> bool {
        (self.0)(stored, probe)
    }
}
