//! chain-hashmap: a separate-chaining hash map with injectable hash and
//! key-equality strategies.
//!
//! Internal Design:
//!
//! Summary
//! - `BucketedHashMap<K, V, H, E>` owns a `Vec` of buckets; each bucket is a
//!   chain of `(key, value)` entries kept in insertion order.
//! - A key lives in bucket `H::hash(key) % bucket_count`. Lookups scan that
//!   one chain with `E::eq`.
//! - Insert is insert-if-absent: a present key keeps its value and the
//!   caller gets a handle to the existing entry.
//!
//! Growth policy
//! - When an insert would push `len / bucket_count` above the max load
//!   factor (default 0.75), the bucket array doubles before the new entry
//!   is appended. Lowering the max load factor or calling `reserve` grows
//!   by doubling until the bound holds.
//! - Max load factors below `MIN_MAX_LOAD_FACTOR` (0.01) are refused, and
//!   growth never asks for more buckets than a `Vec` can hold.
//! - The table never shrinks on its own; erase and clear keep the bucket
//!   count. Only an explicit `rehash(n)` can shrink it.
//! - A zero bucket count, at construction or in `rehash`, is coerced to one
//!   bucket and logged at `warn`.
//!
//! Strategies
//! - `KeyHasher<Q>` and `KeyEq<K, Q>` are generic over the probe type, so
//!   lookups accept a borrowed form of the key (`&str` for `String`) with no
//!   owned temporary. The defaults are `StdHasher` (any `Hash` type through
//!   a `BuildHasher`) and `BorrowEq` (`K: Borrow<Q>`).
//! - Strategies must agree: equal keys hash equally. A strategy that calls
//!   back into the same map panics in debug builds (`reentrancy`).
//!
//! Iteration
//! - Buckets in index order, then chain order; empty buckets are skipped.
//!   This is not global insertion order. Any rehash, or an insert or erase in
//!   the bucket being walked, invalidates positions and handles; the borrow
//!   checker rules out doing that during a live iteration.
//!
//! Notes and non-goals
//! - Single-threaded: the map is `Send` when its contents are, but not
//!   `Sync`. Callers that share it across threads must lock it.
//! - No open addressing, no serialization, no shrink-on-erase.

mod bucket;
pub mod bucketed_hash_map;
pub mod config;
mod diagnostics;
pub mod iter;
mod reentrancy;
pub mod strategy;

#[cfg(test)]
mod bucketed_hash_map_proptest;

// Public surface
pub use bucketed_hash_map::{BucketedHashMap, Handle};
pub use config::{
    ConfigError, MapConfig, DEFAULT_BUCKETS, DEFAULT_MAX_LOAD_FACTOR, MIN_MAX_LOAD_FACTOR,
};
pub use diagnostics::BucketDump;
pub use iter::Position;
pub use strategy::{BorrowEq, FnEq, FnHasher, KeyEq, KeyHasher, StdHasher};
