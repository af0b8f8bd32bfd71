//! Iterators over `BucketedHashMap`.
//!
//! All entry iterators walk the bucket array in index order and each chain
//! in insertion order. A walker holds the not-yet-visited tail of the bucket
//! array plus a cursor into the current chain; after every step it settles
//! onto the next non-empty chain, so an exhausted walker is exactly one that
//! has no chain left. `Iter` and `IterMut` share that logic through
//! `bucket_walker!`.

use crate::bucket::{Bucket, Entry};
use core::fmt;
use core::iter::FusedIterator;

/// Location of an entry: bucket index, then slot within that bucket's chain.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub bucket: usize,
    pub slot: usize,
}

macro_rules! bucket_walker {
    (
        $(#[$meta:meta])*
        $name:ident,
        slice = $slice:ty,
        chain = $chain:ty,
        split = $split_first:ident,
        entries = $entries:ident,
        iter = $iter:ident,
        item = $item:ty,
        |$e:ident| $make:expr
    ) => {
        $(#[$meta])*
        pub struct $name<'a, K, V> {
            rest: $slice,
            chain: $chain,
            taken: usize,
            slot: usize,
            remaining: usize,
        }

        impl<'a, K, V> $name<'a, K, V> {
            pub(crate) fn new(buckets: $slice, len: usize) -> Self {
                let mut it = Self {
                    rest: buckets,
                    chain: Default::default(),
                    taken: 0,
                    slot: 0,
                    remaining: len,
                };
                it.settle();
                it
            }

            // Skip forward over empty chains until an entry or the end.
            fn settle(&mut self) {
                while self.chain.as_slice().is_empty() {
                    let Some((first, tail)) = core::mem::take(&mut self.rest).$split_first() else {
                        return;
                    };
                    self.rest = tail;
                    self.chain = first.$entries().$iter();
                    self.taken += 1;
                    self.slot = 0;
                }
            }

            /// Where the next item lives, or `None` once exhausted.
            pub fn position(&self) -> Option<Position> {
                if self.chain.as_slice().is_empty() {
                    None
                } else {
                    Some(Position {
                        bucket: self.taken - 1,
                        slot: self.slot,
                    })
                }
            }
        }

        impl<'a, K, V> Iterator for $name<'a, K, V> {
            type Item = $item;

            #[inline]
            fn next(&mut self) -> Option<Self::Item> {
                let $e = self.chain.next()?;
                self.slot += 1;
                self.remaining = self.remaining.saturating_sub(1);
                self.settle();
                Some($make)
            }

            #[inline]
            fn size_hint(&self) -> (usize, Option<usize>) {
                (self.remaining, Some(self.remaining))
            }
        }

        impl<'a, K, V> ExactSizeIterator for $name<'a, K, V> {}
        impl<'a, K, V> FusedIterator for $name<'a, K, V> {}
    };
}

bucket_walker! {
    /// Iterator over `(&K, &V)` in bucket order.
    ///
    /// Two `Iter`s compare equal when they would yield their next item from
    /// the same `Position`, or when both are exhausted.
    Iter,
    slice = &'a [Bucket<K, V>],
    chain = core::slice::Iter<'a, Entry<K, V>>,
    split = split_first,
    entries = entries,
    iter = iter,
    item = (&'a K, &'a V),
    |e| (&e.key, &e.value)
}

bucket_walker! {
    /// Iterator over `(&K, &mut V)` in bucket order.
    IterMut,
    slice = &'a mut [Bucket<K, V>],
    chain = core::slice::IterMut<'a, Entry<K, V>>,
    split = split_first_mut,
    entries = entries_mut,
    iter = iter_mut,
    item = (&'a K, &'a mut V),
    |e| (&e.key, &mut e.value)
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            rest: self.rest,
            chain: self.chain.clone(),
            taken: self.taken,
            slot: self.slot,
            remaining: self.remaining,
        }
    }
}

impl<K, V> PartialEq for Iter<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.position() == other.position()
    }
}

impl<K, V> Eq for Iter<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K, V> fmt::Debug for IterMut<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut")
            .field("position", &self.position())
            .field("remaining", &self.remaining)
            .finish()
    }
}

/// Owning iterator returned by `BucketedHashMap::into_iter`.
pub struct IntoIter<K, V> {
    buckets: std::vec::IntoIter<Bucket<K, V>>,
    chain: std::vec::IntoIter<Entry<K, V>>,
    remaining: usize,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(buckets: Vec<Bucket<K, V>>, len: usize) -> Self {
        Self {
            buckets: buckets.into_iter(),
            chain: Default::default(),
            remaining: len,
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.chain.next() {
                self.remaining = self.remaining.saturating_sub(1);
                return Some((e.key, e.value));
            }
            self.chain = self.buckets.next()?.into_entries();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

/// Keys in bucket order.
#[derive(Clone)]
pub struct Keys<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// Values in bucket order.
#[derive(Clone)]
pub struct Values<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}

pub struct ValuesMut<'a, K, V> {
    pub(crate) inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    #[inline]
    fn next(&mut self) -> Option<&'a mut V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}
impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

/// One chain, in insertion order.
pub struct BucketIter<'a, K, V> {
    pub(crate) inner: core::slice::Iter<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for BucketIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|e| (&e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for BucketIter<'_, K, V> {}
