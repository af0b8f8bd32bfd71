//! Bucket chains: one `Vec` of entries per slot of the bucket array.
//!
//! A chain keeps insertion order and does not enforce key uniqueness; the
//! map checks for duplicates before appending.

use crate::strategy::KeyEq;

#[derive(Debug, Clone)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
}

#[derive(Debug, Clone)]
pub(crate) struct Bucket<K, V> {
    entries: Vec<Entry<K, V>>,
}

impl<K, V> Default for Bucket<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K, V> Bucket<K, V> {
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of the entry whose key matches `probe`.
    pub(crate) fn position<Q, E>(&self, eq: &E, probe: &Q) -> Option<usize>
    where
        Q: ?Sized,
        E: KeyEq<K, Q>,
    {
        self.entries.iter().position(|e| eq.eq(&e.key, probe))
    }

    /// Append at the tail and return the new slot.
    pub(crate) fn push(&mut self, key: K, value: V) -> usize {
        self.entries.push(Entry { key, value });
        self.entries.len() - 1
    }

    pub(crate) fn push_entry(&mut self, entry: Entry<K, V>) {
        self.entries.push(entry);
    }

    /// Remove the entry at `slot`; later entries shift down by one so chain
    /// order is kept.
    pub(crate) fn remove(&mut self, slot: usize) -> Entry<K, V> {
        self.entries.remove(slot)
    }

    pub(crate) fn get(&self, slot: usize) -> Option<&Entry<K, V>> {
        self.entries.get(slot)
    }

    pub(crate) fn get_mut(&mut self, slot: usize) -> Option<&mut Entry<K, V>> {
        self.entries.get_mut(slot)
    }

    /// Entry at a slot known to be occupied.
    pub(crate) fn entry_mut(&mut self, slot: usize) -> &mut Entry<K, V> {
        &mut self.entries[slot]
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn entries(&self) -> &[Entry<K, V>] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [Entry<K, V>] {
        &mut self.entries
    }

    pub(crate) fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain_mut(|e| keep(&e.key, &mut e.value));
        before - self.entries.len()
    }

    pub(crate) fn drain(&mut self) -> std::vec::Drain<'_, Entry<K, V>> {
        self.entries.drain(..)
    }

    pub(crate) fn into_entries(self) -> std::vec::IntoIter<Entry<K, V>> {
        self.entries.into_iter()
    }
}

/// A fresh bucket array of `n` empty chains.
pub(crate) fn empty_buckets<K, V>(n: usize) -> Vec<Bucket<K, V>> {
    let mut buckets = Vec::with_capacity(n);
    buckets.resize_with(n, Bucket::default);
    buckets
}
