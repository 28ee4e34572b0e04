//! Map facades over the raw table engine.
//!
//! [`OpenHashMap`] iterates in unspecified (bucket) order;
//! [`LinkedOpenHashMap`] iterates in insertion order and adds endpoint access
//! and access-order promotion. Both are thin: hashing, probing, growth, and
//! removal all live in [`RawTable`](crate::table::RawTable).

use crate::cursor::{CursorError, LinkCursor, RawCursor};
use crate::linkage::{InsertOrder, Linkage, Unordered, NIL};
use crate::slots::{PairProjector, SlotArray};
use crate::table::RawTable;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

/// Hash map with open addressing and backward-shift deletion.
///
/// Iteration order is unspecified and changes on growth; use
/// [`LinkedOpenHashMap`] for a deterministic order.
pub struct OpenHashMap<K, V, S = RandomState> {
    table: RawTable<K, V, S, Unordered>,
}

/// Hash map that additionally maintains insertion order.
///
/// Every iterator and cursor walks the order chain. Promotion
/// ([`get_and_move_to_back`](Self::get_and_move_to_back) and friends) gives
/// access-order (LRU-style) behavior on top of the same table.
pub struct LinkedOpenHashMap<K, V, S = RandomState> {
    table: RawTable<K, V, S, InsertOrder>,
}

macro_rules! common_map_impl {
    ($name:ident) => {
        impl<K, V> $name<K, V>
        where
            K: Eq + Hash,
        {
            pub fn new() -> Self {
                Self { table: RawTable::new() }
            }

            pub fn with_capacity(expected: usize) -> Self {
                Self { table: RawTable::with_capacity(expected) }
            }
        }

        impl<K, V, S> $name<K, V, S> {
            pub fn len(&self) -> usize {
                self.table.len()
            }

            pub fn is_empty(&self) -> bool {
                self.table.is_empty()
            }

            /// Number of slots currently allocated.
            pub fn capacity(&self) -> usize {
                self.table.capacity()
            }

            /// Drop every entry, keeping the allocation.
            pub fn clear(&mut self) {
                self.table.clear();
            }

            /// Shrink the allocation to fit the current entries. Never done
            /// implicitly.
            pub fn trim(&mut self) {
                self.table.trim();
            }
        }

        impl<K, V, S> $name<K, V, S>
        where
            K: Eq + Hash,
            S: BuildHasher,
        {
            pub fn with_hasher(hasher: S) -> Self {
                Self { table: RawTable::with_hasher(hasher) }
            }

            pub fn with_capacity_and_hasher(expected: usize, hasher: S) -> Self {
                Self { table: RawTable::with_capacity_and_hasher(expected, hasher) }
            }

            pub fn get<Q>(&self, key: &Q) -> Option<&V>
            where
                K: Borrow<Q>,
                Q: ?Sized + Hash + Eq,
            {
                self.table.find(key).map(|i| self.table.value_at(i))
            }

            pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
            where
                K: Borrow<Q>,
                Q: ?Sized + Hash + Eq,
            {
                let idx = self.table.find(key)?;
                Some(self.table.value_at_mut(idx))
            }

            pub fn contains_key<Q>(&self, key: &Q) -> bool
            where
                K: Borrow<Q>,
                Q: ?Sized + Hash + Eq,
            {
                self.table.find(key).is_some()
            }

            /// Insert or overwrite, returning the previous value on
            /// overwrite.
            pub fn insert(&mut self, key: K, value: V) -> Option<V> {
                self.table.insert(key, value).1
            }

            pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
            where
                K: Borrow<Q>,
                Q: ?Sized + Hash + Eq,
            {
                self.table.remove(key).map(|(_, v)| v)
            }

            pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
            where
                K: Borrow<Q>,
                Q: ?Sized + Hash + Eq,
            {
                self.table.remove(key)
            }
        }

        impl<K, V, S> Default for $name<K, V, S>
        where
            K: Eq + Hash,
            S: BuildHasher + Default,
        {
            fn default() -> Self {
                Self { table: RawTable::new() }
            }
        }

        impl<K, V, S> fmt::Debug for $name<K, V, S>
        where
            K: fmt::Debug,
            V: fmt::Debug,
        {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_map().entries(self.iter()).finish()
            }
        }

        impl<K, V, S> Clone for $name<K, V, S>
        where
            K: Eq + Hash + Clone,
            V: Clone,
            S: BuildHasher + Clone,
        {
            fn clone(&self) -> Self {
                let mut out =
                    Self::with_capacity_and_hasher(self.len(), self.table.hasher().clone());
                for (k, v) in self.iter() {
                    out.insert(k.clone(), v.clone());
                }
                out
            }
        }

        impl<K, V, S> Extend<(K, V)> for $name<K, V, S>
        where
            K: Eq + Hash,
            S: BuildHasher,
        {
            fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
                for (k, v) in iter {
                    self.insert(k, v);
                }
            }
        }

        impl<K, V, S> FromIterator<(K, V)> for $name<K, V, S>
        where
            K: Eq + Hash,
            S: BuildHasher + Default,
        {
            fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
                let mut out = Self::with_hasher(S::default());
                out.extend(iter);
                out
            }
        }
    };
}

common_map_impl!(OpenHashMap);
common_map_impl!(LinkedOpenHashMap);

impl<K, V, S> OpenHashMap<K, V, S> {
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.table.slots(), self.len())
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let remaining = self.len();
        IterMut { proj: self.table.projector(), pos: 0, remaining }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut { inner: self.iter_mut() }
    }

    /// Detached cursor over the entries. Unlike [`iter`](Self::iter), the
    /// cursor borrows nothing between calls: the map may be mutated while a
    /// cursor exists, and the cursor answers with
    /// [`CursorError::Invalidated`] on its next use. Removal through the
    /// cursor itself is supported and keeps the sweep exact.
    pub fn cursor(&self) -> MapCursor {
        MapCursor { raw: self.table.cursor() }
    }
}

impl<K, V, S> OpenHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Keep only the entries for which `f` returns true.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut cur = self.table.cursor();
        while let Some(idx) = cur.advance(&self.table).expect("no out-of-band modification") {
            let keep = {
                let (k, v) = self.table.pair_at_mut(idx);
                f(k, v)
            };
            if !keep {
                cur.remove_current(&mut self.table).expect("cursor tracks its own removals");
            }
        }
    }
}

impl<K, V, S> LinkedOpenHashMap<K, V, S> {
    /// Iterate in insertion order (or promoted order, in access-order use).
    pub fn iter(&self) -> LinkedIter<'_, K, V> {
        LinkedIter {
            slots: self.table.slots(),
            links: self.table.links(),
            at: self.table.first().unwrap_or(NIL),
            remaining: self.len(),
        }
    }

    pub fn iter_mut(&mut self) -> LinkedIterMut<'_, K, V> {
        let remaining = self.len();
        let at = self.table.first().unwrap_or(NIL);
        let (links, proj) = self.table.order_and_projector();
        LinkedIterMut { proj, links, at, remaining }
    }

    pub fn keys(&self) -> LinkedKeys<'_, K, V> {
        LinkedKeys { inner: self.iter() }
    }

    pub fn values(&self) -> LinkedValues<'_, K, V> {
        LinkedValues { inner: self.iter() }
    }

    /// Oldest entry (head of the order chain).
    pub fn first(&self) -> Option<(&K, &V)> {
        self.table.first().map(|i| self.table.pair_at(i))
    }

    /// Newest entry (tail of the order chain).
    pub fn last(&self) -> Option<(&K, &V)> {
        self.table.last().map(|i| self.table.pair_at(i))
    }

    /// Remove and return the oldest entry.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let idx = self.table.first()?;
        Some(self.table.remove_at(idx))
    }

    /// Remove and return the newest entry.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let idx = self.table.last()?;
        Some(self.table.remove_at(idx))
    }

    /// Detached link-order cursor; same contract as
    /// [`OpenHashMap::cursor`].
    pub fn cursor(&self) -> LinkedMapCursor {
        LinkedMapCursor { raw: self.table.link_cursor() }
    }
}

impl<K, V, S> LinkedOpenHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Look up `key` and promote it to the back of the order (most recently
    /// used end). The access-order primitive: iterating a map maintained
    /// exclusively through this accessor visits entries from least to most
    /// recently used.
    pub fn get_and_move_to_back<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let idx = self.table.find(key)?;
        self.table.move_to_back(idx);
        Some(self.table.value_at(idx))
    }

    /// Look up `key` and demote it to the front of the order.
    pub fn get_and_move_to_front<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let idx = self.table.find(key)?;
        self.table.move_to_front(idx);
        Some(self.table.value_at(idx))
    }

    /// Keep only the entries for which `f` returns true, visiting in order.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut cur = self.table.link_cursor();
        while let Some(idx) = cur.advance(&self.table).expect("no out-of-band modification") {
            let keep = {
                let (k, v) = self.table.pair_at_mut(idx);
                f(k, v)
            };
            if !keep {
                cur.remove_current(&mut self.table).expect("cursor tracks its own removals");
            }
        }
    }
}

/// Detached cursor over an [`OpenHashMap`]. Methods take the map explicitly,
/// so the cursor can outlive any single borrow of it.
pub struct MapCursor {
    raw: RawCursor,
}

impl MapCursor {
    pub fn advance<'a, K, V, S>(
        &mut self,
        map: &'a OpenHashMap<K, V, S>,
    ) -> Result<Option<(&'a K, &'a V)>, CursorError> {
        Ok(self.raw.advance(&map.table)?.map(|i| map.table.pair_at(i)))
    }

    pub fn remove_current<K, V, S>(
        &mut self,
        map: &mut OpenHashMap<K, V, S>,
    ) -> Result<(K, V), CursorError> {
        self.raw.remove_current(&mut map.table)
    }
}

/// Detached link-order cursor over a [`LinkedOpenHashMap`].
pub struct LinkedMapCursor {
    raw: LinkCursor,
}

impl LinkedMapCursor {
    pub fn advance<'a, K, V, S>(
        &mut self,
        map: &'a LinkedOpenHashMap<K, V, S>,
    ) -> Result<Option<(&'a K, &'a V)>, CursorError> {
        Ok(self.raw.advance(&map.table)?.map(|i| map.table.pair_at(i)))
    }

    pub fn remove_current<K, V, S>(
        &mut self,
        map: &mut LinkedOpenHashMap<K, V, S>,
    ) -> Result<(K, V), CursorError> {
        self.raw.remove_current(&mut map.table)
    }
}

/// Bucket-order borrowed iterator.
pub struct Iter<'a, K, V> {
    slots: &'a SlotArray<K, V>,
    pos: usize,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(slots: &'a SlotArray<K, V>, remaining: usize) -> Self {
        Self { slots, pos: 0, remaining }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.slots.capacity() {
            let idx = self.pos;
            self.pos += 1;
            if self.slots.is_used(idx) {
                self.remaining -= 1;
                return Some(self.slots.pair_at(idx));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Bucket-order mutable iterator.
pub struct IterMut<'a, K, V> {
    proj: PairProjector<'a, K, V>,
    pos: usize,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.proj.capacity() {
            let idx = self.pos;
            self.pos += 1;
            if self.proj.is_used(idx) {
                self.remaining -= 1;
                return Some(self.proj.project(idx));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Consuming bucket-order iterator.
pub struct IntoIter<K, V> {
    slots: SlotArray<K, V>,
    pos: usize,
    remaining: usize,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn from_slots(slots: SlotArray<K, V>, remaining: usize) -> Self {
        Self { slots, pos: 0, remaining }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.slots.capacity() {
            let idx = self.pos;
            self.pos += 1;
            if self.slots.is_used(idx) {
                self.remaining -= 1;
                return Some(self.slots.take(idx));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

/// Link-order borrowed iterator.
pub struct LinkedIter<'a, K, V> {
    slots: &'a SlotArray<K, V>,
    links: &'a InsertOrder,
    at: usize,
    remaining: usize,
}

impl<'a, K, V> Iterator for LinkedIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.at == NIL {
            return None;
        }
        let idx = self.at;
        self.at = self.links.next_of(idx).unwrap_or(NIL);
        self.remaining -= 1;
        Some(self.slots.pair_at(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for LinkedIter<'_, K, V> {}

/// Link-order mutable iterator.
pub struct LinkedIterMut<'a, K, V> {
    proj: PairProjector<'a, K, V>,
    links: &'a InsertOrder,
    at: usize,
    remaining: usize,
}

impl<'a, K, V> Iterator for LinkedIterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.at == NIL {
            return None;
        }
        let idx = self.at;
        self.at = self.links.next_of(idx).unwrap_or(NIL);
        self.remaining -= 1;
        Some(self.proj.project(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for LinkedIterMut<'_, K, V> {}

pub struct LinkedKeys<'a, K, V> {
    inner: LinkedIter<'a, K, V>,
}

impl<'a, K, V> Iterator for LinkedKeys<'a, K, V> {
    type Item = &'a K;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

pub struct LinkedValues<'a, K, V> {
    inner: LinkedIter<'a, K, V>,
}

impl<'a, K, V> Iterator for LinkedValues<'a, K, V> {
    type Item = &'a V;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Consuming link-order iterator.
pub struct LinkedIntoIter<K, V> {
    slots: SlotArray<K, V>,
    links: InsertOrder,
    at: usize,
    remaining: usize,
}

impl<K, V> Iterator for LinkedIntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.at == NIL {
            return None;
        }
        let idx = self.at;
        self.at = self.links.next_of(idx).unwrap_or(NIL);
        self.remaining -= 1;
        Some(self.slots.take(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for LinkedIntoIter<K, V> {}

impl<'a, K, V, S> IntoIterator for &'a OpenHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut OpenHashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S> IntoIterator for OpenHashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;
    fn into_iter(self) -> Self::IntoIter {
        let remaining = self.len();
        let (slots, _) = self.table.into_parts();
        IntoIter { slots, pos: 0, remaining }
    }
}

impl<'a, K, V, S> IntoIterator for &'a LinkedOpenHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = LinkedIter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut LinkedOpenHashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = LinkedIterMut<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S> IntoIterator for LinkedOpenHashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = LinkedIntoIter<K, V>;
    fn into_iter(self) -> Self::IntoIter {
        let remaining = self.len();
        let at = self.table.first().unwrap_or(NIL);
        let (slots, links) = self.table.into_parts();
        LinkedIntoIter { slots, links, at, remaining }
    }
}
