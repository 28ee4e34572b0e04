//! Set facades: the map engine with unit values.
//!
//! [`OpenHashSet`] and [`LinkedOpenHashSet`] reuse [`RawTable`] with `()`
//! values, so they inherit probing, growth, backward-shift deletion, and the
//! cursor contract without any storage overhead for the missing values.

use crate::cursor::{CursorError, LinkCursor, RawCursor};
use crate::linkage::{InsertOrder, Linkage, Unordered, NIL};
use crate::table::RawTable;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

/// Hash set with open addressing and backward-shift deletion.
pub struct OpenHashSet<K, S = RandomState> {
    table: RawTable<K, (), S, Unordered>,
}

/// Hash set that additionally maintains insertion order.
pub struct LinkedOpenHashSet<K, S = RandomState> {
    table: RawTable<K, (), S, InsertOrder>,
}

macro_rules! common_set_impl {
    ($name:ident) => {
        impl<K> $name<K>
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

        impl<K, S> $name<K, S> {
            pub fn len(&self) -> usize {
                self.table.len()
            }

            pub fn is_empty(&self) -> bool {
                self.table.is_empty()
            }

            pub fn capacity(&self) -> usize {
                self.table.capacity()
            }

            pub fn clear(&mut self) {
                self.table.clear();
            }

            /// Shrink the allocation to fit the current elements. Never done
            /// implicitly.
            pub fn trim(&mut self) {
                self.table.trim();
            }
        }

        impl<K, S> $name<K, S>
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

            pub fn contains<Q>(&self, key: &Q) -> bool
            where
                K: Borrow<Q>,
                Q: ?Sized + Hash + Eq,
            {
                self.table.find(key).is_some()
            }

            /// The stored element equal to `key`, if any. Useful when the
            /// stored key carries more than its identity (interning).
            pub fn get<Q>(&self, key: &Q) -> Option<&K>
            where
                K: Borrow<Q>,
                Q: ?Sized + Hash + Eq,
            {
                self.table.find(key).map(|i| self.table.key_at(i))
            }

            /// Returns true if the element was newly inserted. Re-inserting a
            /// present element changes nothing, including iteration order.
            pub fn insert(&mut self, key: K) -> bool {
                self.table.insert(key, ()).1.is_none()
            }

            /// Returns true if the element was present.
            pub fn remove<Q>(&mut self, key: &Q) -> bool
            where
                K: Borrow<Q>,
                Q: ?Sized + Hash + Eq,
            {
                self.table.remove(key).is_some()
            }

            /// Remove and return the stored element.
            pub fn take<Q>(&mut self, key: &Q) -> Option<K>
            where
                K: Borrow<Q>,
                Q: ?Sized + Hash + Eq,
            {
                self.table.remove(key).map(|(k, ())| k)
            }
        }

        impl<K, S> Default for $name<K, S>
        where
            K: Eq + Hash,
            S: BuildHasher + Default,
        {
            fn default() -> Self {
                Self { table: RawTable::new() }
            }
        }

        impl<K, S> fmt::Debug for $name<K, S>
        where
            K: fmt::Debug,
        {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_set().entries(self.iter()).finish()
            }
        }

        impl<K, S> Clone for $name<K, S>
        where
            K: Eq + Hash + Clone,
            S: BuildHasher + Clone,
        {
            fn clone(&self) -> Self {
                let mut out =
                    Self::with_capacity_and_hasher(self.len(), self.table.hasher().clone());
                for k in self.iter() {
                    out.insert(k.clone());
                }
                out
            }
        }

        impl<K, S> Extend<K> for $name<K, S>
        where
            K: Eq + Hash,
            S: BuildHasher,
        {
            fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
                for k in iter {
                    self.insert(k);
                }
            }
        }

        impl<K, S> FromIterator<K> for $name<K, S>
        where
            K: Eq + Hash,
            S: BuildHasher + Default,
        {
            fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
                let mut out = Self::with_hasher(S::default());
                out.extend(iter);
                out
            }
        }
    };
}

common_set_impl!(OpenHashSet);
common_set_impl!(LinkedOpenHashSet);

impl<K, S> OpenHashSet<K, S> {
    pub fn iter(&self) -> Iter<'_, K> {
        Iter { inner: crate::map::Iter::new(self.table.slots(), self.len()) }
    }

    /// Detached cursor; same contract as [`crate::OpenHashMap::cursor`].
    pub fn cursor(&self) -> SetCursor {
        SetCursor { raw: self.table.cursor() }
    }
}

impl<K, S> OpenHashSet<K, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Keep only the elements for which `f` returns true.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K) -> bool,
    {
        let mut cur = self.table.cursor();
        while let Some(idx) = cur.advance(&self.table).expect("no out-of-band modification") {
            if !f(self.table.key_at(idx)) {
                cur.remove_current(&mut self.table).expect("cursor tracks its own removals");
            }
        }
    }
}

impl<K, S> LinkedOpenHashSet<K, S> {
    /// Iterate in insertion order.
    pub fn iter(&self) -> LinkedIter<'_, K> {
        LinkedIter {
            slots: self.table.slots(),
            links: self.table.links(),
            at: self.table.first().unwrap_or(NIL),
            remaining: self.len(),
        }
    }

    /// Oldest element.
    pub fn first(&self) -> Option<&K> {
        self.table.first().map(|i| self.table.key_at(i))
    }

    /// Newest element.
    pub fn last(&self) -> Option<&K> {
        self.table.last().map(|i| self.table.key_at(i))
    }

    /// Remove and return the oldest element.
    pub fn pop_first(&mut self) -> Option<K> {
        let idx = self.table.first()?;
        Some(self.table.remove_at(idx).0)
    }

    /// Remove and return the newest element.
    pub fn pop_last(&mut self) -> Option<K> {
        let idx = self.table.last()?;
        Some(self.table.remove_at(idx).0)
    }

    /// Detached link-order cursor.
    pub fn cursor(&self) -> LinkedSetCursor {
        LinkedSetCursor { raw: self.table.link_cursor() }
    }
}

impl<K, S> LinkedOpenHashSet<K, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Insert or, if present, promote to the back of the order. Returns true
    /// on a new insertion. The set counterpart of
    /// [`crate::LinkedOpenHashMap::get_and_move_to_back`].
    pub fn insert_and_move_to_back(&mut self, key: K) -> bool {
        if let Some(idx) = self.table.find(&key) {
            self.table.move_to_back(idx);
            return false;
        }
        self.table.insert(key, ());
        true
    }

    /// Keep only the elements for which `f` returns true, visiting in order.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K) -> bool,
    {
        let mut cur = self.table.link_cursor();
        while let Some(idx) = cur.advance(&self.table).expect("no out-of-band modification") {
            if !f(self.table.key_at(idx)) {
                cur.remove_current(&mut self.table).expect("cursor tracks its own removals");
            }
        }
    }
}

/// Detached cursor over an [`OpenHashSet`].
pub struct SetCursor {
    raw: RawCursor,
}

impl SetCursor {
    pub fn advance<'a, K, S>(
        &mut self,
        set: &'a OpenHashSet<K, S>,
    ) -> Result<Option<&'a K>, CursorError> {
        Ok(self.raw.advance(&set.table)?.map(|i| set.table.key_at(i)))
    }

    pub fn remove_current<K, S>(
        &mut self,
        set: &mut OpenHashSet<K, S>,
    ) -> Result<K, CursorError> {
        Ok(self.raw.remove_current(&mut set.table)?.0)
    }
}

/// Detached link-order cursor over a [`LinkedOpenHashSet`].
pub struct LinkedSetCursor {
    raw: LinkCursor,
}

impl LinkedSetCursor {
    pub fn advance<'a, K, S>(
        &mut self,
        set: &'a LinkedOpenHashSet<K, S>,
    ) -> Result<Option<&'a K>, CursorError> {
        Ok(self.raw.advance(&set.table)?.map(|i| set.table.key_at(i)))
    }

    pub fn remove_current<K, S>(
        &mut self,
        set: &mut LinkedOpenHashSet<K, S>,
    ) -> Result<K, CursorError> {
        Ok(self.raw.remove_current(&mut set.table)?.0)
    }
}

/// Borrowed iterator in bucket order.
pub struct Iter<'a, K> {
    inner: crate::map::Iter<'a, K, ()>,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

/// Borrowed iterator in insertion order.
pub struct LinkedIter<'a, K> {
    slots: &'a crate::slots::SlotArray<K, ()>,
    links: &'a InsertOrder,
    at: usize,
    remaining: usize,
}

impl<'a, K> Iterator for LinkedIter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        if self.at == NIL {
            return None;
        }
        let idx = self.at;
        self.at = self.links.next_of(idx).unwrap_or(NIL);
        self.remaining -= 1;
        Some(self.slots.key_at(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for LinkedIter<'_, K> {}

/// Consuming iterator in bucket order.
pub struct IntoIter<K> {
    inner: crate::map::IntoIter<K, ()>,
}

impl<K> Iterator for IntoIter<K> {
    type Item = K;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> ExactSizeIterator for IntoIter<K> {}

/// Consuming iterator in insertion order.
pub struct LinkedIntoIter<K> {
    slots: crate::slots::SlotArray<K, ()>,
    links: InsertOrder,
    at: usize,
    remaining: usize,
}

impl<K> Iterator for LinkedIntoIter<K> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        if self.at == NIL {
            return None;
        }
        let idx = self.at;
        self.at = self.links.next_of(idx).unwrap_or(NIL);
        self.remaining -= 1;
        Some(self.slots.take(idx).0)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for LinkedIntoIter<K> {}

impl<'a, K, S> IntoIterator for &'a OpenHashSet<K, S> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, S> IntoIterator for OpenHashSet<K, S> {
    type Item = K;
    type IntoIter = IntoIter<K>;
    fn into_iter(self) -> Self::IntoIter {
        let remaining = self.len();
        let (slots, _) = self.table.into_parts();
        IntoIter { inner: crate::map::IntoIter::from_slots(slots, remaining) }
    }
}

impl<'a, K, S> IntoIterator for &'a LinkedOpenHashSet<K, S> {
    type Item = &'a K;
    type IntoIter = LinkedIter<'a, K>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, S> IntoIterator for LinkedOpenHashSet<K, S> {
    type Item = K;
    type IntoIter = LinkedIntoIter<K>;
    fn into_iter(self) -> Self::IntoIter {
        let remaining = self.len();
        let at = self.table.first().unwrap_or(NIL);
        let (slots, links) = self.table.into_parts();
        LinkedIntoIter { slots, links, at, remaining }
    }
}
