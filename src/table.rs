//! The open-addressing table engine behind every map and set in the crate.
//!
//! Layout: one power-of-two slot arena ([`SlotArray`]), linear probing from
//! the mixed hash's home bucket, growth at a 3/4 load factor, and tombstone-
//! free removal by backward shifting. The linked variants thread an intrusive
//! order chain ([`InsertOrder`]) through the same slots; the policy is a type
//! parameter, so the plain variants pay nothing for it.
//!
//! Key invariants:
//! - Probe reachability: every entry is reachable by probing from its home
//!   bucket without crossing an empty slot. Insertion preserves this by
//!   construction; removal restores it by shifting displaced entries back
//!   over the gap instead of leaving a tombstone.
//! - Headroom: `len` stays strictly below the grow threshold, so a probe
//!   always terminates at an empty slot on a miss and the table is never
//!   full.
//! - Stored hashes: each entry's mixed hash is computed once on insert.
//!   Shifting and rehashing use the stored hash, so user `Hash` impls never
//!   run after insertion.
//! - Fail-fast iteration: every structural change bumps a modification
//!   counter; detached cursors snapshot it and refuse to advance after an
//!   out-of-band change (see [`crate::cursor`]).
//!
//! Single-threaded discipline: nothing here blocks, suspends, or
//! synchronizes. Reentrancy through user `Hash`/`Eq` during probing is
//! harmless on the read paths (the structure is consistent while probing) and
//! unreachable from safe code on the write paths, where the exclusive borrow
//! is live while user code runs.

use crate::cursor::{LinkCursor, RawCursor};
use crate::linkage::{InsertOrder, Linkage, Unordered};
use crate::probe::{capacity_for, grow_threshold, home_bucket, mix, ProbeSeq, DEFAULT_CAPACITY};
use crate::slots::{PairProjector, SlotArray};
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::mem;
use std::collections::hash_map::RandomState;

/// Open-addressing hash table addressed by slot index.
///
/// This is the engine the public facades wrap. Entries are identified by
/// their current slot index; an index is valid until the next structural
/// modification. Passing a stale or unused index to an accessor is an
/// invariant violation and panics.
pub struct RawTable<K, V, S = RandomState, L = Unordered> {
    hasher: S,
    slots: SlotArray<K, V>,
    links: L,
    len: usize,
    grow_at: usize,
    mod_count: u64,
}

impl<K, V, S, L: Linkage> RawTable<K, V, S, L> {
    pub fn with_capacity_and_hasher(expected: usize, hasher: S) -> Self {
        let cap = if expected == 0 { DEFAULT_CAPACITY } else { capacity_for(expected) };
        Self {
            hasher,
            slots: SlotArray::with_capacity(cap),
            links: L::with_capacity(cap),
            len: 0,
            grow_at: grow_threshold(cap),
            mod_count: 0,
        }
    }

    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(0, hasher)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    #[inline]
    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Current structural-modification count; cursors snapshot this.
    #[inline]
    pub fn mod_count(&self) -> u64 {
        self.mod_count
    }

    #[inline]
    fn mask(&self) -> usize {
        self.slots.capacity() - 1
    }

    #[inline]
    pub(crate) fn is_used(&self, idx: usize) -> bool {
        self.slots.is_used(idx)
    }

    pub fn key_at(&self, idx: usize) -> &K {
        self.slots.key_at(idx)
    }

    pub fn value_at(&self, idx: usize) -> &V {
        self.slots.value_at(idx)
    }

    pub fn value_at_mut(&mut self, idx: usize) -> &mut V {
        self.slots.value_at_mut(idx)
    }

    pub fn pair_at(&self, idx: usize) -> (&K, &V) {
        self.slots.pair_at(idx)
    }

    pub fn pair_at_mut(&mut self, idx: usize) -> (&K, &mut V) {
        self.slots.pair_at_mut(idx)
    }

    pub(crate) fn slots(&self) -> &SlotArray<K, V> {
        &self.slots
    }

    pub(crate) fn projector(&mut self) -> PairProjector<'_, K, V> {
        self.slots.projector()
    }

    pub(crate) fn into_parts(self) -> (SlotArray<K, V>, L) {
        (self.slots, self.links)
    }

    /// Detached bucket-order cursor. See [`RawCursor`] for the fail-fast and
    /// mid-iteration-removal contract.
    pub fn cursor(&self) -> RawCursor {
        RawCursor::new(self.mod_count)
    }

    /// Drop every entry. Capacity is kept; use [`trim`](Self::trim) to
    /// release memory explicitly.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.links.clear();
        self.len = 0;
        self.mod_count += 1;
    }

    /// Shrink to the smallest capacity that holds the current entries under
    /// the load factor. Never called implicitly; removal cost stays O(probe).
    pub fn trim(&mut self) {
        let target = capacity_for(self.len);
        if target < self.slots.capacity() {
            self.rehash(target);
        }
    }

    /// First empty slot on the probe sequence of `hash`. Only valid while the
    /// headroom invariant holds (the table is never full).
    fn vacant_slot(&self, hash: u64) -> usize {
        let mut probe = ProbeSeq::new(hash, self.mask());
        loop {
            let idx = probe.bucket();
            if !self.slots.is_used(idx) {
                return idx;
            }
            probe.advance();
        }
    }

    fn grow(&mut self) {
        let new_cap = self.slots.capacity().checked_mul(2).expect("table capacity overflow");
        self.rehash(new_cap);
    }

    /// Re-insert every entry into a fresh arena of `new_cap` slots, using the
    /// stored hashes. Ordered variants replay link order so iteration order
    /// survives the resize; plain variants walk the old buckets.
    fn rehash(&mut self, new_cap: usize) {
        debug_assert!(new_cap.is_power_of_two() && grow_threshold(new_cap) >= self.len);
        let old_cap = self.slots.capacity();
        let mut old_slots = mem::replace(&mut self.slots, SlotArray::with_capacity(new_cap));
        let old_links = mem::replace(&mut self.links, L::with_capacity(new_cap));
        self.grow_at = grow_threshold(new_cap);
        self.mod_count += 1;

        let mut reinsert = |slots: &mut SlotArray<K, V>, links: &mut L, old: &mut SlotArray<K, V>, idx: usize| {
            let hash = old.hash_at(idx);
            let (key, value) = old.take(idx);
            let mut probe = ProbeSeq::new(hash, new_cap - 1);
            let dst = loop {
                let i = probe.bucket();
                if !slots.is_used(i) {
                    break i;
                }
                probe.advance();
            };
            slots.write(dst, hash, key, value);
            links.record_insert(dst);
        };

        if L::ORDERED {
            let mut at = old_links.head();
            while let Some(idx) = at {
                at = old_links.next_of(idx);
                reinsert(&mut self.slots, &mut self.links, &mut old_slots, idx);
            }
        } else {
            for idx in 0..old_cap {
                if old_slots.is_used(idx) {
                    reinsert(&mut self.slots, &mut self.links, &mut old_slots, idx);
                }
            }
        }
    }

    /// Remove the entry at `idx`, reporting every backward-shift relocation
    /// `(from, to)` to `on_move` so order state and live cursors can patch
    /// the indices they hold.
    pub(crate) fn remove_at_with<F>(&mut self, idx: usize, mut on_move: F) -> (K, V)
    where
        F: FnMut(usize, usize),
    {
        let pair = self.slots.take(idx);
        self.links.record_remove(idx);
        self.len -= 1;
        self.mod_count += 1;
        self.close_gap(idx, &mut on_move);
        pair
    }

    pub(crate) fn remove_at(&mut self, idx: usize) -> (K, V) {
        self.remove_at_with(idx, |_, _| {})
    }

    /// Backward-shift deletion: walk forward from the gap; any entry whose
    /// home bucket lies on the far side of the gap (with wraparound) is
    /// unreachable through the gap and must move back into it. Stops at the
    /// first empty slot, after which every remaining entry still satisfies
    /// probe reachability.
    fn close_gap<F>(&mut self, mut gap: usize, on_move: &mut F)
    where
        F: FnMut(usize, usize),
    {
        let mask = self.mask();
        let mut cur = (gap + 1) & mask;
        while self.slots.is_used(cur) {
            let home = home_bucket(self.slots.hash_at(cur), mask);
            // Does the gap lie in the half-open probe range [home, cur)?
            let displaced = if home <= cur {
                gap >= home && gap < cur
            } else {
                gap >= home || gap < cur
            };
            if displaced {
                self.slots.relocate(cur, gap);
                self.links.record_relocate(cur, gap);
                on_move(cur, gap);
                gap = cur;
            }
            cur = (cur + 1) & mask;
        }
    }
}

impl<K, V, S, L> RawTable<K, V, S, L>
where
    K: Eq + Hash,
    S: BuildHasher,
    L: Linkage,
{
    #[inline]
    fn hash_key<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        mix(self.hasher.hash_one(q))
    }

    /// Slot index of `q`, if present. Probing stops at the first empty slot;
    /// the stored hash is compared before the key, so `Eq` only runs on
    /// plausible candidates.
    pub fn find<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_key(q);
        let mut probe = ProbeSeq::new(hash, self.mask());
        loop {
            let idx = probe.bucket();
            if !self.slots.is_used(idx) {
                return None;
            }
            if self.slots.hash_at(idx) == hash && self.slots.key_at(idx).borrow() == q {
                return Some(idx);
            }
            probe.advance();
        }
    }

    /// Insert or overwrite. Returns the entry's slot index and, on
    /// overwrite, the previous value; `None` means a new entry was created.
    /// Only a new entry is a structural change (and may grow the table);
    /// overwriting a value invalidates no cursors.
    pub fn insert(&mut self, key: K, value: V) -> (usize, Option<V>) {
        let hash = self.hash_key(&key);
        let mut probe = ProbeSeq::new(hash, self.mask());
        let vacant = loop {
            let idx = probe.bucket();
            if !self.slots.is_used(idx) {
                break idx;
            }
            if self.slots.hash_at(idx) == hash && *self.slots.key_at(idx) == key {
                let old = mem::replace(self.slots.value_at_mut(idx), value);
                return (idx, Some(old));
            }
            probe.advance();
        };
        let idx = if self.len + 1 >= self.grow_at {
            self.grow();
            self.vacant_slot(hash)
        } else {
            vacant
        };
        self.slots.write(idx, hash, key, value);
        self.links.record_insert(idx);
        self.len += 1;
        self.mod_count += 1;
        (idx, None)
    }

    /// Remove `q`'s entry, returning the owned pair. Absence is not an
    /// error.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let idx = self.find(q)?;
        Some(self.remove_at(idx))
    }
}

impl<K, V, S, L> RawTable<K, V, S, L>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
    L: Linkage,
{
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    pub fn with_capacity(expected: usize) -> Self {
        Self::with_capacity_and_hasher(expected, S::default())
    }
}

impl<K, V, S, L> Default for RawTable<K, V, S, L>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
    L: Linkage,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Operations that exist only on the ordered (linked) tables.
impl<K, V, S> RawTable<K, V, S, InsertOrder> {
    pub(crate) fn links(&self) -> &InsertOrder {
        &self.links
    }

    /// Head of the order chain: the oldest entry (or least recently promoted
    /// in access-order use).
    pub fn first(&self) -> Option<usize> {
        self.links.head()
    }

    /// Tail of the order chain: the newest entry.
    pub fn last(&self) -> Option<usize> {
        self.links.tail()
    }

    /// Promote `idx` to the head of the order. Structural for cursors.
    pub fn move_to_front(&mut self, idx: usize) {
        assert!(self.slots.is_used(idx), "move_to_front on unused slot");
        self.links.move_to_front(idx);
        self.mod_count += 1;
    }

    /// Promote `idx` to the tail of the order (access-order promotion).
    /// Structural for cursors.
    pub fn move_to_back(&mut self, idx: usize) {
        assert!(self.slots.is_used(idx), "move_to_back on unused slot");
        self.links.move_to_back(idx);
        self.mod_count += 1;
    }

    /// Detached link-order cursor.
    pub fn link_cursor(&self) -> LinkCursor {
        LinkCursor::new(self.links.head(), self.mod_count)
    }

    pub(crate) fn order_and_projector(&mut self) -> (&InsertOrder, PairProjector<'_, K, V>) {
        let RawTable { links, slots, .. } = self;
        (links, slots.projector())
    }
}
