//! Slot arena: flat key/value storage for the open-addressing table.
//!
//! One power-of-two-length allocation of parallel arrays: keys, values, the
//! stored 64-bit hash of each key, and a used marker. Slots are reused in
//! place; a slot is never individually reallocated. Everything above this
//! layer addresses entries by slot index only, so resizing the arena can
//! never invalidate a reference.
//!
//! All `unsafe` in the crate is confined to this module. The API is safe:
//! every entry point checks the used marker before touching key or value
//! storage, and an index that violates the marker discipline is treated as
//! table corruption and aborts via panic.

use core::marker::PhantomData;
use core::mem::MaybeUninit;

fn uninit_boxed<T>(cap: usize) -> Box<[MaybeUninit<T>]> {
    core::iter::repeat_with(MaybeUninit::uninit).take(cap).collect()
}

pub(crate) struct SlotArray<K, V> {
    keys: Box<[MaybeUninit<K>]>,
    values: Box<[MaybeUninit<V>]>,
    hashes: Box<[u64]>,
    used: Box<[bool]>,
}

impl<K, V> SlotArray<K, V> {
    pub(crate) fn with_capacity(cap: usize) -> Self {
        assert!(cap.is_power_of_two(), "slot array capacity must be a power of two");
        Self {
            keys: uninit_boxed(cap),
            values: uninit_boxed(cap),
            hashes: vec![0; cap].into_boxed_slice(),
            used: vec![false; cap].into_boxed_slice(),
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.used.len()
    }

    #[inline]
    pub(crate) fn is_used(&self, idx: usize) -> bool {
        self.used[idx]
    }

    /// Stored (already mixed) hash of the entry at `idx`.
    #[inline]
    pub(crate) fn hash_at(&self, idx: usize) -> u64 {
        debug_assert!(self.used[idx]);
        self.hashes[idx]
    }

    #[inline]
    pub(crate) fn key_at(&self, idx: usize) -> &K {
        assert!(self.used[idx], "key_at on unused slot");
        // SAFETY: the slot is marked used, so the key was initialized by
        // `write` and not yet moved out by `take`.
        unsafe { self.keys[idx].assume_init_ref() }
    }

    #[inline]
    pub(crate) fn value_at(&self, idx: usize) -> &V {
        assert!(self.used[idx], "value_at on unused slot");
        // SAFETY: used slots hold initialized values.
        unsafe { self.values[idx].assume_init_ref() }
    }

    #[inline]
    pub(crate) fn value_at_mut(&mut self, idx: usize) -> &mut V {
        assert!(self.used[idx], "value_at_mut on unused slot");
        // SAFETY: used slots hold initialized values.
        unsafe { self.values[idx].assume_init_mut() }
    }

    #[inline]
    pub(crate) fn pair_at(&self, idx: usize) -> (&K, &V) {
        assert!(self.used[idx], "pair_at on unused slot");
        // SAFETY: used slots hold initialized keys and values.
        unsafe { (self.keys[idx].assume_init_ref(), self.values[idx].assume_init_ref()) }
    }

    #[inline]
    pub(crate) fn pair_at_mut(&mut self, idx: usize) -> (&K, &mut V) {
        assert!(self.used[idx], "pair_at_mut on unused slot");
        // SAFETY: used slots hold initialized keys and values; keys and
        // values live in separate arrays, so the borrows are disjoint.
        unsafe { (self.keys[idx].assume_init_ref(), self.values[idx].assume_init_mut()) }
    }

    /// Occupy an empty slot.
    pub(crate) fn write(&mut self, idx: usize, hash: u64, key: K, value: V) {
        assert!(!self.used[idx], "write into occupied slot");
        self.keys[idx].write(key);
        self.values[idx].write(value);
        self.hashes[idx] = hash;
        self.used[idx] = true;
    }

    /// Vacate a slot, returning the owned pair.
    pub(crate) fn take(&mut self, idx: usize) -> (K, V) {
        assert!(self.used[idx], "take on unused slot");
        self.used[idx] = false;
        // SAFETY: the slot was used; clearing the marker first means no other
        // accessor can observe the moved-out storage.
        unsafe { (self.keys[idx].assume_init_read(), self.values[idx].assume_init_read()) }
    }

    /// Move the entry at `from` into the empty slot at `to`, vacating `from`.
    /// Used by backward-shift deletion; the entry's identity (key, value,
    /// stored hash) is preserved, only its index changes.
    pub(crate) fn relocate(&mut self, from: usize, to: usize) {
        assert!(self.used[from] && !self.used[to], "relocate between wrong slot states");
        self.used[from] = false;
        // SAFETY: `from` was used, `to` was empty; the bits move, ownership
        // transfers, and no drop runs.
        unsafe {
            let key = self.keys[from].assume_init_read();
            let value = self.values[from].assume_init_read();
            self.keys[to].write(key);
            self.values[to].write(value);
        }
        self.hashes[to] = self.hashes[from];
        self.used[to] = true;
    }

    /// Drop every live entry and mark all slots empty. Capacity is kept.
    pub(crate) fn clear(&mut self) {
        for idx in 0..self.used.len() {
            if self.used[idx] {
                self.used[idx] = false;
                // SAFETY: the slot was used; the marker is cleared before the
                // drops so reentrant Drop code observes a consistent arena.
                unsafe {
                    self.keys[idx].assume_init_drop();
                    self.values[idx].assume_init_drop();
                }
            }
        }
    }

    /// Mutable projection of pairs by arbitrary index order, for the mutable
    /// iterators. Each index may be projected at most once per projector
    /// (checked in debug builds); that keeps the handed-out `&mut V` disjoint.
    pub(crate) fn projector(&mut self) -> PairProjector<'_, K, V> {
        let SlotArray { keys, values, used, .. } = self;
        PairProjector {
            keys,
            used,
            values: values.as_mut_ptr(),
            #[cfg(debug_assertions)]
            handed: vec![false; used.len()].into_boxed_slice(),
            _values: PhantomData,
        }
    }
}

impl<K, V> Drop for SlotArray<K, V> {
    fn drop(&mut self) {
        self.clear();
    }
}

pub(crate) struct PairProjector<'a, K, V> {
    keys: &'a [MaybeUninit<K>],
    used: &'a [bool],
    values: *mut MaybeUninit<V>,
    #[cfg(debug_assertions)]
    handed: Box<[bool]>,
    _values: PhantomData<&'a mut [MaybeUninit<V>]>,
}

impl<'a, K, V> PairProjector<'a, K, V> {
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.used.len()
    }

    #[inline]
    pub(crate) fn is_used(&self, idx: usize) -> bool {
        self.used[idx]
    }

    pub(crate) fn project(&mut self, idx: usize) -> (&'a K, &'a mut V) {
        assert!(self.used[idx], "projection of unused slot");
        #[cfg(debug_assertions)]
        {
            assert!(!self.handed[idx], "slot projected twice");
            self.handed[idx] = true;
        }
        // SAFETY: the slot is used, so key and value are initialized. The
        // projector owns the mutable borrow of the value array for 'a, the
        // index bound was checked against `used`, and each index is projected
        // at most once, so no two returned `&mut V` alias.
        unsafe { (self.keys[idx].assume_init_ref(), (*self.values.add(idx)).assume_init_mut()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone)]
    struct DropTally(Rc<Cell<usize>>);
    impl Drop for DropTally {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    /// Invariant: write/take round-trips the owned pair and flips the marker.
    #[test]
    fn write_take_round_trip() {
        let mut a: SlotArray<u32, String> = SlotArray::with_capacity(8);
        assert!(!a.is_used(3));
        a.write(3, 77, 9, "v".to_string());
        assert!(a.is_used(3));
        assert_eq!(a.hash_at(3), 77);
        assert_eq!(*a.key_at(3), 9);
        assert_eq!(a.value_at(3), "v");
        let (k, v) = a.take(3);
        assert_eq!((k, v.as_str()), (9, "v"));
        assert!(!a.is_used(3));
    }

    /// Invariant: relocate moves an entry without dropping or cloning it and
    /// carries its stored hash along.
    #[test]
    fn relocate_preserves_entry() {
        let drops = Rc::new(Cell::new(0));
        let mut a: SlotArray<u32, DropTally> = SlotArray::with_capacity(8);
        a.write(5, 42, 1, DropTally(drops.clone()));
        a.relocate(5, 2);
        assert!(!a.is_used(5));
        assert!(a.is_used(2));
        assert_eq!(a.hash_at(2), 42);
        assert_eq!(*a.key_at(2), 1);
        assert_eq!(drops.get(), 0, "relocation must not drop the value");
        drop(a);
        assert_eq!(drops.get(), 1);
    }

    /// Invariant: clear and Drop run the destructor of every live entry
    /// exactly once and never touch vacated slots.
    #[test]
    fn clear_and_drop_run_destructors_once() {
        let drops = Rc::new(Cell::new(0));
        let mut a: SlotArray<u32, DropTally> = SlotArray::with_capacity(8);
        for i in 0..4 {
            a.write(i, i as u64, i as u32, DropTally(drops.clone()));
        }
        let _ = a.take(1);
        assert_eq!(drops.get(), 1); // the taken value dropped by the caller
        a.clear();
        assert_eq!(drops.get(), 4);
        drop(a);
        assert_eq!(drops.get(), 4, "drop after clear must not double-free");
    }

    /// Invariant: the mutable projector hands out working `&mut V` per index.
    #[test]
    fn projector_mutates_in_place() {
        let mut a: SlotArray<u32, i32> = SlotArray::with_capacity(8);
        a.write(1, 0, 10, 100);
        a.write(6, 0, 60, 600);
        {
            let mut p = a.projector();
            assert_eq!(p.capacity(), 8);
            assert!(p.is_used(6));
            let (k, v) = p.project(6);
            assert_eq!(*k, 60);
            *v += 1;
            let (_, v1) = p.project(1);
            *v1 += 1;
        }
        assert_eq!(*a.value_at(1), 101);
        assert_eq!(*a.value_at(6), 601);
    }

    /// Invariant: index misuse is fatal, not silent.
    #[test]
    #[should_panic(expected = "take on unused slot")]
    fn take_unused_is_fatal() {
        let mut a: SlotArray<u32, i32> = SlotArray::with_capacity(8);
        let _ = a.take(0);
    }
}
