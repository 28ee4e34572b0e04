//! Order linkage: the intrusive doubly-linked list that gives the linked
//! table variants their deterministic iteration order.
//!
//! The list is stored as per-slot predecessor/successor indices into the slot
//! array, never as pointers; backward-shift deletion relocates entries, and
//! index patching keeps the chain valid where pointers could not be (the slot
//! array is reallocated wholesale on resize).
//!
//! Linkage is a static policy of the table: the plain variants use the
//! zero-sized [`Unordered`] policy and compile to no link bookkeeping at all;
//! the linked variants use [`InsertOrder`].

pub(crate) const NIL: usize = usize::MAX;

pub trait Linkage {
    /// Whether the policy maintains an iteration order that rehashing must
    /// replay (link order instead of raw bucket order).
    const ORDERED: bool;

    fn with_capacity(cap: usize) -> Self;

    /// A new entry occupied `idx`: append it to the order.
    fn record_insert(&mut self, idx: usize);

    /// The entry at `idx` was removed: unlink it.
    fn record_remove(&mut self, idx: usize);

    /// Backward-shift moved the entry at `from` into `to`: patch both
    /// neighbors to the new index.
    fn record_relocate(&mut self, from: usize, to: usize);

    fn clear(&mut self);

    fn head(&self) -> Option<usize>;

    fn next_of(&self, idx: usize) -> Option<usize>;
}

/// No order maintained; all hooks are no-ops and compile away.
#[derive(Default)]
pub struct Unordered;

impl Linkage for Unordered {
    const ORDERED: bool = false;

    #[inline]
    fn with_capacity(_cap: usize) -> Self {
        Unordered
    }
    #[inline]
    fn record_insert(&mut self, _idx: usize) {}
    #[inline]
    fn record_remove(&mut self, _idx: usize) {}
    #[inline]
    fn record_relocate(&mut self, _from: usize, _to: usize) {}
    #[inline]
    fn clear(&mut self) {}
    #[inline]
    fn head(&self) -> Option<usize> {
        None
    }
    #[inline]
    fn next_of(&self, _idx: usize) -> Option<usize> {
        None
    }
}

/// Insertion-order chain from head to tail. `move_to_front`/`move_to_back`
/// give the access-order mode its promotion primitive.
pub struct InsertOrder {
    head: usize,
    tail: usize,
    prev: Box<[usize]>,
    next: Box<[usize]>,
}

impl InsertOrder {
    fn append(&mut self, idx: usize) {
        self.prev[idx] = self.tail;
        self.next[idx] = NIL;
        if self.tail == NIL {
            self.head = idx;
        } else {
            self.next[self.tail] = idx;
        }
        self.tail = idx;
    }

    fn unlink(&mut self, idx: usize) {
        let (p, n) = (self.prev[idx], self.next[idx]);
        if p == NIL {
            self.head = n;
        } else {
            self.next[p] = n;
        }
        if n == NIL {
            self.tail = p;
        } else {
            self.prev[n] = p;
        }
        self.prev[idx] = NIL;
        self.next[idx] = NIL;
    }

    pub(crate) fn tail(&self) -> Option<usize> {
        if self.tail == NIL {
            None
        } else {
            Some(self.tail)
        }
    }

    pub(crate) fn prev_of(&self, idx: usize) -> Option<usize> {
        match self.prev[idx] {
            NIL => None,
            p => Some(p),
        }
    }

    /// Make `idx` the head of the order (least recently used end).
    pub(crate) fn move_to_front(&mut self, idx: usize) {
        if self.head == idx {
            return;
        }
        self.unlink(idx);
        self.next[idx] = self.head;
        self.prev[idx] = NIL;
        self.prev[self.head] = idx;
        self.head = idx;
    }

    /// Make `idx` the tail of the order (most recently used end).
    pub(crate) fn move_to_back(&mut self, idx: usize) {
        if self.tail == idx {
            return;
        }
        self.unlink(idx);
        self.append(idx);
    }
}

impl Linkage for InsertOrder {
    const ORDERED: bool = true;

    fn with_capacity(cap: usize) -> Self {
        Self {
            head: NIL,
            tail: NIL,
            prev: vec![NIL; cap].into_boxed_slice(),
            next: vec![NIL; cap].into_boxed_slice(),
        }
    }

    fn record_insert(&mut self, idx: usize) {
        debug_assert!(self.prev[idx] == NIL && self.next[idx] == NIL && self.head != idx);
        self.append(idx);
    }

    fn record_remove(&mut self, idx: usize) {
        self.unlink(idx);
    }

    fn record_relocate(&mut self, from: usize, to: usize) {
        let (p, n) = (self.prev[from], self.next[from]);
        self.prev[to] = p;
        self.next[to] = n;
        if p == NIL {
            self.head = to;
        } else {
            self.next[p] = to;
        }
        if n == NIL {
            self.tail = to;
        } else {
            self.prev[n] = to;
        }
        self.prev[from] = NIL;
        self.next[from] = NIL;
    }

    fn clear(&mut self) {
        self.head = NIL;
        self.tail = NIL;
        self.prev.fill(NIL);
        self.next.fill(NIL);
    }

    fn head(&self) -> Option<usize> {
        if self.head == NIL {
            None
        } else {
            Some(self.head)
        }
    }

    fn next_of(&self, idx: usize) -> Option<usize> {
        match self.next[idx] {
            NIL => None,
            n => Some(n),
        }
    }
}
