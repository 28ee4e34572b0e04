//! Detached cursors over the raw table: bucket order and link order.
//!
//! A cursor holds no borrow of the table; every call re-validates a
//! modification-count snapshot instead. Structural changes made through any
//! path other than the cursor's own `remove_current` make the next `advance`
//! fail with [`CursorError::Invalidated`], permanently. Exhaustion is
//! `Ok(None)` and is never conflated with invalidation.
//!
//! Removing through the cursor is allowed and keeps the sweep exact: the
//! backward shift that closes the gap may move entries across the cursor's
//! visited boundary in either direction, so the removal path reports every
//! relocation and the cursor tracks:
//! - `extra`: not-yet-visited entries that shifted back into the visited
//!   region; they are served after the main sweep.
//! - `skip`: already-visited entries that wrapped around the end of the
//!   table into the unvisited region; the main sweep passes over them.
//!
//! Both lists hold slot indices and are patched again on later relocations,
//! so no element is skipped or served twice no matter how removals
//! interleave with the sweep.

use crate::linkage::{InsertOrder, Linkage, NIL};
use crate::table::RawTable;
use core::fmt;

/// Failure of a cursor operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorError {
    /// The table was structurally modified outside this cursor's own
    /// `remove_current` path. The cursor is permanently unusable.
    Invalidated,
}

impl fmt::Display for CursorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorError::Invalidated => {
                write!(f, "table structurally modified during cursor iteration")
            }
        }
    }
}

impl std::error::Error for CursorError {}

#[derive(Clone, Copy)]
enum Served {
    Main(usize),
    Extra { list_pos: usize, idx: usize },
}

/// Bucket-order cursor. Created by [`RawTable::cursor`].
pub struct RawCursor {
    /// Next raw index the main sweep will examine; `[0, pos)` is visited.
    pos: usize,
    last: Option<Served>,
    expected_mod: u64,
    extra: Vec<usize>,
    extra_pos: usize,
    skip: Vec<usize>,
}

impl RawCursor {
    pub(crate) fn new(expected_mod: u64) -> Self {
        Self {
            pos: 0,
            last: None,
            expected_mod,
            extra: Vec::new(),
            extra_pos: 0,
            skip: Vec::new(),
        }
    }

    /// Step to the next entry, returning its slot index. `Ok(None)` once
    /// exhausted (and on every later call; the cursor never wraps).
    pub fn advance<K, V, S, L>(
        &mut self,
        table: &RawTable<K, V, S, L>,
    ) -> Result<Option<usize>, CursorError>
    where
        L: Linkage,
    {
        if self.expected_mod != table.mod_count() {
            return Err(CursorError::Invalidated);
        }
        let cap = table.capacity();
        while self.pos < cap {
            let idx = self.pos;
            self.pos += 1;
            if table.is_used(idx) && !self.skip.contains(&idx) {
                self.last = Some(Served::Main(idx));
                return Ok(Some(idx));
            }
        }
        while self.extra_pos < self.extra.len() {
            let list_pos = self.extra_pos;
            self.extra_pos += 1;
            let idx = self.extra[list_pos];
            if idx != NIL {
                debug_assert!(table.is_used(idx));
                self.last = Some(Served::Extra { list_pos, idx });
                return Ok(Some(idx));
            }
        }
        self.last = None;
        Ok(None)
    }

    /// Remove the entry most recently returned by [`advance`](Self::advance)
    /// and re-arm the cursor for the table's new state.
    ///
    /// Panics if there is no current entry (never advanced, already removed,
    /// or exhausted); that is a caller bug, not a data-dependent condition.
    pub fn remove_current<K, V, S, L>(
        &mut self,
        table: &mut RawTable<K, V, S, L>,
    ) -> Result<(K, V), CursorError>
    where
        L: Linkage,
    {
        if self.expected_mod != table.mod_count() {
            return Err(CursorError::Invalidated);
        }
        let served = self.last.take().expect("remove_current without a current entry");
        let idx = match served {
            Served::Main(idx) => idx,
            Served::Extra { list_pos, idx } => {
                self.extra[list_pos] = NIL;
                idx
            }
        };
        let pos = self.pos;
        let extra_pos = self.extra_pos;
        let extra = &mut self.extra;
        let skip = &mut self.skip;
        let pair = table.remove_at_with(idx, |src, dst| {
            // `[0, pos)` is the visited region. Once the main sweep is done
            // (pos == capacity) everything counts as visited and only the
            // extra list matters.
            let visited = |i: usize| i < pos;
            if let Some(p) = extra.iter().position(|&e| e == src) {
                if visited(dst) {
                    extra[p] = dst;
                } else {
                    // Back in the unvisited region: the main sweep will reach
                    // it, unless this cursor already served it from the list.
                    extra[p] = NIL;
                    if p < extra_pos {
                        skip.push(dst);
                    }
                }
            } else if let Some(p) = skip.iter().position(|&e| e == src) {
                if visited(dst) {
                    // Out of the sweep's path again; nothing left to suppress.
                    skip.remove(p);
                } else {
                    skip[p] = dst;
                }
            } else {
                match (visited(src), visited(dst)) {
                    // Shifted behind the sweep before being seen: serve later.
                    (false, true) => extra.push(dst),
                    // Wrapped ahead of the sweep after being seen: suppress.
                    (true, false) => skip.push(dst),
                    _ => {}
                }
            }
        });
        self.expected_mod = table.mod_count();
        Ok(pair)
    }
}

/// Link-order cursor over a linked table. Created by
/// [`RawTable::link_cursor`].
pub struct LinkCursor {
    next: usize,
    last: usize,
    expected_mod: u64,
}

impl LinkCursor {
    pub(crate) fn new(head: Option<usize>, expected_mod: u64) -> Self {
        Self { next: head.unwrap_or(NIL), last: NIL, expected_mod }
    }

    /// Step along the order chain. `Ok(None)` once past the tail.
    pub fn advance<K, V, S>(
        &mut self,
        table: &RawTable<K, V, S, InsertOrder>,
    ) -> Result<Option<usize>, CursorError> {
        if self.expected_mod != table.mod_count() {
            return Err(CursorError::Invalidated);
        }
        if self.next == NIL {
            self.last = NIL;
            return Ok(None);
        }
        let idx = self.next;
        debug_assert!(table.is_used(idx));
        self.next = table.links().next_of(idx).unwrap_or(NIL);
        self.last = idx;
        Ok(Some(idx))
    }

    /// Remove the current entry. The chain unlink is O(1); if the backward
    /// shift relocates the slot this cursor will visit next, the reported
    /// move patches the stored index.
    ///
    /// Panics if there is no current entry.
    pub fn remove_current<K, V, S>(
        &mut self,
        table: &mut RawTable<K, V, S, InsertOrder>,
    ) -> Result<(K, V), CursorError> {
        if self.expected_mod != table.mod_count() {
            return Err(CursorError::Invalidated);
        }
        assert!(self.last != NIL, "remove_current without a current entry");
        let idx = self.last;
        self.last = NIL;
        let next = &mut self.next;
        let pair = table.remove_at_with(idx, |src, dst| {
            if *next == src {
                *next = dst;
            }
        });
        self.expected_mod = table.mod_count();
        Ok(pair)
    }
}
