//! openhash: open-addressing hash maps and sets with backward-shift
//! deletion and optional insertion-order iteration.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one table engine behind four containers, built in safe,
//!   verifiable layers so each piece can be reasoned about independently.
//! - Layers:
//!   - SlotArray<K, V>: flat power-of-two arena of key/value slots with a
//!     stored hash and a used marker per slot; the only module containing
//!     `unsafe`.
//!   - RawTable<K, V, S, L>: probing, growth, and removal over the arena.
//!     Entries are addressed by slot index. The linkage policy `L` is a
//!     type parameter: `Unordered` compiles to nothing, `InsertOrder`
//!     threads an intrusive order chain through the slots.
//!   - OpenHashMap / OpenHashSet / LinkedOpenHashMap / LinkedOpenHashSet:
//!     the public facades. The linked variants add endpoint access
//!     (first/last/pop) and access-order promotion.
//!
//! Constraints
//! - Single-threaded: no atomics, no locks; `&mut self` on every mutation.
//! - Tombstone-free: removal backward-shifts displaced entries over the
//!   gap, so lookup cost never degrades with deletion history.
//! - Power-of-two capacity, linear probing, growth at a 3/4 load factor;
//!   all threshold arithmetic is integral.
//! - Shrinking only on explicit `trim()`; removal never reallocates.
//!
//! Hasher and rehashing invariants
//! - Each entry stores its mixed `u64` hash and every structural operation
//!   (probing past it, shifting it, rehashing it) uses the stored hash;
//!   `K: Hash` is never invoked after insertion. This avoids resize-time
//!   and removal-time calls into user code.
//! - The raw hash is finalized with a xor-shift/multiply mixer before
//!   masking, so weak hashers still spread across buckets.
//!
//! Iteration policy
//! - Borrowing iterators (`iter`, `iter_mut`, `keys`, ...) freeze the
//!   container through the borrow checker, like the std collections.
//! - Detached cursors hold no borrow; they snapshot a modification counter
//!   and fail fast with [`CursorError::Invalidated`] when the container
//!   was structurally changed behind them. Removing the current entry
//!   through the cursor is allowed and keeps the traversal exact even
//!   though backward shifts relocate entries under the sweep.
//! - Value overwrite is not a structural change and invalidates nothing.
//!
//! Notes and non-goals
//! - Key identity is immutable post-insert; there is no `key_mut`.
//! - No entry API and no raw-handle surface; slot indices stay internal
//!   (visible only through the `bench_internal` feature, for benchmarks).
//! - Linked variants cost two `usize` per slot and O(1) extra work per
//!   structural operation; the plain variants pay nothing.

mod cursor;
mod linkage;
pub mod map;
mod probe;
pub mod set;
mod slots;
mod table;
#[cfg(test)]
mod table_proptest;
#[cfg(test)]
mod test_hashers;

// Public surface
pub use cursor::CursorError;
pub use map::{LinkedOpenHashMap, OpenHashMap};
pub use set::{LinkedOpenHashSet, OpenHashSet};

// Internal engine, exposed only for the raw-table benchmarks.
#[cfg(feature = "bench_internal")]
pub use cursor::{LinkCursor, RawCursor};
#[cfg(feature = "bench_internal")]
pub use linkage::{InsertOrder, Linkage, Unordered};
#[cfg(feature = "bench_internal")]
pub use table::RawTable;
