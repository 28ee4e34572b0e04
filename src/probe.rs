//! Probe sequencing: hash finalization, bucket selection, and the capacity
//! and load-factor arithmetic the table shares.
//!
//! The table is always a power of two long, so a bucket is the low bits of
//! the mixed hash and the probe step is linear (`+1 mod capacity`). The load
//! factor is fixed at 3/4 and expressed as an integer threshold; no floats on
//! the lookup or insert path.

pub(crate) const MIN_CAPACITY: usize = 8;
pub(crate) const DEFAULT_CAPACITY: usize = 16;

/// Finalize a hasher's output before masking. A 64-bit xor-shift/multiply
/// scrambler; makes the low bits usable as a bucket index even when the
/// configured hasher is weak (sequential or strided integer keys).
#[inline]
pub(crate) fn mix(h: u64) -> u64 {
    let h = h ^ (h >> 33);
    let h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
    h ^ (h >> 33)
}

/// Home bucket of a mixed hash in a table with the given mask.
#[inline]
pub(crate) fn home_bucket(hash: u64, mask: usize) -> usize {
    (hash as usize) & mask
}

/// Linear probe sequence starting at the hash's home bucket.
pub(crate) struct ProbeSeq {
    pos: usize,
    mask: usize,
}

impl ProbeSeq {
    #[inline]
    pub(crate) fn new(hash: u64, mask: usize) -> Self {
        Self { pos: home_bucket(hash, mask), mask }
    }

    #[inline]
    pub(crate) fn bucket(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn advance(&mut self) {
        self.pos = (self.pos + 1) & self.mask;
    }
}

/// Number of live entries above which a table of `cap` slots must grow.
#[inline]
pub(crate) fn grow_threshold(cap: usize) -> usize {
    // Exact 3/4 of any power of two >= 4.
    cap / 4 * 3
}

/// Smallest valid capacity that can hold `n` entries without growing.
pub(crate) fn capacity_for(n: usize) -> usize {
    let mut cap = MIN_CAPACITY;
    while grow_threshold(cap) <= n {
        cap = cap.checked_mul(2).expect("table capacity overflow");
    }
    cap
}
