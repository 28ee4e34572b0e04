//! Deterministic hashers for collision and slot-placement tests.

use crate::probe::{home_bucket, mix};
use core::hash::{BuildHasher, Hasher};

/// Hashes every key to zero: the worst case, one collision chain.
#[derive(Clone, Default)]
pub(crate) struct ConstBuildHasher;

pub(crate) struct ConstHasher;

impl Hasher for ConstHasher {
    fn finish(&self) -> u64 {
        0
    }
    fn write(&mut self, _bytes: &[u8]) {}
}

impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> ConstHasher {
        ConstHasher
    }
}

/// Hashes every key to one fixed raw value, chosen so the mixed hash homes
/// at a known bucket. Lets a test construct exact slot layouts, including
/// chains that wrap around the end of the table.
#[derive(Clone)]
pub(crate) struct PointBuildHasher {
    value: u64,
}

pub(crate) struct PointHasher(u64);

impl Hasher for PointHasher {
    fn finish(&self) -> u64 {
        self.0
    }
    fn write(&mut self, _bytes: &[u8]) {}
}

impl BuildHasher for PointBuildHasher {
    type Hasher = PointHasher;
    fn build_hasher(&self) -> PointHasher {
        PointHasher(self.value)
    }
}

/// Hasher whose every key homes at `bucket` in a table of `cap` slots.
pub(crate) fn point_hasher(cap: usize, bucket: usize) -> PointBuildHasher {
    debug_assert!(cap.is_power_of_two() && bucket < cap);
    let mask = cap - 1;
    let value = (0u64..)
        .find(|&v| home_bucket(mix(v), mask) == bucket)
        .expect("some raw hash homes at every bucket");
    PointBuildHasher { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_hasher_hits_requested_bucket() {
        for bucket in 0..8 {
            let h = point_hasher(8, bucket);
            let mixed = mix(h.build_hasher().finish());
            assert_eq!(home_bucket(mixed, 7), bucket);
        }
    }
}
