//! # Offset scattering
//!
//! Payload parts are not written to consecutive sample bytes but scattered
//! over the whole buffer, in an order both sides derive from the seed byte at
//! offset 0. The scatter order must therefore be identical across platforms
//! and releases; it is part of the carrier format.

use fastrand::Rng;

/// Deterministic permutation of the writable byte offsets of a buffer.
///
/// Offset 0 carries the seed itself and is never part of the permutation;
/// the remaining offsets `1..index_count` are shuffled with draws from a
/// [`fastrand::Rng`] seeded with the seed byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPermutation {
    offsets: Vec<u32>,
}

impl IndexPermutation {
    /// Shuffle the offsets `1..index_count` under `seed`.
    ///
    /// The swap loop stops two positions short of the end, so the final two
    /// offsets are only ever moved as swap targets of earlier positions.
    /// That quirk is load bearing: existing carriers were written with it.
    pub fn scatter(index_count: u32, seed: u8) -> IndexPermutation {
        let mut rng = Rng::with_seed(u64::from(seed));
        let mut offsets: Vec<u32> = (1..index_count).collect();

        let len = offsets.len();
        for i in 0..len.saturating_sub(2) {
            let draw = rng.u32(0..index_count - 1) as usize;
            let j = i + draw % (len - i);
            offsets.swap(i, j);
        }

        IndexPermutation { offsets }
    }

    /// The scattered offsets, each in `1..index_count`.
    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_produce_the_same_order_for_the_same_seed() {
        let first = IndexPermutation::scatter(1000, 42);
        let second = IndexPermutation::scatter(1000, 42);

        assert_eq!(first, second);
    }

    #[test]
    fn should_produce_different_orders_for_different_seeds() {
        let first = IndexPermutation::scatter(1000, 1);
        let second = IndexPermutation::scatter(1000, 2);

        assert_ne!(first, second);
    }

    #[test]
    fn should_visit_every_offset_exactly_once() {
        let permutation = IndexPermutation::scatter(257, 99);

        let mut sorted = permutation.offsets().to_vec();
        sorted.sort_unstable();
        let expected: Vec<u32> = (1..257).collect();

        assert_eq!(sorted, expected);
    }

    #[test]
    fn should_never_yield_the_seed_offset() {
        for seed in 0..=255 {
            let permutation = IndexPermutation::scatter(64, seed);
            assert!(permutation.offsets().iter().all(|&offset| offset != 0));
        }
    }

    #[test]
    fn should_handle_tiny_buffers() {
        assert!(IndexPermutation::scatter(0, 7).is_empty());
        assert!(IndexPermutation::scatter(1, 7).is_empty());
        assert_eq!(IndexPermutation::scatter(2, 7).offsets(), [1]);

        // two offsets never reach the swap loop
        assert_eq!(IndexPermutation::scatter(3, 7).offsets(), [1, 2]);
    }
}
