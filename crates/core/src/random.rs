//! Seeded pseudo-random stream shared by every generation pass.
//!
//! All randomness in a run flows through one `ZoneRng`, so the same seed and the
//! same call order reproduce the same zone on every platform.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

#[derive(Clone, Debug)]
pub struct ZoneRng {
    seed: u64,
    inner: ChaCha8Rng,
}

impl ZoneRng {
    pub fn new(seed: u64) -> Self {
        Self { seed, inner: ChaCha8Rng::seed_from_u64(seed) }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform value in `[0, 1)`.
    pub fn random(&mut self) -> f64 {
        (self.inner.next_u64() >> 11) as f64 * (1.0 / (1_u64 << 53) as f64)
    }

    pub fn chance(&mut self, probability: f64) -> bool {
        self.random() < probability
    }

    /// Uniform integer in `[min, max]`.
    pub fn range(&mut self, min: i32, max: i32) -> i32 {
        debug_assert!(min <= max);
        let span = (i64::from(max) - i64::from(min) + 1) as u64;
        (i64::from(min) + (self.inner.next_u64() % span) as i64) as i32
    }

    pub fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        (self.inner.next_u64() % len as u64) as usize
    }

    pub fn element<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.index(items.len());
        items.get(index)
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for upper in (1..items.len()).rev() {
            let swap_with = self.index(upper + 1);
            items.swap(upper, swap_with);
        }
    }

    /// Advance the stream one step without using the value.
    pub fn generate_and_mutate(&mut self) {
        self.inner.next_u64();
    }

    /// Independent stream derived from this generator's seed. Consuming a fork
    /// never moves the parent stream.
    pub fn fork(&self, stream: u64) -> Self {
        Self::new(mix_seed_stream(self.seed, stream))
    }
}

pub fn mix_seed_stream(seed: u64, stream: u64) -> u64 {
    let mut mixed = seed ^ stream.wrapping_mul(0xD6E8_FD9A_5B89_7A4D);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    mixed ^ (mixed >> 33)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_stays_inside_requested_bounds() {
        let mut rng = ZoneRng::new(12_345);
        for _ in 0..500 {
            let value = rng.range(-3, 4);
            assert!((-3..=4).contains(&value));
        }
    }

    #[test]
    fn random_stays_in_unit_interval() {
        let mut rng = ZoneRng::new(7);
        for _ in 0..500 {
            let value = rng.random();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn same_seed_replays_identical_sequence() {
        let mut left = ZoneRng::new(2026);
        let mut right = ZoneRng::new(2026);
        let mut left_items = [1, 2, 3, 4, 5, 6];
        let mut right_items = left_items;
        left.shuffle(&mut left_items);
        right.shuffle(&mut right_items);
        assert_eq!(left_items, right_items);
        assert_eq!(left.range(0, 100), right.range(0, 100));
        assert_eq!(left.element(&["a", "b", "c"]), right.element(&["a", "b", "c"]));
    }

    #[test]
    fn shuffle_keeps_every_element() {
        let mut rng = ZoneRng::new(99);
        let mut items: Vec<u32> = (0..20).collect();
        rng.shuffle(&mut items);
        items.sort();
        assert_eq!(items, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn fork_ignores_parent_consumption() {
        let mut parent = ZoneRng::new(55);
        let before = parent.fork(3).random();
        parent.generate_and_mutate();
        parent.random();
        let after = parent.fork(3).random();
        assert_eq!(before, after);
        assert_ne!(parent.fork(3).random(), parent.fork(4).random());
    }

    #[test]
    fn element_of_empty_slice_is_none() {
        let mut rng = ZoneRng::new(1);
        let empty: [u8; 0] = [];
        assert_eq!(rng.element(&empty), None);
    }
}
