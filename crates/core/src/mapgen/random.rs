//! Seeded dice for the generator. One `RandomSource` drives a whole level.

use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

pub struct RandomSource {
    seed: u64,
    rng: ChaCha8Rng,
}

impl RandomSource {
    pub fn new(seed: u64) -> Self {
        Self { seed, rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restarts the whole sequence from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    /// Uniform integer in `[1, sides]`.
    pub fn die_roll(&mut self, sides: u32) -> u32 {
        debug_assert!(sides > 0);
        1 + (self.rng.next_u64() % u64::from(sides.max(1))) as u32
    }

    /// Uniform integer in `[min, max]`.
    pub fn range_int(&mut self, min: i32, max: i32) -> i32 {
        debug_assert!(min <= max);
        let span = (i64::from(max) - i64::from(min) + 1).max(1) as u64;
        (i64::from(min) + (self.rng.next_u64() % span) as i64) as i32
    }

    pub fn percent_roll(&mut self, percent: u8) -> bool {
        self.die_roll(100) <= u32::from(percent)
    }

    /// Index of the cumulative bucket holding a `[1, 100]` draw, or
    /// `weights.len()` when the draw lands past the cumulative sum.
    pub fn weighted_outcome(&mut self, weights: &[u8]) -> usize {
        let draw = self.die_roll(100);
        let mut cumulative = 0_u32;
        for (index, &weight) in weights.iter().enumerate() {
            cumulative += u32::from(weight);
            if draw <= cumulative {
                return index;
            }
        }
        weights.len()
    }

    /// Uniform pick from a non-empty slice.
    pub fn pick<T: Copy>(&mut self, options: &[T]) -> T {
        options[self.die_roll(options.len() as u32) as usize - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn die_roll_covers_every_face_and_nothing_else() {
        let mut rng = RandomSource::new(7);
        let mut seen = [false; 6];
        for _ in 0..600 {
            let roll = rng.die_roll(6);
            assert!((1..=6).contains(&roll));
            seen[roll as usize - 1] = true;
        }
        assert!(seen.iter().all(|&face| face));
    }

    #[test]
    fn range_int_is_inclusive_on_both_ends() {
        let mut rng = RandomSource::new(99);
        let mut low = false;
        let mut high = false;
        for _ in 0..500 {
            let value = rng.range_int(-2, 2);
            assert!((-2..=2).contains(&value));
            low |= value == -2;
            high |= value == 2;
        }
        assert!(low && high);
        assert_eq!(rng.range_int(5, 5), 5);
    }

    #[test]
    fn percent_roll_extremes_are_certain() {
        let mut rng = RandomSource::new(3);
        for _ in 0..200 {
            assert!(rng.percent_roll(100));
            assert!(!rng.percent_roll(0));
        }
    }

    #[test]
    fn weighted_outcome_reports_no_outcome_past_the_cumulative_sum() {
        let mut rng = RandomSource::new(11);
        for _ in 0..200 {
            assert_eq!(rng.weighted_outcome(&[100, 0]), 0);
            assert_eq!(rng.weighted_outcome(&[0, 0]), 2);
            assert_eq!(rng.weighted_outcome(&[0, 100, 0]), 1);
        }

        let mut misses = 0;
        for _ in 0..400 {
            let outcome = rng.weighted_outcome(&[25, 25]);
            assert!(outcome <= 2);
            misses += usize::from(outcome == 2);
        }
        assert!(misses > 0, "half of the draws should land past a 50% table");
    }

    #[test]
    fn reseeding_replays_the_same_sequence() {
        let mut rng = RandomSource::new(2024);
        let first: Vec<u32> = (0..16).map(|_| rng.die_roll(1000)).collect();
        rng.reseed(2024);
        let second: Vec<u32> = (0..16).map(|_| rng.die_roll(1000)).collect();
        assert_eq!(first, second);
        assert_eq!(rng.seed(), 2024);
    }
}
