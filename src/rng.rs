//! Seedable randomness for the lottery and for pruning.

use rand::seq::{IteratorRandom, SliceRandom};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// The engine's random source.
///
/// Production draws seed from the OS; tests and replays pass a fixed seed so the same
/// commands always produce the same numbers.
#[derive(Debug, Clone)]
pub struct DrawRng {
    rng: ChaCha20Rng,
}

impl DrawRng {
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Shuffles `items` in place, uniformly.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    /// Picks `amount` items uniformly without replacement. Order of the result is not
    /// meaningful.
    pub fn sample<T, I>(&mut self, items: I, amount: usize) -> Vec<T>
    where
        I: IntoIterator<Item = T>,
    {
        items.into_iter().choose_multiple(&mut self.rng, amount)
    }
}

impl Default for DrawRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_shuffle() {
        let mut a: Vec<u32> = (1..=20).collect();
        let mut b = a.clone();
        DrawRng::from_seed(7).shuffle(&mut a);
        DrawRng::from_seed(7).shuffle(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_without_replacement() {
        let mut rng = DrawRng::from_seed(3);
        let mut picked = rng.sample(0..10u32, 4);
        picked.sort_unstable();
        picked.dedup();
        assert_eq!(picked.len(), 4);
        assert!(picked.iter().all(|n| *n < 10));
    }
}
