//! Realising the deal's `shuffle` operation.
//!
//! The rules never generate randomness: the deal only names the tile keys
//! to shuffle. Whoever applies the move supplies a [`Shuffler`]. The
//! transport layer would use its own source; tests and local play use
//! [`GameRng`] (seeded, deterministic) or [`Unshuffled`].
//!
//! ```
//! use rummy_engine::core::{GameRng, Shuffler};
//!
//! let mut a = GameRng::new(42);
//! let mut b = GameRng::new(42);
//!
//! let mut x = [1, 2, 3, 4, 5, 6, 7, 8];
//! let mut y = x;
//! a.shuffle(&mut x);
//! b.shuffle(&mut y);
//! assert_eq!(x, y);
//! ```

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Permutes the values stored under a set of shuffled keys.
pub trait Shuffler {
    /// Shuffle a slice in place.
    fn shuffle<T>(&mut self, slice: &mut [T]);
}

/// Deterministic ChaCha8-backed shuffler.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this RNG was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Shuffler for GameRng {
    fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.inner);
    }
}

/// Leaves every slice in its original order.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unshuffled;

impl Shuffler for Unshuffled {
    fn shuffle<T>(&mut self, _slice: &mut [T]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::new(7);
        let mut rng2 = GameRng::new(7);

        let mut a: Vec<u32> = (0..106).collect();
        let mut b = a.clone();
        rng1.shuffle(&mut a);
        rng2.shuffle(&mut b);

        assert_eq!(a, b);
        assert_eq!(rng1.seed(), 7);
    }

    #[test]
    fn test_different_seeds() {
        let mut a: Vec<u32> = (0..106).collect();
        let mut b = a.clone();
        GameRng::new(1).shuffle(&mut a);
        GameRng::new(2).shuffle(&mut b);

        assert_ne!(a, b);
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = GameRng::new(42);
        let mut data: Vec<u32> = (0..20).collect();
        let original = data.clone();

        rng.shuffle(&mut data);
        assert_ne!(data, original);

        data.sort_unstable();
        assert_eq!(data, original);
    }

    #[test]
    fn test_unshuffled() {
        let mut data = [3, 1, 2];
        Unshuffled.shuffle(&mut data);
        assert_eq!(data, [3, 1, 2]);
    }
}
