//! Randomness and coherent noise consumed by the generator
//!
//! Every stage draws from a single [`NoiseSource`] handed down by the
//! pipeline. The source is never reseeded mid-run, so a level depends only
//! on the seed the source was built from.

use ::noise::{NoiseFn, Simplex};

use crate::rng::GameRng;

/// Pseudo-random and coherent-noise collaborator.
///
/// Contract:
/// - `noise2d` is continuous, repeatable for the same input, and stays in `[-1, 1]`.
/// - `uniform_int(lo, hi)` is uniform over `lo..=hi` and returns `lo` when `hi < lo`.
/// - `uniform01` is uniform over `[0, 1)`.
pub trait NoiseSource {
    /// Coherent 2D noise in `[-1, 1]`.
    fn noise2d(&self, x: f64, y: f64) -> f64;

    /// Uniform integer in `lo..=hi_inclusive`.
    fn uniform_int(&mut self, lo: i32, hi_inclusive: i32) -> i32;

    /// Uniform float in `[0, 1)`.
    fn uniform01(&mut self) -> f32;

    /// Uniform float in `[lo, hi)`.
    fn uniform_f32(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.uniform01()
    }

    /// Uniform index into a collection of `len` items (`len` must be non-zero).
    fn pick_index(&mut self, len: usize) -> usize {
        self.uniform_int(0, len as i32 - 1) as usize
    }

    /// Fisher-Yates shuffle, walking from the back.
    fn shuffle<T>(&mut self, items: &mut [T])
    where
        Self: Sized,
    {
        for i in (1..items.len()).rev() {
            let j = self.uniform_int(0, i as i32) as usize;
            items.swap(i, j);
        }
    }
}

/// Seeded source: ChaCha for uniform draws, simplex for coherent noise.
#[derive(Clone)]
pub struct SeededNoise {
    rng: GameRng,
    simplex: Simplex,
}

impl core::fmt::Debug for SeededNoise {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SeededNoise")
            .field("seed", &self.rng.seed())
            .finish()
    }
}

impl SeededNoise {
    /// Build a source whose whole output is determined by `seed`.
    pub fn new(seed: u64) -> Self {
        // fold the high half in so seeds differing only above bit 32 still differ
        let noise_seed = (seed ^ (seed >> 32)) as u32;
        Self {
            rng: GameRng::new(seed),
            simplex: Simplex::new(noise_seed),
        }
    }

    /// Seed this source was built from
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }
}

impl NoiseSource for SeededNoise {
    fn noise2d(&self, x: f64, y: f64) -> f64 {
        self.simplex.get([x, y]).clamp(-1.0, 1.0)
    }

    fn uniform_int(&mut self, lo: i32, hi_inclusive: i32) -> i32 {
        self.rng.range_inclusive(lo, hi_inclusive)
    }

    fn uniform01(&mut self) -> f32 {
        self.rng.next_f32()
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        self.rng.shuffle(items);
    }
}
