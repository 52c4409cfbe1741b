//! Seedable normal generators for path simulation.
//!
//! Reproducibility is part of the pricing contract: the same seed must give the same
//! path set, which is what lets bump-and-reprice Greeks cancel sampling noise. Every
//! path draws from its own stream derived from `(seed, stream_index)`, so the path set
//! does not depend on how paths are scheduled across threads.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

use super::fast_norm::{inverse_normal_cdf, uniform_open01};

/// A seedable source of uniform and standard normal variates.
pub trait NormalSource: Send {
    /// Creates a generator whose output is fully determined by `seed`.
    fn with_seed(seed: u64) -> Self
    where
        Self: Sized;

    /// Uniform draw in [0, 1).
    fn next_f64(&mut self) -> f64;

    /// Standard normal draw.
    #[inline]
    fn next_standard_normal(&mut self) -> f64 {
        inverse_normal_cdf(uniform_open01(self.next_f64()))
    }

    /// Fills `out` with standard normal draws.
    fn fill_standard_normals(&mut self, out: &mut [f64]) {
        for z in out {
            *z = self.next_standard_normal();
        }
    }
}

/// Generator backend selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RngKind {
    /// xoshiro256++ with inverse-CDF normals.
    #[default]
    Xoshiro256PlusPlus,
    /// `rand`'s `StdRng` with ziggurat normals from `rand_distr`.
    StdRng,
}

/// xoshiro256++ generator seeded through SplitMix64.
#[derive(Debug, Clone)]
pub struct Xoshiro256PlusPlus {
    state: [u64; 4],
}

impl Xoshiro256PlusPlus {
    #[inline]
    pub fn seed_from_u64(seed: u64) -> Self {
        let mut sm = SplitMix64::new(seed);
        let mut state = [0_u64; 4];
        for item in &mut state {
            *item = sm.next_u64();
        }

        if state.iter().all(|&x| x == 0) {
            state[0] = 1;
        }

        Self { state }
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.state[0].wrapping_add(self.state[3]))
            .rotate_left(23)
            .wrapping_add(self.state[0]);

        let t = self.state[1] << 17;

        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];

        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);

        result
    }
}

impl NormalSource for Xoshiro256PlusPlus {
    #[inline]
    fn with_seed(seed: u64) -> Self {
        Self::seed_from_u64(seed)
    }

    #[inline]
    fn next_f64(&mut self) -> f64 {
        let x = self.next_u64() >> 11;
        x as f64 * (1.0 / ((1_u64 << 53) as f64))
    }
}

impl NormalSource for StdRng {
    #[inline]
    fn with_seed(seed: u64) -> Self {
        <StdRng as SeedableRng>::seed_from_u64(seed)
    }

    #[inline]
    fn next_f64(&mut self) -> f64 {
        self.random::<f64>()
    }

    #[inline]
    fn next_standard_normal(&mut self) -> f64 {
        StandardNormal.sample(self)
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    #[inline]
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

/// Seed of the `stream_index`-th independent stream under `base_seed`.
#[inline]
pub fn stream_seed(base_seed: u64, stream_index: usize) -> u64 {
    let mut sm = SplitMix64::new(base_seed ^ (stream_index as u64).wrapping_mul(0xD1B5_4A32_D192_ED03));
    sm.next_u64()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draws<R: NormalSource>(seed: u64, n: usize) -> Vec<f64> {
        let mut rng = R::with_seed(seed);
        (0..n).map(|_| rng.next_standard_normal()).collect()
    }

    #[test]
    fn same_seed_reproduces_sequence() {
        assert_eq!(draws::<Xoshiro256PlusPlus>(42, 256), draws::<Xoshiro256PlusPlus>(42, 256));
        assert_eq!(draws::<StdRng>(42, 256), draws::<StdRng>(42, 256));
    }

    #[test]
    fn different_seeds_diverge() {
        assert_ne!(draws::<Xoshiro256PlusPlus>(1, 16), draws::<Xoshiro256PlusPlus>(2, 16));
    }

    #[test]
    fn normals_have_unit_moments() {
        let z = draws::<Xoshiro256PlusPlus>(7, 200_000);
        let n = z.len() as f64;
        let mean = z.iter().sum::<f64>() / n;
        let var = z.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (n - 1.0);
        assert!(mean.abs() < 0.01, "mean={mean}");
        assert!((var - 1.0).abs() < 0.02, "var={var}");
    }

    #[test]
    fn stream_seeds_are_distinct_and_stable() {
        assert_eq!(stream_seed(42, 3), stream_seed(42, 3));
        assert_ne!(stream_seed(42, 3), stream_seed(42, 4));
        assert_ne!(stream_seed(42, 0), stream_seed(43, 0));
    }
}
