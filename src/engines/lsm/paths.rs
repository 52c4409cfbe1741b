//! Risk-neutral GBM path sets.
//!
//! Paths are stored row-major in one flat buffer, `spots[path * stride + step]`, with
//! `stride = num_steps + 1`. Each path (or antithetic pair) draws from its own
//! generator stream so the set is identical whether rows are filled serially or with
//! the `parallel` feature.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::math::NormalSource;
use crate::math::rng::stream_seed;

/// Simulation inputs for a log-Euler GBM path set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GbmSpec {
    /// Initial spot.
    pub spot: f64,
    /// Risk-neutral carry `b` (drift of `S` is `b S`).
    pub carry: f64,
    /// Volatility.
    pub vol: f64,
    /// Horizon in years.
    pub maturity: f64,
    /// Number of time increments.
    pub num_steps: usize,
}

/// `num_paths` trajectories of `num_steps + 1` spots each, starting at the initial spot.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedPathSet {
    num_paths: usize,
    stride: usize,
    spots: Vec<f64>,
}

impl SimulatedPathSet {
    /// Simulates `num_paths` paths. With `antithetic`, the count is rounded up to even
    /// and paths `2k`/`2k+1` use mirrored normals.
    pub fn simulate<R: NormalSource>(
        spec: &GbmSpec,
        num_paths: usize,
        seed: u64,
        antithetic: bool,
    ) -> Self {
        let group = if antithetic { 2 } else { 1 };
        let num_paths = num_paths.div_ceil(group) * group;
        let stride = spec.num_steps + 1;
        let mut spots = vec![0.0_f64; num_paths * stride];

        let dt = spec.maturity / spec.num_steps as f64;
        let drift = (spec.carry - 0.5 * spec.vol * spec.vol) * dt;
        let step_vol = spec.vol * dt.sqrt();

        let fill = |stream: usize, rows: &mut [f64]| {
            let mut rng = R::with_seed(stream_seed(seed, stream));
            let mut normals = vec![0.0_f64; spec.num_steps];
            rng.fill_standard_normals(&mut normals);
            for (k, row) in rows.chunks_exact_mut(stride).enumerate() {
                let sign = if k == 0 { 1.0 } else { -1.0 };
                row[0] = spec.spot;
                for ti in 1..stride {
                    row[ti] = row[ti - 1] * step_vol.mul_add(sign * normals[ti - 1], drift).exp();
                }
            }
        };

        #[cfg(feature = "parallel")]
        spots
            .par_chunks_mut(stride * group)
            .enumerate()
            .for_each(|(stream, rows)| fill(stream, rows));
        #[cfg(not(feature = "parallel"))]
        spots
            .chunks_mut(stride * group)
            .enumerate()
            .for_each(|(stream, rows)| fill(stream, rows));

        Self {
            num_paths,
            stride,
            spots,
        }
    }

    #[inline]
    pub fn num_paths(&self) -> usize {
        self.num_paths
    }

    #[inline]
    pub fn num_steps(&self) -> usize {
        self.stride - 1
    }

    /// Spot of `path` at time index `step`.
    #[inline]
    pub fn spot(&self, path: usize, step: usize) -> f64 {
        self.spots[path * self.stride + step]
    }

    /// Whole trajectory of `path`.
    #[inline]
    pub fn path(&self, path: usize) -> &[f64] {
        &self.spots[path * self.stride..(path + 1) * self.stride]
    }

    /// Terminal spots, one per path.
    pub fn terminal_spots(&self) -> impl Iterator<Item = f64> + '_ {
        self.spots
            .chunks_exact(self.stride)
            .map(|row| row[self.stride - 1])
    }
}
