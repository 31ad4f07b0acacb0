//! Starting parameters for the EM engine.
//!
//! Randomness always flows through a caller-owned RNG; [`seeded_rng`] builds
//! one per fit so repeated or concurrent fits never share generator state.

use crate::config::InitStrategy;
use crate::error::{Error, Result};
use crate::params::MixtureParams;
use crate::vector::normalize_in_place;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use std::f64::consts::PI;

/// RNG for one fit: seeded when a seed is given, OS entropy otherwise.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

/// Produce starting parameters for `k` components in dimension `p`.
pub fn initialize<R: Rng + ?Sized>(
    strategy: &InitStrategy,
    k: usize,
    p: usize,
    rng: &mut R,
) -> Result<MixtureParams> {
    if k == 0 {
        return Err(Error::InvalidComponentCount(k));
    }
    match strategy {
        InitStrategy::Explicit(params) => explicit_init(params, k, p),
        InitStrategy::Spiral => spiral_init(k, p),
        InitStrategy::Random => Ok(random_init(k, p, rng)),
        InitStrategy::Auto if p == 3 => spiral_init(k, p),
        InitStrategy::Auto => Ok(random_init(k, p, rng)),
    }
}

fn explicit_init(params: &MixtureParams, k: usize, p: usize) -> Result<MixtureParams> {
    if params.k() != k {
        return Err(Error::invalid_parameter(
            "init",
            format!("explicit parameters have {} components, expected {}", params.k(), k),
        ));
    }
    for mu in &params.means {
        if mu.len() != p {
            return Err(Error::DimensionMismatch {
                expected: p,
                got: mu.len(),
            });
        }
    }
    let out = params.normalized()?;
    out.validate(p)?;
    Ok(out)
}

fn spiral_init(k: usize, p: usize) -> Result<MixtureParams> {
    if p != 3 {
        return Err(Error::SpiralRequiresThreeDimensions { dim: p });
    }
    Ok(with_flat_start(golden_spiral_directions(k)))
}

/// Random axes with unit concentrations and uniform weights.
pub fn random_init<R: Rng + ?Sized>(k: usize, p: usize, rng: &mut R) -> MixtureParams {
    with_flat_start(random_directions(k, p, rng))
}

/// `k` isotropic random unit vectors in dimension `p`.
///
/// Each axis is a standard normal draw scaled to unit length.
pub fn random_directions<R: Rng + ?Sized>(k: usize, p: usize, rng: &mut R) -> Vec<Vec<f64>> {
    let mut directions = Vec::with_capacity(k);
    while directions.len() < k {
        let mut v = Vec::with_capacity(p);
        for _ in 0..p {
            let z: f64 = StandardNormal.sample(rng);
            v.push(z);
        }
        // A zero draw has no direction; draw again.
        if normalize_in_place(&mut v) > 0.0 {
            directions.push(v);
        }
    }
    directions
}

/// `k` unit vectors on S² from the golden-spiral construction.
///
/// Direction `i` has polar angle `acos(1 - 2(i + 1/2)/k)` and azimuth
/// `π(1 + √5)(i + 1/2)`.
pub fn golden_spiral_directions(k: usize) -> Vec<Vec<f64>> {
    let golden_turn = PI * (1.0 + 5.0f64.sqrt());
    (0..k)
        .map(|i| {
            let idx = i as f64 + 0.5;
            let phi = (1.0 - 2.0 * idx / k as f64).acos();
            let theta = golden_turn * idx;
            vec![theta.cos() * phi.sin(), theta.sin() * phi.sin(), phi.cos()]
        })
        .collect()
}

fn with_flat_start(means: Vec<Vec<f64>>) -> MixtureParams {
    let k = means.len();
    MixtureParams {
        means,
        concentrations: vec![1.0; k],
        weights: vec![1.0 / k as f64; k],
    }
}
