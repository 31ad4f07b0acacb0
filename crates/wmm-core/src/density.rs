//! Watson density on the unit (p-1)-sphere.
//!
//! For a unit mean axis μ and concentration κ >= 0:
//!
//! ```text
//! f(x | μ, κ) = c_p(κ) · exp(κ (μᵀx)²)
//! c_p(κ)      = Γ(p/2) / (2 π^(p/2) · M(1/2, p/2, κ))
//! ```
//!
//! The density depends on x only through (μᵀx)², so x and -x are equally
//! likely. Normalizing constants are computed in the log domain via
//! [`wmm_math::log_kummer`] so that tight components do not overflow.

use crate::error::{Error, Result};
use crate::observations::Observations;
use crate::params::PARAM_TOLERANCE;
use crate::vector::{dot, norm};
use wmm_math::{kummer, log_gamma, log_kummer, log_sphere_area, SeriesConfig};

/// Log of the normalizing constant `ln c_p(κ)`.
pub fn log_normalizer(p: usize, kappa: f64, series: &SeriesConfig) -> Result<f64> {
    check_kappa(kappa)?;
    if p == 0 {
        return Err(Error::invalid_parameter("p", "dimension must be >= 1"));
    }
    let log_m = log_kummer(0.5, p as f64 / 2.0, kappa, series)?;
    Ok(-log_sphere_area(p) - log_m)
}

/// Normalizing constant `c_p(κ)` evaluated with the linear-space series.
///
/// Overflows (as a [`wmm_math::SeriesError::Overflow`]) for very large κ;
/// prefer [`log_normalizer`] inside iterative code.
pub fn normalizer(p: usize, kappa: f64, series: &SeriesConfig) -> Result<f64> {
    check_kappa(kappa)?;
    if p == 0 {
        return Err(Error::invalid_parameter("p", "dimension must be >= 1"));
    }
    let half = p as f64 / 2.0;
    let m = kummer(0.5, half, kappa, series)?;
    let gamma_half = log_gamma(half).exp();
    Ok(gamma_half / (2.0 * std::f64::consts::PI.powf(half) * m.value))
}

fn check_kappa(kappa: f64) -> Result<()> {
    if !kappa.is_finite() || kappa < 0.0 {
        return Err(Error::invalid_parameter(
            "concentration",
            format!("must be finite and >= 0, got {}", kappa),
        ));
    }
    Ok(())
}

fn check_mean(mean: &[f64], p: usize) -> Result<()> {
    if mean.len() != p {
        return Err(Error::DimensionMismatch {
            expected: p,
            got: mean.len(),
        });
    }
    let n = norm(mean);
    if !n.is_finite() || (n - 1.0).abs() > PARAM_TOLERANCE {
        return Err(Error::invalid_parameter(
            "mean",
            format!("mean direction must have unit norm, got {}", n),
        ));
    }
    Ok(())
}

/// One Watson component with its normalizing constant precomputed.
#[derive(Debug, Clone, Copy)]
pub struct WatsonKernel<'a> {
    mean: &'a [f64],
    kappa: f64,
    log_norm: f64,
}

impl<'a> WatsonKernel<'a> {
    pub fn new(mean: &'a [f64], kappa: f64, series: &SeriesConfig) -> Result<Self> {
        let log_norm = log_normalizer(mean.len(), kappa, series)?;
        Ok(Self {
            mean,
            kappa,
            log_norm,
        })
    }

    /// `ln f(x | μ, κ)`.
    #[inline]
    pub fn log_density_at(&self, x: &[f64]) -> f64 {
        let t = dot(self.mean, x);
        self.log_norm + self.kappa * t * t
    }

    pub fn log_norm(&self) -> f64 {
        self.log_norm
    }
}

/// Per-point log density of a single component.
///
/// An empty batch yields an empty vector once `mean` and `kappa` are valid.
pub fn log_density(points: &[Vec<f64>], mean: &[f64], kappa: f64) -> Result<Vec<f64>> {
    if points.is_empty() {
        check_kappa(kappa)?;
        check_mean(mean, mean.len())?;
        return Ok(Vec::new());
    }
    let obs = Observations::new(points)?;
    check_mean(mean, obs.dim())?;
    let kernel = WatsonKernel::new(mean, kappa, &SeriesConfig::default())?;
    Ok(obs.iter().map(|x| kernel.log_density_at(x)).collect())
}

/// Per-point density of a single component.
pub fn density(points: &[Vec<f64>], mean: &[f64], kappa: f64) -> Result<Vec<f64>> {
    Ok(log_density(points, mean, kappa)?
        .into_iter()
        .map(f64::exp)
        .collect())
}

/// Per-point mixture density `Σ_j w_j f(x | μ_j, κ_j)`.
///
/// Components are accumulated in order, so the result equals the explicit
/// weighted sum of [`density`] calls.
pub fn mixture_density(
    points: &[Vec<f64>],
    means: &[Vec<f64>],
    concentrations: &[f64],
    weights: &[f64],
) -> Result<Vec<f64>> {
    let k = means.len();
    if k == 0 {
        return Err(Error::InvalidComponentCount(0));
    }
    if concentrations.len() != k || weights.len() != k {
        return Err(Error::invalid_parameter(
            "mixture",
            format!(
                "means, concentrations, and weights must have equal length, got {}, {}, {}",
                k,
                concentrations.len(),
                weights.len()
            ),
        ));
    }
    if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(Error::invalid_parameter(
            "weights",
            format!("must be finite and >= 0, got {}", w),
        ));
    }

    let mut total = vec![0.0; points.len()];
    for ((mean, &kappa), &weight) in means.iter().zip(concentrations).zip(weights) {
        let component = density(points, mean, kappa)?;
        for (acc, d) in total.iter_mut().zip(component) {
            *acc += weight * d;
        }
    }
    Ok(total)
}
