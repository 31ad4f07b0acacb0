//! Expectation step: responsibilities and log-likelihood.
//!
//! Unnormalized log weights `ln π_j + ln c_p(κ_j) + κ_j (μ_jᵀx_i)²` are
//! normalized per row with `log_sum_exp`, so rows whose linear-space sum
//! would underflow still normalize correctly.

use crate::density::WatsonKernel;
use crate::error::{Error, Result};
use crate::observations::Observations;
use crate::params::MixtureParams;
use nalgebra::DMatrix;
use wmm_math::{log_sum_exp, SeriesConfig};

/// Output of one expectation step.
#[derive(Debug, Clone)]
pub struct Expectation {
    /// N × k soft assignments; each row sums to 1.
    pub responsibilities: DMatrix<f64>,
    /// Σ_i ln Σ_j π_j f(x_i | μ_j, κ_j) under the parameters that were passed in.
    pub log_likelihood: f64,
}

/// Compute responsibilities of `params` for every observation.
///
/// Fails with [`Error::DegenerateResponsibility`] when an observation has
/// zero (or non-finite) likelihood under every component.
pub fn expectation_step(
    obs: &Observations<'_>,
    params: &MixtureParams,
    series: &SeriesConfig,
) -> Result<Expectation> {
    let n = obs.len();
    let k = params.k();

    let kernels = params
        .means
        .iter()
        .zip(&params.concentrations)
        .map(|(mu, &kappa)| WatsonKernel::new(mu, kappa, series))
        .collect::<Result<Vec<_>>>()?;
    let log_weights: Vec<f64> = params.weights.iter().map(|w| w.ln()).collect();

    let mut responsibilities = DMatrix::<f64>::zeros(n, k);
    let mut row = vec![0.0; k];
    let mut log_likelihood = 0.0;

    for (i, x) in obs.iter().enumerate() {
        for (j, slot) in row.iter_mut().enumerate() {
            *slot = log_weights[j] + kernels[j].log_density_at(x);
        }
        let log_total = log_sum_exp(&row);
        if !log_total.is_finite() {
            return Err(Error::DegenerateResponsibility { observation: i });
        }
        for (j, &lw) in row.iter().enumerate() {
            responsibilities[(i, j)] = (lw - log_total).exp();
        }
        log_likelihood += log_total;
    }

    Ok(Expectation {
        responsibilities,
        log_likelihood,
    })
}
