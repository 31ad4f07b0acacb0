//! Maximization step: mixing weights, mean axes, and concentrations.
//!
//! For each component j:
//!
//! ```text
//! π_j = (1/N) Σ_i β_ij
//! S_j = Σ_i β_ij x_i x_iᵀ / Σ_i β_ij
//! μ_j = leading eigenvector of S_j,  r_j = leading eigenvalue
//! κ_j = central bound B(1/2, p/2, r_j)
//! ```
//!
//! Bounds may be shrunk toward their across-component mean before κ is
//! read off; that shrinkage needs every component's bounds first.

use crate::error::{Error, Result};
use crate::observations::Observations;
use crate::params::MixtureParams;
use crate::vector::view;
use nalgebra::{DMatrix, SymmetricEigen};
use tracing::debug;
use wmm_math::{clamp_ratio, BoundTriple};

const EIGEN_EPS: f64 = f64::EPSILON;
const EIGEN_MAX_SWEEPS: usize = 1_000;

/// Output of one maximization step.
#[derive(Debug, Clone)]
pub struct Maximization {
    pub params: MixtureParams,
    /// Per-component bounds after regularization.
    pub bounds: Vec<BoundTriple>,
}

/// Re-estimate all parameters from a responsibility matrix.
///
/// `regularization` is the shrinkage factor γ in [0, 1].
pub fn maximization_step(
    obs: &Observations<'_>,
    responsibilities: &DMatrix<f64>,
    regularization: f64,
) -> Result<Maximization> {
    let n = obs.len() as f64;
    let p = obs.dim();
    let k = responsibilities.ncols();

    let mut means = Vec::with_capacity(k);
    let mut weights = Vec::with_capacity(k);
    let mut bounds = Vec::with_capacity(k);

    for j in 0..k {
        let column: Vec<f64> = responsibilities.column(j).iter().copied().collect();
        let mass: f64 = column.iter().sum();
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::DegenerateComponent { component: j });
        }
        weights.push(mass / n);

        let scatter = scatter_matrix(obs, &column, mass);
        let (axis, r) = principal_axis(scatter, j)?;
        let ratio = clamp_ratio(r);
        if ratio != r {
            debug!(component = j, raw = r, clamped = ratio, "clamped eigenvalue ratio");
        }
        means.push(axis);
        bounds.push(BoundTriple::watson(p, ratio));
    }

    regularize(&mut bounds, regularization);

    let concentrations = bounds
        .iter()
        .enumerate()
        .map(|(j, b)| {
            if b.central < 0.0 {
                debug!(component = j, central = b.central, "negative concentration floored at 0");
            }
            b.central.max(0.0)
        })
        .collect();

    Ok(Maximization {
        params: MixtureParams {
            means,
            concentrations,
            weights,
        },
        bounds,
    })
}

/// Weighted scatter matrix `Σ_i w_i x_i x_iᵀ / mass`.
pub fn scatter_matrix(obs: &Observations<'_>, weights: &[f64], mass: f64) -> DMatrix<f64> {
    let p = obs.dim();
    let mut s = DMatrix::<f64>::zeros(p, p);
    for (x, &w) in obs.iter().zip(weights) {
        if w == 0.0 {
            continue;
        }
        let x = view(x);
        // Rank-one update of the lower triangle only.
        s.syger(w / mass, &x, &x, 1.0);
    }
    s.fill_upper_triangle_with_lower_triangle();
    s
}

/// Unit eigenvector and eigenvalue of the largest eigenvalue of a
/// symmetric matrix. The sign of the axis is arbitrary.
fn principal_axis(scatter: DMatrix<f64>, component: usize) -> Result<(Vec<f64>, f64)> {
    if scatter.iter().any(|v| !v.is_finite()) {
        return Err(Error::EigenDecomposition {
            component,
            message: "scatter matrix has non-finite entries".to_string(),
        });
    }
    let eigen = SymmetricEigen::try_new(scatter, EIGEN_EPS, EIGEN_MAX_SWEEPS).ok_or_else(|| {
        Error::EigenDecomposition {
            component,
            message: format!("no convergence within {} sweeps", EIGEN_MAX_SWEEPS),
        }
    })?;

    let (idx, lambda) = eigen.eigenvalues.argmax();
    let column = eigen.eigenvectors.column(idx);
    let len = column.norm();
    if !lambda.is_finite() || len == 0.0 || !len.is_finite() {
        return Err(Error::EigenDecomposition {
            component,
            message: format!("degenerate leading eigenpair (eigenvalue {})", lambda),
        });
    }
    let axis = column.unscale(len).iter().copied().collect();
    Ok((axis, lambda))
}

/// Shrink each bound toward the across-component mean by `gamma`.
pub fn regularize(bounds: &mut [BoundTriple], gamma: f64) {
    if gamma == 0.0 {
        return;
    }
    if let Some(mean) = BoundTriple::mean_of(bounds) {
        debug!(gamma, central_mean = mean.central, "regularizing concentration bounds");
        for b in bounds.iter_mut() {
            *b = b.shrink_toward(&mean, gamma);
        }
    }
}
