//! Mixture parameters: mean axes, concentrations, and mixing weights.

use crate::density;
use crate::error::{Error, Result};
use crate::vector::{norm, normalize_in_place};
use serde::{Deserialize, Serialize};

/// Tolerance for the unit-norm and weight-sum invariants.
pub const PARAM_TOLERANCE: f64 = 1e-6;

/// Parameters of a k-component Watson mixture.
///
/// `means[j]` is a unit axis (±μ describe the same component),
/// `concentrations[j] >= 0`, and `weights` sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixtureParams {
    pub means: Vec<Vec<f64>>,
    pub concentrations: Vec<f64>,
    pub weights: Vec<f64>,
}

impl MixtureParams {
    /// Build parameters, normalizing each mean to unit length.
    ///
    /// Fails if the three sequences disagree in length, a mean is zero or
    /// ragged, a concentration is negative, or the weights are not a
    /// probability vector.
    pub fn new(means: Vec<Vec<f64>>, concentrations: Vec<f64>, weights: Vec<f64>) -> Result<Self> {
        let params = Self {
            means,
            concentrations,
            weights,
        }
        .normalized()?;
        params.validate(params.dim())?;
        Ok(params)
    }

    /// Number of components k.
    pub fn k(&self) -> usize {
        self.means.len()
    }

    /// Dimensionality of the mean axes (0 when there are no components).
    pub fn dim(&self) -> usize {
        self.means.first().map_or(0, Vec::len)
    }

    /// Copy with every mean scaled to unit length.
    pub fn normalized(&self) -> Result<Self> {
        let mut out = self.clone();
        for (j, mu) in out.means.iter_mut().enumerate() {
            let n = normalize_in_place(mu);
            if n == 0.0 || !n.is_finite() {
                return Err(Error::invalid_parameter(
                    format!("means[{}]", j),
                    format!("mean direction must be a finite non-zero vector, norm {}", n),
                ));
            }
        }
        Ok(out)
    }

    /// Check every invariant against observation dimensionality `p`.
    pub fn validate(&self, p: usize) -> Result<()> {
        let k = self.k();
        if k == 0 {
            return Err(Error::InvalidComponentCount(0));
        }
        if self.concentrations.len() != k {
            return Err(Error::invalid_parameter(
                "concentrations",
                format!("expected {} values, got {}", k, self.concentrations.len()),
            ));
        }
        if self.weights.len() != k {
            return Err(Error::invalid_parameter(
                "weights",
                format!("expected {} values, got {}", k, self.weights.len()),
            ));
        }

        for (j, mu) in self.means.iter().enumerate() {
            if mu.len() != p {
                return Err(Error::DimensionMismatch {
                    expected: p,
                    got: mu.len(),
                });
            }
            let n = norm(mu);
            if !n.is_finite() || (n - 1.0).abs() > PARAM_TOLERANCE {
                return Err(Error::invalid_parameter(
                    format!("means[{}]", j),
                    format!("mean direction must have unit norm, got {}", n),
                ));
            }
        }

        for (j, &kappa) in self.concentrations.iter().enumerate() {
            if !kappa.is_finite() || kappa < 0.0 {
                return Err(Error::invalid_parameter(
                    format!("concentrations[{}]", j),
                    format!("must be finite and >= 0, got {}", kappa),
                ));
            }
        }

        for (j, &w) in self.weights.iter().enumerate() {
            if !w.is_finite() || w < 0.0 {
                return Err(Error::invalid_parameter(
                    format!("weights[{}]", j),
                    format!("must be finite and >= 0, got {}", w),
                ));
            }
        }
        let sum = self.weight_sum();
        if (sum - 1.0).abs() > PARAM_TOLERANCE {
            return Err(Error::invalid_parameter(
                "weights",
                format!("must sum to 1, got {}", sum),
            ));
        }

        Ok(())
    }

    pub fn weight_sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Mixture density at each point.
    pub fn density(&self, points: &[Vec<f64>]) -> Result<Vec<f64>> {
        density::mixture_density(points, &self.means, &self.concentrations, &self.weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalizes_means() {
        let params = MixtureParams::new(
            vec![vec![2.0, 0.0, 0.0], vec![0.0, 3.0, 4.0]],
            vec![1.0, 2.0],
            vec![0.25, 0.75],
        )
        .unwrap();
        assert_eq!(params.k(), 2);
        assert_eq!(params.dim(), 3);
        assert_eq!(params.means[0], vec![1.0, 0.0, 0.0]);
        assert!((params.means[1][2] - 0.8).abs() < 1e-15);
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = MixtureParams::new(vec![vec![1.0, 0.0]], vec![1.0, 1.0], vec![1.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[test]
    fn rejects_zero_mean_and_bad_weights() {
        assert!(MixtureParams::new(vec![vec![0.0, 0.0]], vec![1.0], vec![1.0]).is_err());
        assert!(MixtureParams::new(vec![vec![1.0, 0.0]], vec![1.0], vec![0.5]).is_err());
        assert!(MixtureParams::new(vec![vec![1.0, 0.0]], vec![-1.0], vec![1.0]).is_err());
    }

    #[test]
    fn validate_checks_dimension() {
        let params = MixtureParams::new(vec![vec![1.0, 0.0]], vec![1.0], vec![1.0]).unwrap();
        assert!(params.validate(2).is_ok());
        assert!(matches!(
            params.validate(3),
            Err(Error::DimensionMismatch {
                expected: 3,
                got: 2
            })
        ));
    }

    #[test]
    fn empty_params_rejected() {
        let err = MixtureParams::new(vec![], vec![], vec![]).unwrap_err();
        assert!(matches!(err, Error::InvalidComponentCount(0)));
    }
}
