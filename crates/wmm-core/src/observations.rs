//! Borrowed, validated view over the caller's observation set.

use crate::error::{Error, Result};
use crate::vector::norm;

/// N points of common dimension p, borrowed read-only from the caller.
#[derive(Debug, Clone, Copy)]
pub struct Observations<'a> {
    points: &'a [Vec<f64>],
    dim: usize,
}

impl<'a> Observations<'a> {
    /// Validate shape and finiteness.
    ///
    /// Rejects an empty set, zero-dimensional points, ragged rows, and
    /// non-finite coordinates.
    pub fn new(points: &'a [Vec<f64>]) -> Result<Self> {
        let first = points.first().ok_or(Error::EmptyObservations)?;
        let dim = first.len();
        if dim == 0 {
            return Err(Error::invalid_parameter(
                "points",
                "observations must have dimension >= 1",
            ));
        }
        for (index, x) in points.iter().enumerate() {
            if x.len() != dim {
                return Err(Error::InconsistentDimension {
                    index,
                    expected: dim,
                    got: x.len(),
                });
            }
            if x.iter().any(|v| !v.is_finite()) {
                return Err(Error::NonUnitPoint {
                    index,
                    norm: f64::NAN,
                });
            }
        }
        Ok(Self { points, dim })
    }

    /// Like [`Observations::new`], additionally requiring `| |x| - 1 | <= tol`
    /// for every point.
    pub fn on_sphere(points: &'a [Vec<f64>], tol: f64) -> Result<Self> {
        let obs = Self::new(points)?;
        for (index, x) in points.iter().enumerate() {
            let n = norm(x);
            if (n - 1.0).abs() > tol {
                return Err(Error::NonUnitPoint { index, norm: n });
            }
        }
        Ok(obs)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Dimensionality p.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn points(&self) -> &'a [Vec<f64>] {
        self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'a, Vec<f64>> {
        self.points.iter()
    }
}
