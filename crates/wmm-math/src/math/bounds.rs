//! Closed-form concentration bounds for the Watson distribution.
//!
//! For a Watson component with shape parameters `a = 1/2`, `c = p/2` and
//! leading scatter eigenvalue `r`, the maximum-likelihood concentration κ
//! solves `M'(a, c, κ) / M(a, c, κ) = r`. Sra & Karp (2013) bracket the
//! solution with three algebraic approximations:
//!
//! ```text
//! L(r) = (rc - a) / (r(1-r)) · (1 + (1-r)/(c-a))
//! B(r) = (rc - a) / (2r(1-r)) · (1 + sqrt(1 + 4(c+1)r(1-r) / (a(c-a))))
//! U(r) = (rc - a) / (r(1-r)) · (1 + r/a)
//! ```
//!
//! with `L <= B <= U` whenever `a/c < r < 1` and `0 < a < c`. All three
//! blow up as `r -> 1`, so callers clamp `r` first (see [`clamp_ratio`]).

use serde::{Deserialize, Serialize};

/// Eigenvalue ratios above this are treated as degenerate.
pub const RATIO_CLAMP_THRESHOLD: f64 = 0.999;

/// Replacement ratio used when the threshold is exceeded.
pub const RATIO_CLAMP_VALUE: f64 = 0.99;

/// Lower bound on the concentration estimate.
pub fn lower_bound(a: f64, c: f64, r: f64) -> f64 {
    (r * c - a) / (r * (1.0 - r)) * (1.0 + (1.0 - r) / (c - a))
}

/// Central (tightest) concentration estimate.
pub fn central_bound(a: f64, c: f64, r: f64) -> f64 {
    let disc = 1.0 + (4.0 * (c + 1.0) * r * (1.0 - r)) / (a * (c - a));
    (r * c - a) / (2.0 * r * (1.0 - r)) * (1.0 + disc.sqrt())
}

/// Upper bound on the concentration estimate.
pub fn upper_bound(a: f64, c: f64, r: f64) -> f64 {
    (r * c - a) / (r * (1.0 - r)) * (1.0 + r / a)
}

/// Replace ratios above [`RATIO_CLAMP_THRESHOLD`] with [`RATIO_CLAMP_VALUE`].
///
/// Ratios in `(0.99, 0.999]` pass through unchanged.
pub fn clamp_ratio(r: f64) -> f64 {
    if r > RATIO_CLAMP_THRESHOLD {
        RATIO_CLAMP_VALUE
    } else {
        r
    }
}

/// (lower, central, upper) concentration estimates for one component.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundTriple {
    pub lower: f64,
    pub central: f64,
    pub upper: f64,
}

impl BoundTriple {
    /// Evaluate all three bounds for general shape parameters.
    pub fn estimate(a: f64, c: f64, r: f64) -> Self {
        Self {
            lower: lower_bound(a, c, r),
            central: central_bound(a, c, r),
            upper: upper_bound(a, c, r),
        }
    }

    /// Watson bounds in dimension `p` (`a = 1/2`, `c = p/2`).
    ///
    /// `r` is used as given; apply [`clamp_ratio`] beforehand.
    pub fn watson(p: usize, r: f64) -> Self {
        Self::estimate(0.5, p as f64 / 2.0, r)
    }

    /// Whether `lower <= central <= upper` within `tol`.
    pub fn is_ordered(&self, tol: f64) -> bool {
        self.lower <= self.central + tol && self.central <= self.upper + tol
    }

    /// Move each bound toward `target` by `factor` (0 = unchanged, 1 = target).
    pub fn shrink_toward(&self, target: &BoundTriple, factor: f64) -> Self {
        Self {
            lower: self.lower + factor * (target.lower - self.lower),
            central: self.central + factor * (target.central - self.central),
            upper: self.upper + factor * (target.upper - self.upper),
        }
    }

    /// Element-wise mean of a set of triples. Returns None for an empty slice.
    pub fn mean_of(triples: &[BoundTriple]) -> Option<Self> {
        if triples.is_empty() {
            return None;
        }
        let n = triples.len() as f64;
        let sum = triples.iter().fold(BoundTriple::default(), |acc, t| BoundTriple {
            lower: acc.lower + t.lower,
            central: acc.central + t.central,
            upper: acc.upper + t.upper,
        });
        Some(Self {
            lower: sum.lower / n,
            central: sum.central / n,
            upper: sum.upper / n,
        })
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.lower, self.central, self.upper]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn known_values_in_three_dimensions() {
        // p = 3, r = 0.5: prefactor is exactly 1.
        let t = BoundTriple::watson(3, 0.5);
        assert!(approx_eq(t.lower, 1.5, 1e-12));
        assert!(approx_eq(t.central, (1.0 + 6.0f64.sqrt()) / 2.0, 1e-12));
        assert!(approx_eq(t.upper, 2.0, 1e-12));
    }

    #[test]
    fn uniform_scatter_gives_zero_concentration() {
        // r = 1/p is the isotropic case.
        let t = BoundTriple::watson(4, 0.25);
        assert!(approx_eq(t.lower, 0.0, 1e-12));
        assert!(approx_eq(t.central, 0.0, 1e-12));
        assert!(approx_eq(t.upper, 0.0, 1e-12));
    }

    #[test]
    fn bounds_are_ordered() {
        for p in 2..20 {
            let lo = 1.0 / p as f64;
            for step in 1..50 {
                let r = lo + (0.99 - lo) * step as f64 / 50.0;
                let t = BoundTriple::watson(p, r);
                assert!(t.is_ordered(1e-9), "p={} r={} {:?}", p, r, t);
            }
        }
    }

    #[test]
    fn bounds_grow_with_ratio() {
        let a = BoundTriple::watson(3, 0.6);
        let b = BoundTriple::watson(3, 0.9);
        assert!(b.central > a.central);
    }

    #[test]
    fn clamp_ratio_policy() {
        assert_eq!(clamp_ratio(0.5), 0.5);
        assert_eq!(clamp_ratio(0.995), 0.995);
        assert_eq!(clamp_ratio(0.999), 0.999);
        assert_eq!(clamp_ratio(0.9995), RATIO_CLAMP_VALUE);
        assert_eq!(clamp_ratio(1.0), RATIO_CLAMP_VALUE);
    }

    #[test]
    fn shrink_and_mean() {
        let a = BoundTriple {
            lower: 1.0,
            central: 2.0,
            upper: 3.0,
        };
        let b = BoundTriple {
            lower: 3.0,
            central: 4.0,
            upper: 5.0,
        };
        let mean = BoundTriple::mean_of(&[a, b]).unwrap();
        assert_eq!(mean.as_array(), [2.0, 3.0, 4.0]);

        assert_eq!(a.shrink_toward(&mean, 0.0), a);
        assert_eq!(a.shrink_toward(&mean, 1.0), mean);
        let half = a.shrink_toward(&mean, 0.5);
        assert!(approx_eq(half.central, 2.5, 1e-12));

        assert!(BoundTriple::mean_of(&[]).is_none());
    }
}
