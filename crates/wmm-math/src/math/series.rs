//! Confluent hypergeometric (Kummer) series.
//!
//! Evaluates Kummer's function of the first kind
//!
//! ```text
//! M(a, b, κ) = Σ_{n=0}^∞ (a)_n / (b)_n · κ^n / n!
//! ```
//!
//! term-by-term: `term_0 = 1` and `term_n = term_{n-1} · (a+n-1)·κ / ((b+n-1)·n)`.
//! `M(1/2, p/2, κ)` is the normalizing denominator of the Watson density on
//! the (p-1)-sphere.
//!
//! Two evaluators are provided:
//! - [`kummer`] sums in linear space and stops once `|term| <= tolerance`.
//!   Intermediate terms grow roughly like `e^κ`, so it overflows for κ in the
//!   high hundreds and reports [`SeriesError::Overflow`].
//! - [`log_kummer`] sums the same terms in the log domain and returns
//!   `ln M(a, b, κ)`, which stays finite for any κ >= 0 that converges within
//!   the term budget.
//!
//! Both refuse to loop forever: exceeding `max_terms` yields
//! [`SeriesError::NonConvergence`].

use super::stable::log_add_exp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default absolute (linear) or relative (log-domain) stopping tolerance.
pub const SERIES_DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default hard cap on the number of non-constant terms.
pub const SERIES_DEFAULT_MAX_TERMS: usize = 100_000;

/// Stopping rules for the series evaluators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesConfig {
    /// Stop once the latest term drops to this size.
    pub tolerance: f64,
    /// Maximum number of non-constant terms before giving up.
    pub max_terms: usize,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            tolerance: SERIES_DEFAULT_TOLERANCE,
            max_terms: SERIES_DEFAULT_MAX_TERMS,
        }
    }
}

impl SeriesConfig {
    /// Config with a custom tolerance and the default term cap.
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }
}

/// Value of the linear-space series together with the number of
/// non-constant terms that were summed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KummerValue {
    pub value: f64,
    pub terms: usize,
}

/// Failures of the series evaluators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("invalid series argument: {0}")]
    InvalidArgument(String),

    #[error("series M({a}, {b}, {kappa}) did not converge within {terms} terms")]
    NonConvergence { a: f64, b: f64, kappa: f64, terms: usize },

    #[error("series M({a}, {b}, {kappa}) overflowed after {terms} terms")]
    Overflow { a: f64, b: f64, kappa: f64, terms: usize },
}

fn check_args(a: f64, b: f64, kappa: f64, config: &SeriesConfig) -> Result<(), SeriesError> {
    if !a.is_finite() || !b.is_finite() || !kappa.is_finite() {
        return Err(SeriesError::InvalidArgument(format!(
            "parameters must be finite, got a={}, b={}, kappa={}",
            a, b, kappa
        )));
    }
    if b <= 0.0 {
        return Err(SeriesError::InvalidArgument(format!(
            "b must be positive, got {}",
            b
        )));
    }
    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return Err(SeriesError::InvalidArgument(format!(
            "tolerance must be positive, got {}",
            config.tolerance
        )));
    }
    if config.max_terms == 0 {
        return Err(SeriesError::InvalidArgument(
            "max_terms must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Evaluate `M(a, b, κ)` by direct summation.
///
/// # Arguments
/// * `a` - Numerator Pochhammer parameter
/// * `b` - Denominator Pochhammer parameter (b > 0)
/// * `kappa` - Argument of the series (any finite value)
/// * `config` - Absolute stopping tolerance and term cap
///
/// # Returns
/// The series value and the count of non-constant terms summed. With
/// `kappa == 0` the value is exactly 1.
pub fn kummer(a: f64, b: f64, kappa: f64, config: &SeriesConfig) -> Result<KummerValue, SeriesError> {
    check_args(a, b, kappa, config)?;

    let mut ai = a;
    let mut bi = b;
    let mut term = ai * kappa / bi;
    let mut sum = 1.0 + term;
    let mut terms = 1usize;

    while term.abs() > config.tolerance {
        if terms >= config.max_terms {
            return Err(SeriesError::NonConvergence { a, b, kappa, terms });
        }
        terms += 1;
        ai += 1.0;
        bi += 1.0;
        term *= ai * kappa / bi / terms as f64;
        sum += term;
        if !sum.is_finite() || !term.is_finite() {
            return Err(SeriesError::Overflow { a, b, kappa, terms });
        }
    }

    Ok(KummerValue { value: sum, terms })
}

/// Evaluate `ln M(a, b, κ)` in the log domain.
///
/// Requires `a >= 0`, `b > 0` and `κ >= 0` so that every term is
/// non-negative. Summation stops once the terms have started shrinking and
/// the latest term is below `tolerance` relative to the running sum.
pub fn log_kummer(a: f64, b: f64, kappa: f64, config: &SeriesConfig) -> Result<f64, SeriesError> {
    check_args(a, b, kappa, config)?;
    if a < 0.0 || kappa < 0.0 {
        return Err(SeriesError::InvalidArgument(format!(
            "log-domain series needs a >= 0 and kappa >= 0, got a={}, kappa={}",
            a, kappa
        )));
    }
    if kappa == 0.0 || a == 0.0 {
        return Ok(0.0);
    }

    let log_kappa = kappa.ln();
    let log_tol = config.tolerance.ln();
    let mut log_term = 0.0_f64;
    let mut log_sum = 0.0_f64;

    for n in 1..=config.max_terms {
        let nf = n as f64;
        let log_ratio = (a + nf - 1.0).ln() + log_kappa - (b + nf - 1.0).ln() - nf.ln();
        log_term += log_ratio;
        log_sum = log_add_exp(log_sum, log_term);
        if !log_sum.is_finite() {
            return Err(SeriesError::Overflow {
                a,
                b,
                kappa,
                terms: n,
            });
        }
        if log_ratio < 0.0 && log_term - log_sum <= log_tol {
            return Ok(log_sum);
        }
    }

    Err(SeriesError::NonConvergence {
        a,
        b,
        kappa,
        terms: config.max_terms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return false;
        }
        (a - b).abs() <= tol
    }

    #[test]
    fn zero_kappa_is_exactly_one() {
        let out = kummer(0.5, 1.5, 0.0, &SeriesConfig::default()).unwrap();
        assert_eq!(out.value, 1.0);
        assert_eq!(out.terms, 1);
        assert_eq!(log_kummer(0.5, 1.5, 0.0, &SeriesConfig::default()).unwrap(), 0.0);
    }

    #[test]
    fn equal_parameters_give_exponential() {
        // M(a, a, κ) = e^κ
        let out = kummer(1.0, 1.0, 2.0, &SeriesConfig::default()).unwrap();
        assert!(approx_eq(out.value, 2.0f64.exp(), 1e-9));

        let neg = kummer(1.0, 1.0, -1.0, &SeriesConfig::default()).unwrap();
        assert!(approx_eq(neg.value, (-1.0f64).exp(), 1e-9));

        let log = log_kummer(1.0, 1.0, 50.0, &SeriesConfig::default()).unwrap();
        assert!(approx_eq(log, 50.0, 1e-8));
    }

    #[test]
    fn one_two_closed_form() {
        // M(1, 2, κ) = (e^κ - 1) / κ
        let kappa = 3.5;
        let out = kummer(1.0, 2.0, kappa, &SeriesConfig::default()).unwrap();
        let expected = (kappa.exp() - 1.0) / kappa;
        assert!(approx_eq(out.value, expected, 1e-9));
    }

    #[test]
    fn log_domain_agrees_with_linear() {
        let cfg = SeriesConfig::default();
        for kappa in [0.1, 1.0, 5.0, 20.0, 100.0, 300.0] {
            let linear = kummer(0.5, 1.5, kappa, &cfg).unwrap().value.ln();
            let log = log_kummer(0.5, 1.5, kappa, &cfg).unwrap();
            assert!(
                approx_eq(linear, log, 1e-8 * linear.abs().max(1.0)),
                "kappa={}: {} vs {}",
                kappa,
                linear,
                log
            );
        }
    }

    #[test]
    fn term_count_grows_with_kappa() {
        let cfg = SeriesConfig::default();
        let small = kummer(0.5, 1.5, 1.0, &cfg).unwrap();
        let large = kummer(0.5, 1.5, 100.0, &cfg).unwrap();
        assert!(large.terms > small.terms);
    }

    #[test]
    fn term_cap_reports_non_convergence() {
        let cfg = SeriesConfig {
            tolerance: 1e-10,
            max_terms: 5,
        };
        let err = kummer(0.5, 1.5, 100.0, &cfg).unwrap_err();
        assert!(matches!(err, SeriesError::NonConvergence { terms: 5, .. }));

        let err = log_kummer(0.5, 1.5, 100.0, &cfg).unwrap_err();
        assert!(matches!(err, SeriesError::NonConvergence { .. }));
    }

    #[test]
    fn linear_series_overflows_for_huge_kappa() {
        let err = kummer(0.5, 1.5, 2000.0, &SeriesConfig::default()).unwrap_err();
        assert!(matches!(err, SeriesError::Overflow { .. }));
    }

    #[test]
    fn log_series_handles_huge_kappa() {
        // Asymptotically ln M(a,b,κ) ≈ ln(Γ(b)/Γ(a)) + κ + (a-b) ln κ.
        let kappa: f64 = 2000.0;
        let out = log_kummer(0.5, 1.5, kappa, &SeriesConfig::default()).unwrap();
        let expected = 0.5f64.ln() + kappa - kappa.ln();
        assert!(approx_eq(out, expected, 1e-2), "{} vs {}", out, expected);
    }

    #[test]
    fn invalid_arguments_rejected() {
        let cfg = SeriesConfig::default();
        assert!(matches!(
            kummer(0.5, 0.0, 1.0, &cfg),
            Err(SeriesError::InvalidArgument(_))
        ));
        assert!(matches!(
            kummer(0.5, 1.5, f64::NAN, &cfg),
            Err(SeriesError::InvalidArgument(_))
        ));
        assert!(matches!(
            log_kummer(0.5, 1.5, -1.0, &cfg),
            Err(SeriesError::InvalidArgument(_))
        ));
        assert!(matches!(
            kummer(0.5, 1.5, 1.0, &SeriesConfig::with_tolerance(0.0)),
            Err(SeriesError::InvalidArgument(_))
        ));
    }
}
