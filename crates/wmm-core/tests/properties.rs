//! Property-based tests for density and EM invariants.

use proptest::prelude::*;
use wmm_core::em::{expectation_step, relative_change, ConvergenceMonitor, EmState};
use wmm_core::{density, log_density, mixture_density, MixtureParams, Observations, SeriesConfig};

fn unit(v: &[f64]) -> Vec<f64> {
    let n = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    v.iter().map(|x| x / n).collect()
}

/// Non-degenerate 3-vector, normalized.
fn direction() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1.0..1.0f64, 3)
        .prop_filter("non-zero", |v| v.iter().map(|x| x * x).sum::<f64>() > 1e-3)
        .prop_map(|v| unit(&v))
}

fn points(max: usize) -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(direction(), 1..max)
}

/// Orthogonal unit vector to `mu` (3-D only).
fn orthogonal(mu: &[f64]) -> Vec<f64> {
    let helper = if mu[0].abs() < 0.9 {
        [1.0, 0.0, 0.0]
    } else {
        [0.0, 1.0, 0.0]
    };
    let cross = [
        mu[1] * helper[2] - mu[2] * helper[1],
        mu[2] * helper[0] - mu[0] * helper[2],
        mu[0] * helper[1] - mu[1] * helper[0],
    ];
    unit(&cross)
}

// ============================================================================
// Density properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Mixture density is exactly the in-order weighted sum of component densities.
    #[test]
    fn mixture_equals_weighted_sum(
        pts in points(12),
        means in prop::collection::vec(direction(), 1..4),
        raw in prop::collection::vec((0.0..50.0f64, 0.05..1.0f64), 3),
    ) {
        let k = means.len();
        let kappas: Vec<f64> = raw.iter().take(k).map(|r| r.0).collect();
        let total: f64 = raw.iter().take(k).map(|r| r.1).sum();
        let weights: Vec<f64> = raw.iter().take(k).map(|r| r.1 / total).collect();

        let mix = mixture_density(&pts, &means, &kappas, &weights).unwrap();
        let mut expected = vec![0.0; pts.len()];
        for j in 0..k {
            let d = density(&pts, &means[j], kappas[j]).unwrap();
            for (e, v) in expected.iter_mut().zip(d) {
                *e += weights[j] * v;
            }
        }
        prop_assert_eq!(mix, expected);
    }

    /// Density is axially symmetric and peaks on the mean axis.
    #[test]
    fn density_peaks_on_axis(mu in direction(), kappa in 0.01..500.0f64) {
        let ortho = orthogonal(&mu);
        let neg: Vec<f64> = mu.iter().map(|x| -x).collect();
        let d = density(&[mu.clone(), neg, ortho], &mu, kappa).unwrap();
        prop_assert_eq!(d[0], d[1]);
        prop_assert!(d[0] > d[2]);
    }

    /// log_density and density agree.
    #[test]
    fn log_density_matches_density(pts in points(8), mu in direction(), kappa in 0.0..100.0f64) {
        let lin = density(&pts, &mu, kappa).unwrap();
        let log = log_density(&pts, &mu, kappa).unwrap();
        for (a, b) in lin.iter().zip(&log) {
            prop_assert!((a.ln() - b).abs() < 1e-9);
        }
    }

    /// Responsibilities form a probability vector per observation.
    #[test]
    fn responsibilities_are_stochastic(
        pts in points(20),
        means in prop::collection::vec(direction(), 1..5),
        kappa in 0.0..300.0f64,
    ) {
        let k = means.len();
        let params = MixtureParams::new(means, vec![kappa; k], vec![1.0 / k as f64; k]).unwrap();
        let obs = Observations::new(&pts).unwrap();
        let e = expectation_step(&obs, &params, &SeriesConfig::default()).unwrap();
        prop_assert!(e.log_likelihood.is_finite());
        for row in e.responsibilities.row_iter() {
            prop_assert!((row.sum() - 1.0).abs() < 1e-9);
        }
    }
}

// ============================================================================
// Convergence properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// The monitor always terminates by the iteration cap, and a terminal
    /// iteration never exceeds the last observed one.
    #[test]
    fn monitor_terminates_within_cap(
        llh in prop::collection::vec(-1e4..-1.0f64, 1..40),
        max in 1usize..30,
        tol in 0.0..1e-2f64,
    ) {
        let mut monitor = ConvergenceMonitor::new(tol, max);
        let mut observed = 0;
        for &value in &llh {
            let state = monitor.observe(value);
            observed += 1;
            if state.is_terminal() {
                break;
            }
        }
        let state = monitor.state();
        if observed >= max {
            prop_assert!(state.is_terminal());
        }
        if let Some(t) = state.terminal_iteration() {
            prop_assert!(t < observed);
            prop_assert!(t < max);
        }
        if let EmState::Converged { rolled_back: true, iteration } = state {
            prop_assert!(llh[iteration + 1] < llh[iteration]);
        }
    }

    /// Relative change is scale invariant for non-zero baselines.
    #[test]
    fn relative_change_scale_invariant(prev in -1e6..-1e-3f64, delta in -10.0..10.0f64, s in 0.1..100.0f64) {
        let a = relative_change(prev, prev + delta);
        let b = relative_change(prev * s, (prev + delta) * s);
        prop_assert!((a - b).abs() <= 1e-9 * a.abs().max(1.0));
    }
}
