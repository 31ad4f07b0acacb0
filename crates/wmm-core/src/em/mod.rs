//! Expectation-Maximization fitting of a Watson mixture.
//!
//! Each iteration runs an expectation step under the current parameters,
//! a maximization step producing the next parameters, and records both as
//! an [`IterationSnapshot`]. [`ConvergenceMonitor`] decides when to stop and
//! which snapshot is the result.

pub mod convergence;
pub mod estep;
pub mod history;
pub mod mstep;

pub use convergence::{relative_change, ConvergenceMonitor, EmState};
pub use estep::{expectation_step, Expectation};
pub use history::{FitHistory, History, IterationSnapshot};
pub use mstep::{maximization_step, Maximization};

use crate::config::FitOptions;
use crate::error::{Error, Result};
use crate::init::{initialize, seeded_rng};
use crate::logging::{progress, EM_TARGET};
use crate::observations::Observations;
use crate::params::MixtureParams;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use wmm_math::BoundTriple;

/// Result of [`fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatsonMixtureFit {
    /// One entry per retained iteration, `0..=terminal`.
    pub log_likelihood: Vec<f64>,
    pub status: EmState,
    pub history: FitHistory,
}

impl WatsonMixtureFit {
    /// Parameters of the terminal iteration.
    pub fn params(&self) -> &MixtureParams {
        &self.history.terminal().params
    }

    /// Concentration bounds of the terminal iteration.
    pub fn bounds(&self) -> &[BoundTriple] {
        &self.history.terminal().bounds
    }

    pub fn iterations(&self) -> &[IterationSnapshot] {
        self.history.snapshots()
    }

    /// Number of iterations kept, including the terminal one.
    pub fn iterations_run(&self) -> usize {
        self.log_likelihood.len()
    }

    pub fn converged(&self) -> bool {
        matches!(self.status, EmState::Converged { .. })
    }

    /// Mixture density of the fitted model at each point.
    pub fn density(&self, points: &[Vec<f64>]) -> Result<Vec<f64>> {
        self.params().density(points)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Fit a `k`-component Watson mixture to unit vectors `points`.
pub fn fit(points: &[Vec<f64>], k: usize, options: &FitOptions) -> Result<WatsonMixtureFit> {
    options.validate()?;
    if k == 0 {
        return Err(Error::InvalidComponentCount(k));
    }
    let obs = Observations::on_sphere(points, options.unit_norm_tolerance)?;
    // Watson bounds need c = p/2 > a = 1/2.
    if obs.dim() < 2 {
        return Err(Error::UnsupportedDimension { dim: obs.dim() });
    }
    let series = options.series_config();

    let mut rng = seeded_rng(options.random_seed);
    let mut params = initialize(&options.init, k, obs.dim(), &mut rng)?;

    info!(
        target: EM_TARGET,
        n = obs.len(),
        p = obs.dim(),
        k,
        init = %options.init,
        max_iterations = options.max_iterations,
        "starting EM fit"
    );

    let mut monitor = ConvergenceMonitor::new(options.tolerance, options.max_iterations);
    let mut history = History::with_capacity(options.max_iterations);

    let status = loop {
        let expectation = expectation_step(&obs, &params, &series)?;
        let Maximization {
            params: next,
            bounds,
        } = maximization_step(&obs, &expectation.responsibilities, options.regularization)?;

        let iteration = history.len();
        let change = monitor.last_change(expectation.log_likelihood);
        history.record(IterationSnapshot {
            iteration,
            params: next.clone(),
            bounds,
            log_likelihood: expectation.log_likelihood,
        });
        params = next;

        let state = monitor.observe(expectation.log_likelihood);
        debug!(
            target: EM_TARGET,
            iteration,
            log_likelihood = expectation.log_likelihood,
            change = ?change,
            state = %state,
            "EM iteration"
        );
        progress(
            options.verbose,
            &format!(
                "iteration {}: log-likelihood {:.6}",
                iteration, expectation.log_likelihood
            ),
        );

        if state.is_terminal() {
            break state;
        }
    };

    if let EmState::Converged {
        rolled_back: true,
        iteration,
    } = status
    {
        warn!(
            target: EM_TARGET,
            iteration,
            "log-likelihood decreased; keeping the previous iteration"
        );
    }

    let terminal = status
        .terminal_iteration()
        .ok_or_else(|| Error::invalid_option("max_iterations", "fit ended without a result"))?;
    let (log_likelihood, history) = history
        .finish(terminal, options.return_all_iterations)
        .ok_or_else(|| Error::invalid_option("max_iterations", "fit ended without a result"))?;

    info!(target: EM_TARGET, status = %status, "EM fit finished");
    progress(options.verbose, &format!("{}", status));

    Ok(WatsonMixtureFit {
        log_likelihood,
        status,
        history,
    })
}
