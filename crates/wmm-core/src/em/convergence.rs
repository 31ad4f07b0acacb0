//! EM termination as an explicit state machine.
//!
//! ```text
//! Init ──observe──▶ Iterating ──observe──▶ Iterating ...
//!                      │
//!                      ├─▶ Converged { iteration, rolled_back }
//!                      └─▶ MaxIterReached { iteration }
//! ```
//!
//! After iteration i (0-based) records log-likelihood `llh[i]`, the relative
//! change `(llh[i] - llh[i-1]) / |llh[i-1]|` is compared with the tolerance.
//! Below tolerance with a non-negative change converges at i; below
//! tolerance with a negative change (overshoot) converges at i-1, discarding
//! the last update. Otherwise the fit stops at i once i reaches
//! `max_iterations - 1`.

use serde::{Deserialize, Serialize};

/// Lifecycle of one EM fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EmState {
    Init,
    Iterating { iteration: usize },
    Converged { iteration: usize, rolled_back: bool },
    MaxIterReached { iteration: usize },
}

impl EmState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EmState::Converged { .. } | EmState::MaxIterReached { .. }
        )
    }

    /// Index of the iteration whose snapshot is the fit result.
    pub fn terminal_iteration(&self) -> Option<usize> {
        match *self {
            EmState::Converged { iteration, .. } | EmState::MaxIterReached { iteration } => {
                Some(iteration)
            }
            EmState::Init | EmState::Iterating { .. } => None,
        }
    }
}

impl std::fmt::Display for EmState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmState::Init => write!(f, "init"),
            EmState::Iterating { iteration } => write!(f, "iterating ({})", iteration),
            EmState::Converged {
                iteration,
                rolled_back: false,
            } => write!(f, "converged at iteration {}", iteration),
            EmState::Converged {
                iteration,
                rolled_back: true,
            } => write!(
                f,
                "converged at iteration {} (last update discarded after likelihood decrease)",
                iteration
            ),
            EmState::MaxIterReached { iteration } => {
                write!(f, "stopped at iteration cap ({})", iteration)
            }
        }
    }
}

/// Relative log-likelihood change, falling back to the absolute change
/// when the previous value is exactly zero.
pub fn relative_change(previous: f64, current: f64) -> f64 {
    let delta = current - previous;
    if previous == 0.0 {
        delta
    } else {
        delta / previous.abs()
    }
}

/// Drives [`EmState`] from the per-iteration log-likelihood sequence.
#[derive(Debug, Clone)]
pub struct ConvergenceMonitor {
    tolerance: f64,
    max_iterations: usize,
    previous: Option<f64>,
    state: EmState,
}

impl ConvergenceMonitor {
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations: max_iterations.max(1),
            previous: None,
            state: EmState::Init,
        }
    }

    pub fn state(&self) -> EmState {
        self.state
    }

    /// Relative change of the most recent step, if there was a previous one.
    pub fn last_change(&self, current: f64) -> Option<f64> {
        self.previous.map(|prev| relative_change(prev, current))
    }

    /// Record the log-likelihood of the iteration that just finished and
    /// return the new state. Terminal states are sticky.
    pub fn observe(&mut self, log_likelihood: f64) -> EmState {
        let iteration = match self.state {
            EmState::Init => 0,
            EmState::Iterating { iteration } => iteration + 1,
            terminal => return terminal,
        };
        let at_cap = iteration + 1 >= self.max_iterations;

        let next = match self.previous {
            Some(prev) if relative_change(prev, log_likelihood) < self.tolerance => {
                if log_likelihood - prev >= 0.0 {
                    EmState::Converged {
                        iteration,
                        rolled_back: false,
                    }
                } else {
                    EmState::Converged {
                        iteration: iteration - 1,
                        rolled_back: true,
                    }
                }
            }
            _ if at_cap => EmState::MaxIterReached { iteration },
            _ => EmState::Iterating { iteration },
        };

        self.previous = Some(log_likelihood);
        self.state = next;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(llh: &[f64], tol: f64, max: usize) -> Vec<EmState> {
        let mut monitor = ConvergenceMonitor::new(tol, max);
        llh.iter().map(|&v| monitor.observe(v)).collect()
    }

    #[test]
    fn converges_on_small_increase() {
        let states = run(&[-100.0, -50.0, -49.999], 1e-4, 200);
        assert_eq!(states[0], EmState::Iterating { iteration: 0 });
        assert_eq!(states[1], EmState::Iterating { iteration: 1 });
        assert_eq!(
            states[2],
            EmState::Converged {
                iteration: 2,
                rolled_back: false
            }
        );
    }

    #[test]
    fn zero_change_converges_without_rollback() {
        let states = run(&[-10.0, -10.0], 1e-4, 200);
        assert_eq!(
            states[1],
            EmState::Converged {
                iteration: 1,
                rolled_back: false
            }
        );
    }

    #[test]
    fn decrease_rolls_back_one_iteration() {
        let states = run(&[-100.0, -50.0, -51.0], 1e-4, 200);
        assert_eq!(
            states[2],
            EmState::Converged {
                iteration: 1,
                rolled_back: true
            }
        );
        assert_eq!(states[2].terminal_iteration(), Some(1));
    }

    #[test]
    fn stops_at_cap() {
        let states = run(&[-100.0, -50.0, -25.0], 1e-4, 3);
        assert_eq!(states[2], EmState::MaxIterReached { iteration: 2 });

        let single = run(&[-5.0], 1e-4, 1);
        assert_eq!(single[0], EmState::MaxIterReached { iteration: 0 });
    }

    #[test]
    fn convergence_beats_cap_on_last_iteration() {
        let states = run(&[-100.0, -100.0], 1e-4, 2);
        assert_eq!(
            states[1],
            EmState::Converged {
                iteration: 1,
                rolled_back: false
            }
        );
    }

    #[test]
    fn terminal_state_is_sticky() {
        let mut monitor = ConvergenceMonitor::new(1e-4, 1);
        let first = monitor.observe(-1.0);
        assert!(first.is_terminal());
        assert_eq!(monitor.observe(100.0), first);
        assert_eq!(monitor.state(), first);
    }

    #[test]
    fn relative_change_handles_zero() {
        assert_eq!(relative_change(0.0, 0.5), 0.5);
        assert_eq!(relative_change(-200.0, -100.0), 0.5);
        assert_eq!(relative_change(100.0, 50.0), -0.5);
    }

    #[test]
    fn display_reports_rollback() {
        let s = EmState::Converged {
            iteration: 4,
            rolled_back: true,
        }
        .to_string();
        assert!(s.contains("discarded"));
        assert_eq!(EmState::Init.to_string(), "init");
    }
}
