//! Per-iteration snapshots of the EM trajectory.

use crate::params::MixtureParams;
use serde::{Deserialize, Serialize};
use wmm_math::BoundTriple;

/// Parameters produced by one EM iteration.
///
/// `log_likelihood` is the value computed in that iteration's expectation
/// step, i.e. under the parameters the iteration started from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationSnapshot {
    pub iteration: usize,
    pub params: MixtureParams,
    pub bounds: Vec<BoundTriple>,
    pub log_likelihood: f64,
}

/// What the caller gets back: only the terminal snapshot, or all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "snapshots", rename_all = "snake_case")]
pub enum FitHistory {
    Final(IterationSnapshot),
    All(Vec<IterationSnapshot>),
}

impl FitHistory {
    /// Snapshot the fit terminated on.
    pub fn terminal(&self) -> &IterationSnapshot {
        match self {
            FitHistory::Final(s) => s,
            // `All` is built from a non-empty, trimmed buffer.
            FitHistory::All(all) => &all[all.len() - 1],
        }
    }

    /// Every retained snapshot (one for `Final`).
    pub fn snapshots(&self) -> &[IterationSnapshot] {
        match self {
            FitHistory::Final(s) => std::slice::from_ref(s),
            FitHistory::All(all) => all,
        }
    }
}

/// Growable buffer sized for the iteration cap, trimmed at termination.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<IterationSnapshot>,
}

impl History {
    pub fn with_capacity(max_iterations: usize) -> Self {
        Self {
            snapshots: Vec::with_capacity(max_iterations),
        }
    }

    pub fn record(&mut self, snapshot: IterationSnapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn log_likelihoods(&self) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.log_likelihood).collect()
    }

    /// Keep iterations `0..=terminal` and package them.
    ///
    /// Returns the trimmed log-likelihood sequence alongside the history;
    /// None when `terminal` was never recorded.
    pub fn finish(mut self, terminal: usize, return_all: bool) -> Option<(Vec<f64>, FitHistory)> {
        if terminal >= self.snapshots.len() {
            return None;
        }
        self.snapshots.truncate(terminal + 1);
        let llh = self.log_likelihoods();
        let history = if return_all {
            FitHistory::All(self.snapshots)
        } else {
            FitHistory::Final(self.snapshots.pop()?)
        };
        Some((llh, history))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(iteration: usize, llh: f64) -> IterationSnapshot {
        IterationSnapshot {
            iteration,
            params: MixtureParams {
                means: vec![vec![1.0, 0.0]],
                concentrations: vec![iteration as f64],
                weights: vec![1.0],
            },
            bounds: vec![BoundTriple::default()],
            log_likelihood: llh,
        }
    }

    fn filled(n: usize) -> History {
        let mut h = History::with_capacity(10);
        for i in 0..n {
            h.record(snapshot(i, -(10.0 - i as f64)));
        }
        h
    }

    #[test]
    fn finish_trims_to_terminal() {
        let (llh, history) = filled(5).finish(3, true).unwrap();
        assert_eq!(llh, vec![-10.0, -9.0, -8.0, -7.0]);
        assert_eq!(history.snapshots().len(), 4);
        assert_eq!(history.terminal().iteration, 3);
    }

    #[test]
    fn finish_final_only() {
        let (llh, history) = filled(5).finish(3, false).unwrap();
        assert_eq!(llh.len(), 4);
        match &history {
            FitHistory::Final(s) => assert_eq!(s.iteration, 3),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(history.snapshots().len(), 1);
    }

    #[test]
    fn finish_rejects_unrecorded_terminal() {
        assert!(filled(2).finish(2, false).is_none());
        assert!(History::with_capacity(3).finish(0, true).is_none());
    }
}
