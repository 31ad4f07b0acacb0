//! Fuzz target for the EM fit.
//!
//! Small arbitrary point sets are projected onto the sphere and fitted
//! with a short iteration cap. The fit may fail, but must not panic.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use wmm_core::{fit, FitOptions, InitStrategy};

#[derive(Debug, Arbitrary)]
struct Input {
    dim: u8,
    k: u8,
    seed: u64,
    regularization: u8,
    coords: Vec<f64>,
}

fuzz_target!(|input: Input| {
    let dim = (input.dim as usize % 6) + 1;
    let points: Vec<Vec<f64>> = input
        .coords
        .chunks_exact(dim)
        .take(64)
        .filter_map(|chunk| {
            let n = chunk.iter().map(|x| x * x).sum::<f64>().sqrt();
            if n.is_finite() && n > 1e-6 {
                Some(chunk.iter().map(|x| x / n).collect())
            } else {
                None
            }
        })
        .collect();

    let options = FitOptions {
        max_iterations: 5,
        random_seed: Some(input.seed),
        init: InitStrategy::Random,
        regularization: input.regularization as f64 / u8::MAX as f64,
        ..FitOptions::default()
    };
    let k = input.k as usize % 5;
    if let Ok(result) = fit(&points, k, &options) {
        assert!(!result.log_likelihood.is_empty());
        assert!(result.status.is_terminal());
    }
});
