//! Fuzz target for the Kummer series and concentration bounds.
//!
//! Arbitrary parameters must produce a value or an error, never a panic
//! or an unbounded loop.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use wmm_math::{clamp_ratio, kummer, log_kummer, BoundTriple, SeriesConfig};

#[derive(Debug, Arbitrary)]
struct Input {
    a: f64,
    b: f64,
    kappa: f64,
    tolerance: f64,
    max_terms: u16,
    p: u8,
    r: f64,
}

fuzz_target!(|input: Input| {
    let config = SeriesConfig {
        tolerance: input.tolerance,
        max_terms: input.max_terms as usize,
    };
    let _ = kummer(input.a, input.b, input.kappa, &config);
    if let Ok(log) = log_kummer(input.a, input.b, input.kappa, &config) {
        assert!(log.is_finite());
    }

    let p = (input.p as usize).max(1);
    let _ = BoundTriple::watson(p, clamp_ratio(input.r));
});
