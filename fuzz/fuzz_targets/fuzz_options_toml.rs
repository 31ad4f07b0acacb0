//! Fuzz target for TOML fit options.
//!
//! Tests that `FitOptions::from_toml_str` handles arbitrary input without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use wmm_core::FitOptions;

fuzz_target!(|data: &str| {
    let _ = FitOptions::from_toml_str(data);
});
