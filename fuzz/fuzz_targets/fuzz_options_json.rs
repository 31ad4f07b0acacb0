//! Fuzz target for JSON fit options.
//!
//! Options that parse must also survive a serialize/parse cycle.

#![no_main]

use libfuzzer_sys::fuzz_target;
use wmm_core::FitOptions;

fuzz_target!(|data: &str| {
    if let Ok(options) = FitOptions::from_json_str(data) {
        if let Ok(json) = serde_json::to_string(&options) {
            let _ = FitOptions::from_json_str(&json);
        }
    }
});
