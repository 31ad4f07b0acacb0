//! Watson mixture models on the unit hypersphere.
//!
//! Fits a mixture of Watson (axially symmetric) distributions to unit
//! vectors with Expectation-Maximization, and evaluates single and mixture
//! densities.
//!
//! ```ignore
//! use wmm_core::{fit, FitOptions};
//!
//! let options = FitOptions { random_seed: Some(42), ..FitOptions::default() };
//! let result = fit(&points, 2, &options)?;
//! println!("{}: {:?}", result.status, result.params().concentrations);
//! ```

pub mod config;
pub mod density;
pub mod em;
pub mod error;
pub mod init;
pub mod logging;
pub mod observations;
pub mod params;
pub mod vector;

pub use config::{FitOptions, InitStrategy};
pub use density::{density, log_density, log_normalizer, mixture_density};
pub use em::{fit, EmState, FitHistory, IterationSnapshot, WatsonMixtureFit};
pub use error::{Error, ErrorCategory, Result};
pub use observations::Observations;
pub use params::MixtureParams;
pub use wmm_math::{BoundTriple, SeriesConfig, SeriesError};
