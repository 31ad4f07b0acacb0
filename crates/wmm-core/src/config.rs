//! Fit options: defaults, parsing, and validation.
//!
//! Options can be built in code (struct update syntax over
//! [`FitOptions::default`]) or loaded from TOML/JSON:
//!
//! ```toml
//! max_iterations = 100
//! tolerance = 1e-5
//! random_seed = 7
//! regularization = 0.1
//!
//! [init]
//! mode = "random"
//! ```

use crate::error::{Error, Result};
use crate::params::MixtureParams;
use serde::{Deserialize, Serialize};
use std::path::Path;
use wmm_math::{SeriesConfig, SERIES_DEFAULT_MAX_TERMS, SERIES_DEFAULT_TOLERANCE};

pub const DEFAULT_MAX_ITERATIONS: usize = 200;
pub const DEFAULT_TOLERANCE: f64 = 1e-4;
pub const DEFAULT_UNIT_NORM_TOLERANCE: f64 = 1e-6;

/// How the EM engine picks its starting parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InitStrategy {
    /// Golden spiral for 3-dimensional data, random otherwise.
    #[default]
    Auto,
    /// Isotropic random axes, unit concentrations, uniform weights.
    Random,
    /// Deterministic golden-spiral axes (3-dimensional data only).
    Spiral,
    /// Caller-supplied parameters, copied and normalized.
    Explicit(MixtureParams),
}

impl std::str::FromStr for InitStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "auto" | "default" => Ok(InitStrategy::Auto),
            "random" => Ok(InitStrategy::Random),
            "spiral" | "golden_spiral" | "golden-spiral" => Ok(InitStrategy::Spiral),
            _ => Err(Error::invalid_option(
                "init",
                format!("unknown init mode: {}", s),
            )),
        }
    }
}

impl std::fmt::Display for InitStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InitStrategy::Auto => write!(f, "auto"),
            InitStrategy::Random => write!(f, "random"),
            InitStrategy::Spiral => write!(f, "spiral"),
            InitStrategy::Explicit(_) => write!(f, "explicit"),
        }
    }
}

/// Options for [`crate::fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Upper bound on EM iterations (>= 1).
    pub max_iterations: usize,
    /// Relative log-likelihood change below which the fit has converged.
    pub tolerance: f64,
    /// Emit per-iteration progress through the logging collaborator.
    pub verbose: bool,
    /// Seed for random initialization; None draws from the OS.
    pub random_seed: Option<u64>,
    pub init: InitStrategy,
    /// Return every iteration's snapshot instead of only the terminal one.
    pub return_all_iterations: bool,
    /// Shrinkage γ in [0, 1] of each bound toward the across-component mean.
    #[serde(alias = "regularization_factor")]
    pub regularization: f64,
    /// Stopping tolerance of the normalizing-constant series.
    pub series_tolerance: f64,
    /// Term cap of the normalizing-constant series.
    pub series_max_terms: usize,
    /// Allowed deviation of observation norms from 1.
    pub unit_norm_tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            verbose: false,
            random_seed: None,
            init: InitStrategy::Auto,
            return_all_iterations: false,
            regularization: 0.0,
            series_tolerance: SERIES_DEFAULT_TOLERANCE,
            series_max_terms: SERIES_DEFAULT_MAX_TERMS,
            unit_norm_tolerance: DEFAULT_UNIT_NORM_TOLERANCE,
        }
    }
}

impl FitOptions {
    /// Validate option ranges.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(Error::invalid_option(
                "max_iterations",
                "must be at least 1",
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(Error::invalid_option(
                "tolerance",
                format!("must be finite and > 0, got {}", self.tolerance),
            ));
        }
        if !(0.0..=1.0).contains(&self.regularization) {
            return Err(Error::invalid_option(
                "regularization",
                format!("must be in [0, 1], got {}", self.regularization),
            ));
        }
        if !self.series_tolerance.is_finite() || self.series_tolerance <= 0.0 {
            return Err(Error::invalid_option(
                "series_tolerance",
                format!("must be finite and > 0, got {}", self.series_tolerance),
            ));
        }
        if self.series_max_terms == 0 {
            return Err(Error::invalid_option(
                "series_max_terms",
                "must be at least 1",
            ));
        }
        if !self.unit_norm_tolerance.is_finite() || self.unit_norm_tolerance < 0.0 {
            return Err(Error::invalid_option(
                "unit_norm_tolerance",
                format!("must be finite and >= 0, got {}", self.unit_norm_tolerance),
            ));
        }
        Ok(())
    }

    /// Series stopping rules derived from these options.
    pub fn series_config(&self) -> SeriesConfig {
        SeriesConfig {
            tolerance: self.series_tolerance,
            max_terms: self.series_max_terms,
        }
    }

    /// Parse and validate options from a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let options: FitOptions =
            toml::from_str(s).map_err(|e| Error::Parse(format!("invalid TOML: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Parse and validate options from a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let options: FitOptions =
            serde_json::from_str(s).map_err(|e| Error::Parse(format!("invalid JSON: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a `.toml` or `.json` file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(Error::Parse(format!(
                "unsupported options file extension: {}",
                path.display()
            ))),
        }
    }
}
