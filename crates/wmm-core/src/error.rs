//! Error types for Watson mixture fitting.
//!
//! Errors carry a stable numeric code and a category so callers can group
//! failures without matching on every variant:
//!
//! - 10-19: invalid input, reported before any EM state is allocated
//! - 30-39: numerical failures that abort a fit in progress
//! - 40-49: option/config parsing and validation
//! - 60-69: I/O and serialization

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wmm_math::SeriesError;

/// Result type alias for Watson mixture operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed observations, parameters, or component counts.
    Input,
    /// Series, responsibility, or eigen-decomposition failures.
    Numerical,
    /// Fit option errors.
    Config,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Numerical => write!(f, "numerical"),
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for Watson mixture operations.
#[derive(Error, Debug)]
pub enum Error {
    // Input errors (10-19)
    #[error("observation set is empty")]
    EmptyObservations,

    #[error("observation {index} has dimension {got}, expected {expected}")]
    InconsistentDimension {
        index: usize,
        expected: usize,
        got: usize,
    },

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("number of components must be at least 1, got {0}")]
    InvalidComponentCount(usize),

    #[error("golden-spiral initialization requires 3-dimensional data, got {dim}")]
    SpiralRequiresThreeDimensions { dim: usize },

    #[error("observation {index} is not a finite unit vector (norm {norm})")]
    NonUnitPoint { index: usize, norm: f64 },

    #[error("invalid parameter {field}: {message}")]
    InvalidParameter { field: String, message: String },

    #[error("fitting needs observations of dimension >= 2, got {dim}")]
    UnsupportedDimension { dim: usize },

    // Numerical errors (30-39)
    #[error("normalizing constant failed: {0}")]
    Series(#[from] SeriesError),

    #[error("observation {observation} has zero likelihood under every component")]
    DegenerateResponsibility { observation: usize },

    #[error("component {component} received no responsibility mass")]
    DegenerateComponent { component: usize },

    #[error("eigen-decomposition failed for component {component}: {message}")]
    EigenDecomposition { component: usize, message: String },

    // Config errors (40-49)
    #[error("invalid option {field}: {message}")]
    InvalidOption { field: String, message: String },

    #[error("failed to parse options: {0}")]
    Parse(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the stable error code for this error type.
    pub fn code(&self) -> u32 {
        match self {
            Error::EmptyObservations => 10,
            Error::InconsistentDimension { .. } => 11,
            Error::DimensionMismatch { .. } => 12,
            Error::InvalidComponentCount(_) => 13,
            Error::SpiralRequiresThreeDimensions { .. } => 14,
            Error::NonUnitPoint { .. } => 15,
            Error::InvalidParameter { .. } => 16,
            Error::UnsupportedDimension { .. } => 17,
            Error::Series(_) => 30,
            Error::DegenerateResponsibility { .. } => 31,
            Error::DegenerateComponent { .. } => 32,
            Error::EigenDecomposition { .. } => 33,
            Error::InvalidOption { .. } => 40,
            Error::Parse(_) => 41,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::EmptyObservations
            | Error::InconsistentDimension { .. }
            | Error::DimensionMismatch { .. }
            | Error::InvalidComponentCount(_)
            | Error::SpiralRequiresThreeDimensions { .. }
            | Error::NonUnitPoint { .. }
            | Error::InvalidParameter { .. }
            | Error::UnsupportedDimension { .. } => ErrorCategory::Input,

            Error::Series(_)
            | Error::DegenerateResponsibility { .. }
            | Error::DegenerateComponent { .. }
            | Error::EigenDecomposition { .. } => ErrorCategory::Numerical,

            Error::InvalidOption { .. } | Error::Parse(_) => ErrorCategory::Config,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Whether retrying with a different initialization or fewer components
    /// may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Series(_)
                | Error::DegenerateResponsibility { .. }
                | Error::DegenerateComponent { .. }
        )
    }

    pub(crate) fn invalid_parameter(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidParameter {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_option(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidOption {
            field: field.into(),
            message: message.into(),
        }
    }
}
