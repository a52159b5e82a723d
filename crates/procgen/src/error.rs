//! Contract violations raised by the generators.

use thiserror::Error;

/// Errors that can occur while validating generator inputs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("seed length must be {expected} hex characters, got {actual}")]
    InvalidSeedLength { expected: usize, actual: usize },
    #[error("seed contains non-hex characters: {0:?}")]
    InvalidHex(String),
    #[error("invalid range for {attribute}: min ({min}) > max ({max})")]
    InvalidRange {
        attribute: String,
        min: f64,
        max: f64,
    },
    #[error("{attribute} must lie within [0, 1], got {value}")]
    InvalidProbability { attribute: String, value: f32 },
    #[error("{attribute} must be at least 1, got {value}")]
    NonPositiveCount { attribute: String, value: i32 },
    #[error("gradient needs at least one stop")]
    EmptyGradient,
    #[error("gradient stop fraction must be finite and within [0, 1], got {0}")]
    InvalidStopFraction(f32),
    #[error("mesh resolution must be at least 2, got {0}")]
    InvalidResolution(u32),
}

pub type Result<T> = std::result::Result<T, GenerationError>;
