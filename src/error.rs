//! Error types shared by the kinematics and tendon layers.
//!
//! Every check happens at the input boundary of the component that owns it; once an
//! error is returned nothing downstream has been computed.

use thiserror::Error;

/// Rejected input parameter. Carries the field name and the offending value so the
/// request layer can render it however it likes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("`{field}` cannot be empty")]
    EmptyArray { field: &'static str },
    #[error("`{field}` = {value} is outside {expected}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },
    #[error("`{field}` has {actual} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl ValidationError {
    /// Name of the offending input field.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyArray { field }
            | Self::OutOfRange { field, .. }
            | Self::LengthMismatch { field, .. } => field,
        }
    }

    /// Offending value rendered as text (the array length for length errors).
    #[must_use]
    pub fn value(&self) -> String {
        match self {
            Self::EmptyArray { .. } => "[]".to_owned(),
            Self::OutOfRange { value, .. } => value.to_string(),
            Self::LengthMismatch { actual, .. } => actual.to_string(),
        }
    }

    pub(crate) fn check_range(
        field: &'static str,
        value: f64,
        expected: &'static str,
        in_range: bool,
    ) -> Result<(), Self> {
        if in_range {
            Ok(())
        } else {
            Err(Self::OutOfRange {
                field,
                value,
                expected,
            })
        }
    }

    pub(crate) fn check_len(
        field: &'static str,
        expected: usize,
        actual: usize,
    ) -> Result<(), Self> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::LengthMismatch {
                field,
                expected,
                actual,
            })
        }
    }
}

/// Invalid input to the eyelet geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("eyelet count must be >= 1, got {count}")]
    InvalidEyeletCount { count: usize },
    #[error("eyelet radius must be >= 0, got {radius}")]
    NegativeRadius { radius: f64 },
    #[error("origin must be a 4x4 homogeneous pose, got {rows}x{cols}")]
    MalformedPose { rows: usize, cols: usize },
    #[error("origin pose is not homogeneous (bottom row must be [0, 0, 0, 1])")]
    NonHomogeneousPose,
}

/// Umbrella error for the analysis pipeline and the wasm facade.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("invalid request payload: {0}")]
    Payload(String),
}
