//! Tendon routing configuration.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const MIN_TENDON_COUNT: i64 = 3;
pub const MAX_TENDON_COUNT: i64 = 12;
/// Upper bound for the eyelet radius in metres (exclusive lower bound is 0).
pub const MAX_TENDON_RADIUS: f64 = 0.1;
/// Bound on the axial eyelet offset from a coupling frame in metres.
pub const MAX_COUPLING_OFFSET: f64 = 0.05;

/// Eyelet radius: one value for every coupling element, or one per element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TendonRadius {
    Uniform(f64),
    PerElement(Vec<f64>),
}

impl TendonRadius {
    fn values(&self) -> &[f64] {
        match self {
            Self::Uniform(radius) => std::slice::from_ref(radius),
            Self::PerElement(radii) => radii,
        }
    }

    /// Radii for `element_count` coupling elements; a uniform radius is broadcast.
    pub fn resolve(&self, element_count: usize) -> Result<Vec<f64>, ValidationError> {
        match self {
            Self::Uniform(radius) => Ok(vec![*radius; element_count]),
            Self::PerElement(radii) => {
                ValidationError::check_len("tendon_config.radius", element_count, radii.len())?;
                Ok(radii.clone())
            }
        }
    }
}

impl From<f64> for TendonRadius {
    fn from(radius: f64) -> Self {
        Self::Uniform(radius)
    }
}

impl From<Vec<f64>> for TendonRadius {
    fn from(radii: Vec<f64>) -> Self {
        Self::PerElement(radii)
    }
}

/// Number of tendons, their eyelet radius and the axial offset of the eyelet
/// plane from each coupling frame. `count` is signed so a negative payload value
/// surfaces as a range error from [`validate`](Self::validate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TendonConfig {
    pub count: i64,
    pub radius: TendonRadius,
    pub coupling_offset: f64,
}

impl Default for TendonConfig {
    fn default() -> Self {
        Self {
            count: 3,
            radius: TendonRadius::Uniform(0.03),
            coupling_offset: 0.0,
        }
    }
}

impl TendonConfig {
    #[must_use]
    pub fn new(count: i64, radius: impl Into<TendonRadius>, coupling_offset: f64) -> Self {
        Self {
            count,
            radius: radius.into(),
            coupling_offset,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::check_range(
            "tendon_config.count",
            self.count as f64,
            "[3, 12]",
            (MIN_TENDON_COUNT..=MAX_TENDON_COUNT).contains(&self.count),
        )?;

        let radii = self.radius.values();
        if radii.is_empty() {
            return Err(ValidationError::EmptyArray {
                field: "tendon_config.radius",
            });
        }
        for &radius in radii {
            ValidationError::check_range(
                "tendon_config.radius",
                radius,
                "(0, 0.1]",
                radius > 0.0 && radius <= MAX_TENDON_RADIUS,
            )?;
        }

        ValidationError::check_range(
            "tendon_config.coupling_offset",
            self.coupling_offset,
            "[-0.05, 0.05]",
            self.coupling_offset.abs() <= MAX_COUPLING_OFFSET,
        )
    }

    /// Tendon count as an index bound; 0 for a negative count.
    #[must_use]
    pub fn tendon_count(&self) -> usize {
        usize::try_from(self.count).unwrap_or(0)
    }

    /// Radii for `element_count` coupling elements.
    pub fn radii_for(&self, element_count: usize) -> Result<Vec<f64>, ValidationError> {
        self.radius.resolve(element_count)
    }
}
