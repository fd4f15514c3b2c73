//! Request parameters for the PCC chain and their boundary validation.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::tendon::TendonConfig;

/// Smallest accepted number of integration steps per backbone segment.
pub const MIN_DISCRETIZATION_STEPS: i64 = 1;
/// Largest accepted number of integration steps; caps worst-case latency.
pub const MAX_DISCRETIZATION_STEPS: i64 = 10_000;

/// One constant-curvature backbone segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentSpec {
    /// Bending angle θ in radians.
    pub bending_angle: f64,
    /// Bend-plane angle φ in radians, measured from the local x-axis.
    pub rotation_angle: f64,
    /// Arc length of the backbone.
    pub length: f64,
}

/// Full parameter set for one robot configuration.
///
/// `coupling_lengths` has one more entry than the per-segment arrays: a coupling
/// link precedes the first backbone segment and one follows every segment.
/// `discretization_steps` is signed so a negative count in a payload reaches
/// [`validate`](Self::validate) instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PccParams {
    pub bending_angles: Vec<f64>,
    pub rotation_angles: Vec<f64>,
    pub backbone_lengths: Vec<f64>,
    pub coupling_lengths: Vec<f64>,
    pub discretization_steps: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tendon_config: Option<TendonConfig>,
}

impl PccParams {
    #[must_use]
    pub fn new(
        bending_angles: Vec<f64>,
        rotation_angles: Vec<f64>,
        backbone_lengths: Vec<f64>,
        coupling_lengths: Vec<f64>,
        discretization_steps: i64,
    ) -> Self {
        Self {
            bending_angles,
            rotation_angles,
            backbone_lengths,
            coupling_lengths,
            discretization_steps,
            tendon_config: None,
        }
    }

    #[must_use]
    pub fn with_tendon_config(mut self, config: TendonConfig) -> Self {
        self.tendon_config = Some(config);
        self
    }

    /// Number of backbone segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.bending_angles.len()
    }

    /// Steps per backbone segment; 0 for a negative count, which validation rejects.
    #[must_use]
    pub fn steps(&self) -> usize {
        usize::try_from(self.discretization_steps).unwrap_or(0)
    }

    /// Number of tendon routing frames: the base plus one per coupling link.
    #[must_use]
    pub fn coupling_element_count(&self) -> usize {
        self.coupling_lengths.len() + 1
    }

    /// Backbone segments in base-to-tip order.
    pub fn segments(&self) -> impl Iterator<Item = SegmentSpec> + '_ {
        self.bending_angles
            .iter()
            .zip(&self.rotation_angles)
            .zip(&self.backbone_lengths)
            .map(|((&bending_angle, &rotation_angle), &length)| SegmentSpec {
                bending_angle,
                rotation_angle,
                length,
            })
    }

    /// Validates everything the chain builder consumes.
    pub fn validate_geometry(&self) -> Result<(), ValidationError> {
        for (field, values) in [
            ("bending_angles", &self.bending_angles),
            ("rotation_angles", &self.rotation_angles),
            ("backbone_lengths", &self.backbone_lengths),
            ("coupling_lengths", &self.coupling_lengths),
        ] {
            if values.is_empty() {
                return Err(ValidationError::EmptyArray { field });
            }
        }

        ValidationError::check_range(
            "discretization_steps",
            self.discretization_steps as f64,
            "[1, 10000]",
            (MIN_DISCRETIZATION_STEPS..=MAX_DISCRETIZATION_STEPS)
                .contains(&self.discretization_steps),
        )?;

        let segments = self.segment_count();
        ValidationError::check_len("rotation_angles", segments, self.rotation_angles.len())?;
        ValidationError::check_len("backbone_lengths", segments, self.backbone_lengths.len())?;
        ValidationError::check_len("coupling_lengths", segments + 1, self.coupling_lengths.len())
    }

    /// Validates the chain inputs and, when present, the tendon configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_geometry()?;
        if let Some(config) = &self.tendon_config {
            config.validate()?;
        }
        Ok(())
    }
}
