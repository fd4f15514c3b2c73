//! Tendon routing lengths and actuation commands from coupling element poses.
//!
//! Every tendon threads the eyelet with the same index on each coupling element,
//! so its length is the polyline through those eyelets. Length changes are
//! measured against the straightened robot: the same consecutive element
//! distances stacked along +z with identity orientation.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{EngineError, GeometryError, ValidationError};
use crate::geom::{EngineMetrics, Point3, TimingBucket, Transform, Vec3};

use super::config::TendonConfig;
use super::eyelet::{eyelet_positions, offset_frame};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Length bookkeeping for `K` tendons routed through `M` coupling elements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TendonAnalysis {
    /// `[K][M-1]` distances between consecutive eyelets.
    pub segment_lengths: Vec<Vec<f64>>,
    /// `[K][M]` cumulative lengths, 0 at the base.
    pub total_lengths: Vec<Vec<f64>>,
    /// `[K][M]` cumulative change against the straight configuration.
    pub length_changes: Vec<Vec<f64>>,
    /// `[K][M-1]`
    pub segment_length_changes: Vec<Vec<f64>>,
    /// `[K][M-1]`
    pub reference_segment_lengths: Vec<Vec<f64>>,
    /// `[M][K]` eyelet positions.
    pub routing_points: Vec<Vec<Point3>>,
}

impl TendonAnalysis {
    #[must_use]
    pub fn tendon_count(&self) -> usize {
        self.segment_lengths.len()
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.routing_points.len()
    }

    /// Cumulative change at the last coupling element, one per tendon.
    #[must_use]
    pub fn final_length_changes(&self) -> Vec<f64> {
        self.length_changes
            .iter()
            .map(|changes| changes.last().copied().unwrap_or(0.0))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PullDirection {
    Pull,
    Release,
    Hold,
}

impl PullDirection {
    /// Shortening needs a pull, lengthening a release.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn from_change(change: f64) -> Self {
        if change < 0.0 {
            Self::Pull
        } else if change > 0.0 {
            Self::Release
        } else {
            Self::Hold
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pull => "pull",
            Self::Release => "release",
            Self::Hold => "hold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActuationCommand {
    pub length_change_m: f64,
    pub pull_direction: PullDirection,
    pub magnitude: f64,
}

impl ActuationCommand {
    #[must_use]
    pub fn from_change(change: f64) -> Self {
        Self {
            length_change_m: change,
            pull_direction: PullDirection::from_change(change),
            magnitude: change.abs(),
        }
    }
}

/// Commands keyed by 1-based tendon id.
pub type ActuationCommands = BTreeMap<usize, ActuationCommand>;

/// Derives one command per tendon from its final cumulative length change.
#[must_use]
pub fn actuation_commands(analysis: &TendonAnalysis) -> ActuationCommands {
    analysis
        .final_length_changes()
        .into_iter()
        .enumerate()
        .map(|(index, change)| (index + 1, ActuationCommand::from_change(change)))
        .collect()
}

#[derive(Debug, Clone)]
pub struct TendonCalculator {
    config: TendonConfig,
}

impl TendonCalculator {
    pub fn new(config: TendonConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &TendonConfig {
        &self.config
    }

    pub fn calculate_tendon_lengths(
        &self,
        coupling_poses: &[Transform],
    ) -> Result<TendonAnalysis, EngineError> {
        self.calculate_with_metrics(coupling_poses, &mut EngineMetrics::default())
    }

    /// Same as [`calculate_tendon_lengths`](Self::calculate_tendon_lengths),
    /// accumulating eyelet and length timings into `metrics`.
    pub fn calculate_with_metrics(
        &self,
        coupling_poses: &[Transform],
        metrics: &mut EngineMetrics,
    ) -> Result<TendonAnalysis, EngineError> {
        if coupling_poses.is_empty() {
            return Err(ValidationError::EmptyArray {
                field: "coupling_poses",
            }
            .into());
        }
        let radii = self.config.radii_for(coupling_poses.len())?;
        let reference_poses = straightened(coupling_poses);

        let (routing_points, reference_points) = metrics.time(TimingBucket::Eyelets, || {
            Ok::<_, GeometryError>((
                self.routing_points(coupling_poses, &radii)?,
                self.routing_points(&reference_poses, &radii)?,
            ))
        })?;

        Ok(metrics.time(TimingBucket::TendonLengths, || {
            self.lengths(routing_points, &reference_points)
        }))
    }

    fn routing_points(
        &self,
        poses: &[Transform],
        radii: &[f64],
    ) -> Result<Vec<Vec<Point3>>, GeometryError> {
        let count = self.config.tendon_count();
        let offset = self.config.coupling_offset;
        let place = |(pose, &radius): (&Transform, &f64)| {
            eyelet_positions(&offset_frame(*pose, offset), count, radius)
        };

        #[cfg(feature = "parallel")]
        {
            poses.par_iter().zip(radii.par_iter()).map(place).collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            poses.iter().zip(radii).map(place).collect()
        }
    }

    fn lengths(
        &self,
        routing_points: Vec<Vec<Point3>>,
        reference_points: &[Vec<Point3>],
    ) -> TendonAnalysis {
        let tendons = self.config.tendon_count();
        let mut segment_lengths = Vec::with_capacity(tendons);
        let mut reference_segment_lengths = Vec::with_capacity(tendons);
        let mut segment_length_changes = Vec::with_capacity(tendons);
        let mut total_lengths = Vec::with_capacity(tendons);
        let mut length_changes = Vec::with_capacity(tendons);

        for tendon in 0..tendons {
            let bent = polyline_segments(&routing_points, tendon);
            let reference = polyline_segments(reference_points, tendon);
            let changes: Vec<f64> = bent.iter().zip(&reference).map(|(b, r)| b - r).collect();

            total_lengths.push(prefix_sums(&bent));
            length_changes.push(prefix_sums(&changes));
            segment_lengths.push(bent);
            reference_segment_lengths.push(reference);
            segment_length_changes.push(changes);
        }

        TendonAnalysis {
            segment_lengths,
            total_lengths,
            length_changes,
            segment_length_changes,
            reference_segment_lengths,
            routing_points,
        }
    }
}

/// Straight reference: identity rotation, z at the running sum of the
/// distances between consecutive coupling element origins.
fn straightened(coupling_poses: &[Transform]) -> Vec<Transform> {
    let mut z = 0.0;
    let mut previous: Option<Point3> = None;
    coupling_poses
        .iter()
        .map(|pose| {
            let origin = pose.origin();
            if let Some(previous) = previous {
                z += origin.distance_to(previous);
            }
            previous = Some(origin);
            Transform::translate(Vec3::new(0.0, 0.0, z))
        })
        .collect()
}

fn polyline_segments(points: &[Vec<Point3>], tendon: usize) -> Vec<f64> {
    points
        .windows(2)
        .map(|pair| pair[1][tendon].distance_to(pair[0][tendon]))
        .collect()
}

/// `[0, a, a+b, ...]`, one longer than `values`.
fn prefix_sums(values: &[f64]) -> Vec<f64> {
    let mut sums = Vec::with_capacity(values.len() + 1);
    let mut running = 0.0;
    sums.push(running);
    for value in values {
        running += value;
        sums.push(running);
    }
    sums
}
