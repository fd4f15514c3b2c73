//! Model-agnostic tendon analysis pipeline.

use serde::Serialize;

use crate::error::{EngineError, ValidationError};
use crate::geom::{EngineMetrics, Point3, Rotation3, TimingBucket, TimingReport, Transform};
use crate::pcc::{PccParams, PccRobotModel, RobotShape};

use super::calculator::{ActuationCommands, TendonAnalysis, TendonCalculator, actuation_commands};
use super::config::TendonConfig;

/// Coupling element frames as a robot model reports them.
#[derive(Debug, Clone, PartialEq)]
pub enum CouplingFrames {
    /// Full homogeneous poses.
    Poses(Vec<Transform>),
    /// Positions and rotations reported separately; counts must agree.
    Split {
        positions: Vec<Point3>,
        orientations: Vec<Rotation3>,
    },
}

impl CouplingFrames {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Poses(poses) => poses.len(),
            Self::Split { positions, .. } => positions.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Assembles full poses, rejecting split frames whose counts disagree.
    pub fn into_poses(self) -> Result<Vec<Transform>, ValidationError> {
        match self {
            Self::Poses(poses) => Ok(poses),
            Self::Split {
                positions,
                orientations,
            } => {
                ValidationError::check_len(
                    "coupling_orientations",
                    positions.len(),
                    orientations.len(),
                )?;
                Ok(positions
                    .into_iter()
                    .zip(orientations)
                    .map(|(position, rotation)| {
                        Transform::from_rotation_translation(rotation, position.to_vec3())
                    })
                    .collect())
            }
        }
    }
}

/// A kinematic model the analysis engine can route tendons through.
pub trait RobotModel {
    type Params;

    /// Short identifier reported in analysis results.
    fn model_type(&self) -> &str;

    fn compute_robot_position(&mut self, params: &Self::Params) -> Result<RobotShape, EngineError>;

    /// Frames the eyelets are mounted on, base first.
    fn coupling_elements(
        &self,
        params: &Self::Params,
        shape: &RobotShape,
    ) -> Result<CouplingFrames, EngineError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CouplingData {
    pub positions: Vec<Point3>,
    pub orientations: Vec<Rotation3>,
}

impl CouplingData {
    #[must_use]
    pub fn from_poses(poses: &[Transform]) -> Self {
        Self {
            positions: poses.iter().map(|pose| pose.origin()).collect(),
            orientations: poses.iter().map(|pose| pose.rotation()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub robot_positions: Vec<Vec<Point3>>,
    pub coupling_data: CouplingData,
    pub tendon_analysis: TendonAnalysis,
    pub actuation_commands: ActuationCommands,
    pub model_type: String,
    pub tendon_config: TendonConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<TimingReport>,
}

/// Runs a [`RobotModel`] and routes the configured tendons through its
/// coupling elements.
#[derive(Debug, Clone)]
pub struct TendonAnalysisEngine {
    calculator: TendonCalculator,
}

impl TendonAnalysisEngine {
    pub fn new(config: TendonConfig) -> Result<Self, ValidationError> {
        Ok(Self {
            calculator: TendonCalculator::new(config)?,
        })
    }

    #[must_use]
    pub fn config(&self) -> &TendonConfig {
        self.calculator.config()
    }

    pub fn analyze<M: RobotModel>(
        &self,
        model: &mut M,
        params: &M::Params,
    ) -> Result<AnalysisResult, EngineError> {
        let mut metrics = EngineMetrics::default();
        metrics.begin();

        let shape = metrics.time(TimingBucket::ChainBuild, || {
            model.compute_robot_position(params)
        })?;
        let frames = metrics.time(TimingBucket::CouplingFrames, || {
            model.coupling_elements(params, &shape)
        })?;
        let poses = frames.into_poses()?;

        let tendon_analysis = self.calculator.calculate_with_metrics(&poses, &mut metrics)?;
        let actuation_commands = metrics.time(TimingBucket::Actuation, || {
            actuation_commands(&tendon_analysis)
        });

        log::debug!(
            "{} analysis: {} coupling elements, {} tendons",
            model.model_type(),
            poses.len(),
            tendon_analysis.tendon_count()
        );

        Ok(AnalysisResult {
            robot_positions: shape.robot_positions(),
            coupling_data: CouplingData::from_poses(&poses),
            tendon_analysis,
            actuation_commands,
            model_type: model.model_type().to_owned(),
            tendon_config: self.config().clone(),
            timing: metrics.end(),
        })
    }
}

/// One-shot PCC analysis with the tendon configuration carried by `params`
/// (the default configuration when absent).
pub fn compute_pcc_with_tendons(params: &PccParams) -> Result<AnalysisResult, EngineError> {
    analyze_pcc(&mut PccRobotModel::new(), params)
}

/// Like [`compute_pcc_with_tendons`], reusing `model` and its shape cache.
pub fn analyze_pcc(
    model: &mut PccRobotModel,
    params: &PccParams,
) -> Result<AnalysisResult, EngineError> {
    params.validate()?;
    let engine = TendonAnalysisEngine::new(params.tendon_config.clone().unwrap_or_default())?;
    engine.analyze(model, params)
}
