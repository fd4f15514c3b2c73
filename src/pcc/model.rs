//! The PCC robot model plugged into the tendon analysis engine.

use crate::error::EngineError;
use crate::tendon::{CouplingFrames, RobotModel};

use super::cache::ShapeCache;
use super::chain::{RobotShape, build_chain};
use super::coupling::{infer_coupling_poses, reconstruct_coupling_poses};
use super::params::PccParams;

/// How coupling element frames are derived for the tendon layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CouplingFrameSource {
    /// Re-walk the chain from the bending parameters (exact orientations).
    #[default]
    ExplicitAngles,
    /// Infer orientations from the sampled link directions.
    PositionsOnly,
}

/// Piecewise-constant-curvature model. Owns the shape cache so repeated
/// requests with the same geometry skip the chain walk.
#[derive(Debug, Default)]
pub struct PccRobotModel {
    frame_source: CouplingFrameSource,
    cache: ShapeCache,
}

impl PccRobotModel {
    pub const MODEL_TYPE: &'static str = "pcc";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_frame_source(mut self, frame_source: CouplingFrameSource) -> Self {
        self.frame_source = frame_source;
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: ShapeCache) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn frame_source(&self) -> CouplingFrameSource {
        self.frame_source
    }

    #[must_use]
    pub fn cache(&self) -> &ShapeCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ShapeCache {
        &mut self.cache
    }
}

impl RobotModel for PccRobotModel {
    type Params = PccParams;

    fn model_type(&self) -> &str {
        Self::MODEL_TYPE
    }

    fn compute_robot_position(&mut self, params: &PccParams) -> Result<RobotShape, EngineError> {
        Ok(build_chain(params, &mut self.cache)?)
    }

    fn coupling_elements(
        &self,
        params: &PccParams,
        shape: &RobotShape,
    ) -> Result<CouplingFrames, EngineError> {
        match self.frame_source {
            CouplingFrameSource::ExplicitAngles => {
                Ok(CouplingFrames::Poses(reconstruct_coupling_poses(params)?))
            }
            CouplingFrameSource::PositionsOnly => {
                let poses = infer_coupling_poses(shape);
                Ok(CouplingFrames::Split {
                    positions: poses.iter().map(|pose| pose.origin()).collect(),
                    orientations: poses.iter().map(|pose| pose.rotation()).collect(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> PccParams {
        PccParams::new(
            vec![0.5, 0.2],
            vec![0.0, 1.0],
            vec![0.07, 0.07],
            vec![0.03, 0.03, 0.03],
            20,
        )
    }

    #[test]
    fn reports_model_type() {
        assert_eq!(PccRobotModel::new().model_type(), "pcc");
    }

    #[test]
    fn repeated_positions_hit_cache() {
        let mut model = PccRobotModel::new();
        let first = model.compute_robot_position(&params()).expect("valid");
        let second = model.compute_robot_position(&params()).expect("valid");
        assert_eq!(first, second);
        assert_eq!(model.cache().stats().hits, 1);
        assert_eq!(model.cache().len(), 1);

        model.cache_mut().clear();
        assert!(model.cache().is_empty());
    }

    #[test]
    fn frame_source_selects_variant() {
        let p = params();
        let mut explicit = PccRobotModel::new();
        let shape = explicit.compute_robot_position(&p).expect("valid");
        assert!(matches!(
            explicit.coupling_elements(&p, &shape),
            Ok(CouplingFrames::Poses(poses)) if poses.len() == 4
        ));

        let inferred = PccRobotModel::new().with_frame_source(CouplingFrameSource::PositionsOnly);
        match inferred.coupling_elements(&p, &shape) {
            Ok(CouplingFrames::Split {
                positions,
                orientations,
            }) => {
                assert_eq!(positions.len(), 4);
                assert_eq!(orientations.len(), 4);
            }
            other => panic!("unexpected frames: {other:?}"),
        }
    }

    #[test]
    fn invalid_params_surface_as_validation_errors() {
        let mut p = params();
        p.rotation_angles.pop();
        let err = PccRobotModel::new()
            .compute_robot_position(&p)
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }
}
