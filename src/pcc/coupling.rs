//! Coupling element poses: the frames the tendon eyelets are mounted on.
//!
//! A chain with `N` backbone segments has `N + 2` coupling elements: the base
//! frame at the origin plus one frame at the midpoint of every coupling link.
//! When the bending parameters are known the frames are reconstructed exactly;
//! otherwise they are inferred from the sampled link directions.

use std::f64::consts::PI;

use serde::Serialize;

use crate::error::ValidationError;
use crate::geom::{IDENTITY_ROTATION, Point3, Rotation3, Tolerance, Transform, Vec3};

use super::chain::{RobotShape, SegmentKind};
use super::params::PccParams;
use super::transforms::{backbone_step, coupling_transform};

/// Position and orientation of one coupling element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CouplingElementPose {
    pub position: Point3,
    pub orientation: Rotation3,
}

impl CouplingElementPose {
    #[must_use]
    pub fn from_pose(pose: Transform) -> Self {
        Self {
            position: pose.origin(),
            orientation: pose.rotation(),
        }
    }

    #[must_use]
    pub fn pose(&self) -> Transform {
        Transform::from_rotation_translation(self.orientation, self.position.to_vec3())
    }
}

/// Rebuilds the coupling element frames by re-walking the chain from the
/// bending parameters.
///
/// Each link frame is the accumulated transform at the link start, translated
/// half the link length along its own z-axis. Couplings carry no rotation, so
/// the first link keeps the identity orientation and every later link inherits
/// the rotation of all backbone segments before it.
pub fn reconstruct_coupling_poses(params: &PccParams) -> Result<Vec<Transform>, ValidationError> {
    params.validate_geometry()?;

    let mut poses = Vec::with_capacity(params.coupling_element_count());
    poses.push(Transform::identity());

    let Some((&first_coupling, trailing_couplings)) = params.coupling_lengths.split_first() else {
        return Ok(poses);
    };

    let mut current = Transform::identity();
    poses.push(current.compose(coupling_transform(0.5 * first_coupling)));
    current = current.compose(coupling_transform(first_coupling));

    for (segment, &coupling_length) in params.segments().zip(trailing_couplings) {
        let step = backbone_step(segment, params.steps());
        for _ in 0..params.steps() {
            current = current.compose(step);
        }
        poses.push(current.compose(coupling_transform(0.5 * coupling_length)));
        current = current.compose(coupling_transform(coupling_length));
    }

    Ok(poses)
}

/// Infers coupling element frames from sampled positions only.
///
/// The frame sits at the link midpoint, oriented so its z-axis follows the
/// link direction. A zero-length link reuses the last known heading: the end
/// chord of the preceding backbone, or +z at the base.
#[must_use]
pub fn infer_coupling_poses(shape: &RobotShape) -> Vec<Transform> {
    let mut poses = Vec::with_capacity(shape.couplings().count() + 1);
    poses.push(Transform::identity());

    let mut heading = Vec3::Z;
    let mut previous_end = Point3::ORIGIN;
    for segment in &shape.segments {
        let (Some(start), Some(end)) = (segment.first(), segment.last()) else {
            continue;
        };
        match segment.kind {
            SegmentKind::Backbone => {
                let before = match segment.points.as_slice() {
                    [.., before, _] => *before,
                    _ => previous_end,
                };
                heading = direction_or(end - before, heading);
            }
            SegmentKind::Coupling => {
                heading = direction_or(end - start, heading);
                let orientation = orientation_from_direction(heading);
                poses.push(Transform::from_rotation_translation(
                    orientation,
                    start.midpoint(end).to_vec3(),
                ));
            }
        }
        previous_end = end;
    }

    poses
}

fn direction_or(direction: Vec3, fallback: Vec3) -> Vec3 {
    if Tolerance::ZERO_LENGTH.is_zero_vec3(direction) {
        fallback
    } else {
        direction
    }
}

/// Rotation whose z-axis points along `direction`, expressed as a torsion-free
/// bend from +z.
///
/// `θ = acos(z)` and `φ = atan2(y, x)` of the unit direction. Below 1e-6 rad the
/// result is the identity; within 1e-6 rad of a half turn φ is ill-conditioned
/// and the rotation is fixed to a half turn about y.
#[must_use]
pub fn orientation_from_direction(direction: Vec3) -> Rotation3 {
    let Some(unit) = direction.normalized() else {
        return IDENTITY_ROTATION;
    };

    let theta = unit.z.clamp(-1.0, 1.0).acos();
    if theta < Tolerance::ANGLE.eps {
        return IDENTITY_ROTATION;
    }
    if PI - theta < Tolerance::ANGLE.eps {
        return Transform::rotate_y(PI).rotation();
    }

    let phi = unit.y.atan2(unit.x);
    Transform::bend(theta, phi).rotation()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcc::chain::compute_shape;

    fn bent_params() -> PccParams {
        PccParams::new(
            vec![0.6, 1.0, -0.4],
            vec![0.3, 2.0, 4.1],
            vec![0.07, 0.05, 0.08],
            vec![0.03, 0.02, 0.04, 0.015],
            30,
        )
    }

    fn z_of(rotation: Rotation3) -> Vec3 {
        Vec3::new(rotation[0][2], rotation[1][2], rotation[2][2])
    }

    #[test]
    fn reconstructs_base_plus_one_pose_per_coupling() {
        let poses = reconstruct_coupling_poses(&bent_params()).expect("valid");
        assert_eq!(poses.len(), 5);
        assert_eq!(poses[0], Transform::identity());
        assert_eq!(poses[1].rotation(), IDENTITY_ROTATION);
        assert_eq!(poses[1].origin(), Point3::new(0.0, 0.0, 0.015));
        assert!(poses.iter().all(|p| p.is_rigid(Tolerance::LOOSE)));
    }

    #[test]
    fn explicit_poses_sit_on_link_midpoints() {
        let params = bent_params();
        let shape = compute_shape(&params).expect("valid");
        let poses = reconstruct_coupling_poses(&params).expect("valid");

        for (pose, link) in poses[1..].iter().zip(shape.couplings()) {
            let mid = link.points[0].midpoint(link.points[1]);
            assert!(Tolerance::new(1e-12).approx_eq_point3(pose.origin(), mid));
        }
    }

    #[test]
    fn inferred_frames_agree_with_explicit_z_axes() {
        let params = bent_params();
        let shape = compute_shape(&params).expect("valid");
        let explicit = reconstruct_coupling_poses(&params).expect("valid");
        let inferred = infer_coupling_poses(&shape);

        assert_eq!(explicit.len(), inferred.len());
        for (a, b) in explicit.iter().zip(&inferred) {
            assert!(Tolerance::new(1e-12).approx_eq_point3(a.origin(), b.origin()));
            assert!((a.z_axis() - b.z_axis()).length() < 1e-9);
        }
    }

    #[test]
    fn zero_length_coupling_keeps_backbone_heading() {
        let mut params = bent_params();
        params.coupling_lengths[2] = 0.0;
        let shape = compute_shape(&params).expect("valid");
        let explicit = reconstruct_coupling_poses(&params).expect("valid");
        let inferred = infer_coupling_poses(&shape);

        // The end chord lags the tangent by half a step angle.
        let lag = (explicit[3].z_axis() - inferred[3].z_axis()).length();
        assert!(lag < 0.05, "lag = {lag}");
    }

    #[test]
    fn orientation_branches() {
        assert_eq!(orientation_from_direction(Vec3::Z), IDENTITY_ROTATION);
        assert_eq!(orientation_from_direction(Vec3::ZERO), IDENTITY_ROTATION);

        let flipped = orientation_from_direction(-Vec3::Z);
        assert!((z_of(flipped) + Vec3::Z).length() < 1e-12);

        let sideways = orientation_from_direction(Vec3::new(0.0, 2.0, 0.0));
        assert!((z_of(sideways) - Vec3::Y).length() < 1e-12);
    }
}
