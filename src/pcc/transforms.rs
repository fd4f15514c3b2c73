//! Local transforms for the two link types of the chain.

use crate::geom::{Transform, Vec3};

use super::params::SegmentSpec;

/// Straight rigid coupling link: identity rotation, `length` along local z.
#[must_use]
pub fn coupling_transform(length: f64) -> Transform {
    Transform::translate(Vec3::new(0.0, 0.0, length))
}

/// One integration step of a constant-curvature arc split into `steps` pieces.
///
/// The rotation is the torsion-free bend `Rz(φ)·Ry(δθ)·Rz(−φ)`; the translation is
/// the chord of a circular arc of length `δL` turning through `δθ`, or a straight
/// `δL` along z when the step does not bend.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn backbone_step(segment: SegmentSpec, steps: usize) -> Transform {
    let steps = steps.max(1) as f64;
    let delta_theta = segment.bending_angle / steps;
    let delta_length = segment.length / steps;
    let phi = segment.rotation_angle;

    let rotation = Transform::bend(delta_theta, phi).rotation();
    let translation = if delta_theta == 0.0 {
        Vec3::new(0.0, 0.0, delta_length)
    } else {
        let versine = 1.0 - delta_theta.cos();
        Vec3::new(phi.cos() * versine, phi.sin() * versine, delta_theta.sin())
            * (delta_length / delta_theta)
    };

    Transform::from_rotation_translation(rotation, translation)
}

/// The `steps` local incremental transforms of a backbone segment.
///
/// Every step of a constant-curvature arc is the same transform, so the list is the
/// single [`backbone_step`] repeated.
#[must_use]
pub fn backbone_transforms(segment: SegmentSpec, steps: usize) -> Vec<Transform> {
    if steps == 0 {
        return Vec::new();
    }
    vec![backbone_step(segment, steps); steps]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Point3, Tolerance};
    use std::f64::consts::{FRAC_PI_2, PI};

    fn segment(bending_angle: f64, rotation_angle: f64, length: f64) -> SegmentSpec {
        SegmentSpec {
            bending_angle,
            rotation_angle,
            length,
        }
    }

    fn tip(segment: SegmentSpec, steps: usize) -> Transform {
        backbone_transforms(segment, steps)
            .into_iter()
            .fold(Transform::identity(), Transform::compose)
    }

    #[test]
    fn coupling_is_pure_translation() {
        let t = coupling_transform(0.03);
        assert_eq!(t.translation(), Vec3::new(0.0, 0.0, 0.03));
        assert_eq!(t.rotation(), Transform::identity().rotation());
    }

    #[test]
    fn produces_requested_step_count() {
        assert_eq!(backbone_transforms(segment(0.5, 0.2, 0.1), 17).len(), 17);
        assert!(backbone_transforms(segment(0.5, 0.2, 0.1), 0).is_empty());
    }

    #[test]
    fn straight_limit_avoids_division_by_zero() {
        let end = tip(segment(0.0, 1.3, 0.07), 10);
        let origin = end.origin();
        assert!(origin.x.abs() < 1e-15 && origin.y.abs() < 1e-15);
        assert!((origin.z - 0.07).abs() < 1e-12);
        assert!(origin.z.is_finite());
    }

    #[test]
    fn quarter_circle_lands_on_arc_end() {
        // Arc of length L turning 90° in the xz-plane has radius 2L/π.
        let length = 0.1;
        let radius = length / FRAC_PI_2;
        let end = tip(segment(FRAC_PI_2, 0.0, length), 50);

        let expected = Point3::new(radius, 0.0, radius);
        assert!(Tolerance::new(1e-12).approx_eq_point3(end.origin(), expected));
        assert!((end.z_axis() - Vec3::X).length() < 1e-12);
    }

    #[test]
    fn chord_is_exact_for_any_step_count() {
        let seg = segment(1.2, 0.7, 0.09);
        let coarse = tip(seg, 1).origin();
        let fine = tip(seg, 400).origin();
        assert!(Tolerance::new(1e-12).approx_eq_point3(coarse, fine));
    }

    #[test]
    fn half_turn_points_backwards() {
        let end = tip(segment(PI, FRAC_PI_2, 0.1), 100);
        assert!((end.z_axis().z + 1.0).abs() < 1e-9);
        // Bending towards +y folds the tip over to the +y side.
        assert!(end.origin().y > 0.0);
        assert!(end.is_rigid(Tolerance::LOOSE));
    }
}
