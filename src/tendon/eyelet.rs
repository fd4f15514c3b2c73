//! Eyelet placement around a coupling frame.

use std::f64::consts::TAU;

use crate::error::GeometryError;
use crate::geom::{Point3, Transform, Vec3};

/// Places `count` eyelets evenly on a circle of `radius` in the local xy-plane
/// of `origin`. Eyelet `i` sits at angle `2πi / count` from the local x-axis and
/// keeps the orientation of `origin`.
pub fn eyelets_from_origin(
    origin: &Transform,
    count: usize,
    radius: f64,
) -> Result<Vec<Transform>, GeometryError> {
    Ok(eyelet_positions(origin, count, radius)?
        .into_iter()
        .map(|position| origin.with_origin(position))
        .collect())
}

/// Positions only, without the per-eyelet frames.
pub fn eyelet_positions(
    origin: &Transform,
    count: usize,
    radius: f64,
) -> Result<Vec<Point3>, GeometryError> {
    if count < 1 {
        return Err(GeometryError::InvalidEyeletCount { count });
    }
    if radius < 0.0 {
        return Err(GeometryError::NegativeRadius { radius });
    }
    if !origin.is_homogeneous() {
        return Err(GeometryError::NonHomogeneousPose);
    }

    Ok((0..count)
        .map(|i| {
            let angle = TAU * i as f64 / count as f64;
            let local = Point3::new(radius * angle.cos(), radius * angle.sin(), 0.0);
            origin.apply_point(local)
        })
        .collect())
}

/// Boundary variant taking the origin as nested rows.
pub fn eyelets_from_rows(
    rows: &[Vec<f64>],
    count: usize,
    radius: f64,
) -> Result<Vec<Transform>, GeometryError> {
    let origin = Transform::try_from(rows)?;
    eyelets_from_origin(&origin, count, radius)
}

/// Shifts a coupling frame along its own z-axis to the eyelet plane.
#[must_use]
pub fn offset_frame(frame: Transform, coupling_offset: f64) -> Transform {
    frame.compose(Transform::translate(Vec3::new(0.0, 0.0, coupling_offset)))
}
