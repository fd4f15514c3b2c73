//! Forward kinematics: walks coupling and backbone links from the base and
//! records the sampled centreline of every link.

use serde::{Serialize, Serializer};

use crate::error::ValidationError;
use crate::geom::{Point3, Transform};

use super::cache::{ParamsHash, ShapeCache};
use super::params::PccParams;
use super::transforms::{backbone_step, coupling_transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// Rigid straight link, sampled at its two end points.
    Coupling,
    /// Constant-curvature section, sampled at the end of every step.
    Backbone,
}

/// Sampled points of one link. Serializes as the bare point list.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeSegment {
    pub kind: SegmentKind,
    pub points: Vec<Point3>,
}

impl ShapeSegment {
    #[must_use]
    pub fn first(&self) -> Option<Point3> {
        self.points.first().copied()
    }

    #[must_use]
    pub fn last(&self) -> Option<Point3> {
        self.points.last().copied()
    }
}

impl Serialize for ShapeSegment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.points.serialize(serializer)
    }
}

/// Ordered segments from base to tip: `coupling, backbone, coupling, ...`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RobotShape {
    pub segments: Vec<ShapeSegment>,
}

impl RobotShape {
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn couplings(&self) -> impl Iterator<Item = &ShapeSegment> {
        self.segments
            .iter()
            .filter(|segment| segment.kind == SegmentKind::Coupling)
    }

    pub fn backbones(&self) -> impl Iterator<Item = &ShapeSegment> {
        self.segments
            .iter()
            .filter(|segment| segment.kind == SegmentKind::Backbone)
    }

    /// Last sampled point of the chain.
    #[must_use]
    pub fn tip(&self) -> Option<Point3> {
        self.segments.last().and_then(ShapeSegment::last)
    }

    /// The shape as plain point lists, one per segment.
    #[must_use]
    pub fn robot_positions(&self) -> Vec<Vec<Point3>> {
        self.segments
            .iter()
            .map(|segment| segment.points.clone())
            .collect()
    }
}

/// Computes the shape through `cache`.
///
/// Validation runs before the lookup, so a rejected request never touches the
/// cache. A hit returns a clone of the stored shape.
pub fn build_chain(
    params: &PccParams,
    cache: &mut ShapeCache,
) -> Result<RobotShape, ValidationError> {
    params.validate_geometry()?;

    let key = ParamsHash::of(params);
    if let Some(shape) = cache.get(&key) {
        log::debug!("shape cache hit {key}");
        return Ok(shape.clone());
    }

    let shape = walk_chain(params);
    log::debug!(
        "built shape with {} segments ({} steps per backbone)",
        shape.segment_count(),
        params.discretization_steps
    );
    cache.insert(key, shape.clone());
    Ok(shape)
}

/// Computes the shape without caching.
pub fn compute_shape(params: &PccParams) -> Result<RobotShape, ValidationError> {
    params.validate_geometry()?;
    Ok(walk_chain(params))
}

fn walk_chain(params: &PccParams) -> RobotShape {
    let steps = params.steps();
    let mut segments = Vec::with_capacity(2 * params.segment_count() + 1);
    let mut current = Transform::identity();

    let Some((&first_coupling, trailing_couplings)) = params.coupling_lengths.split_first() else {
        return RobotShape::default();
    };
    segments.push(coupling_segment(&mut current, first_coupling));

    for (segment, &coupling_length) in params.segments().zip(trailing_couplings) {
        let step = backbone_step(segment, steps);
        let mut points = Vec::with_capacity(steps);
        for _ in 0..steps {
            current = current.compose(step);
            points.push(current.origin());
        }
        segments.push(ShapeSegment {
            kind: SegmentKind::Backbone,
            points,
        });
        segments.push(coupling_segment(&mut current, coupling_length));
    }

    RobotShape { segments }
}

/// Advances `current` across a coupling link and returns its two end points.
fn coupling_segment(current: &mut Transform, length: f64) -> ShapeSegment {
    let start = current.origin();
    *current = current.compose(coupling_transform(length));
    ShapeSegment {
        kind: SegmentKind::Coupling,
        points: vec![start, current.origin()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Tolerance;

    fn params(bending: Vec<f64>, steps: i64) -> PccParams {
        let n = bending.len();
        PccParams::new(
            bending,
            vec![0.0; n],
            vec![0.07; n],
            vec![0.03; n + 1],
            steps,
        )
    }

    #[test]
    fn layout_alternates_coupling_and_backbone() {
        let shape = compute_shape(&params(vec![0.0; 3], 10)).expect("valid");
        assert_eq!(shape.segment_count(), 7);
        for (i, segment) in shape.segments.iter().enumerate() {
            if i % 2 == 0 {
                assert_eq!(segment.kind, SegmentKind::Coupling);
                assert_eq!(segment.points.len(), 2);
            } else {
                assert_eq!(segment.kind, SegmentKind::Backbone);
                assert_eq!(segment.points.len(), 10);
            }
        }
        assert_eq!(shape.couplings().count(), 4);
        assert_eq!(shape.backbones().count(), 3);
    }

    #[test]
    fn backbones_end_where_the_next_coupling_starts() {
        let mut p = params(vec![0.4, -0.3, 0.9], 25);
        p.rotation_angles = vec![0.0, 1.1, 2.5];
        let shape = compute_shape(&p).expect("valid");
        assert_eq!(shape.segments[0].first(), Some(Point3::ORIGIN));

        for pair in shape.segments.windows(2) {
            let end = pair[0].last().expect("non-empty");
            let start = pair[1].first().expect("non-empty");
            match pair[0].kind {
                SegmentKind::Backbone => assert_eq!(end, start),
                // A backbone's first sample is already one step along the arc.
                SegmentKind::Coupling => {
                    let gap = end.distance_to(start);
                    assert!(gap > 0.0 && gap <= 0.07 / 25.0 + 1e-12, "gap = {gap}");
                }
            }
        }
    }

    #[test]
    fn straight_chain_tip_is_total_length() {
        let shape = compute_shape(&params(vec![0.0; 3], 10)).expect("valid");
        let tip = shape.tip().expect("tip");
        let expected = Point3::new(0.0, 0.0, 3.0 * 0.07 + 4.0 * 0.03);
        assert!(Tolerance::new(1e-12).approx_eq_point3(tip, expected));
    }

    #[test]
    fn cache_returns_identical_shape() {
        let mut cache = ShapeCache::new();
        let p = params(vec![0.3, 0.6], 40);
        let first = build_chain(&p, &mut cache).expect("valid");
        let second = build_chain(&p, &mut cache).expect("valid");
        assert_eq!(first, second);

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn invalid_params_skip_cache() {
        let mut cache = ShapeCache::new();
        let mut p = params(vec![0.3], 10);
        p.discretization_steps = 0;
        assert!(build_chain(&p, &mut cache).is_err());
        assert_eq!(cache.stats(), Default::default());
    }

    #[test]
    fn serializes_as_point_lists() {
        let shape = compute_shape(&params(vec![0.0], 1)).expect("valid");
        let value = serde_json::to_value(&shape).expect("serializable");
        let segments = value["segments"].as_array().expect("array");
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0][0], serde_json::json!([0.0, 0.0, 0.0]));
        assert_eq!(shape.robot_positions().len(), 3);
    }
}
