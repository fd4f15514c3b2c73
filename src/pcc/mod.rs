//! Piecewise-constant-curvature kinematics.
//!
//! The chain alternates straight coupling links and constant-curvature backbone
//! segments, starting and ending with a coupling:
//!
//! ```text
//! base ─ coupling₀ ─ backbone₀ ─ coupling₁ ─ ... ─ backbone_{N-1} ─ coupling_N ─ tip
//! ```
//!
//! [`build_chain`] samples the centreline, [`reconstruct_coupling_poses`] yields
//! the frames the tendon layer mounts eyelets on, and [`PccRobotModel`] wires both
//! into the analysis engine behind a FIFO [`ShapeCache`].

mod cache;
mod chain;
mod coupling;
mod model;
mod params;
mod transforms;

pub use cache::{
    DEFAULT_CACHE_CAPACITY, ParamsHash, ShapeCache, ShapeCacheOptions, ShapeCacheStats,
    params_hash,
};
pub use chain::{RobotShape, SegmentKind, ShapeSegment, build_chain, compute_shape};
pub use coupling::{
    CouplingElementPose, infer_coupling_poses, orientation_from_direction,
    reconstruct_coupling_poses,
};
pub use model::{CouplingFrameSource, PccRobotModel};
pub use params::{MAX_DISCRETIZATION_STEPS, MIN_DISCRETIZATION_STEPS, PccParams, SegmentSpec};
pub use transforms::{backbone_step, backbone_transforms, coupling_transform};
