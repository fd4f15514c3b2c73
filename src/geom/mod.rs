//! Math primitives shared by the kinematics and tendon layers.

mod core;
mod metrics;

pub use self::core::{IDENTITY_ROTATION, Point3, Rotation3, Tolerance, Transform, Vec3};
pub use metrics::{EngineMetrics, TimingBucket, TimingReport};
