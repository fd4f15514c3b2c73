//! Tendon routing: eyelet placement, routing lengths and actuation.

mod calculator;
mod config;
mod engine;
mod eyelet;

pub use calculator::{
    ActuationCommand, ActuationCommands, PullDirection, TendonAnalysis, TendonCalculator,
    actuation_commands,
};
pub use config::{
    MAX_COUPLING_OFFSET, MAX_TENDON_COUNT, MAX_TENDON_RADIUS, MIN_TENDON_COUNT, TendonConfig,
    TendonRadius,
};
pub use engine::{
    AnalysisResult, CouplingData, CouplingFrames, RobotModel, TendonAnalysisEngine, analyze_pcc,
    compute_pcc_with_tendons,
};
pub use eyelet::{eyelet_positions, eyelets_from_origin, eyelets_from_rows, offset_frame};
