use std::f64::consts::{FRAC_PI_3, PI};

use pcc_engine::error::{EngineError, ValidationError};
use pcc_engine::geom::{Point3, Rotation3, Tolerance, Transform};
use pcc_engine::pcc::{CouplingFrameSource, PccParams, PccRobotModel, ShapeCache, build_chain};
use pcc_engine::tendon::{
    PullDirection, RobotModel, TendonConfig, compute_pcc_with_tendons, eyelets_from_origin,
};
use pcc_engine::{Engine, EngineOptions};

fn chain(bending: Vec<f64>, rotation: Vec<f64>, steps: i64) -> PccParams {
    let n = bending.len();
    PccParams::new(bending, rotation, vec![0.07; n], vec![0.03; n + 1], steps)
}

fn three_segment_bend() -> PccParams {
    chain(vec![PI / 5.0; 3], vec![FRAC_PI_3; 3], 100)
        .with_tendon_config(TendonConfig::new(3, 0.03, 0.0))
}

fn z_column(rotation: &Rotation3) -> [f64; 3] {
    [rotation[0][2], rotation[1][2], rotation[2][2]]
}

#[test]
fn engine_initializes() {
    let engine = Engine::new();
    assert!(engine.is_initialized());
    assert_eq!(engine.cache_size(), 0);
    assert_eq!(engine.frame_source(), CouplingFrameSource::ExplicitAngles);
}

#[test]
fn shape_has_two_n_plus_one_segments() {
    let mut cache = ShapeCache::new();
    let shape = build_chain(&chain(vec![0.2, 0.4, 0.6], vec![0.0; 3], 10), &mut cache)
        .expect("valid params");
    assert_eq!(shape.segment_count(), 7);
    let sizes: Vec<usize> = shape.segments.iter().map(|s| s.points.len()).collect();
    assert_eq!(sizes, vec![2, 10, 2, 10, 2, 10, 2]);
}

#[test]
fn straight_configuration_needs_no_actuation() {
    let params = chain(vec![0.0; 3], vec![0.3, 1.7, -2.2], 25);
    let result = compute_pcc_with_tendons(&params).expect("valid params");

    for changes in &result.tendon_analysis.length_changes {
        assert!(changes.iter().all(|c| c.abs() < 1e-6), "{changes:?}");
    }
    for segments in &result.tendon_analysis.segment_length_changes {
        assert!(segments.iter().all(|c| c.abs() < 1e-6));
    }
    for point in result.robot_positions.iter().flatten() {
        assert!(point.x.abs() < 1e-12 && point.y.abs() < 1e-12, "{point:?}");
    }
    let tip = result
        .robot_positions
        .last()
        .and_then(|segment| segment.last())
        .copied()
        .expect("tip");
    assert!(Tolerance::new(1e-9).approx_eq_point3(tip, Point3::new(0.0, 0.0, 0.33)));
}

#[test]
fn identical_requests_are_deterministic_and_cached() {
    let mut engine = Engine::new();
    let params = three_segment_bend();

    let first = engine.analyze(&params).expect("valid params");
    let second = engine.analyze(&params).expect("valid params");
    assert_eq!(first.robot_positions, second.robot_positions);
    assert_eq!(first.tendon_analysis, second.tendon_analysis);
    assert_eq!(first.actuation_commands, second.actuation_commands);
    assert_eq!(engine.cache_size(), 1);

    let stats = engine.cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);

    engine.clear_cache();
    assert_eq!(engine.cache_size(), 0);
}

#[test]
fn three_segment_bend_end_to_end() {
    let result = compute_pcc_with_tendons(&three_segment_bend()).expect("valid params");
    let analysis = &result.tendon_analysis;

    assert_eq!(analysis.length_changes.len(), 3);
    assert!(analysis.length_changes.iter().all(|row| row.len() == 5));
    assert_eq!(result.coupling_data.positions.len(), 5);

    let finals = analysis.final_length_changes();
    assert!(finals.iter().any(|c| *c < 0.0), "{finals:?}");
    assert!(finals.iter().any(|c| *c > 0.0), "{finals:?}");
    assert!(finals.iter().all(|c| c.abs() < 0.1), "{finals:?}");

    // Bend plane at 60°: the tendons at 0° and 120° sit on the inside.
    let commands = &result.actuation_commands;
    assert_eq!(commands[&1].pull_direction, PullDirection::Pull);
    assert_eq!(commands[&2].pull_direction, PullDirection::Pull);
    assert_eq!(commands[&3].pull_direction, PullDirection::Release);
    assert!((commands[&1].length_change_m - commands[&2].length_change_m).abs() < 1e-9);
}

#[test]
fn rejects_zero_discretization_steps() {
    let err = compute_pcc_with_tendons(&chain(vec![0.1], vec![0.0], 0)).unwrap_err();
    match err {
        EngineError::Validation(validation) => {
            assert_eq!(validation.field(), "discretization_steps");
            assert_eq!(validation.value(), "0");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn rejects_empty_bending_angles() {
    let params = PccParams::new(vec![], vec![0.0], vec![0.07], vec![0.03, 0.03], 10);
    assert!(matches!(
        Engine::new().shape(&params),
        Err(EngineError::Validation(ValidationError::EmptyArray {
            field: "bending_angles"
        }))
    ));
}

#[test]
fn rejects_radius_array_of_wrong_length() {
    let params = chain(vec![0.2, 0.2], vec![0.0; 2], 10)
        .with_tendon_config(TendonConfig::new(3, vec![0.03; 3], 0.0));
    let err = compute_pcc_with_tendons(&params).unwrap_err();
    let message = err.to_string();
    assert!(message.contains('4') && message.contains('3'), "{message}");
}

#[test]
fn engine_cache_is_bounded() {
    let mut engine = Engine::new();
    for i in 0..110 {
        let params = chain(vec![f64::from(i) * 0.001], vec![0.0], 2);
        engine.shape(&params).expect("valid params");
    }
    assert_eq!(engine.cache_size(), 100);
    assert_eq!(engine.cache_stats().evictions, 10);
}

#[test]
fn positions_only_frames_share_z_axes_with_explicit_frames() {
    let params = chain(vec![0.5, 0.9, 0.3], vec![0.0, 1.2, -2.0], 60);
    let explicit = Engine::new().analyze(&params).expect("valid params");
    let inferred = Engine::with_options(EngineOptions {
        frame_source: CouplingFrameSource::PositionsOnly,
        ..EngineOptions::default()
    })
    .analyze(&params)
    .expect("valid params");

    let pairs = explicit
        .coupling_data
        .orientations
        .iter()
        .zip(&inferred.coupling_data.orientations);
    for (a, b) in pairs {
        let (za, zb) = (z_column(a), z_column(b));
        for k in 0..3 {
            assert!((za[k] - zb[k]).abs() < 1e-9, "{za:?} vs {zb:?}");
        }
    }
}

#[test]
fn model_trait_is_usable_generically() {
    fn frame_count<M: RobotModel>(model: &mut M, params: &M::Params) -> usize {
        let shape = model.compute_robot_position(params).expect("valid params");
        model
            .coupling_elements(params, &shape)
            .expect("frames")
            .len()
    }
    let mut model = PccRobotModel::new();
    assert_eq!(frame_count(&mut model, &three_segment_bend()), 5);
}

#[test]
fn eyelets_on_identity_frame() {
    let eyelets = eyelets_from_origin(&Transform::identity(), 3, 0.03).expect("valid");
    let z: Vec<f64> = eyelets.iter().map(|e| e.origin().z).collect();
    assert_eq!(z, vec![0.0; 3]);
    assert!(Tolerance::new(1e-15).approx_eq_point3(eyelets[0].origin(), Point3::new(0.03, 0.0, 0.0)));
}

#[test]
fn json_boundary_round_trip() {
    let payload = r#"{
        "bending_angles": [0.6283185307179586, 0.6283185307179586, 0.6283185307179586],
        "rotation_angles": [1.0471975511965976, 1.0471975511965976, 1.0471975511965976],
        "backbone_lengths": [0.07, 0.07, 0.07],
        "coupling_lengths": [0.03, 0.03, 0.03, 0.03],
        "discretization_steps": 100,
        "tendon_config": {"count": 3, "radius": 0.03, "coupling_offset": 0.0}
    }"#;
    let mut engine = Engine::new();
    let json = engine.analyze_json(payload).expect("valid payload");
    let value: serde_json::Value = serde_json::from_str(&json).expect("json output");

    assert_eq!(value["model_type"], "pcc");
    assert_eq!(value["robot_positions"].as_array().map(Vec::len), Some(7));
    assert_eq!(value["tendon_config"]["radius"], 0.03);
    for id in ["1", "2", "3"] {
        let command = &value["actuation_commands"][id];
        assert!(command["magnitude"].as_f64().is_some_and(|m| m < 0.1));
    }

    assert!(matches!(
        engine.analyze_json("{\"bending_angles\": 3}"),
        Err(EngineError::Payload(_))
    ));
}

#[test]
fn negative_counts_at_json_boundary_are_validation_errors() {
    let mut engine = Engine::new();
    let steps = r#"{
        "bending_angles": [0.1],
        "rotation_angles": [0.0],
        "backbone_lengths": [0.07],
        "coupling_lengths": [0.03, 0.03],
        "discretization_steps": -5
    }"#;
    match engine.analyze_json(steps) {
        Err(EngineError::Validation(ValidationError::OutOfRange { field, value, .. })) => {
            assert_eq!(field, "discretization_steps");
            assert_eq!(value, -5.0);
        }
        other => panic!("unexpected result: {other:?}"),
    }

    let count = r#"{
        "bending_angles": [0.1],
        "rotation_angles": [0.0],
        "backbone_lengths": [0.07],
        "coupling_lengths": [0.03, 0.03],
        "discretization_steps": 5,
        "tendon_config": {"count": -1}
    }"#;
    let err = engine.analyze_json(count).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::OutOfRange {
            field: "tendon_config.count",
            ..
        })
    ));
    assert_eq!(engine.cache_size(), 0);
}
