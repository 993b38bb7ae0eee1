use std::time::Duration;

use dorling_rs::api::{
    AnimationController, AnimationStage, BuildInput, CARTOGRAM_FRAME_JSON_SCHEMA_V1,
    CartogramFrame, DorlingConfig,
};
use dorling_rs::core::{Point, RegionAnchor, StatResponse};

fn running_controller() -> AnimationController {
    let input = BuildInput::new(
        vec![
            RegionAnchor::new("NL11", Point::new(10.0, 10.0)).expect("anchor"),
            RegionAnchor::new("NL12", Point::new(12.0, 11.0)).expect("anchor"),
        ],
        StatResponse::from_entries([("NL11", Some(2_500_000.0)), ("NL12", Some(900_000.0))]),
        StatResponse::from_entries([("NL11", Some(4.2)), ("NL12", Some(-1.1))]),
    );
    let mut controller = AnimationController::new(DorlingConfig::new()).expect("controller");
    controller.build(&input).expect("build");
    controller.advance(Duration::from_secs(2));
    controller.advance(Duration::from_millis(16));
    controller
}

#[test]
fn frame_contract_v1_round_trips() {
    let controller = running_controller();
    let frame = controller.frame().expect("frame");
    assert_eq!(frame.stage, AnimationStage::Cartogram);

    let json = frame.to_json_pretty().expect("serialize");
    assert!(json.contains(&format!("\"schema_version\": {CARTOGRAM_FRAME_JSON_SCHEMA_V1}")));

    let restored = CartogramFrame::from_json_compat_str(&json).expect("parse");
    assert_eq!(restored.stage, frame.stage);
    assert_eq!(restored.run_id, frame.run_id);
    assert_eq!(restored.tick, frame.tick);
    assert_eq!(restored.circles.len(), frame.circles.len());
    for (a, b) in restored.circles.iter().zip(&frame.circles) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.color.to_hex(), b.color.to_hex());
        assert!((a.x - b.x).abs() <= 1e-9);
        assert!((a.y - b.y).abs() <= 1e-9);
        assert!((a.radius - b.radius).abs() <= 1e-9);
    }
}

#[test]
fn bare_frame_json_is_accepted() {
    let controller = running_controller();
    let frame = controller.frame().expect("frame");
    let bare = serde_json::to_string(frame).expect("serialize bare frame");

    let restored = CartogramFrame::from_json_compat_str(&bare).expect("parse");
    assert_eq!(restored.circles.len(), 2);
    assert!(restored.circle("NL12").is_some());
}

#[test]
fn unsupported_schema_version_is_rejected() {
    let json = r#"{ "schema_version": 99, "frame": { "stage": "Geographic", "run_id": 0, "tick": 0, "circles": [] } }"#;
    assert!(CartogramFrame::from_json_compat_str(json).is_err());
}
