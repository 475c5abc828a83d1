use mocap_core::{parse_motion, parse_skeleton, Config, Kinematics, Pose, ROOT};

/// it should parse a skeleton and its motion, then pose every frame
#[test]
fn two_bone_pipeline() {
    let asf = mocap_test_fixtures::skeletons::text("two-bone").expect("load two-bone");
    let amc = mocap_test_fixtures::motions::text("two-bone-300").expect("load two-bone-300");
    assert_eq!(
        mocap_test_fixtures::motions::skeleton("two-bone-300").unwrap(),
        "two-bone"
    );

    let skeleton = parse_skeleton(&asf).expect("parse skeleton");
    assert_eq!(skeleton.len(), 3);
    assert_eq!(skeleton.children(ROOT), &["lfemur", "rfemur"]);

    let motion = parse_motion(&amc, &skeleton).expect("parse motion");
    assert_eq!(motion.frame_count(), 300);
    assert_eq!(motion.duration(), 10.0);
    assert_eq!(motion.frame_time(150), 5.0);

    let kinematics = Kinematics::new(&skeleton).with_motion(&motion);
    let poses: Vec<Pose> = kinematics.frames().collect();
    assert_eq!(poses.len(), 300);
    assert!(poses.iter().all(|pose| pose.len() == 3));

    // Same input, same output.
    let again = parse_motion(&amc, &parse_skeleton(&asf).unwrap()).unwrap();
    assert_eq!(again, motion);
    assert_eq!(kinematics.posed_positions(42).unwrap(), poses[42]);
}

/// it should serialize parsed models and poses to JSON
#[test]
fn models_serialize() {
    let asf = mocap_test_fixtures::skeletons::text("subject").unwrap();
    let amc = mocap_test_fixtures::motions::text("subject-walk").unwrap();
    let skeleton = parse_skeleton(&asf).unwrap();
    let motion = parse_motion(&amc, &skeleton).unwrap();

    let json = serde_json::to_value(&skeleton).expect("serialize skeleton");
    assert_eq!(json["name"], "subject01");
    assert_eq!(json["joints"].as_array().map(Vec::len), Some(11));
    assert_eq!(json["hierarchy"]["thorax"][0], "head");

    let motion_json = serde_json::to_string(&motion).unwrap();
    let decoded: mocap_core::Motion = serde_json::from_str(&motion_json).unwrap();
    assert_eq!(decoded, motion);

    let pose = Kinematics::new(&skeleton).bind_pose().clone();
    let json = serde_json::to_value(&pose).unwrap();
    assert_eq!(json["positions"]["head"][1], 9.0);
}

/// it should read configuration from JSON with missing fields defaulted
#[test]
fn config_from_json() {
    let config: Config =
        serde_json::from_str(r#"{ "delimiter": "whitespace", "root_motion": "translated" }"#)
            .expect("parse config");
    assert_eq!(config.frame_rate, 30);
    assert_eq!(config.version, "1.10");
    assert!(config.validate().is_ok());

    let asf = mocap_test_fixtures::skeletons::text("subject-spaces").unwrap();
    let skeleton = mocap_core::SkeletonParser::new(config).parse_str(&asf).unwrap();
    assert_eq!(skeleton.len(), 11);
}
