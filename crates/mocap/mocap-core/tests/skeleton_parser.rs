use mocap_core::{
    parse_skeleton, Config, Delimiter, ErrorKind, EulerOrder, Limit, MocapError, SkeletonParser,
    ROOT,
};

fn subject_text() -> String {
    mocap_test_fixtures::skeletons::text("subject").expect("load subject fixture")
}

/// Minimal tab-delimited skeleton with one bone block per entry of `bones`.
fn asf_with_bones(bones: &[&str]) -> String {
    let mut text = String::from(
        ":version\t1.10\n:name\tmini\n:units\n\tmass\t1.0\n\tlength\t1.0\n\tangle\tdeg\n\
         :documentation\n:root\n\taxis\tXYZ\n\torder\tTX\tTY\tTZ\tRX\tRY\tRZ\n\
         \tposition\t0\t0\t0\n\torientation\t0\t0\t0\n:bonedata\n",
    );
    for bone in bones {
        text.push_str(bone);
    }
    text.push_str(":hierarchy\n\tbegin\n\t\troot");
    for bone in bones {
        let name = bone
            .lines()
            .find_map(|l| l.trim().strip_prefix("name\t"))
            .expect("bone block has a name");
        text.push('\t');
        text.push_str(name);
    }
    text.push_str("\n\tend\n");
    text
}

fn bone(name: &str, axis: &str) -> String {
    format!(
        "\tbegin\n\t\tname\t{name}\n\t\tdirection\t1\t0\t0\n\t\tlength\t5\n\t\taxis\t{axis}\n\
         \t\tdof\trx\try\trz\n\t\tlimits\t(-90\t90)\n\t\t\t(-90\t90)\n\t\t\t(-90\t90)\n\tend\n"
    )
}

/// it should produce one joint per bone block plus the root
#[test]
fn joint_count_is_bones_plus_root() {
    let skeleton = parse_skeleton(&subject_text()).expect("parse subject");
    let blocks = subject_text().matches("\tbegin\n\t\tid").count();
    assert_eq!(blocks, 10);
    assert_eq!(skeleton.len(), blocks + 1);
    assert_eq!(skeleton.name(), "subject01");
    assert!(skeleton.contains(ROOT));
}

/// it should give every non-root joint exactly one parent and reach all joints from the root
#[test]
fn hierarchy_is_a_tree() {
    let skeleton = parse_skeleton(&subject_text()).expect("parse subject");
    assert_eq!(skeleton.parent_of(ROOT).unwrap(), None);
    for joint in skeleton.joints().iter().filter(|j| !j.is_root()) {
        let parent = skeleton.parent_of(joint.name()).unwrap();
        assert!(parent.is_some(), "{} has no parent", joint.name());
    }
    assert_eq!(skeleton.depth_first().len(), skeleton.len());
    assert_eq!(skeleton.bones().len(), skeleton.len() - 1);
    assert_eq!(skeleton.parent_of("head").unwrap(), Some("thorax"));
    assert_eq!(
        skeleton.children(ROOT),
        &["lhipjoint", "rhipjoint", "lowerback"]
    );
}

/// it should keep every field of a bone block
#[test]
fn bone_fields_are_parsed() {
    let skeleton = parse_skeleton(&subject_text()).expect("parse subject");

    let femur = skeleton.joint("lfemur").unwrap();
    assert_eq!(femur.id(), Some(2));
    assert_eq!(femur.direction(), [0.0, -1.0, 0.0]);
    assert_eq!(femur.length(), 7.0);
    assert_eq!(femur.offset(), [0.0, -7.0, 0.0]);
    assert_eq!(femur.rotation_order(), EulerOrder::XYZ);
    assert_eq!(femur.axis_value("Z"), Some(20.0));
    assert_eq!(femur.dof(), &["rx", "ry", "rz"]);
    assert_eq!(femur.limit("rx"), Some(&Limit::new(-160.0, 20.0)));
    assert_eq!(femur.limit("rz"), Some(&Limit::new(-60.0, 70.0)));

    let tibia = skeleton.joint("ltibia").unwrap();
    assert_eq!(tibia.dof_count(), 1);
    assert_eq!(tibia.limits().count(), 1);
}

/// it should accept bones without a dof line
#[test]
fn dofless_bone_has_no_channels() {
    let skeleton = parse_skeleton(&subject_text()).expect("parse subject");
    let hip = skeleton.joint("lhipjoint").unwrap();
    assert!(hip.dof().is_empty());
    assert_eq!(hip.limits().count(), 0);
    assert_eq!(skeleton.dof_count("lhipjoint").unwrap(), 0);
}

/// it should parse infinite limits
#[test]
fn infinite_limits() {
    let skeleton = parse_skeleton(&subject_text()).expect("parse subject");
    let limit = skeleton.joint("head").unwrap().limit("ry").copied().unwrap();
    assert_eq!(limit, Limit::unbounded());
    assert!(limit.contains(1e9));
}

/// it should map root order labels to position then orientation values
#[test]
fn root_axis_and_order() {
    let skeleton = parse_skeleton(&subject_text()).expect("parse subject");
    let root = skeleton.root();
    assert_eq!(
        root.axis_order(),
        &["TX", "TY", "TZ", "RX", "RY", "RZ"]
    );
    assert_eq!(root.dof_count(), 6);
    for label in root.axis_order() {
        assert_eq!(root.axis_value(label), Some(0.0));
    }
}

/// it should keep units and the documentation block verbatim
#[test]
fn units_and_documentation() {
    let skeleton = parse_skeleton(&subject_text()).expect("parse subject");
    assert_eq!(skeleton.units().mass, "1.0");
    assert_eq!(skeleton.units().length, "0.45");
    assert_eq!(skeleton.units().angle, "deg");
    assert!(!skeleton.units().angle_is_radians());
    assert_eq!(
        skeleton.documentation(),
        "   Synthetic eleven-joint subject with hip joints,\n   legs and a spine."
    );
}

/// it should produce identical skeletons for identical input
#[test]
fn parsing_is_deterministic() {
    let text = subject_text();
    let first = parse_skeleton(&text).unwrap();
    let second = parse_skeleton(&text).unwrap();
    assert_eq!(first, second);
}

/// it should accept a line sequence as well as a single string
#[test]
fn parse_lines_matches_parse_str() {
    let lines = mocap_test_fixtures::skeletons::lines("subject").unwrap();
    let parser = SkeletonParser::default();
    assert_eq!(
        parser.parse_lines(&lines).unwrap(),
        parser.parse_str(&subject_text()).unwrap()
    );
}

/// it should parse space-separated files with the whitespace delimiter
#[test]
fn whitespace_delimited_variant() {
    let text = mocap_test_fixtures::skeletons::text("subject-spaces").unwrap();
    assert!(parse_skeleton(&text).is_err());

    let parser = SkeletonParser::new(Config::default().with_delimiter(Delimiter::Whitespace));
    let spaced = parser.parse_str(&text).expect("parse with whitespace delimiter");
    let tabbed = parse_skeleton(&subject_text()).unwrap();
    assert_eq!(spaced, tabbed);
}

/// it should reject an unsupported version on the version line
#[test]
fn unsupported_version() {
    let text = subject_text().replace(":version\t1.10", ":version\t1.20");
    let err = parse_skeleton(&text).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.line(), Some(2));
}

/// it should report the 0-based line of a misplaced keyword
#[test]
fn syntax_error_carries_line_index() {
    let text = subject_text().replace("\t\tdirection\t0\t-1\t0\n\t\tlength\t7\n", "\t\tlength\t7\n");
    let err = parse_skeleton(&text).unwrap_err();
    match err {
        MocapError::Syntax { line, expected, found } => {
            assert_eq!(expected, "'direction'");
            assert_eq!(found, "length");
            let lines: Vec<&str> = text.lines().collect();
            assert_eq!(lines[line].trim(), "length\t7");
        }
        other => panic!("expected a syntax error, got {other:?}"),
    }
}

/// it should fail on axis lines with two or four values
#[test]
fn axis_value_count_must_match_order() {
    let good = asf_with_bones(&[&bone("arm", "0\t0\t0\tXYZ")]);
    assert!(parse_skeleton(&good).is_ok());

    for axis in ["0\t0\tXYZ", "0\t0\t0\t0\tXYZ"] {
        let text = asf_with_bones(&[&bone("arm", axis)]);
        let err = parse_skeleton(&text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cardinality, "axis '{axis}'");
    }
}

/// it should reject a limit count different from the dof count
#[test]
fn limit_count_must_match_dof() {
    let text = asf_with_bones(&[&bone("arm", "0\t0\t0\tXYZ")]).replace("\t\t\t(-90\t90)\n\tend", "\tend");
    let err = parse_skeleton(&text).unwrap_err();
    assert_eq!(
        err,
        MocapError::Cardinality {
            owner: "arm".into(),
            field: "limits".into(),
            expected: 3,
            found: 2,
        }
    );
}

/// it should reject a bone declared twice
#[test]
fn duplicate_bone() {
    let text = asf_with_bones(&[&bone("arm", "0\t0\t0\tXYZ"), &bone("arm", "0\t0\t0\tXYZ")]);
    let err = parse_skeleton(&text).unwrap_err();
    assert_eq!(err, MocapError::DuplicateJoint { name: "arm".into() });
}

/// it should reject hierarchy lines naming unknown joints
#[test]
fn hierarchy_with_unknown_child() {
    let text = subject_text().replace("\t\tthorax\thead\n", "\t\tthorax\thead\tneck\n");
    let err = parse_skeleton(&text).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Lookup);
}

/// it should reject bones left out of the hierarchy
#[test]
fn detached_bone() {
    let text = subject_text().replace("\t\tthorax\thead\n", "");
    let err = parse_skeleton(&text).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Hierarchy);
}

/// it should reject a truncated file
#[test]
fn truncated_input() {
    let text = subject_text();
    let cut = text.find(":hierarchy").unwrap();
    let err = parse_skeleton(&text[..cut]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

/// it should accept the root order line ahead of the axis line
#[test]
fn root_order_before_axis() {
    let text = subject_text().replace(
        "\taxis\tXYZ\n\torder\tTX\tTY\tTZ\tRX\tRY\tRZ\n",
        "\torder\tTX\tTY\tTZ\tRX\tRY\tRZ\n\taxis\tXYZ\n",
    );
    assert_ne!(text, subject_text());
    let swapped = parse_skeleton(&text).expect("parse with order first");
    assert_eq!(swapped, parse_skeleton(&subject_text()).unwrap());
}

/// it should reject a negative bone length at its line
#[test]
fn negative_length() {
    let text = subject_text().replacen("\t\tlength\t7.5\n", "\t\tlength\t-7.5\n", 1);
    let err = parse_skeleton(&text).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[err.line().unwrap()].trim(), "length\t-7.5");
}
