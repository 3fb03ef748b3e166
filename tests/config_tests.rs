use kinetic_movers::*;

fn parse(json: &str) -> PhysicsConfigInput {
    serde_json::from_str(json).unwrap()
}

#[test]
fn top_level_coefficients_parse_as_a_single_config() {
    let input = parse(r#"{ "stiffness": 30 }"#);
    assert_eq!(
        input,
        PhysicsConfigInput::Single(PhysicsOverrides::default().with_stiffness(30.0))
    );

    let configs = normalize_physics_config(Some(&input), MoverKind::TwoD).unwrap();
    let params = configs.get("default").unwrap();
    assert_eq!(params.stiffness, 30.0);
    assert_eq!(params.stop_speed, 1.0);
}

#[test]
fn nested_objects_parse_as_named_variants() {
    let input = parse(
        r#"{
            "slow": { "friction": 0.5 },
            "fast": { "friction": 0.05, "stopSpeed": 2 }
        }"#,
    );
    let PhysicsConfigInput::Named(variants) = &input else {
        panic!("expected named variants, got {input:?}");
    };
    assert_eq!(variants.len(), 2);

    let configs = normalize_physics_config(Some(&input), MoverKind::ThreeD).unwrap();
    assert_eq!(configs.names().collect::<Vec<_>>(), ["fast", "slow"]);
    assert_eq!(configs.get("fast").unwrap().stop_speed, 2.0);
    assert_eq!(configs.get("slow").unwrap().stop_speed, 0.5);
    assert!(configs.get("default").is_none());
}

#[test]
fn preset_strings_run_on_kind_defaults() {
    let input = parse(r#""bouncy""#);
    assert_eq!(input, PhysicsConfigInput::Preset("bouncy".to_string()));

    let mut world = MoverWorld::new();
    let entity = world.spawn();
    world
        .add_mover(
            entity,
            MoverSpec::scalar("preset", MoverInitialState::at(0.0)).with_physics(input),
        )
        .unwrap();
    world
        .add_mover(entity, MoverSpec::scalar("plain", MoverInitialState::at(0.0)))
        .unwrap();
    assert!(world.refs(entity, "preset").unwrap().physics_configs().is_empty());

    world.set_goal(entity, "preset", 25.0).unwrap();
    world.set_goal(entity, "plain", 25.0).unwrap();
    for _ in 0..20 {
        world.tick(16.6667);
    }
    assert_eq!(
        world.value::<f64>(entity, "preset").unwrap(),
        world.value::<f64>(entity, "plain").unwrap()
    );
}

#[test]
fn zero_mass_from_json_is_rejected() {
    let input = parse(r#"{ "mass": 0 }"#);
    let mut world = MoverWorld::new();
    let entity = world.spawn();
    let err = world
        .add_mover(
            entity,
            MoverSpec::planar("position", MoverInitialState::default()).with_physics(input),
        )
        .unwrap_err();
    assert!(matches!(err, MoverError::InvalidPhysics { ref name, .. } if name == "default"));
}

#[test]
fn negative_friction_in_a_named_variant_is_rejected() {
    let input = parse(r#"{ "ok": {}, "broken": { "friction": -0.2 } }"#);
    let mut world = MoverWorld::new();
    let entity = world.spawn();
    let err = world
        .add_mover(
            entity,
            MoverSpec::scalar("zoom", MoverInitialState::default()).with_physics(input),
        )
        .unwrap_err();
    assert!(matches!(err, MoverError::InvalidPhysics { ref name, .. } if name == "broken"));
}

#[test]
fn modes_and_kinds_use_lowercase_tags() {
    assert_eq!(serde_json::to_string(&MoveMode::Slide).unwrap(), r#""slide""#);
    assert_eq!(
        serde_json::from_str::<MoveMode>(r#""push""#).unwrap(),
        MoveMode::Push
    );
    assert!(serde_json::from_str::<MoveMode>(r#""Spring""#).is_err());

    assert_eq!(serde_json::to_string(&MoverKind::ThreeD).unwrap(), r#""3d""#);
    assert_eq!(
        serde_json::from_str::<MoverKind>(r#""multi""#).unwrap(),
        MoverKind::Multi
    );
    assert_eq!("2d".parse::<MoverKind>().unwrap(), MoverKind::TwoD);
    assert_eq!(
        "4d".parse::<MoverKind>(),
        Err(MoverError::UnknownMoverKind("4d".to_string()))
    );
}

#[test]
fn normalized_configs_serialize_with_camel_case_fields() {
    let configs = PhysicsConfigs::defaults(MoverKind::OneD);
    let json = serde_json::to_value(&configs).unwrap();
    assert_eq!(json["default"]["stopSpeed"], 0.01);
    assert_eq!(json["default"]["mass"], 41.5);

    let back: PhysicsConfigs = serde_json::from_value(json).unwrap();
    assert_eq!(back, configs);
}

#[test]
fn state_configs_override_registered_variants() {
    let mut world = MoverWorld::new();
    let entity = world.spawn();
    world
        .add_mover(entity, MoverSpec::scalar("soft", MoverInitialState::at(0.0)))
        .unwrap();
    world
        .add_mover(entity, MoverSpec::scalar("firm", MoverInitialState::at(0.0)))
        .unwrap();

    let configs: PhysicsConfigs = serde_json::from_str(
        r#"{ "default": { "mass": 41.5, "stiffness": 200, "damping": 1,
                          "friction": 0.16, "stopSpeed": 0.01 } }"#,
    )
    .unwrap();
    world.set_move_configs(entity, "firm", configs).unwrap();

    world.set_goal(entity, "soft", 10.0).unwrap();
    world.set_goal(entity, "firm", 10.0).unwrap();
    world.tick(16.6667);

    let soft: f64 = world.value(entity, "soft").unwrap();
    let firm: f64 = world.value(entity, "firm").unwrap();
    assert!(firm > soft, "firm {firm} should lead soft {soft}");
}
