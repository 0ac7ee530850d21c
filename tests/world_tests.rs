use tether::*;

const DT: f32 = 1.0 / 60.0;

fn zero_gravity() -> SimulationWorld {
    SimulationWorld::new(WorldConfig::default().with_gravity(Vec2::ZERO))
}

#[test]
fn nodes_fall_under_gravity() {
    let mut world = SimulationWorld::default();
    let id = world.add_node(Node::dynamic(Vec2::new(0.0, 10.0)));

    world.step(DT);

    let y = world.node(id).expect("node should exist").position.y;
    assert!(y > 10.0, "canvas gravity points down (+y), y = {}", y);
}

#[test]
fn anchors_never_move() {
    let mut world = SimulationWorld::default();
    let anchor = world.add_node(Node::anchor(Vec2::new(5.0, 5.0)));
    let hanging = world.add_node(Node::dynamic(Vec2::new(5.0, 40.0)));
    world
        .add_constraint(Constraint::between(anchor, hanging, 35.0, 1.0).unwrap())
        .unwrap();

    for _ in 0..120 {
        world.step(DT);
    }
    assert_eq!(world.node(anchor).unwrap().position, Vec2::new(5.0, 5.0));
    assert_eq!(world.node(anchor).unwrap().velocity, Vec2::ZERO);
}

#[test]
fn set_anchor_position_relocates_anchor() {
    let mut world = SimulationWorld::default();
    let anchor = world.add_node(Node::anchor(Vec2::ZERO));
    world.set_anchor_position(anchor, Vec2::new(300.0, 20.0)).unwrap();
    world.step(DT);
    assert_eq!(world.node(anchor).unwrap().position, Vec2::new(300.0, 20.0));

    let err = world
        .set_anchor_position(anchor, Vec2::new(f32::NAN, 0.0))
        .unwrap_err();
    assert!(matches!(
        err,
        SimError::NonFiniteVector {
            what: "anchor position",
            ..
        }
    ));
    assert_eq!(world.node(anchor).unwrap().position, Vec2::new(300.0, 20.0));
}

#[test]
fn non_finite_velocity_and_targets_are_rejected() {
    let mut world = zero_gravity();
    let node = world.add_node(Node::dynamic(Vec2::ZERO).with_velocity(Vec2::new(1.0, 2.0)));
    let err = world
        .set_velocity(node, Vec2::new(0.0, f32::INFINITY))
        .unwrap_err();
    assert!(err.to_string().starts_with("velocity is not finite"));
    assert_eq!(world.node(node).unwrap().velocity, Vec2::new(1.0, 2.0));

    let constraint = world
        .add_constraint(Constraint::to_point(node, Vec2::new(10.0, 0.0), 0.0, 0.5).unwrap())
        .unwrap();
    assert!(matches!(
        world.set_constraint_target(constraint, Vec2::NAN),
        Err(SimError::NonFiniteVector {
            what: "constraint target",
            ..
        })
    ));
}

#[test]
fn invalid_dt_is_ignored() {
    let mut world = SimulationWorld::default();
    let id = world.add_node(Node::dynamic(Vec2::ZERO));
    world.step(0.0);
    world.step(-1.0);
    world.step(f32::NAN);
    assert_eq!(world.step_count(), 0);
    assert_eq!(world.node(id).unwrap().position, Vec2::ZERO);
}

#[test]
fn large_dt_is_clamped() {
    let mut world = SimulationWorld::default();
    world.add_node(Node::dynamic(Vec2::ZERO));
    world.step(2.0);
    assert_eq!(world.last_metrics().dt, world.config.max_dt);
    assert_eq!(world.last_metrics().substeps, world.config.substeps);
}

#[test]
fn stepping_many_times_per_frame_is_fine() {
    let mut world = SimulationWorld::default();
    ChainBuilder::between(Vec2::ZERO, Vec2::new(100.0, 0.0), 10)
        .anchor_first(true)
        .build(&mut world)
        .unwrap();
    for _ in 0..10 {
        world.step(DT / 10.0);
    }
    assert_eq!(world.step_count(), 10);
    assert!(world.non_finite_nodes().is_empty());
}

#[test]
fn removing_a_node_removes_its_constraints() {
    let mut world = SimulationWorld::default();
    let a = world.add_node(Node::dynamic(Vec2::ZERO));
    let b = world.add_node(Node::dynamic(Vec2::new(10.0, 0.0)));
    let c = world.add_node(Node::dynamic(Vec2::new(20.0, 0.0)));
    world.add_constraint(Constraint::between(a, b, 10.0, 1.0).unwrap()).unwrap();
    let bc = world.add_constraint(Constraint::between(b, c, 10.0, 1.0).unwrap()).unwrap();
    world
        .add_constraint(Constraint::to_point(a, Vec2::ZERO, 0.0, 0.5).unwrap())
        .unwrap();

    world.remove_node(a);

    assert_eq!(world.constraint_count(), 1);
    assert!(world.constraint(bc).is_some());
    assert!(world.node(a).is_none());
}

#[test]
fn constraints_to_unknown_nodes_are_rejected() {
    let mut world = SimulationWorld::default();
    let a = world.add_node(Node::dynamic(Vec2::ZERO));
    let b = world.add_node(Node::dynamic(Vec2::ONE));
    world.remove_node(b);

    let err = world
        .add_constraint(Constraint::between(a, b, 1.0, 1.0).unwrap())
        .unwrap_err();
    assert_eq!(err, SimError::UnknownNode(b));
    assert_eq!(
        Constraint::between(a, a, 1.0, 1.0).unwrap_err(),
        SimError::SelfConstraint(a)
    );
}

#[test]
fn stale_ids_do_not_resolve_after_reuse() {
    let mut world = SimulationWorld::default();
    let old = world.add_node(Node::dynamic(Vec2::ZERO));
    world.remove_node(old);
    let new = world.add_node(Node::dynamic(Vec2::ONE));
    assert_eq!(old.index(), new.index());
    assert!(world.node(old).is_none());
    assert_eq!(world.node(new).unwrap().position, Vec2::ONE);
}

#[test]
fn zero_length_constraints_are_skipped() {
    let mut world = zero_gravity();
    let a = world.add_node(Node::dynamic(Vec2::new(10.0, 10.0)));
    let b = world.add_node(Node::dynamic(Vec2::new(10.0, 10.0)).with_radius(0.0));
    world.node_mut(a).unwrap().radius = 0.0;
    world.add_constraint(Constraint::between(a, b, 5.0, 1.0).unwrap()).unwrap();

    world.step(DT);

    assert!(world.last_metrics().solver.degenerate_skipped > 0);
    assert!(world.non_finite_nodes().is_empty());
}

#[test]
fn recycle_offscreen_prunes_only_dynamic_strays() {
    let mut world = zero_gravity();
    let visible = Bounds::from_size(800.0, 600.0);
    let inside = world.add_node(Node::dynamic(Vec2::new(400.0, 300.0)));
    let stray = world.add_node(Node::dynamic(Vec2::new(2000.0, 300.0)));
    let anchor = world.add_node(Node::anchor(Vec2::new(-500.0, -500.0)));
    let near = world.add_node(Node::dynamic(Vec2::new(820.0, 300.0)));

    let removed = world.recycle_offscreen(visible, 50.0);

    assert_eq!(removed, vec![stray]);
    assert!(world.node(inside).is_some());
    assert!(world.node(anchor).is_some());
    assert!(world.node(near).is_some());
}

#[test]
fn bounds_keep_nodes_inside() {
    let config = WorldConfig::default().with_bounds(Some(Bounds::from_size(200.0, 200.0)));
    let mut world = SimulationWorld::new(config);
    let id = world.add_node(Node::dynamic(Vec2::new(100.0, 100.0)));

    for _ in 0..600 {
        world.step(DT);
    }
    let node = world.node(id).unwrap();
    assert!(node.position.y <= 200.0 - node.radius + 1e-3);
    assert!(node.position.y > 150.0);
}

#[test]
fn forces_from_the_registry_are_applied() {
    let mut world = zero_gravity();
    world.force_registry.add_force(WindForce {
        direction: Vec2::X,
        strength: 500.0,
        gust_strength: 0.0,
        gust_frequency: 0.0,
    });
    let id = world.add_node(Node::dynamic(Vec2::ZERO));
    for _ in 0..30 {
        world.step(DT);
    }
    assert!(world.node(id).unwrap().position.x > 10.0);
}

#[test]
fn clear_resets_everything() {
    let mut world = SimulationWorld::default();
    ChainBuilder::between(Vec2::ZERO, Vec2::new(50.0, 0.0), 5)
        .build(&mut world)
        .unwrap();
    world.step(DT);

    world.clear();

    assert_eq!(world.node_count(), 0);
    assert_eq!(world.constraint_count(), 0);
    assert!(world.chains().is_empty());
    assert_eq!(world.step_count(), 0);
    assert_eq!(world.time(), 0.0);
}
