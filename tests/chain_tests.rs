use tether::*;

fn line(count: usize) -> Vec<Vec2> {
    (0..count).map(|i| Vec2::new(i as f32 * 20.0, 0.0)).collect()
}

#[test]
fn chain_has_one_node_per_point_and_sequential_constraints() {
    let mut world = SimulationWorld::default();
    let id = ChainBuilder::new(line(6)).build(&mut world).unwrap();

    let chain = world.chain(id).expect("chain should exist");
    assert_eq!(chain.len(), 6);
    assert_eq!(chain.constraints.len(), 5);
    assert_eq!(world.node_count(), 6);
    assert_eq!(world.constraint_count(), 5);

    for (i, pair) in chain.nodes.windows(2).enumerate() {
        let constraint = world.constraint(chain.constraints[i]).unwrap();
        assert_eq!(constraint.node, pair[0]);
        assert_eq!(constraint.target, Anchor::Node(pair[1]));
        assert!((constraint.rest_length - 20.0).abs() < 1e-4);
    }
}

#[test]
fn closed_chain_adds_closing_constraint() {
    let mut world = SimulationWorld::default();
    let id = ChainBuilder::ring(Vec2::new(200.0, 200.0), 50.0, 12)
        .build(&mut world)
        .unwrap();

    let chain = world.chain(id).unwrap();
    assert!(chain.closed);
    assert_eq!(chain.constraints.len(), 12);
    let closing = world.constraint(*chain.constraints.last().unwrap()).unwrap();
    assert_eq!(closing.node, chain.last().unwrap());
    assert_eq!(closing.target, Anchor::Node(chain.first().unwrap()));
}

#[test]
fn two_point_closed_chain_does_not_double_link() {
    let mut world = SimulationWorld::default();
    let id = ChainBuilder::new(line(2)).closed(true).build(&mut world).unwrap();
    assert_eq!(world.chain(id).unwrap().constraints.len(), 1);
    assert!(!world.chain(id).unwrap().closed);
}

#[test]
fn single_point_and_empty_chains_are_allowed() {
    let mut world = SimulationWorld::default();
    let single = ChainBuilder::new(line(1)).build(&mut world).unwrap();
    assert_eq!(world.chain(single).unwrap().len(), 1);
    assert_eq!(world.constraint_count(), 0);

    let empty = ChainBuilder::new(Vec::new()).build(&mut world).unwrap();
    assert!(world.chain(empty).unwrap().is_empty());

    world.step(1.0 / 60.0);
}

#[test]
fn anchors_are_flagged_static() {
    let mut world = SimulationWorld::default();
    let id = ChainBuilder::new(line(4))
        .anchor_first(true)
        .anchor_last(true)
        .build(&mut world)
        .unwrap();
    let chain = world.chain(id).unwrap();
    let flags: Vec<bool> = chain
        .nodes
        .iter()
        .map(|n| world.node(*n).unwrap().is_static)
        .collect();
    assert_eq!(flags, vec![true, false, false, true]);
}

#[test]
fn uniform_spacing_overrides_initial_distance() {
    let mut world = SimulationWorld::default();
    let id = ChainBuilder::new(line(3)).spacing(35.0).build(&mut world).unwrap();
    for cid in &world.chain(id).unwrap().constraints {
        assert_eq!(world.constraint(*cid).unwrap().rest_length, 35.0);
    }
}

#[test]
fn invalid_options_are_rejected_before_anything_is_created() {
    let mut world = SimulationWorld::default();

    let err = ChainBuilder::new(line(3)).stiffness(1.5).build(&mut world).unwrap_err();
    assert_eq!(err, SimError::InvalidStiffness(1.5));

    let err = ChainBuilder::new(line(3)).damping(-0.1).build(&mut world).unwrap_err();
    assert_eq!(err, SimError::InvalidDamping(-0.1));

    let err = ChainBuilder::new(line(3)).node_mass(0.0).build(&mut world).unwrap_err();
    assert_eq!(err, SimError::InvalidMass(0.0));

    let err = ChainBuilder::new(line(3)).spacing(-2.0).build(&mut world).unwrap_err();
    assert_eq!(err, SimError::InvalidSpacing(-2.0));

    let mut points = line(3);
    points[1].x = f32::NAN;
    let err = ChainBuilder::new(points).build(&mut world).unwrap_err();
    assert_eq!(err, SimError::NonFinitePoint { index: 1 });

    assert_eq!(world.node_count(), 0);
    assert_eq!(world.constraint_count(), 0);
    assert_eq!(world.chains().len(), 0);
}

#[test]
fn chain_nodes_know_their_chain() {
    let mut world = SimulationWorld::default();
    let id = ChainBuilder::between(Vec2::ZERO, Vec2::new(100.0, 0.0), 5)
        .build(&mut world)
        .unwrap();
    for node in &world.chain(id).unwrap().nodes {
        assert_eq!(world.node(*node).unwrap().chain, Some(id));
    }
}

#[test]
fn remove_chain_takes_nodes_and_constraints_with_it() {
    let mut world = SimulationWorld::default();
    let keep = world.add_node(Node::dynamic(Vec2::new(-50.0, 0.0)));
    let id = ChainBuilder::new(line(5)).build(&mut world).unwrap();

    let removed = world.remove_chain(id).unwrap();
    assert_eq!(removed.len(), 5);
    assert_eq!(world.node_count(), 1);
    assert!(world.node(keep).is_some());
    assert_eq!(world.constraint_count(), 0);
    assert_eq!(world.remove_chain(id).unwrap_err(), SimError::UnknownChain(id));
}
