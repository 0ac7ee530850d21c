use tether::*;

const DT: f32 = 1.0 / 60.0;

/// A rope strung across the top of the canvas plus two bumping balls.
#[derive(Default)]
struct Clothesline {
    setups: usize,
    rope: Option<EntityId>,
    balls: Vec<EntityId>,
    log: Vec<&'static str>,
    collisions: usize,
}

impl Sketch for Clothesline {
    fn setup(&mut self, world: &mut SimulationWorld, viewport: &Viewport) -> SimResult<()> {
        self.setups += 1;
        let y = viewport.height * 0.25;
        self.rope = Some(
            ChainBuilder::between(Vec2::new(0.0, y), Vec2::new(viewport.width, y), 10)
                .anchor_first(true)
                .anchor_last(true)
                .build(world)?,
        );
        self.balls = vec![
            world.add_node(Node::dynamic(Vec2::new(100.0, 400.0))),
            world.add_node(Node::dynamic(Vec2::new(103.0, 400.0))),
        ];
        Ok(())
    }

    fn update(&mut self, _world: &mut SimulationWorld, _dt: f32) {
        self.log.push("update");
    }

    fn on_collision(&mut self, _world: &mut SimulationWorld, _event: &CollisionEvent) {
        self.collisions += 1;
        self.log.push("collision");
    }

    fn draw_overlay(&self, _world: &SimulationWorld, surface: &mut dyn Surface) {
        surface.circle(Vec2::ZERO, 1.0, None, None);
    }
}

fn runner_with(config: WorldConfig, viewport: Viewport) -> SketchRunner<Clothesline> {
    SketchRunner::new(Clothesline::default(), config, PointerConfig::default(), viewport)
}

fn runner(viewport: Viewport) -> SketchRunner<Clothesline> {
    runner_with(WorldConfig::default(), viewport)
}

#[test]
fn frame_runs_update_step_events_then_render() {
    let mut runner = runner(Viewport::new(800.0, 600.0, 1.0));
    let mut surface = RecordingSurface::new();

    let report = runner.frame(DT, &mut surface);

    assert_eq!(runner.world().step_count(), 1);
    assert_eq!(report.collision_events, 1);
    assert_eq!(runner.sketch().log, vec!["update", "collision"]);
    assert_eq!(runner.sketch().collisions, 1);
    assert_eq!(report.render.chains_drawn, 1);
    assert_eq!(
        surface.commands().last(),
        Some(&DrawCommand::Circle {
            center: Vec2::ZERO,
            radius: 1.0,
            fill: None,
            stroke: None,
        }),
        "overlay is drawn last"
    );
}

#[test]
fn resize_rebuilds_instead_of_rescaling() {
    let mut runner = runner(Viewport::new(800.0, 600.0, 1.0));
    let nodes_before = runner.world().node_count();
    for _ in 0..10 {
        runner.frame(DT, &mut RecordingSurface::new());
    }

    runner.resize(Viewport::new(1200.0, 400.0, 2.0));

    assert_eq!(runner.sketch().setups, 2);
    assert_eq!(runner.world().node_count(), nodes_before);
    assert_eq!(runner.world().step_count(), 0);
    let rope = runner.sketch().rope.unwrap();
    let positions = runner.world().chain_positions(rope).unwrap();
    assert_eq!(positions.first(), Some(&Vec2::new(0.0, 100.0)));
    assert_eq!(positions.last(), Some(&Vec2::new(1200.0, 100.0)));
    assert_eq!(runner.view().device_pixel_ratio, 2.0);
}

#[test]
fn queued_pointer_intents_drive_grabs() {
    let mut runner = runner_with(
        WorldConfig::default().with_gravity(Vec2::ZERO),
        Viewport::new(800.0, 600.0, 2.0),
    );
    let ball = runner.sketch().balls[0];
    let start = Vec2::new(100.0, 400.0);
    let sender = runner.intents();

    // Device pixels are twice the world units at a ratio of 2.
    sender.grab(PointerId(1), start * 2.0, 0.0);
    let report = runner.frame(DT, &mut RecordingSurface::new());
    assert_eq!(report.intents, 1);
    assert_eq!(runner.pointer().grab(PointerId(1)).map(|g| g.node), Some(ball));

    let target = start + Vec2::new(0.0, 120.0);
    sender.move_to(PointerId(1), target * 2.0, 0.05);
    for _ in 0..30 {
        runner.frame(DT, &mut RecordingSurface::new());
    }
    assert!(runner.world().node(ball).unwrap().position.y > 460.0);

    sender.release(PointerId(1), target * 2.0, 0.6);
    runner.frame(DT, &mut RecordingSurface::new());
    assert_eq!(runner.pointer().grab_count(), 0);
    assert_eq!(runner.world().constraint_count(), 10);
}

#[test]
fn resize_drops_active_grabs() {
    let mut runner = runner(Viewport::new(800.0, 600.0, 1.0));
    let rope = runner.sketch().rope.unwrap();
    let node = runner.world().chain(rope).unwrap().nodes[3];
    let at = runner.world().node(node).unwrap().position;
    runner.intents().grab(PointerId(0), at, 0.0);
    runner.frame(DT, &mut RecordingSurface::new());
    assert_eq!(runner.pointer().grab_count(), 1);

    runner.resize(Viewport::new(640.0, 480.0, 1.0));

    assert_eq!(runner.pointer().grab_count(), 0);
    runner.frame(DT, &mut RecordingSurface::new());
}

#[test]
fn viewport_bounds_follow_resize() {
    let mut runner = runner(Viewport::new(800.0, 600.0, 1.0)).with_viewport_bounds(true);
    assert_eq!(runner.world().config.bounds, Some(Bounds::from_size(800.0, 600.0)));
    runner.resize(Viewport::new(300.0, 200.0, 3.0));
    assert_eq!(runner.world().config.bounds, Some(Bounds::from_size(300.0, 200.0)));
}

#[test]
fn frames_over_budget_are_flagged() {
    let mut runner = runner(Viewport::default()).with_frame_budget_ms(0.0);
    let report = runner.frame(DT, &mut RecordingSurface::new());
    assert!(report.over_budget);
}
