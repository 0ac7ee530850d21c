//! Headless run of a hanging rope that gets grabbed, dragged and flung.

use tether::*;

struct HangingRope {
    rope: Option<EntityId>,
}

impl Sketch for HangingRope {
    fn setup(&mut self, world: &mut SimulationWorld, viewport: &Viewport) -> SimResult<()> {
        let y = viewport.height * 0.2;
        let style = ChainStyle {
            stroke: Some(Stroke::new(Rgba::new(0.9, 0.8, 0.6, 1.0), 3.0)),
            ..ChainStyle::default()
        };
        let rope = ChainBuilder::between(
            Vec2::new(viewport.width * 0.2, y),
            Vec2::new(viewport.width * 0.8, y),
            24,
        )
        .anchor_first(true)
        .anchor_last(true)
        .spacing(viewport.width * 0.6 / 20.0)
        .stiffness(0.9)
        .style(style)
        .build(world)?;
        self.rope = Some(rope);

        world.force_registry.add_force(WindForce {
            direction: Vec2::X,
            strength: 40.0,
            gust_strength: 60.0,
            gust_frequency: 0.3,
        });
        Ok(())
    }

    fn on_collision(&mut self, _world: &mut SimulationWorld, event: &CollisionEvent) {
        println!("collision: {event:?}");
    }
}

fn main() {
    let viewport = Viewport::new(800.0, 600.0, 2.0);
    let mut runner = SketchRunner::new(
        HangingRope { rope: None },
        WorldConfig::default().with_bounds(Some(Bounds::from_size(800.0, 600.0))),
        PointerConfig::default(),
        viewport,
    );

    let Some(rope) = runner.sketch().rope else {
        eprintln!("setup failed: {:?}", runner.setup_error());
        return;
    };
    let world = runner.world();
    let Some(grab_at) = world
        .chain(rope)
        .and_then(|chain| world.node(chain.nodes[12]))
        .map(|node| node.position)
    else {
        return;
    };

    let dpr = viewport.device_pixel_ratio;
    let sender = runner.intents();
    let mut surface = RecordingSurface::new();
    let mut time = 0.0f64;
    for frame in 0..240 {
        time += 1.0 / 60.0;
        match frame {
            30 => sender.grab(PointerId(0), grab_at * dpr, time),
            31..=89 => {
                let t = (frame - 30) as f32 / 60.0;
                let drag = grab_at + Vec2::new(-120.0 * t, 200.0 * t);
                sender.move_to(PointerId(0), drag * dpr, time);
            }
            90 => sender.release(PointerId(0), (grab_at + Vec2::new(-140.0, 240.0)) * dpr, time),
            _ => {}
        }
        surface.clear();
        let report = runner.frame(1.0 / 60.0, &mut surface);
        if frame % 60 == 0 {
            println!(
                "frame {frame}: {} chains, {} grabs, {:?}",
                report.render.chains_drawn,
                runner.pointer().grab_count(),
                report.elapsed
            );
        }
    }

    if let Some(positions) = runner.world().chain_positions(rope) {
        println!("rope middle ends at {}", positions[positions.len() / 2]);
    }
    println!("{} draw commands in last frame", surface.len());
}
