use std::time::{Duration, Instant};

use log::{debug, error, warn};

use crate::{
    collision::contact::CollisionEvent,
    config::{PointerConfig, WorldConfig, DEFAULT_FRAME_BUDGET_MS},
    error::{SimError, SimResult},
    interaction::{
        intent::{IntentQueue, IntentSender},
        pointer::PointerLayer,
        view::{ViewTransform, Viewport},
    },
    render::{
        renderer::{ChainRenderer, RenderStats},
        surface::Surface,
    },
    utils::logging::{warn_if_frame_budget_exceeded, ScopedTimer},
    world::SimulationWorld,
};

/// One interactive scene built on a [`SimulationWorld`].
///
/// Only `setup` is required. It runs at start and again after every resize,
/// against a freshly cleared world.
pub trait Sketch {
    fn setup(&mut self, world: &mut SimulationWorld, viewport: &Viewport) -> SimResult<()>;

    /// Runs once per frame before the physics step.
    fn update(&mut self, _world: &mut SimulationWorld, _dt: f32) {}

    fn on_collision(&mut self, _world: &mut SimulationWorld, _event: &CollisionEvent) {}

    /// Draws on top of the chains after the renderer has run.
    fn draw_overlay(&self, _world: &SimulationWorld, _surface: &mut dyn Surface) {}
}

/// Summary of one `frame` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub intents: usize,
    pub collision_events: usize,
    pub render: RenderStats,
    pub elapsed: Duration,
    pub over_budget: bool,
}

/// Drives a [`Sketch`]: intents, update, step, events, then render.
pub struct SketchRunner<S: Sketch> {
    sketch: S,
    world: SimulationWorld,
    pointer: PointerLayer,
    renderer: ChainRenderer,
    intents: IntentQueue,
    view: ViewTransform,
    viewport: Viewport,
    frame_budget_ms: f32,
    frame_count: u64,
    viewport_bounds: bool,
    setup_error: Option<SimError>,
}

impl<S: Sketch> SketchRunner<S> {
    pub fn new(sketch: S, config: WorldConfig, pointer: PointerConfig, viewport: Viewport) -> Self {
        let mut runner = Self {
            sketch,
            world: SimulationWorld::new(config),
            pointer: PointerLayer::new(pointer),
            renderer: ChainRenderer::default(),
            intents: IntentQueue::new(),
            view: ViewTransform::for_viewport(&viewport),
            viewport,
            frame_budget_ms: DEFAULT_FRAME_BUDGET_MS,
            frame_count: 0,
            viewport_bounds: false,
            setup_error: None,
        };
        runner.rebuild();
        runner
    }

    /// Keeps the world's wall bounds equal to the visible area.
    pub fn with_viewport_bounds(mut self, enabled: bool) -> Self {
        self.viewport_bounds = enabled;
        self.rebuild();
        self
    }

    pub fn with_frame_budget_ms(mut self, budget_ms: f32) -> Self {
        self.frame_budget_ms = budget_ms;
        self
    }

    /// Handle for pointer callbacks. Positions are device pixels.
    pub fn intents(&self) -> IntentSender {
        self.intents.sender()
    }

    pub fn world(&self) -> &SimulationWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut SimulationWorld {
        &mut self.world
    }

    pub fn sketch(&self) -> &S {
        &self.sketch
    }

    pub fn sketch_mut(&mut self) -> &mut S {
        &mut self.sketch
    }

    pub fn pointer(&self) -> &PointerLayer {
        &self.pointer
    }

    pub fn renderer_mut(&mut self) -> &mut ChainRenderer {
        &mut self.renderer
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn set_view(&mut self, view: ViewTransform) {
        self.view = view;
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Error from the most recent `setup`, if it failed.
    pub fn setup_error(&self) -> Option<&SimError> {
        self.setup_error.as_ref()
    }

    /// Runs one frame. Never fails; trouble is logged and skipped.
    pub fn frame(&mut self, dt: f32, surface: &mut dyn Surface) -> FrameReport {
        let started = Instant::now();
        let _timer = ScopedTimer::new("sketch::frame");
        let mut report = FrameReport::default();

        let intents = self.intents.drain();
        report.intents = intents.len();
        for intent in intents {
            let intent = intent.map_position(|p| self.view.canvas_to_world(p));
            if let Err(err) = self.pointer.apply(&mut self.world, intent) {
                warn!("pointer intent {intent:?} rejected: {err}");
            }
        }
        self.pointer.sync(&mut self.world);

        self.sketch.update(&mut self.world, dt);
        self.world.step(dt);
        self.pointer.sync(&mut self.world);

        let events = self.world.drain_collision_events();
        report.collision_events = events.len();
        for event in &events {
            self.sketch.on_collision(&mut self.world, event);
        }

        report.render = self.renderer.render(&self.world, surface);
        self.sketch.draw_overlay(&self.world, surface);

        self.frame_count += 1;
        report.elapsed = started.elapsed();
        report.over_budget = warn_if_frame_budget_exceeded(report.elapsed, self.frame_budget_ms);
        report
    }

    /// Rebuilds the scene for a new canvas size. Grabs are dropped.
    pub fn resize(&mut self, viewport: Viewport) {
        debug!(
            "resize to {}x{} @{}",
            viewport.width, viewport.height, viewport.device_pixel_ratio
        );
        self.viewport = viewport;
        self.view.device_pixel_ratio = viewport.device_pixel_ratio;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.pointer.clear();
        self.world.clear();
        self.world.force_registry.clear();
        if self.viewport_bounds {
            self.world
                .set_bounds(Some(self.view.visible_bounds(&self.viewport)));
        }
        self.setup_error = match self.sketch.setup(&mut self.world, &self.viewport) {
            Ok(()) => None,
            Err(err) => {
                error!("sketch setup failed: {err}");
                Some(err)
            }
        };
    }
}
