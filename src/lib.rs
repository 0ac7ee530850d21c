//! Tether – constraint-chain simulation for pointer-driven 2D sketches.
//!
//! Ropes, rings, and tethered bodies are built as chains of point nodes
//! joined by soft distance constraints. A [`SimulationWorld`] owns every node
//! and constraint, pointer gestures become grab constraints through the
//! [`PointerLayer`], and the [`ChainRenderer`] draws smoothed curves onto any
//! [`Surface`].
//!
//! ```
//! use tether::{ChainBuilder, SimulationWorld, Vec2};
//!
//! let mut world = SimulationWorld::default();
//! let rope = ChainBuilder::between(Vec2::new(0.0, 100.0), Vec2::new(400.0, 100.0), 4)
//!     .anchor_first(true)
//!     .anchor_last(true)
//!     .build(&mut world)
//!     .unwrap();
//!
//! for _ in 0..60 {
//!     world.step(1.0 / 60.0);
//! }
//! let middle = world.chain_positions(rope).unwrap()[2];
//! assert!(middle.y > 100.0);
//! ```

pub mod assets;
pub mod collision;
pub mod config;
pub mod core;
pub mod dynamics;
pub mod error;
pub mod interaction;
pub mod render;
pub mod sketch;
pub mod utils;
pub mod world;

pub use glam::Vec2;

pub use assets::{AssetHandle, AssetSlot, AssetState};
pub use collision::{CollisionEvent, Contact};
pub use config::{Bounds, FlingPolicy, PointerConfig, WorldConfig};
pub use core::{
    Anchor, Chain, ChainBuilder, CollisionFilter, Constraint, Node, NodeShape, Tether,
    TetherPolicy, TetherState,
};
pub use dynamics::{AttractorForce, DragForce, ForceGenerator, ForceRegistry, WindForce};
pub use error::{SimError, SimResult};
pub use interaction::{
    IntentQueue, IntentSender, PointerId, PointerIntent, PointerLayer, Release, ViewTransform,
    Viewport,
};
pub use render::{
    ChainRenderer, ChainStyle, DrawCommand, NodeStyle, RecordingSurface, RenderStats, Rgba,
    Smoothing, Stroke, Surface,
};
pub use sketch::{FrameReport, Sketch, SketchRunner};
pub use utils::allocator::{Arena, EntityId};
pub use world::{SimulationWorld, StepMetrics};
