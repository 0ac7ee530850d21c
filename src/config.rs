//! Global defaults and serde-loadable configuration for worlds and pointers.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Default gravity in canvas space (Y grows downward), pixels per second squared.
pub const DEFAULT_GRAVITY: [f32; 2] = [0.0, 980.0];

/// Default frame timestep (in seconds).
pub const DEFAULT_TIME_STEP: f32 = 1.0 / 60.0;

/// Largest timestep a single `step` will integrate; longer frames are clamped.
pub const DEFAULT_MAX_TIME_STEP: f32 = 1.0 / 20.0;

/// Sub-steps per `step` call.
pub const DEFAULT_SUBSTEPS: u32 = 2;

/// Number of constraint solver iterations performed per sub-step.
pub const DEFAULT_SOLVER_ITERATIONS: u32 = 8;

/// Default damping applied to linear velocity (fraction per second).
pub const DEFAULT_LINEAR_DAMPING: f32 = 0.8;

/// Default radius for chain nodes (collision and pick size).
pub const DEFAULT_NODE_RADIUS: f32 = 4.0;

/// Default pointer pick radius, in world units.
pub const DEFAULT_PICK_RADIUS: f32 = 40.0;

/// Stiffness of the constraint pinning a grabbed node to the pointer.
pub const DEFAULT_GRAB_STIFFNESS: f32 = 0.35;

/// Upper bound on a fling release speed, world units per second.
pub const DEFAULT_MAX_FLING_SPEED: f32 = 2500.0;

/// Pointer samples kept per grab for release velocity.
pub const POINTER_HISTORY_LEN: usize = 8;

/// Default cell size for the contact broad-phase grid.
pub const DEFAULT_BROADPHASE_CELL_SIZE: f32 = 32.0;

/// Frame budget used by the runner's overrun warning (60 Hz).
pub const DEFAULT_FRAME_BUDGET_MS: f32 = 16.7;

/// Axis-aligned world rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(Vec2::ZERO, Vec2::new(width, height))
    }

    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(margin),
            max: self.max + Vec2::splat(margin),
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

/// Tunables for [`crate::SimulationWorld`].
///
/// Every field has a default, so a partial JSON object is a valid config:
///
/// ```
/// let config: tether::WorldConfig =
///     serde_json::from_str(r#"{ "substeps": 4 }"#).unwrap();
/// assert_eq!(config.substeps, 4);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub gravity: Vec2,
    pub substeps: u32,
    pub solver_iterations: u32,
    pub linear_damping: f32,
    pub max_dt: f32,
    pub collisions_enabled: bool,
    /// Walls the nodes bounce inside. `None` leaves the world open.
    pub bounds: Option<Bounds>,
    pub wall_restitution: f32,
    pub broadphase_cell_size: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::from_array(DEFAULT_GRAVITY),
            substeps: DEFAULT_SUBSTEPS,
            solver_iterations: DEFAULT_SOLVER_ITERATIONS,
            linear_damping: DEFAULT_LINEAR_DAMPING,
            max_dt: DEFAULT_MAX_TIME_STEP,
            collisions_enabled: true,
            bounds: None,
            wall_restitution: 0.3,
            broadphase_cell_size: DEFAULT_BROADPHASE_CELL_SIZE,
        }
    }
}

impl WorldConfig {
    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_substeps(mut self, substeps: u32) -> Self {
        self.substeps = substeps.max(1);
        self
    }

    pub fn with_solver_iterations(mut self, iterations: u32) -> Self {
        self.solver_iterations = iterations.max(1);
        self
    }

    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping.max(0.0);
        self
    }

    pub fn with_bounds(mut self, bounds: Option<Bounds>) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_collisions(mut self, enabled: bool) -> Self {
        self.collisions_enabled = enabled;
        self
    }
}

/// How a released grab hands pointer motion back to the node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlingPolicy {
    pub enabled: bool,
    /// Multiplier on the measured pointer velocity.
    pub scale: f32,
    /// Speed clamp; `0` disables clamping.
    pub max_speed: f32,
}

impl Default for FlingPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            scale: 1.0,
            max_speed: DEFAULT_MAX_FLING_SPEED,
        }
    }
}

impl FlingPolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Tunables for [`crate::interaction::PointerLayer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    pub pick_radius: f32,
    pub grab_stiffness: f32,
    pub grab_damping: f32,
    pub fling: FlingPolicy,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            pick_radius: DEFAULT_PICK_RADIUS,
            grab_stiffness: DEFAULT_GRAB_STIFFNESS,
            grab_damping: 0.1,
            fling: FlingPolicy::default(),
        }
    }
}
