use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::shape::NodeShape;
use crate::{
    config::DEFAULT_NODE_RADIUS,
    error::{SimError, SimResult},
    render::style::NodeStyle,
    utils::allocator::EntityId,
};

/// Layer/mask collision filtering between nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionFilter {
    pub layer: u32,
    pub mask: u32,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            layer: 1,
            mask: u32::MAX,
        }
    }
}

impl CollisionFilter {
    /// Collides with nothing.
    pub const NONE: CollisionFilter = CollisionFilter { layer: 0, mask: 0 };

    pub fn matches(&self, other: &CollisionFilter) -> bool {
        (self.mask & other.layer) != 0 && (other.mask & self.layer) != 0
    }
}

/// Simulated point-mass or static anchor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Accumulated acceleration for the current sub-step; cleared by integration.
    pub acceleration: Vec2,
    pub radius: f32,
    pub is_static: bool,
    pub inverse_mass: f32,
    pub gravity_scale: f32,
    /// Per-node override of the world's linear damping.
    pub linear_damping: Option<f32>,
    pub filter: CollisionFilter,
    pub shape: NodeShape,
    pub style: NodeStyle,
    /// Owning chain, if the node was created by a chain builder.
    pub chain: Option<EntityId>,
    #[serde(skip)]
    pub(crate) previous_position: Vec2,
}

impl Node {
    /// Dynamic node of unit mass.
    pub fn dynamic(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            radius: DEFAULT_NODE_RADIUS,
            is_static: false,
            inverse_mass: 1.0,
            gravity_scale: 1.0,
            linear_damping: None,
            filter: CollisionFilter::default(),
            shape: NodeShape::circle(DEFAULT_NODE_RADIUS),
            style: NodeStyle::default(),
            chain: None,
            previous_position: position,
        }
    }

    /// Immovable anchor.
    pub fn anchor(position: Vec2) -> Self {
        Self {
            is_static: true,
            inverse_mass: 0.0,
            ..Self::dynamic(position)
        }
    }

    pub fn with_mass(mut self, mass: f32) -> SimResult<Self> {
        self.set_mass(mass)?;
        Ok(self)
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius.max(0.0);
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_shape(mut self, shape: NodeShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_style(mut self, style: NodeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    /// Mass of a dynamic node; `f32::INFINITY` for anchors.
    pub fn mass(&self) -> f32 {
        if self.is_static || self.inverse_mass == 0.0 {
            f32::INFINITY
        } else {
            1.0 / self.inverse_mass
        }
    }

    pub fn set_mass(&mut self, mass: f32) -> SimResult<()> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(SimError::InvalidMass(mass));
        }
        self.inverse_mass = 1.0 / mass;
        Ok(())
    }

    /// Inverse mass as seen by the solver: zero for anchors.
    #[inline]
    pub fn solver_inverse_mass(&self) -> f32 {
        if self.is_static {
            0.0
        } else {
            self.inverse_mass
        }
    }

    pub fn apply_force(&mut self, force: Vec2) {
        if self.is_static {
            return;
        }
        self.acceleration += force * self.inverse_mass;
    }

    pub fn apply_impulse(&mut self, impulse: Vec2) {
        if self.is_static {
            return;
        }
        self.velocity += impulse * self.inverse_mass;
    }

    /// Moves the node without leaving an implied velocity behind.
    pub fn teleport(&mut self, position: Vec2) {
        self.position = position;
        self.previous_position = position;
        self.velocity = Vec2::ZERO;
    }

    pub fn make_static(&mut self) {
        self.is_static = true;
        self.velocity = Vec2::ZERO;
        self.acceleration = Vec2::ZERO;
    }

    pub fn make_dynamic(&mut self, mass: f32) -> SimResult<()> {
        self.set_mass(mass)?;
        self.is_static = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_ignore_forces() {
        let mut anchor = Node::anchor(Vec2::new(1.0, 2.0));
        anchor.apply_force(Vec2::new(10.0, 0.0));
        anchor.apply_impulse(Vec2::new(10.0, 0.0));
        assert_eq!(anchor.acceleration, Vec2::ZERO);
        assert_eq!(anchor.velocity, Vec2::ZERO);
        assert_eq!(anchor.solver_inverse_mass(), 0.0);
        assert!(anchor.mass().is_infinite());
    }

    #[test]
    fn invalid_mass_is_rejected() {
        assert_eq!(
            Node::dynamic(Vec2::ZERO).with_mass(0.0).unwrap_err(),
            SimError::InvalidMass(0.0)
        );
        assert!(Node::dynamic(Vec2::ZERO).with_mass(f32::NAN).is_err());
        let node = Node::dynamic(Vec2::ZERO).with_mass(4.0).unwrap();
        assert_eq!(node.inverse_mass, 0.25);
    }

    #[test]
    fn filters_are_symmetric() {
        let a = CollisionFilter { layer: 0b01, mask: 0b10 };
        let b = CollisionFilter { layer: 0b10, mask: 0b01 };
        assert!(a.matches(&b) && b.matches(&a));
        assert!(!CollisionFilter::NONE.matches(&CollisionFilter::default()));
    }
}
