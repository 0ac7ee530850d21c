use crate::{
    error::{check_unit, SimError, SimResult},
    utils::allocator::EntityId,
};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Second endpoint of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Anchor {
    Node(EntityId),
    /// Fixed world point, e.g. a pointer target. Behaves like infinite mass.
    Point(Vec2),
}

/// Soft distance constraint between `node` and `target`.
///
/// `stiffness` is the fraction of the length error removed per sub-step and
/// `damping` the fraction of relative axial velocity removed per sub-step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub node: EntityId,
    pub target: Anchor,
    pub rest_length: f32,
    pub stiffness: f32,
    pub damping: f32,
    pub enabled: bool,
}

impl Constraint {
    pub fn between(a: EntityId, b: EntityId, rest_length: f32, stiffness: f32) -> SimResult<Self> {
        if a == b {
            return Err(SimError::SelfConstraint(a));
        }
        Self::build(a, Anchor::Node(b), rest_length, stiffness)
    }

    pub fn to_point(node: EntityId, point: Vec2, rest_length: f32, stiffness: f32) -> SimResult<Self> {
        if !(point.x.is_finite() && point.y.is_finite()) {
            return Err(SimError::NonFiniteVector {
                what: "constraint target",
                value: point,
            });
        }
        Self::build(node, Anchor::Point(point), rest_length, stiffness)
    }

    fn build(node: EntityId, target: Anchor, rest_length: f32, stiffness: f32) -> SimResult<Self> {
        if !(rest_length.is_finite() && rest_length >= 0.0) {
            return Err(SimError::InvalidRestLength(rest_length));
        }
        Ok(Self {
            node,
            target,
            rest_length,
            stiffness: check_unit(stiffness, SimError::InvalidStiffness)?,
            damping: 0.0,
            enabled: true,
        })
    }

    pub fn with_damping(mut self, damping: f32) -> SimResult<Self> {
        self.damping = check_unit(damping, SimError::InvalidDamping)?;
        Ok(self)
    }

    /// Node on the far end, if the target is a node.
    pub fn other_node(&self) -> Option<EntityId> {
        match self.target {
            Anchor::Node(id) => Some(id),
            Anchor::Point(_) => None,
        }
    }

    pub fn involves(&self, id: EntityId) -> bool {
        self.node == id || self.other_node() == Some(id)
    }

    /// Ordered `(min, max)` node pair for node–node constraints.
    pub fn node_pair(&self) -> Option<(EntityId, EntityId)> {
        self.other_node()
            .map(|other| (self.node.min(other), self.node.max(other)))
    }
}
