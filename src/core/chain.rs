//! Chains: ordered nodes joined by sequential distance constraints.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{
    constraints::Constraint,
    node::{CollisionFilter, Node},
    shape::NodeShape,
};
use crate::{
    config::DEFAULT_NODE_RADIUS,
    error::{check_unit, SimError, SimResult},
    render::style::{ChainStyle, NodeStyle},
    utils::{allocator::EntityId, math::is_finite},
    world::SimulationWorld,
};

/// A rope, string, loop or tether built by [`ChainBuilder`].
///
/// `nodes` is fixed at construction. Nodes pruned later (for example by
/// [`SimulationWorld::recycle_offscreen`]) keep their slot here but no longer
/// resolve in the world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chain {
    pub nodes: Vec<EntityId>,
    pub constraints: Vec<EntityId>,
    pub closed: bool,
    pub style: ChainStyle,
}

impl Chain {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn first(&self) -> Option<EntityId> {
        self.nodes.first().copied()
    }

    pub fn last(&self) -> Option<EntityId> {
        self.nodes.last().copied()
    }
}

/// Builder for [`Chain`]s.
///
/// ```
/// use tether::{ChainBuilder, SimulationWorld, Vec2};
///
/// let mut world = SimulationWorld::default();
/// let rope = ChainBuilder::between(Vec2::new(0.0, 0.0), Vec2::new(200.0, 0.0), 10)
///     .anchor_first(true)
///     .stiffness(0.9)
///     .build(&mut world)
///     .unwrap();
/// assert_eq!(world.chain(rope).unwrap().len(), 11);
/// ```
#[derive(Debug, Clone)]
pub struct ChainBuilder {
    points: Vec<Vec2>,
    stiffness: f32,
    damping: f32,
    anchor_first: bool,
    anchor_last: bool,
    closed: bool,
    spacing: Option<f32>,
    node_radius: f32,
    node_mass: f32,
    shape: Option<NodeShape>,
    node_style: NodeStyle,
    filter: CollisionFilter,
    style: ChainStyle,
}

impl ChainBuilder {
    pub fn new(points: impl Into<Vec<Vec2>>) -> Self {
        Self {
            points: points.into(),
            stiffness: 1.0,
            damping: 0.05,
            anchor_first: false,
            anchor_last: false,
            closed: false,
            spacing: None,
            node_radius: DEFAULT_NODE_RADIUS,
            node_mass: 1.0,
            shape: None,
            node_style: NodeStyle::hidden(),
            filter: CollisionFilter::default(),
            style: ChainStyle::default(),
        }
    }

    /// Straight chain of `segments` equal segments from `start` to `end`.
    pub fn between(start: Vec2, end: Vec2, segments: usize) -> Self {
        let segments = segments.max(1);
        let points: Vec<Vec2> = (0..=segments)
            .map(|i| start.lerp(end, i as f32 / segments as f32))
            .collect();
        Self::new(points)
    }

    /// Closed ring of `count` nodes on a circle.
    pub fn ring(center: Vec2, radius: f32, count: usize) -> Self {
        let step = std::f32::consts::TAU / count.max(1) as f32;
        let points: Vec<Vec2> = (0..count)
            .map(|i| center + Vec2::from_angle(step * i as f32) * radius)
            .collect();
        Self::new(points).closed(true)
    }

    pub fn stiffness(mut self, stiffness: f32) -> Self {
        self.stiffness = stiffness;
        self
    }

    pub fn damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    pub fn anchor_first(mut self, anchored: bool) -> Self {
        self.anchor_first = anchored;
        self
    }

    pub fn anchor_last(mut self, anchored: bool) -> Self {
        self.anchor_last = anchored;
        self
    }

    pub fn closed(mut self, closed: bool) -> Self {
        self.closed = closed;
        self
    }

    /// Uniform rest length for every segment instead of the initial distances.
    pub fn spacing(mut self, spacing: f32) -> Self {
        self.spacing = Some(spacing);
        self
    }

    pub fn node_radius(mut self, radius: f32) -> Self {
        self.node_radius = radius;
        self
    }

    pub fn node_mass(mut self, mass: f32) -> Self {
        self.node_mass = mass;
        self
    }

    pub fn node_shape(mut self, shape: NodeShape) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn node_style(mut self, style: NodeStyle) -> Self {
        self.node_style = style;
        self
    }

    pub fn filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn style(mut self, style: ChainStyle) -> Self {
        self.style = style;
        self
    }

    fn validate(&self) -> SimResult<()> {
        check_unit(self.stiffness, SimError::InvalidStiffness)?;
        check_unit(self.damping, SimError::InvalidDamping)?;
        if !(self.node_mass.is_finite() && self.node_mass > 0.0) {
            return Err(SimError::InvalidMass(self.node_mass));
        }
        if !(self.node_radius.is_finite() && self.node_radius >= 0.0) {
            return Err(SimError::InvalidRadius(self.node_radius));
        }
        if let Some(spacing) = self.spacing {
            if !(spacing.is_finite() && spacing > 0.0) {
                return Err(SimError::InvalidSpacing(spacing));
            }
        }
        if let Some(index) = self.points.iter().position(|p| !is_finite(*p)) {
            return Err(SimError::NonFinitePoint { index });
        }
        Ok(())
    }

    /// Creates the nodes and constraints in `world` and registers the chain.
    ///
    /// Nothing is added to the world when validation fails.
    pub fn build(self, world: &mut SimulationWorld) -> SimResult<EntityId> {
        self.validate()?;

        let count = self.points.len();
        let shape = self
            .shape
            .clone()
            .unwrap_or_else(|| NodeShape::circle(self.node_radius));

        let mut nodes = Vec::with_capacity(count);
        for (index, point) in self.points.iter().enumerate() {
            let anchored = (index == 0 && self.anchor_first)
                || (index + 1 == count && self.anchor_last);
            let node = if anchored {
                Node::anchor(*point)
            } else {
                Node::dynamic(*point).with_mass(self.node_mass)?
            };
            let node = node
                .with_radius(self.node_radius)
                .with_shape(shape.clone())
                .with_style(self.node_style.clone())
                .with_filter(self.filter);
            nodes.push(world.add_node(node));
        }

        let mut pairs: Vec<(usize, usize)> = (1..count).map(|i| (i - 1, i)).collect();
        if self.closed && count >= 3 {
            pairs.push((count - 1, 0));
        }

        let mut constraints = Vec::with_capacity(pairs.len());
        for (a, b) in pairs {
            let rest_length = self
                .spacing
                .unwrap_or_else(|| self.points[a].distance(self.points[b]));
            let constraint = Constraint::between(nodes[a], nodes[b], rest_length, self.stiffness)?
                .with_damping(self.damping)?;
            constraints.push(world.add_constraint(constraint)?);
        }

        let chain = Chain {
            nodes,
            constraints,
            closed: self.closed && count >= 3,
            style: self.style,
        };
        let id = world.register_chain(chain);
        log::debug!(
            "built chain {id}: {count} nodes, closed = {}",
            self.closed && count >= 3
        );
        Ok(id)
    }
}
