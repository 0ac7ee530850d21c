use crate::{core::node::Node, utils::allocator::Arena};
use glam::Vec2;

/// External force applied to every dynamic node each sub-step.
pub trait ForceGenerator: Send + Sync {
    /// `time` is the world clock at the start of the sub-step.
    fn apply(&self, node: &mut Node, time: f32, dt: f32);
}

/// Quadratic drag resisting the direction of motion.
pub struct DragForce {
    pub drag_coefficient: f32,
}

impl ForceGenerator for DragForce {
    fn apply(&self, node: &mut Node, _time: f32, _dt: f32) {
        let speed = node.velocity.length();
        if node.is_static || speed < 1e-6 {
            return;
        }
        let drag = -node.velocity * speed * self.drag_coefficient;
        node.apply_force(drag);
    }
}

/// Pulls nodes within `radius` toward `point`, linearly weaker with distance.
/// Negative `strength` repels.
pub struct AttractorForce {
    pub point: Vec2,
    pub strength: f32,
    pub radius: f32,
}

impl ForceGenerator for AttractorForce {
    fn apply(&self, node: &mut Node, _time: f32, _dt: f32) {
        let offset = self.point - node.position;
        let distance = offset.length();
        if node.is_static || distance < 1e-6 || distance > self.radius {
            return;
        }
        let falloff = 1.0 - distance / self.radius;
        node.apply_force(offset / distance * self.strength * falloff);
    }
}

/// Gusting wind: a steady push plus a sinusoidal gust term.
pub struct WindForce {
    pub direction: Vec2,
    pub strength: f32,
    pub gust_strength: f32,
    /// Gusts per second.
    pub gust_frequency: f32,
}

impl ForceGenerator for WindForce {
    fn apply(&self, node: &mut Node, time: f32, _dt: f32) {
        if node.is_static {
            return;
        }
        let gust = (time * self.gust_frequency * std::f32::consts::TAU).sin();
        let magnitude = self.strength + self.gust_strength * gust;
        node.apply_force(self.direction.normalize_or_zero() * magnitude);
    }
}

/// Collection of forces that can be applied each sub-step.
pub struct ForceRegistry {
    forces: Vec<Box<dyn ForceGenerator>>,
}

impl Default for ForceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ForceRegistry {
    pub fn new() -> Self {
        Self { forces: Vec::new() }
    }

    pub fn add_force<F: ForceGenerator + 'static>(&mut self, force: F) {
        self.forces.push(Box::new(force));
    }

    pub fn clear(&mut self) {
        self.forces.clear();
    }

    pub fn len(&self) -> usize {
        self.forces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forces.is_empty()
    }

    pub fn apply_all(&self, nodes: &mut Arena<Node>, time: f32, dt: f32) {
        if self.forces.is_empty() {
            return;
        }
        for node in nodes.values_mut() {
            for force in &self.forces {
                force.apply(node, time, dt);
            }
        }
    }
}
