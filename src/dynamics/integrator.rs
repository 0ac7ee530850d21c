use glam::Vec2;

use crate::{core::node::Node, utils::allocator::Arena};

/// Semi-implicit Euler integrator with position-based velocity recovery.
///
/// A sub-step is `integrate_velocity` → `predict_position` → (constraint and
/// contact projection) → `recover_velocity`.
#[derive(Debug, Clone)]
pub struct Integrator {
    pub gravity: Vec2,
    pub linear_damping: f32,
    parallel: bool,
}

impl Integrator {
    pub fn new(gravity: Vec2, linear_damping: f32) -> Self {
        Self {
            gravity,
            linear_damping,
            parallel: false,
        }
    }

    pub fn set_parallel(&mut self, enabled: bool) {
        self.parallel = enabled;
    }

    pub fn integrate_velocity(&self, node: &mut Node, dt: f32) {
        if node.is_static {
            node.acceleration = Vec2::ZERO;
            return;
        }

        node.velocity += (self.gravity * node.gravity_scale + node.acceleration) * dt;
        let damping = node.linear_damping.unwrap_or(self.linear_damping);
        node.velocity *= (1.0 - damping * dt).max(0.0);
        node.acceleration = Vec2::ZERO;
    }

    pub fn predict_position(&self, node: &mut Node, dt: f32) {
        node.previous_position = node.position;
        if node.is_static {
            return;
        }
        node.position += node.velocity * dt;
    }

    pub fn recover_velocity(&self, node: &mut Node, dt: f32) {
        if node.is_static {
            node.velocity = Vec2::ZERO;
            return;
        }
        node.velocity = (node.position - node.previous_position) / dt;
    }

    pub fn integrate(&self, nodes: &mut Arena<Node>, dt: f32) {
        #[cfg(feature = "parallel")]
        if self.parallel {
            nodes.par_for_each_mut(|node| {
                self.integrate_velocity(node, dt);
                self.predict_position(node, dt);
            });
            return;
        }

        for node in nodes.values_mut() {
            self.integrate_velocity(node, dt);
            self.predict_position(node, dt);
        }
    }

    pub fn finish(&self, nodes: &mut Arena<Node>, dt: f32) {
        #[cfg(feature = "parallel")]
        if self.parallel {
            nodes.par_for_each_mut(|node| self.recover_velocity(node, dt));
            return;
        }

        for node in nodes.values_mut() {
            self.recover_velocity(node, dt);
        }
    }
}
