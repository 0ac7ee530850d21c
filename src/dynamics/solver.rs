use glam::Vec2;

use crate::{
    core::{
        constraints::{Anchor, Constraint},
        node::Node,
    },
    utils::{
        allocator::{Arena, EntityId},
        math::per_iteration_stiffness,
    },
};

/// Below this separation a constraint has no usable axis and is skipped.
const DEGENERATE_LENGTH: f32 = 1e-6;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SolverStepMetrics {
    pub constraints_solved: usize,
    /// Constraint evaluations skipped for zero length or a missing endpoint.
    pub degenerate_skipped: usize,
    /// Largest absolute length error seen in the last iteration.
    pub max_error: f32,
}

impl SolverStepMetrics {
    pub fn merge(&mut self, other: &Self) {
        self.constraints_solved += other.constraints_solved;
        self.degenerate_skipped += other.degenerate_skipped;
        self.max_error = self.max_error.max(other.max_error);
    }
}

/// Gauss–Seidel projection of soft distance constraints.
#[derive(Debug, Clone)]
pub struct ConstraintSolver {
    pub iterations: u32,
}

impl Default for ConstraintSolver {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SOLVER_ITERATIONS)
    }
}

impl ConstraintSolver {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    /// Projects positions toward every enabled constraint, in id order.
    pub fn solve_positions(
        &self,
        nodes: &mut Arena<Node>,
        constraints: &Arena<Constraint>,
    ) -> SolverStepMetrics {
        let mut metrics = SolverStepMetrics::default();
        for iteration in 0..self.iterations {
            let last = iteration + 1 == self.iterations;
            if last {
                metrics.max_error = 0.0;
            }
            for constraint in constraints.values().filter(|c| c.enabled) {
                let k = per_iteration_stiffness(constraint.stiffness, self.iterations);
                match Self::project(nodes, constraint, k) {
                    Some(error) => {
                        metrics.constraints_solved += 1;
                        if last {
                            metrics.max_error = metrics.max_error.max(error.abs());
                        }
                    }
                    None => metrics.degenerate_skipped += 1,
                }
            }
        }
        metrics
    }

    /// Returns the length error before correction, or `None` when skipped.
    fn project(nodes: &mut Arena<Node>, constraint: &Constraint, k: f32) -> Option<f32> {
        match constraint.target {
            Anchor::Node(other) => {
                let (a, b) = nodes.get2_mut(constraint.node, other)?;
                let (wa, wb) = (a.solver_inverse_mass(), b.solver_inverse_mass());
                let w = wa + wb;
                let delta = b.position - a.position;
                let dist = delta.length();
                if w <= 0.0 || !dist.is_finite() || dist < DEGENERATE_LENGTH {
                    return None;
                }

                let error = dist - constraint.rest_length;
                let correction = delta * (error * k / dist);
                a.position += correction * (wa / w);
                b.position -= correction * (wb / w);
                Some(error)
            }
            Anchor::Point(point) => {
                let a = nodes.get_mut(constraint.node)?;
                if a.solver_inverse_mass() <= 0.0 {
                    return None;
                }
                let delta = point - a.position;
                let dist = delta.length();
                if !dist.is_finite() || dist < DEGENERATE_LENGTH {
                    return None;
                }

                let error = dist - constraint.rest_length;
                a.position += delta * (error * k / dist);
                Some(error)
            }
        }
    }

    /// Removes a `damping` fraction of each constraint's relative axial velocity.
    pub fn apply_damping(&self, nodes: &mut Arena<Node>, constraints: &Arena<Constraint>) {
        for constraint in constraints.values().filter(|c| c.enabled && c.damping > 0.0) {
            Self::damp(nodes, constraint);
        }
    }

    fn damp(nodes: &mut Arena<Node>, constraint: &Constraint) -> Option<()> {
        match constraint.target {
            Anchor::Node(other) => {
                let (a, b) = nodes.get2_mut(constraint.node, other)?;
                let (wa, wb) = (a.solver_inverse_mass(), b.solver_inverse_mass());
                let w = wa + wb;
                let axis = axis_between(a.position, b.position)?;
                if w <= 0.0 {
                    return None;
                }
                let relative = (b.velocity - a.velocity).dot(axis) * constraint.damping;
                a.velocity += axis * (relative * wa / w);
                b.velocity -= axis * (relative * wb / w);
            }
            Anchor::Point(point) => {
                let a = nodes.get_mut(constraint.node)?;
                if a.solver_inverse_mass() <= 0.0 {
                    return None;
                }
                let axis = axis_between(a.position, point)?;
                let along = a.velocity.dot(axis) * constraint.damping;
                a.velocity -= axis * along;
            }
        }
        Some(())
    }

    /// Current length of a constraint, `None` if an endpoint is gone.
    pub fn current_length(nodes: &Arena<Node>, constraint: &Constraint) -> Option<f32> {
        let a = nodes.get(constraint.node)?.position;
        let b = match constraint.target {
            Anchor::Node(other) => nodes.get(other)?.position,
            Anchor::Point(point) => point,
        };
        Some(a.distance(b))
    }

    /// Endpoint ids of every node–node constraint, for contact exclusion.
    pub fn linked_pairs(constraints: &Arena<Constraint>) -> Vec<(EntityId, EntityId)> {
        let mut pairs: Vec<_> = constraints.values().filter_map(Constraint::node_pair).collect();
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }
}

fn axis_between(from: Vec2, to: Vec2) -> Option<Vec2> {
    let delta = to - from;
    let dist = delta.length();
    (dist.is_finite() && dist >= DEGENERATE_LENGTH).then(|| delta / dist)
}
