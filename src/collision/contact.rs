use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    config::Bounds,
    core::node::Node,
    utils::allocator::{Arena, EntityId},
};

/// Overlap between two node circles. `normal` points from `a` to `b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub a: EntityId,
    pub b: EntityId,
    pub normal: Vec2,
    pub depth: f32,
}

/// Collision-start/end notification for a node pair, ordered `(low, high)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionEvent {
    Started { a: EntityId, b: EntityId },
    Ended { a: EntityId, b: EntityId },
}

impl CollisionEvent {
    pub fn pair(&self) -> (EntityId, EntityId) {
        match *self {
            CollisionEvent::Started { a, b } | CollisionEvent::Ended { a, b } => (a, b),
        }
    }

    pub fn involves(&self, id: EntityId) -> bool {
        let (a, b) = self.pair();
        a == id || b == id
    }
}

/// Circle–circle narrow-phase test.
pub fn circle_contact(a_id: EntityId, a: &Node, b_id: EntityId, b: &Node) -> Option<Contact> {
    let delta = b.position - a.position;
    let combined = a.radius + b.radius;
    let dist_sq = delta.length_squared();
    if !dist_sq.is_finite() || dist_sq >= combined * combined {
        return None;
    }

    let dist = dist_sq.sqrt();
    // Coincident centres: pick a fixed axis so the result stays deterministic.
    let normal = if dist > 1e-6 { delta / dist } else { Vec2::Y };
    Some(Contact {
        a: a_id,
        b: b_id,
        normal,
        depth: combined - dist,
    })
}

/// Pushes overlapping nodes apart, split by inverse mass.
pub fn resolve_contacts(nodes: &mut Arena<Node>, contacts: &[Contact]) {
    for contact in contacts {
        let Some((a, b)) = nodes.get2_mut(contact.a, contact.b) else {
            continue;
        };
        let (wa, wb) = (a.solver_inverse_mass(), b.solver_inverse_mass());
        let w = wa + wb;
        if w <= 0.0 {
            continue;
        }
        let push = contact.normal * contact.depth;
        a.position -= push * (wa / w);
        b.position += push * (wb / w);
    }
}

/// Clamps dynamic nodes inside `bounds`, reflecting the implied velocity.
///
/// Must run between position prediction and velocity recovery.
pub fn clamp_to_bounds(nodes: &mut Arena<Node>, bounds: &Bounds, restitution: f32) {
    for node in nodes.values_mut() {
        if node.is_static || !node.position.is_finite() {
            continue;
        }
        let min = bounds.min + Vec2::splat(node.radius);
        let max = bounds.max - Vec2::splat(node.radius);
        for axis in 0..2 {
            let (lo, hi) = (min[axis], max[axis].max(min[axis]));
            let pos = node.position[axis];
            if pos < lo || pos > hi {
                let wall = pos.clamp(lo, hi);
                let travel = pos - node.previous_position[axis];
                node.position[axis] = wall;
                node.previous_position[axis] = wall + travel * restitution;
            }
        }
    }
}

/// Remembers which pairs touched last step and reports changes.
#[derive(Debug, Default, Clone)]
pub struct ContactTracker {
    touching: BTreeSet<(EntityId, EntityId)>,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the touching set with `current`, returning the events in pair order:
    /// endings first, then starts.
    pub fn update(&mut self, current: BTreeSet<(EntityId, EntityId)>) -> Vec<CollisionEvent> {
        let mut events: Vec<CollisionEvent> = self
            .touching
            .difference(&current)
            .map(|&(a, b)| CollisionEvent::Ended { a, b })
            .collect();
        events.extend(
            current
                .difference(&self.touching)
                .map(|&(a, b)| CollisionEvent::Started { a, b }),
        );
        self.touching = current;
        events
    }

    pub fn is_touching(&self, a: EntityId, b: EntityId) -> bool {
        self.touching.contains(&(a.min(b), a.max(b)))
    }

    pub fn clear(&mut self) {
        self.touching.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn overlapping_circles_separate_evenly() {
        let mut nodes = Arena::new();
        let a = nodes.insert(Node::dynamic(Vec2::ZERO).with_radius(5.0));
        let b = nodes.insert(Node::dynamic(Vec2::new(8.0, 0.0)).with_radius(5.0));

        let contact = circle_contact(a, nodes.get(a).unwrap(), b, nodes.get(b).unwrap())
            .expect("circles overlap");
        assert_relative_eq!(contact.depth, 2.0, epsilon = 1e-5);

        resolve_contacts(&mut nodes, &[contact]);
        assert_relative_eq!(nodes.get(a).unwrap().position.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(nodes.get(b).unwrap().position.x, 9.0, epsilon = 1e-5);
    }

    #[test]
    fn anchor_takes_no_push() {
        let mut nodes = Arena::new();
        let a = nodes.insert(Node::anchor(Vec2::ZERO).with_radius(5.0));
        let b = nodes.insert(Node::dynamic(Vec2::new(8.0, 0.0)).with_radius(5.0));
        let contact = circle_contact(a, nodes.get(a).unwrap(), b, nodes.get(b).unwrap()).unwrap();
        resolve_contacts(&mut nodes, &[contact]);
        assert_eq!(nodes.get(a).unwrap().position, Vec2::ZERO);
        assert_relative_eq!(nodes.get(b).unwrap().position.x, 10.0, epsilon = 1e-5);
    }

    #[test]
    fn tracker_reports_start_then_end() {
        let mut tracker = ContactTracker::new();
        let pair = (EntityId::new(0, 0), EntityId::new(1, 0));

        let started = tracker.update([pair].into_iter().collect());
        assert_eq!(started, vec![CollisionEvent::Started { a: pair.0, b: pair.1 }]);
        assert!(tracker.update([pair].into_iter().collect()).is_empty());

        let ended = tracker.update(BTreeSet::new());
        assert_eq!(ended, vec![CollisionEvent::Ended { a: pair.0, b: pair.1 }]);
    }

    #[test]
    fn bounds_clamp_reflects_motion() {
        let mut nodes = Arena::new();
        let id = nodes.insert(Node::dynamic(Vec2::new(50.0, 50.0)).with_radius(0.0));
        {
            let node = nodes.get_mut(id).unwrap();
            node.previous_position = Vec2::new(50.0, 90.0);
            node.position = Vec2::new(50.0, 110.0);
        }
        clamp_to_bounds(&mut nodes, &Bounds::from_size(100.0, 100.0), 1.0);
        let node = nodes.get(id).unwrap();
        assert_eq!(node.position.y, 100.0);
        // Implied velocity (position - previous) now points back up.
        assert!(node.position.y - node.previous_position.y < 0.0);
    }
}
