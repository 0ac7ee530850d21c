use std::collections::{BTreeMap, VecDeque};

use glam::Vec2;
use log::{debug, trace};

use crate::{
    config::{PointerConfig, POINTER_HISTORY_LEN},
    core::constraints::Constraint,
    error::SimResult,
    interaction::intent::{PointerId, PointerIntent},
    utils::{
        allocator::EntityId,
        math::{clamp_length, is_finite},
    },
    world::SimulationWorld,
};

/// Timestamped pointer position, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub position: Vec2,
    pub time: f64,
}

/// A node held by one pointer through a temporary soft constraint.
#[derive(Debug, Clone)]
pub struct PointerGrab {
    pub pointer: PointerId,
    pub node: EntityId,
    pub constraint: EntityId,
    /// Node position minus pointer position at grab time.
    pub offset: Vec2,
    history: VecDeque<PointerSample>,
}

impl PointerGrab {
    pub fn history(&self) -> impl Iterator<Item = &PointerSample> {
        self.history.iter()
    }

    pub fn target(&self, pointer: Vec2) -> Vec2 {
        pointer + self.offset
    }

    fn record(&mut self, sample: PointerSample) {
        if self.history.len() == POINTER_HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(sample);
    }

    /// Pointer velocity between the last two samples, if time advanced.
    pub fn velocity(&self) -> Option<Vec2> {
        let mut recent = self.history.iter().rev();
        let last = recent.next()?;
        let prev = recent.next()?;
        let elapsed = last.time - prev.time;
        if !elapsed.is_finite() || elapsed <= 0.0 {
            return None;
        }
        let velocity = (last.position - prev.position) / elapsed as f32;
        is_finite(velocity).then_some(velocity)
    }
}

/// Outcome of lifting a pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Release {
    pub node: EntityId,
    /// Velocity handed to the node, when a fling happened.
    pub fling: Option<Vec2>,
}

/// Turns pointer gestures into grab constraints on the world.
///
/// Grabs are keyed by pointer id, so several touches can each hold a
/// different node. Two pointers never hold the same node.
#[derive(Debug, Default)]
pub struct PointerLayer {
    pub config: PointerConfig,
    grabs: BTreeMap<PointerId, PointerGrab>,
}

impl PointerLayer {
    pub fn new(config: PointerConfig) -> Self {
        Self {
            config,
            grabs: BTreeMap::new(),
        }
    }

    pub fn grab(&self, pointer: PointerId) -> Option<&PointerGrab> {
        self.grabs.get(&pointer)
    }

    /// Active grabs in pointer id order.
    pub fn grabs(&self) -> impl Iterator<Item = &PointerGrab> {
        self.grabs.values()
    }

    pub fn grab_count(&self) -> usize {
        self.grabs.len()
    }

    pub fn is_held(&self, node: EntityId) -> bool {
        self.grabs.values().any(|g| g.node == node)
    }

    /// Picks the nearest free dynamic node within the pick radius and holds it.
    pub fn on_pointer_down(
        &mut self,
        world: &mut SimulationWorld,
        pointer: PointerId,
        position: Vec2,
        time: f64,
    ) -> SimResult<Option<EntityId>> {
        if self.grabs.contains_key(&pointer) {
            self.on_pointer_cancel(world, pointer);
        }
        if !is_finite(position) {
            return Ok(None);
        }

        let grabs = &self.grabs;
        let picked = world.nearest_node_with_filter(position, self.config.pick_radius, |id, node| {
            !node.is_static && !grabs.values().any(|g| g.node == id)
        });
        let Some((node, distance)) = picked else {
            trace!("pointer {:?} down at {position} hit nothing", pointer);
            return Ok(None);
        };
        let Some(node_position) = world.node(node).map(|n| n.position) else {
            return Ok(None);
        };

        let offset = node_position - position;
        let constraint = Constraint::to_point(node, node_position, 0.0, self.config.grab_stiffness)?
            .with_damping(self.config.grab_damping)?;
        let constraint = world.add_constraint(constraint)?;

        let mut grab = PointerGrab {
            pointer,
            node,
            constraint,
            offset,
            history: VecDeque::with_capacity(POINTER_HISTORY_LEN),
        };
        grab.record(PointerSample { position, time });
        self.grabs.insert(pointer, grab);
        debug!("pointer {:?} grabbed node {node} at distance {distance:.1}", pointer);
        Ok(Some(node))
    }

    /// Moves the grab target. Returns false when the pointer holds nothing.
    pub fn on_pointer_move(
        &mut self,
        world: &mut SimulationWorld,
        pointer: PointerId,
        position: Vec2,
        time: f64,
    ) -> bool {
        if !is_finite(position) {
            return false;
        }
        let Some(grab) = self.grabs.get_mut(&pointer) else {
            return false;
        };
        if world
            .set_constraint_target(grab.constraint, grab.target(position))
            .is_err()
        {
            self.grabs.remove(&pointer);
            return false;
        }
        grab.record(PointerSample { position, time });
        true
    }

    /// Drops the grab constraint and, if fling is on, hands the pointer's
    /// velocity to the node.
    pub fn on_pointer_up(
        &mut self,
        world: &mut SimulationWorld,
        pointer: PointerId,
        position: Vec2,
        time: f64,
    ) -> Option<Release> {
        let mut grab = self.grabs.remove(&pointer)?;
        world.remove_constraint(grab.constraint);
        world.node(grab.node)?;

        if is_finite(position) {
            grab.record(PointerSample { position, time });
        }

        let fling = if self.config.fling.enabled {
            grab.velocity()
                .map(|v| clamp_length(v * self.config.fling.scale, self.config.fling.max_speed))
        } else {
            None
        };
        if let Some(velocity) = fling {
            if world.set_velocity(grab.node, velocity).is_ok() {
                debug!("node {} flung at {velocity}", grab.node);
            }
        }
        Some(Release {
            node: grab.node,
            fling,
        })
    }

    /// Drops the grab without any fling.
    pub fn on_pointer_cancel(
        &mut self,
        world: &mut SimulationWorld,
        pointer: PointerId,
    ) -> Option<EntityId> {
        let grab = self.grabs.remove(&pointer)?;
        world.remove_constraint(grab.constraint);
        Some(grab.node)
    }

    /// Routes one queued intent. Positions must already be in world space.
    pub fn apply(&mut self, world: &mut SimulationWorld, intent: PointerIntent) -> SimResult<()> {
        match intent {
            PointerIntent::Grab { pointer, position, time } => {
                self.on_pointer_down(world, pointer, position, time)?;
            }
            PointerIntent::Move { pointer, position, time } => {
                self.on_pointer_move(world, pointer, position, time);
            }
            PointerIntent::Release { pointer, position, time } => {
                self.on_pointer_up(world, pointer, position, time);
            }
            PointerIntent::Cancel { pointer } => {
                self.on_pointer_cancel(world, pointer);
            }
        }
        Ok(())
    }

    /// Forgets grabs whose node or constraint no longer exists.
    pub fn sync(&mut self, world: &mut SimulationWorld) -> usize {
        let stale: Vec<PointerId> = self
            .grabs
            .iter()
            .filter(|(_, g)| world.node(g.node).is_none() || world.constraint(g.constraint).is_none())
            .map(|(p, _)| *p)
            .collect();
        for pointer in &stale {
            if let Some(grab) = self.grabs.remove(pointer) {
                world.remove_constraint(grab.constraint);
                debug!("dropped stale grab on node {}", grab.node);
            }
        }
        stale.len()
    }

    /// Releases every grab without fling.
    pub fn release_all(&mut self, world: &mut SimulationWorld) {
        for (_, grab) in std::mem::take(&mut self.grabs) {
            world.remove_constraint(grab.constraint);
        }
    }

    /// Forgets all grabs without touching any world, e.g. after `world.clear()`.
    pub fn clear(&mut self) {
        self.grabs.clear();
    }
}
