use std::collections::BTreeSet;

use glam::Vec2;
use log::{debug, warn};

use crate::{
    collision::{
        broadphase::BroadPhase,
        contact::{self, CollisionEvent, ContactTracker},
    },
    config::{Bounds, WorldConfig},
    core::{
        chain::Chain,
        constraints::{Anchor, Constraint},
        node::Node,
        tether::{Tether, TetherPolicy, TetherState},
    },
    dynamics::{
        forces::ForceRegistry,
        integrator::Integrator,
        solver::{ConstraintSolver, SolverStepMetrics},
    },
    error::{SimError, SimResult},
    utils::{
        allocator::{Arena, EntityId},
        logging::ScopedTimer,
        math::is_finite,
    },
};

/// What the last `step` did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StepMetrics {
    pub dt: f32,
    pub substeps: u32,
    pub solver: SolverStepMetrics,
    pub contacts: usize,
    pub non_finite_nodes: usize,
    pub tether_transitions: usize,
}

/// The one simulation every subsystem reads and mutates.
///
/// Owns the node registry, constraints, chains, and tethers. Created at sketch
/// setup and cleared on teardown or resize.
pub struct SimulationWorld {
    pub config: WorldConfig,
    pub force_registry: ForceRegistry,
    nodes: Arena<Node>,
    constraints: Arena<Constraint>,
    chains: Arena<Chain>,
    tethers: Arena<Tether>,
    integrator: Integrator,
    solver: ConstraintSolver,
    broadphase: BroadPhase,
    contacts: ContactTracker,
    events: Vec<CollisionEvent>,
    time: f32,
    step_count: u64,
    last_metrics: StepMetrics,
    parallel_enabled: bool,
}

impl Default for SimulationWorld {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

impl SimulationWorld {
    pub fn new(config: WorldConfig) -> Self {
        Self {
            integrator: Integrator::new(config.gravity, config.linear_damping),
            solver: ConstraintSolver::new(config.solver_iterations),
            broadphase: BroadPhase::new(config.broadphase_cell_size),
            config,
            force_registry: ForceRegistry::new(),
            nodes: Arena::new(),
            constraints: Arena::new(),
            chains: Arena::new(),
            tethers: Arena::new(),
            contacts: ContactTracker::new(),
            events: Vec::new(),
            time: 0.0,
            step_count: 0,
            last_metrics: StepMetrics::default(),
            parallel_enabled: false,
        }
    }

    pub fn set_parallel_enabled(&mut self, enabled: bool) {
        self.parallel_enabled = enabled;
        self.integrator.set_parallel(enabled);
    }

    pub fn parallel_enabled(&self) -> bool {
        self.parallel_enabled
    }

    pub fn set_bounds(&mut self, bounds: Option<Bounds>) {
        self.config.bounds = bounds;
    }

    /// Simulated seconds since creation or the last `clear`.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    // ----- nodes -----

    pub fn add_node(&mut self, node: Node) -> EntityId {
        self.nodes.insert(node)
    }

    /// Removes a node and every constraint touching it.
    pub fn remove_node(&mut self, id: EntityId) -> Option<Node> {
        let node = self.nodes.remove(id)?;
        let attached: Vec<EntityId> = self
            .constraints
            .iter()
            .filter(|(_, c)| c.involves(id))
            .map(|(cid, _)| cid)
            .collect();
        for cid in attached {
            self.remove_constraint(cid);
        }
        Some(node)
    }

    pub fn node(&self, id: EntityId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: EntityId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn nodes(&self) -> &Arena<Node> {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Moves an anchor (or teleports a dynamic node). The step never moves anchors itself.
    pub fn set_anchor_position(&mut self, id: EntityId, position: Vec2) -> SimResult<()> {
        if !is_finite(position) {
            return Err(SimError::NonFiniteVector {
                what: "anchor position",
                value: position,
            });
        }
        let node = self.nodes.get_mut(id).ok_or(SimError::UnknownNode(id))?;
        node.teleport(position);
        Ok(())
    }

    /// Sets a dynamic node's velocity. Anchors ignore it.
    pub fn set_velocity(&mut self, id: EntityId, velocity: Vec2) -> SimResult<()> {
        if !is_finite(velocity) {
            return Err(SimError::NonFiniteVector {
                what: "velocity",
                value: velocity,
            });
        }
        let node = self.nodes.get_mut(id).ok_or(SimError::UnknownNode(id))?;
        if !node.is_static {
            node.velocity = velocity;
        }
        Ok(())
    }

    /// Nearest node within `radius` of `point` accepted by `filter`.
    ///
    /// Ties go to the lower id, so picking is deterministic.
    pub fn nearest_node_with_filter<F>(
        &self,
        point: Vec2,
        radius: f32,
        mut filter: F,
    ) -> Option<(EntityId, f32)>
    where
        F: FnMut(EntityId, &Node) -> bool,
    {
        let mut best: Option<(EntityId, f32)> = None;
        for (id, node) in self.nodes.iter() {
            let distance = node.position.distance(point);
            if !distance.is_finite() || distance > radius || !filter(id, node) {
                continue;
            }
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((id, distance));
            }
        }
        best
    }

    /// Ids of nodes whose position is NaN or infinite.
    pub fn non_finite_nodes(&self) -> Vec<EntityId> {
        self.nodes
            .iter()
            .filter(|(_, n)| !is_finite(n.position) || !is_finite(n.velocity))
            .map(|(id, _)| id)
            .collect()
    }

    /// Removes dynamic nodes that left `visible` by more than `margin`, plus any
    /// non-finite ones. Returns the removed ids in id order.
    pub fn recycle_offscreen(&mut self, visible: Bounds, margin: f32) -> Vec<EntityId> {
        let keep_area = visible.expanded(margin);
        let doomed: Vec<EntityId> = self
            .nodes
            .iter()
            .filter(|(_, n)| {
                !n.is_static && (!is_finite(n.position) || !keep_area.contains(n.position))
            })
            .map(|(id, _)| id)
            .collect();
        for id in &doomed {
            self.remove_node(*id);
        }
        if !doomed.is_empty() {
            debug!("recycled {} offscreen nodes", doomed.len());
        }
        doomed
    }

    // ----- constraints -----

    pub fn add_constraint(&mut self, constraint: Constraint) -> SimResult<EntityId> {
        if !self.nodes.contains(constraint.node) {
            return Err(SimError::UnknownNode(constraint.node));
        }
        if let Anchor::Node(other) = constraint.target {
            if !self.nodes.contains(other) {
                return Err(SimError::UnknownNode(other));
            }
        }
        Ok(self.constraints.insert(constraint))
    }

    /// Removes a constraint and any tether built on it.
    pub fn remove_constraint(&mut self, id: EntityId) -> Option<Constraint> {
        let constraint = self.constraints.remove(id)?;
        let tethers: Vec<EntityId> = self
            .tethers
            .iter()
            .filter(|(_, t)| t.constraint == id)
            .map(|(tid, _)| tid)
            .collect();
        for tid in tethers {
            self.tethers.remove(tid);
        }
        Some(constraint)
    }

    pub fn constraint(&self, id: EntityId) -> Option<&Constraint> {
        self.constraints.get(id)
    }

    pub fn constraint_mut(&mut self, id: EntityId) -> Option<&mut Constraint> {
        self.constraints.get_mut(id)
    }

    pub fn constraints(&self) -> &Arena<Constraint> {
        &self.constraints
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Points the constraint's far end at a world position.
    pub fn set_constraint_target(&mut self, id: EntityId, point: Vec2) -> SimResult<()> {
        if !is_finite(point) {
            return Err(SimError::NonFiniteVector {
                what: "constraint target",
                value: point,
            });
        }
        let constraint = self
            .constraints
            .get_mut(id)
            .ok_or(SimError::UnknownConstraint(id))?;
        constraint.target = Anchor::Point(point);
        Ok(())
    }

    pub fn constraint_length(&self, id: EntityId) -> Option<f32> {
        ConstraintSolver::current_length(&self.nodes, self.constraints.get(id)?)
    }

    // ----- chains -----

    pub(crate) fn register_chain(&mut self, chain: Chain) -> EntityId {
        let members = chain.nodes.clone();
        let id = self.chains.insert(chain);
        for node in members {
            if let Some(node) = self.nodes.get_mut(node) {
                node.chain = Some(id);
            }
        }
        id
    }

    pub fn chain(&self, id: EntityId) -> Option<&Chain> {
        self.chains.get(id)
    }

    pub fn chain_mut(&mut self, id: EntityId) -> Option<&mut Chain> {
        self.chains.get_mut(id)
    }

    pub fn chains(&self) -> &Arena<Chain> {
        &self.chains
    }

    /// Live positions of a chain's nodes, in chain order. Pruned nodes are skipped.
    pub fn chain_positions(&self, id: EntityId) -> Option<Vec<Vec2>> {
        let chain = self.chains.get(id)?;
        Some(
            chain
                .nodes
                .iter()
                .filter_map(|node| self.nodes.get(*node))
                .map(|node| node.position)
                .collect(),
        )
    }

    /// Removes a chain with all of its nodes and constraints.
    pub fn remove_chain(&mut self, id: EntityId) -> SimResult<Chain> {
        let chain = self.chains.remove(id).ok_or(SimError::UnknownChain(id))?;
        for node in &chain.nodes {
            self.remove_node(*node);
        }
        for constraint in &chain.constraints {
            self.remove_constraint(*constraint);
        }
        Ok(chain)
    }

    // ----- tethers -----

    pub fn add_tether(&mut self, constraint: EntityId, policy: TetherPolicy) -> SimResult<EntityId> {
        let enabled = self
            .constraints
            .get(constraint)
            .ok_or(SimError::UnknownConstraint(constraint))?
            .enabled;
        let mut tether = Tether::new(constraint, policy);
        if !enabled {
            tether.set_state(TetherState::Detached);
        }
        Ok(self.tethers.insert(tether))
    }

    pub fn tether(&self, id: EntityId) -> Option<&Tether> {
        self.tethers.get(id)
    }

    pub fn tethers(&self) -> &Arena<Tether> {
        &self.tethers
    }

    pub fn attach_tether(&mut self, id: EntityId) -> SimResult<()> {
        self.set_tether_state(id, TetherState::Attached)
    }

    pub fn detach_tether(&mut self, id: EntityId) -> SimResult<()> {
        self.set_tether_state(id, TetherState::Detached)
    }

    fn set_tether_state(&mut self, id: EntityId, state: TetherState) -> SimResult<()> {
        let tether = self.tethers.get_mut(id).ok_or(SimError::UnknownTether(id))?;
        let constraint = self
            .constraints
            .get_mut(tether.constraint)
            .ok_or(SimError::UnknownConstraint(tether.constraint))?;
        tether.set_state(state);
        constraint.enabled = state == TetherState::Attached;
        Ok(())
    }

    fn update_tethers(&mut self, dt: f32) -> usize {
        let mut transitions = 0;
        for (tid, tether) in self.tethers.iter_mut() {
            let Some(constraint) = self.constraints.get_mut(tether.constraint) else {
                continue;
            };
            let Some(length) = ConstraintSolver::current_length(&self.nodes, constraint) else {
                continue;
            };
            if let Some(state) = tether.evaluate(length, dt) {
                constraint.enabled = state == TetherState::Attached;
                transitions += 1;
                debug!("tether {tid} -> {state:?} at length {length:.1}");
            }
        }
        transitions
    }

    // ----- stepping -----

    /// Collision events queued since the last drain, in step order.
    pub fn drain_collision_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advances the simulation by `dt` seconds exactly once.
    ///
    /// Non-finite or non-positive `dt` is ignored; `dt` above `config.max_dt` is clamped.
    pub fn step(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            warn!("ignoring step with invalid dt {dt}");
            return;
        }
        let _timer = ScopedTimer::new("world::step");
        let dt = if self.config.max_dt > 0.0 {
            dt.min(self.config.max_dt)
        } else {
            dt
        };
        let substeps = self.config.substeps.max(1);
        let h = dt / substeps as f32;

        self.integrator.gravity = self.config.gravity;
        self.integrator.linear_damping = self.config.linear_damping;
        self.solver.iterations = self.config.solver_iterations.max(1);

        let linked = if self.config.collisions_enabled {
            ConstraintSolver::linked_pairs(&self.constraints)
        } else {
            Vec::new()
        };

        let mut metrics = StepMetrics {
            dt,
            substeps,
            ..StepMetrics::default()
        };
        let mut touching = BTreeSet::new();

        for _ in 0..substeps {
            self.force_registry.apply_all(&mut self.nodes, self.time, h);
            {
                let _timer = ScopedTimer::new("integrator::predict");
                self.integrator.integrate(&mut self.nodes, h);
            }
            {
                let _timer = ScopedTimer::new("solver::positions");
                let solved = self.solver.solve_positions(&mut self.nodes, &self.constraints);
                metrics.solver.merge(&solved);
            }
            if self.config.collisions_enabled {
                let _timer = ScopedTimer::new("contacts::resolve");
                let contacts = self.generate_contacts(&linked);
                metrics.contacts += contacts.len();
                touching.extend(contacts.iter().map(|c| (c.a, c.b)));
                contact::resolve_contacts(&mut self.nodes, &contacts);
            }
            if let Some(bounds) = self.config.bounds {
                contact::clamp_to_bounds(&mut self.nodes, &bounds, self.config.wall_restitution);
            }
            self.integrator.finish(&mut self.nodes, h);
            self.solver.apply_damping(&mut self.nodes, &self.constraints);
            self.time += h;
        }

        let events = self.contacts.update(touching);
        self.events.extend(events);
        metrics.tether_transitions = self.update_tethers(dt);

        metrics.non_finite_nodes = self.non_finite_nodes().len();
        if metrics.non_finite_nodes > 0 {
            warn!(
                "{} nodes hold non-finite state after step {}",
                metrics.non_finite_nodes, self.step_count
            );
        }

        self.step_count += 1;
        self.last_metrics = metrics;
    }

    fn generate_contacts(&mut self, linked: &[(EntityId, EntityId)]) -> Vec<contact::Contact> {
        if self.nodes.len() < 2 {
            return Vec::new();
        }
        self.broadphase
            .potential_pairs(&self.nodes)
            .into_iter()
            .filter(|pair| linked.binary_search(pair).is_err())
            .filter_map(|(a, b)| {
                let (node_a, node_b) = (self.nodes.get(a)?, self.nodes.get(b)?);
                contact::circle_contact(a, node_a, b, node_b)
            })
            .collect()
    }

    /// Tears everything down. Ids handed out before become stale.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.constraints.clear();
        self.chains.clear();
        self.tethers.clear();
        self.contacts.clear();
        self.events.clear();
        self.time = 0.0;
        self.step_count = 0;
        self.last_metrics = StepMetrics::default();
    }
}
