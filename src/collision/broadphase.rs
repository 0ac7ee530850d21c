use std::collections::HashMap;

use glam::Vec2;

use crate::{
    core::node::Node,
    utils::allocator::{Arena, EntityId},
};

/// Nodes spanning more cells than this along either axis skip the grid.
pub const MAX_CELLS_PER_AXIS: i64 = 4;

#[derive(Debug, Clone, Copy)]
struct Entry {
    id: EntityId,
    min: Vec2,
    max: Vec2,
}

impl Entry {
    fn overlaps(&self, other: &Entry) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

/// Uniform grid spatial partitioning used by the broad-phase.
///
/// Bodies too large for the grid are kept in a separate list and tested
/// against every other entry by bounding box, so insert cost stays bounded
/// whatever the radius.
pub struct SpatialGrid {
    cell_size: f32,
    grid: HashMap<(i32, i32), Vec<EntityId>>,
    entries: Vec<Entry>,
    oversized: Vec<Entry>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: if cell_size > 0.0 && cell_size.is_finite() {
                cell_size
            } else {
                1.0
            },
            grid: HashMap::new(),
            entries: Vec::new(),
            oversized: Vec::new(),
        }
    }

    fn world_to_grid(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        self.grid.clear();
        self.entries.clear();
        self.oversized.clear();
    }

    pub fn insert(&mut self, id: EntityId, position: Vec2, radius: f32) {
        let entry = Entry {
            id,
            min: position - Vec2::splat(radius),
            max: position + Vec2::splat(radius),
        };
        let min_cell = self.world_to_grid(entry.min);
        let max_cell = self.world_to_grid(entry.max);
        let span_x = i64::from(max_cell.0) - i64::from(min_cell.0);
        let span_y = i64::from(max_cell.1) - i64::from(min_cell.1);

        self.entries.push(entry);
        if span_x >= MAX_CELLS_PER_AXIS || span_y >= MAX_CELLS_PER_AXIS {
            self.oversized.push(entry);
            return;
        }
        for x in min_cell.0..=max_cell.0 {
            for y in min_cell.1..=max_cell.1 {
                self.grid.entry((x, y)).or_default().push(id);
            }
        }
    }

    pub fn oversized_count(&self) -> usize {
        self.oversized.len()
    }

    /// Every pair of ids that may overlap, ordered `(low, high)`, sorted.
    pub fn pairs(&self) -> Vec<(EntityId, EntityId)> {
        let mut pairs = Vec::new();
        for ids in self.grid.values() {
            for (i, a) in ids.iter().enumerate() {
                for b in &ids[i + 1..] {
                    if a != b {
                        pairs.push(((*a).min(*b), (*a).max(*b)));
                    }
                }
            }
        }
        for big in &self.oversized {
            for other in &self.entries {
                if other.id != big.id && big.overlaps(other) {
                    pairs.push((big.id.min(other.id), big.id.max(other.id)));
                }
            }
        }
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }
}

/// Finds candidate node pairs for the narrow-phase.
pub struct BroadPhase {
    grid: SpatialGrid,
}

impl BroadPhase {
    pub fn new(cell_size: f32) -> Self {
        Self {
            grid: SpatialGrid::new(cell_size),
        }
    }

    /// Candidate pairs of live, finite, collidable nodes. Anchor–anchor pairs and
    /// filter mismatches are dropped. Output order is deterministic.
    pub fn potential_pairs(&mut self, nodes: &Arena<Node>) -> Vec<(EntityId, EntityId)> {
        self.grid.clear();
        for (id, node) in nodes.iter() {
            if node.radius <= 0.0 || node.filter.layer == 0 || !node.position.is_finite() {
                continue;
            }
            self.grid.insert(id, node.position, node.radius);
        }

        self.grid
            .pairs()
            .into_iter()
            .filter(|(a, b)| match (nodes.get(*a), nodes.get(*b)) {
                (Some(na), Some(nb)) => {
                    !(na.is_static && nb.is_static) && na.filter.matches(&nb.filter)
                }
                _ => false,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::node::CollisionFilter;

    #[test]
    fn nearby_nodes_pair_up_once() {
        let mut nodes = Arena::new();
        let a = nodes.insert(Node::dynamic(Vec2::new(10.0, 10.0)).with_radius(8.0));
        let b = nodes.insert(Node::dynamic(Vec2::new(20.0, 10.0)).with_radius(8.0));
        nodes.insert(Node::dynamic(Vec2::new(500.0, 500.0)).with_radius(8.0));

        let pairs = BroadPhase::new(16.0).potential_pairs(&nodes);
        assert_eq!(pairs, vec![(a, b)]);
    }

    #[test]
    fn anchors_and_filtered_nodes_are_skipped() {
        let mut nodes = Arena::new();
        nodes.insert(Node::anchor(Vec2::ZERO).with_radius(8.0));
        nodes.insert(Node::anchor(Vec2::new(4.0, 0.0)).with_radius(8.0));
        nodes.insert(
            Node::dynamic(Vec2::new(2.0, 0.0))
                .with_radius(8.0)
                .with_filter(CollisionFilter::NONE),
        );

        assert!(BroadPhase::new(16.0).potential_pairs(&nodes).is_empty());
    }

    #[test]
    fn huge_bodies_bypass_the_grid() {
        let mut nodes = Arena::new();
        let big = nodes.insert(Node::dynamic(Vec2::ZERO).with_radius(20_000.0));
        let small = nodes.insert(Node::dynamic(Vec2::new(900.0, -300.0)).with_radius(4.0));
        nodes.insert(Node::dynamic(Vec2::new(50_000.0, 0.0)).with_radius(4.0));

        let mut broadphase = BroadPhase::new(32.0);
        let pairs = broadphase.potential_pairs(&nodes);
        assert_eq!(pairs, vec![(big, small)]);
        assert_eq!(broadphase.grid.oversized_count(), 1);
    }

    #[test]
    fn two_oversized_bodies_pair_once() {
        let mut grid = SpatialGrid::new(1.0);
        let a = EntityId::new(0, 0);
        let b = EntityId::new(1, 0);
        grid.insert(a, Vec2::ZERO, 100.0);
        grid.insert(b, Vec2::new(150.0, 0.0), 100.0);
        assert_eq!(grid.pairs(), vec![(a, b)]);
    }
}
