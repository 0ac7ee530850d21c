use glam::Vec2;
use log::debug;

use crate::{
    core::{node::Node, shape::NodeShape},
    render::{spline, style::NodeStyle, surface::Surface},
    utils::{allocator::EntityId, math::is_finite},
    world::SimulationWorld,
};

/// What one `render` call drew and skipped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    pub chains_drawn: usize,
    pub chains_skipped: usize,
    pub nodes_drawn: usize,
    pub nodes_skipped: usize,
}

/// Reads node positions and issues draw calls. Never mutates the world.
#[derive(Debug, Clone)]
pub struct ChainRenderer {
    /// Draw nodes that belong to no chain using their `NodeShape`.
    pub draw_free_nodes: bool,
}

impl Default for ChainRenderer {
    fn default() -> Self {
        Self {
            draw_free_nodes: true,
        }
    }
}

impl ChainRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&self, world: &SimulationWorld, surface: &mut dyn Surface) -> RenderStats {
        let mut stats = RenderStats::default();

        for (id, chain) in world.chains().iter() {
            if !chain.style.visible {
                continue;
            }
            let points: Vec<Vec2> = chain
                .nodes
                .iter()
                .filter_map(|node| world.node(*node))
                .map(|node| node.position)
                .collect();
            if points.len() < 2 {
                stats.chains_skipped += 1;
                continue;
            }
            if !points.iter().all(|p| is_finite(*p)) {
                debug!("chain {id} has non-finite nodes, not drawn");
                stats.chains_skipped += 1;
                continue;
            }

            let closed = chain.closed && points.len() >= 3;
            let curve = spline::smooth(&points, closed, chain.style.smoothing);
            if closed {
                if let Some(fill) = chain.style.fill {
                    surface.fill_polygon(&curve, fill);
                }
            }
            if let Some(stroke) = &chain.style.stroke {
                surface.stroke_polyline(&curve, closed, stroke);
            }
            stats.chains_drawn += 1;
        }

        if self.draw_free_nodes {
            for (id, node) in world.nodes().iter() {
                let in_chain = node.chain.is_some_and(|c| world.chain(c).is_some());
                if in_chain || !node.style.visible {
                    continue;
                }
                if self.draw_node(id, node, surface) {
                    stats.nodes_drawn += 1;
                } else {
                    stats.nodes_skipped += 1;
                }
            }
        }

        stats
    }

    fn draw_node(&self, id: EntityId, node: &Node, surface: &mut dyn Surface) -> bool {
        if !is_finite(node.position) {
            debug!("node {id} is not finite, not drawn");
            return false;
        }
        let style = &node.style;
        surface.save();
        surface.translate(node.position);
        match &node.shape {
            NodeShape::Circle { radius } => {
                surface.circle(Vec2::ZERO, *radius, style.fill, style.stroke.as_ref());
            }
            NodeShape::Polygon { vertices } => draw_outline(vertices, style, surface),
            NodeShape::PathMesh { contours } => {
                for contour in contours {
                    draw_outline(contour, style, surface);
                }
            }
        }
        surface.restore();
        true
    }
}

fn draw_outline(points: &[Vec2], style: &NodeStyle, surface: &mut dyn Surface) {
    if points.len() < 3 {
        return;
    }
    if let Some(fill) = style.fill {
        surface.fill_polygon(points, fill);
    }
    if let Some(stroke) = &style.stroke {
        surface.stroke_polyline(points, true, stroke);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::surface::{DrawCommand, RecordingSurface};

    #[test]
    fn polygon_node_is_drawn_in_local_space() {
        let mut world = SimulationWorld::default();
        world.add_node(Node::anchor(Vec2::new(50.0, 60.0)).with_shape(NodeShape::regular_polygon(4, 5.0)));

        let mut surface = RecordingSurface::new();
        let stats = ChainRenderer::new().render(&world, &mut surface);

        assert_eq!(stats.nodes_drawn, 1);
        let commands = surface.commands();
        assert_eq!(commands[0], DrawCommand::Save);
        assert_eq!(
            commands[1],
            DrawCommand::Translate {
                offset: Vec2::new(50.0, 60.0)
            }
        );
        assert!(matches!(&commands[2], DrawCommand::FillPolygon { points, .. } if points.len() == 4));
        assert_eq!(commands.last(), Some(&DrawCommand::Restore));
    }

    #[test]
    fn hidden_nodes_are_not_drawn() {
        let mut world = SimulationWorld::default();
        world.add_node(Node::dynamic(Vec2::ZERO).with_style(NodeStyle::hidden()));
        let mut surface = RecordingSurface::new();
        let stats = ChainRenderer::new().render(&world, &mut surface);
        assert_eq!(stats, RenderStats::default());
        assert!(surface.is_empty());
    }
}
