use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Drawable outline of a free node, chosen once at construction.
///
/// Vertices are in node-local space (relative to the node position).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeShape {
    Circle { radius: f32 },
    Polygon { vertices: Vec<Vec2> },
    /// Pre-flattened path outlines, one closed contour each.
    PathMesh { contours: Vec<Vec<Vec2>> },
}

impl Default for NodeShape {
    fn default() -> Self {
        NodeShape::Circle { radius: 1.0 }
    }
}

impl NodeShape {
    pub fn circle(radius: f32) -> Self {
        NodeShape::Circle { radius }
    }

    /// Regular polygon with `sides` corners on a circle of `radius`, first corner on +X.
    ///
    /// Fewer than three sides degrades to a circle.
    pub fn regular_polygon(sides: usize, radius: f32) -> Self {
        if sides < 3 {
            return NodeShape::Circle { radius };
        }
        let step = std::f32::consts::TAU / sides as f32;
        let vertices = (0..sides)
            .map(|i| Vec2::from_angle(step * i as f32) * radius)
            .collect();
        NodeShape::Polygon { vertices }
    }

    /// Gear outline: `teeth` rectangular teeth between `root_radius` and `tip_radius`.
    pub fn gear(teeth: usize, root_radius: f32, tip_radius: f32) -> Self {
        if teeth < 3 {
            return NodeShape::Circle { radius: tip_radius };
        }
        let step = std::f32::consts::TAU / (teeth * 4) as f32;
        let radii = [root_radius, tip_radius, tip_radius, root_radius];
        let vertices = (0..teeth * 4)
            .map(|i| Vec2::from_angle(step * i as f32) * radii[i % 4])
            .collect();
        NodeShape::Polygon { vertices }
    }

    pub fn bounding_radius(&self) -> f32 {
        let farthest = |points: &[Vec2]| points.iter().map(|p| p.length()).fold(0.0, f32::max);
        match self {
            NodeShape::Circle { radius } => *radius,
            NodeShape::Polygon { vertices } => farthest(vertices),
            NodeShape::PathMesh { contours } => contours
                .iter()
                .map(|contour| farthest(contour))
                .fold(0.0, f32::max),
        }
    }
}
