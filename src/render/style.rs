use serde::{Deserialize, Serialize};

/// Linear RGBA colour, components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::WHITE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f32,
}

impl Stroke {
    pub fn new(color: Rgba, width: f32) -> Self {
        Self { color, width }
    }
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            color: Rgba::WHITE,
            width: 2.0,
        }
    }
}

/// How a chain's node positions are turned into a drawn curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Smoothing {
    /// Straight segments between nodes.
    Linear,
    /// Cardinal spline through every node. `tension` 0.5 is Catmull-Rom.
    CatmullRom { samples_per_segment: u32, tension: f32 },
}

impl Default for Smoothing {
    fn default() -> Self {
        Smoothing::CatmullRom {
            samples_per_segment: 8,
            tension: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainStyle {
    pub visible: bool,
    pub stroke: Option<Stroke>,
    /// Only used by closed chains.
    pub fill: Option<Rgba>,
    pub smoothing: Smoothing,
}

impl Default for ChainStyle {
    fn default() -> Self {
        Self {
            visible: true,
            stroke: Some(Stroke::default()),
            fill: None,
            smoothing: Smoothing::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeStyle {
    pub visible: bool,
    pub fill: Option<Rgba>,
    pub stroke: Option<Stroke>,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            visible: true,
            fill: Some(Rgba::WHITE),
            stroke: None,
        }
    }
}

impl NodeStyle {
    pub fn hidden() -> Self {
        Self {
            visible: false,
            ..Self::default()
        }
    }
}
