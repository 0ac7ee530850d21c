use glam::Vec2;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::render::style::{Rgba, Stroke};

/// A 2D drawing sink with a save/restore transform stack.
///
/// Implemented over a canvas context, an SVG writer, or [`RecordingSurface`].
pub trait Surface {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, offset: Vec2);
    fn rotate(&mut self, radians: f32);
    fn scale(&mut self, factor: Vec2);
    fn stroke_polyline(&mut self, points: &[Vec2], closed: bool, stroke: &Stroke);
    fn fill_polygon(&mut self, points: &[Vec2], color: Rgba);
    fn circle(&mut self, center: Vec2, radius: f32, fill: Option<Rgba>, stroke: Option<&Stroke>);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Save,
    Restore,
    Translate { offset: Vec2 },
    Rotate { radians: f32 },
    Scale { factor: Vec2 },
    StrokePolyline { points: Vec<Vec2>, closed: bool, stroke: Stroke },
    FillPolygon { points: Vec<Vec2>, color: Rgba },
    Circle { center: Vec2, radius: f32, fill: Option<Rgba>, stroke: Option<Stroke> },
}

/// Records every call as a [`DrawCommand`]. Used headless and in tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    depth: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take(&mut self) -> Vec<DrawCommand> {
        self.depth = 0;
        std::mem::take(&mut self.commands)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.depth = 0;
    }

    /// Unmatched `save` calls so far.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Surface for RecordingSurface {
    fn save(&mut self) {
        self.depth += 1;
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        if self.depth == 0 {
            warn!("restore without matching save ignored");
            return;
        }
        self.depth -= 1;
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, offset: Vec2) {
        self.commands.push(DrawCommand::Translate { offset });
    }

    fn rotate(&mut self, radians: f32) {
        self.commands.push(DrawCommand::Rotate { radians });
    }

    fn scale(&mut self, factor: Vec2) {
        self.commands.push(DrawCommand::Scale { factor });
    }

    fn stroke_polyline(&mut self, points: &[Vec2], closed: bool, stroke: &Stroke) {
        self.commands.push(DrawCommand::StrokePolyline {
            points: points.to_vec(),
            closed,
            stroke: *stroke,
        });
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Rgba) {
        self.commands.push(DrawCommand::FillPolygon {
            points: points.to_vec(),
            color,
        });
    }

    fn circle(&mut self, center: Vec2, radius: f32, fill: Option<Rgba>, stroke: Option<&Stroke>) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            fill,
            stroke: stroke.copied(),
        });
    }
}
