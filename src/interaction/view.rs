use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::Bounds;

/// Canvas size in CSS pixels plus the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub device_pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio: if device_pixel_ratio > 0.0 {
                device_pixel_ratio
            } else {
                1.0
            },
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.size() * 0.5
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0, 1.0)
    }
}

/// Maps device-pixel pointer coordinates to simulation space and back.
///
/// `origin` is the world point shown at the canvas's top-left corner and
/// `zoom` is CSS pixels per world unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub device_pixel_ratio: f32,
    pub origin: Vec2,
    pub zoom: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            device_pixel_ratio: 1.0,
            origin: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl ViewTransform {
    pub fn for_viewport(viewport: &Viewport) -> Self {
        Self {
            device_pixel_ratio: viewport.device_pixel_ratio,
            ..Self::default()
        }
    }

    fn scale(&self) -> f32 {
        let scale = self.device_pixel_ratio * self.zoom;
        if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        }
    }

    pub fn canvas_to_world(&self, device: Vec2) -> Vec2 {
        self.origin + device / self.scale()
    }

    pub fn world_to_canvas(&self, world: Vec2) -> Vec2 {
        (world - self.origin) * self.scale()
    }

    /// World rectangle currently visible in `viewport`.
    pub fn visible_bounds(&self, viewport: &Viewport) -> Bounds {
        let device = viewport.size() * viewport.device_pixel_ratio;
        Bounds::new(self.canvas_to_world(Vec2::ZERO), self.canvas_to_world(device))
    }
}
