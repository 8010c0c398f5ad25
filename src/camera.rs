//! View transform between the physics world and the screen
//!
//! The view is a plain `Affine2` mapping world units to screen pixels. `Camera`
//! builds one from pan / zoom / rotation; hosts with their own camera can pass
//! any `Affine2` straight to the drawer.

use glam::{Affine2, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest zoom factor `Camera::zoom_by` will settle on
pub const MIN_ZOOM: f32 = 0.01;

/// Map a world point to screen pixels
#[inline]
pub fn world_to_screen(point: Vec2, view: &Affine2) -> Vec2 {
    view.transform_point2(point)
}

/// Map a screen point back to world units
///
/// Returns `Vec2::NAN` when `view` cannot be inverted (zero scale), so callers
/// treat the frame as a no-op instead of crashing.
pub fn screen_to_world(point: Vec2, view: &Affine2) -> Vec2 {
    let det = view.matrix2.determinant();
    if det == 0.0 || !det.is_finite() {
        return Vec2::NAN;
    }
    view.inverse().transform_point2(point)
}

/// Mirror the y axis, for worlds whose +Y points up
#[inline]
pub fn flip_y() -> Affine2 {
    Affine2::from_scale(Vec2::new(1.0, -1.0))
}

/// Look-at camera with zoom and rotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// World point shown at the viewport center
    pub position: Vec2,
    pub zoom: f32,
    /// Radians
    pub rotation: f32,
    /// Viewport size in pixels
    pub viewport: Vec2,
    /// World +Y points up the screen
    #[serde(default)]
    pub y_up: bool,
}

impl Camera {
    pub fn new(position: Vec2, viewport: Vec2) -> Self {
        Self {
            position,
            zoom: 1.0,
            rotation: 0.0,
            viewport,
            y_up: false,
        }
    }

    pub fn with_y_up(mut self) -> Self {
        self.y_up = true;
        self
    }

    pub fn look_at(&mut self, target: Vec2) {
        self.position = target;
    }

    pub fn zoom_by(&mut self, factor: f32) {
        self.zoom = (self.zoom * factor).max(MIN_ZOOM);
    }

    pub fn rotate_by(&mut self, radians: f32) {
        self.rotation += radians;
    }

    /// Back to unit zoom, no rotation, centered on the viewport
    pub fn reset(&mut self) {
        self.position = self.viewport * 0.5;
        self.zoom = 1.0;
        self.rotation = 0.0;
    }

    /// World-to-screen transform
    pub fn transform(&self) -> Affine2 {
        let flip = if self.y_up { flip_y() } else { Affine2::IDENTITY };
        Affine2::from_translation(self.viewport * 0.5)
            * flip
            * Affine2::from_angle(self.rotation)
            * Affine2::from_scale(Vec2::splat(self.zoom))
            * Affine2::from_translation(-self.position)
    }

    pub fn screen_to_world(&self, point: Vec2) -> Vec2 {
        screen_to_world(point, &self.transform())
    }

    pub fn world_to_screen(&self, point: Vec2) -> Vec2 {
        world_to_screen(point, &self.transform())
    }
}
