//! physdraw - debug drawing for 2D rigid-body physics
//!
//! Core modules:
//! - `geometry`: Path recording, outline extrusion and tessellation
//! - `renderer`: Drawer, mesh batching and wgpu submission
//! - `world`: Physics world contract plus an in-memory world
//! - `grab`: Pointer drag controller
//! - `camera`: View transform and screen/world conversion
//! - `input`: Pointer and touch snapshot read by the drag controller
//! - `theme`: Colors, draw toggles and JSON config

pub mod camera;
pub mod color;
pub mod error;
pub mod geometry;
pub mod grab;
pub mod input;
pub mod renderer;
pub mod theme;
pub mod world;

pub use camera::{Camera, screen_to_world, world_to_screen};
pub use color::Color;
pub use error::ConfigError;
pub use grab::{DragController, DragState};
pub use renderer::{DrawStats, Drawer, GpuRenderer, MeshBatch, RenderTarget};
pub use theme::{DrawOptions, DrawerConfig, Theme};
pub use world::{MemoryWorld, PhysicsWorld};

use glam::Vec2;

/// Drawing and interaction constants
pub mod consts {
    /// Scale between physics units and outline line widths
    pub const DRAW_POINT_LINE_SCALE: f32 = 1.0;

    /// Pointer pick tolerance around the cursor (world units)
    pub const PICK_RADIUS: f32 = 5.0;
    /// Fraction of the remaining distance the mouse body covers per tick
    pub const MOUSE_LERP: f32 = 0.25;
    /// Ticks per second assumed when deriving mouse body velocity
    pub const TICK_RATE: f32 = 60.0;

    /// Maximum force of the drag pivot
    pub const GRAB_MAX_FORCE: f32 = 50_000.0;
    /// Fraction of positional error corrected per tick by the drag pivot
    pub const GRAB_CORRECTION: f32 = 0.15;

    /// Arc flattening density
    pub const ARC_SEGMENTS_PER_RADIAN: f32 = 6.0;
    pub const ARC_MIN_SEGMENTS: u32 = 2;
    pub const ARC_MAX_SEGMENTS: u32 = 64;

    /// Half length of a contact marker along the contact normal
    pub const CONTACT_MARKER_LENGTH: f32 = 2.0;
}

/// Error bias for the drag pivot: `(1 - correction)^60`
#[inline]
pub fn grab_error_bias() -> f32 {
    (1.0 - consts::GRAB_CORRECTION).powf(consts::TICK_RATE)
}

/// Rotate a vector by -90 degrees
#[inline]
pub fn reverse_perp(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

/// Unit vector for an angle in radians
#[inline]
pub fn from_angle(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}
