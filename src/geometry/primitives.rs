//! Paths for the simple shape kinds

use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use super::path::{Path, Winding};
use crate::from_angle;

/// Full circle outline
pub fn circle_path(center: Vec2, radius: f32) -> Path {
    let mut path = Path::new();
    path.arc(center, radius, 0.0, TAU, Winding::Positive).close();
    path
}

/// Capsule ("fat segment") around `a`-`b`
///
/// Two half-circle caps centered on `a` and `b`, each spanning exactly π and
/// starting perpendicular to the segment, joined by the straight sides.
pub fn capsule_path(a: Vec2, b: Vec2, radius: f32) -> Path {
    let d = b - a;
    let t1 = d.y.atan2(d.x) + FRAC_PI_2;
    let t2 = t1 + PI;

    let mut path = Path::new();
    path.arc(a, radius, t1, t1 + PI, Winding::Positive)
        .arc(b, radius, t2, t2 + PI, Winding::Positive)
        .close();
    path
}

/// Open two-point path
pub fn segment_path(a: Vec2, b: Vec2) -> Path {
    let mut path = Path::new();
    path.move_to(a).line_to(b);
    path
}

/// Radius line from `center` along `angle`, shows body rotation
pub fn angle_tick_path(center: Vec2, angle: f32, radius: f32) -> Path {
    segment_path(center, center + from_angle(angle) * radius)
}
