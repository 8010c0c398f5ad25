//! Constraint schematics
//!
//! Joints with positional anchors get dots and connecting lines; springs get
//! a zig-zag. Purely rotational joints have nothing to anchor a drawing to and
//! are skipped.

use glam::Vec2;

use super::drawer::Drawer;
use super::target::RenderTarget;
use crate::color::Color;
use crate::world::{Constraint, ConstraintKind, PhysicsWorld};

/// Spring zig-zag in a normalized frame: x runs 0..1 along the spring, y is
/// the lateral offset in world units
pub const SPRING_VERTS: [Vec2; 15] = [
    Vec2::new(0.00, 0.0),
    Vec2::new(0.20, 0.0),
    Vec2::new(0.25, 3.0),
    Vec2::new(0.30, -6.0),
    Vec2::new(0.35, 6.0),
    Vec2::new(0.40, -6.0),
    Vec2::new(0.45, 6.0),
    Vec2::new(0.50, -6.0),
    Vec2::new(0.55, 6.0),
    Vec2::new(0.60, -6.0),
    Vec2::new(0.65, 6.0),
    Vec2::new(0.70, -3.0),
    Vec2::new(0.75, 6.0),
    Vec2::new(0.80, 0.0),
    Vec2::new(1.00, 0.0),
];

/// Map the spring template onto the world segment `a`-`b`
pub fn spring_points(a: Vec2, b: Vec2) -> [Vec2; 15] {
    let delta = b - a;
    let (cos, sin) = (delta.x, delta.y);
    let s = 1.0 / delta.length();

    let r1 = Vec2::new(cos, -sin * s);
    let r2 = Vec2::new(sin, cos * s);
    SPRING_VERTS.map(|v| Vec2::new(v.dot(r1) + a.x, v.dot(r2) + a.y))
}

impl Drawer {
    /// Draw a constraint between its bodies' current transforms
    ///
    /// Constraints with a missing body are skipped.
    pub fn draw_constraint<W, T>(
        &self,
        world: &W,
        constraint: &Constraint,
        color: Color,
        target: &mut T,
    ) where
        W: PhysicsWorld + ?Sized,
        T: RenderTarget + ?Sized,
    {
        let (Some(body_a), Some(body_b)) =
            (world.body(constraint.body_a), world.body(constraint.body_b))
        else {
            return;
        };
        let on_a = |p: Vec2| body_a.local_to_world(p);
        let on_b = |p: Vec2| body_b.local_to_world(p);

        match &constraint.kind {
            ConstraintKind::Pin { anchor_a, anchor_b }
            | ConstraintKind::Slide {
                anchor_a, anchor_b, ..
            } => {
                let a = on_a(*anchor_a);
                let b = on_b(*anchor_b);
                self.draw_dot(target, a, color);
                self.draw_dot(target, b, color);
                self.draw_segment(target, a, b, color);
            }
            ConstraintKind::Pivot { anchor_a, anchor_b } => {
                self.draw_dot(target, on_a(*anchor_a), color);
                self.draw_dot(target, on_b(*anchor_b), color);
            }
            ConstraintKind::Groove {
                groove_a,
                groove_b,
                anchor_b,
            } => {
                self.draw_dot(target, on_b(*anchor_b), color);
                self.draw_segment(target, on_a(*groove_a), on_a(*groove_b), color);
            }
            ConstraintKind::DampedSpring {
                anchor_a, anchor_b, ..
            } => {
                let a = on_a(*anchor_a);
                let b = on_b(*anchor_b);
                self.draw_dot(target, a, color);
                self.draw_dot(target, b, color);

                let points = spring_points(a, b);
                for pair in points.windows(2) {
                    self.draw_segment(target, pair[0], pair[1], color);
                }
            }
            ConstraintKind::Gear { .. }
            | ConstraintKind::SimpleMotor { .. }
            | ConstraintKind::DampedRotarySpring { .. }
            | ConstraintKind::RotaryLimit { .. }
            | ConstraintKind::Ratchet { .. } => {}
        }
    }
}
