//! Physics world contract
//!
//! The simulation lives outside this crate. `PhysicsWorld` is the slice of it
//! the drawer and the drag controller need: body lookup, shape / constraint /
//! contact visitation, a nearest-point query and constraint add/remove.
//!
//! Shape and constraint kinds are closed enums, so every renderer match is
//! checked for exhaustiveness at compile time.

pub mod memory;
pub mod query;

use glam::{Affine2, Vec2};
use serde::{Deserialize, Serialize};

pub use memory::MemoryWorld;
pub use query::{Projection, project_circle, project_polygon, project_segment};

/// Body identifier issued by the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

/// Shape identifier issued by the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeHandle(pub u32);

/// Constraint identifier issued by the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConstraintHandle(pub u32);

// ============================================================================
// BODIES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Moved by forces
    Dynamic,
    /// Infinite mass, moved only by assigning position / velocity
    Kinematic,
    /// Never moves
    Static,
}

/// Rigid body state as seen by the drawer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub kind: BodyKind,
    /// `f32::INFINITY` for kinematic and static bodies
    pub mass: f32,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Radians
    pub angle: f32,
    pub sleeping: bool,
    /// Seconds the body has been below the sleep velocity threshold
    pub idle_time: f32,
}

impl Body {
    fn with_kind(kind: BodyKind, mass: f32) -> Self {
        Self {
            kind,
            mass,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            angle: 0.0,
            sleeping: false,
            idle_time: 0.0,
        }
    }

    pub fn dynamic(mass: f32) -> Self {
        Self::with_kind(BodyKind::Dynamic, mass)
    }

    pub fn kinematic() -> Self {
        Self::with_kind(BodyKind::Kinematic, f32::INFINITY)
    }

    pub fn fixed() -> Self {
        Self::with_kind(BodyKind::Static, f32::INFINITY)
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn rotated(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    /// Finite mass: the only bodies a pointer may drag
    #[inline]
    pub fn has_finite_mass(&self) -> bool {
        self.mass.is_finite()
    }

    /// Body-local to world transform
    #[inline]
    pub fn transform(&self) -> Affine2 {
        Affine2::from_angle_translation(self.angle, self.position)
    }

    #[inline]
    pub fn local_to_world(&self, local: Vec2) -> Vec2 {
        self.transform().transform_point2(local)
    }

    #[inline]
    pub fn world_to_local(&self, world: Vec2) -> Vec2 {
        Vec2::from_angle(-self.angle).rotate(world - self.position)
    }
}

// ============================================================================
// SHAPES
// ============================================================================

/// Group value that never matches another group
pub const NO_GROUP: u32 = 0;
pub const ALL_CATEGORIES: u32 = u32::MAX;
/// Category bit carried by shapes the pointer may pick
pub const GRABBABLE_MASK_BIT: u32 = 1 << 31;

/// Collision / query filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeFilter {
    pub group: u32,
    pub categories: u32,
    pub mask: u32,
}

impl ShapeFilter {
    /// Matches everything
    pub const ALL: ShapeFilter = ShapeFilter {
        group: NO_GROUP,
        categories: ALL_CATEGORIES,
        mask: ALL_CATEGORIES,
    };

    /// Filter used for pointer picking
    pub const GRAB: ShapeFilter = ShapeFilter {
        group: NO_GROUP,
        categories: GRABBABLE_MASK_BIT,
        mask: ALL_CATEGORIES,
    };

    /// Filter for shapes the pointer must never pick
    pub const NOT_GRABBABLE: ShapeFilter = ShapeFilter {
        group: NO_GROUP,
        categories: ALL_CATEGORIES,
        mask: ALL_CATEGORIES & !GRABBABLE_MASK_BIT,
    };

    /// True when the two filters must not interact
    pub fn rejects(&self, other: &ShapeFilter) -> bool {
        (self.group != NO_GROUP && self.group == other.group)
            || (self.categories & other.mask) == 0
            || (other.categories & self.mask) == 0
    }
}

impl Default for ShapeFilter {
    fn default() -> Self {
        Self::ALL
    }
}

/// Shape geometry in body-local coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeGeometry {
    Circle { offset: Vec2, radius: f32 },
    /// Capsule between `a` and `b`
    Segment { a: Vec2, b: Vec2, radius: f32 },
    /// Convex, counter-clockwise, with rounded corners of `radius`
    Polygon { verts: Vec<Vec2>, radius: f32 },
}

impl ShapeGeometry {
    /// Same geometry mapped through `body`'s transform
    pub fn to_world(&self, body: &Body) -> ShapeGeometry {
        let xf = body.transform();
        match self {
            ShapeGeometry::Circle { offset, radius } => ShapeGeometry::Circle {
                offset: xf.transform_point2(*offset),
                radius: *radius,
            },
            ShapeGeometry::Segment { a, b, radius } => ShapeGeometry::Segment {
                a: xf.transform_point2(*a),
                b: xf.transform_point2(*b),
                radius: *radius,
            },
            ShapeGeometry::Polygon { verts, radius } => ShapeGeometry::Polygon {
                verts: verts.iter().map(|&v| xf.transform_point2(v)).collect(),
                radius: *radius,
            },
        }
    }

    /// Nearest surface point to a world point, given world-space geometry
    pub fn project(&self, point: Vec2) -> Projection {
        match self {
            ShapeGeometry::Circle { offset, radius } => project_circle(point, *offset, *radius),
            ShapeGeometry::Segment { a, b, radius } => project_segment(point, *a, *b, *radius),
            ShapeGeometry::Polygon { verts, radius } => project_polygon(point, verts, *radius),
        }
    }
}

/// A shape attached to a body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub body: BodyHandle,
    pub geometry: ShapeGeometry,
    pub filter: ShapeFilter,
}

impl Shape {
    pub fn new(body: BodyHandle, geometry: ShapeGeometry) -> Self {
        Self {
            body,
            geometry,
            filter: ShapeFilter::ALL,
        }
    }

    pub fn circle(body: BodyHandle, radius: f32, offset: Vec2) -> Self {
        Self::new(body, ShapeGeometry::Circle { offset, radius })
    }

    pub fn segment(body: BodyHandle, a: Vec2, b: Vec2, radius: f32) -> Self {
        Self::new(body, ShapeGeometry::Segment { a, b, radius })
    }

    pub fn polygon(body: BodyHandle, verts: Vec<Vec2>, radius: f32) -> Self {
        Self::new(body, ShapeGeometry::Polygon { verts, radius })
    }

    /// Axis-aligned box centered on the body origin
    pub fn boxed(body: BodyHandle, width: f32, height: f32, radius: f32) -> Self {
        let (hw, hh) = (width * 0.5, height * 0.5);
        Self::polygon(
            body,
            vec![
                Vec2::new(-hw, -hh),
                Vec2::new(hw, -hh),
                Vec2::new(hw, hh),
                Vec2::new(-hw, hh),
            ],
            radius,
        )
    }

    pub fn with_filter(mut self, filter: ShapeFilter) -> Self {
        self.filter = filter;
        self
    }
}

// ============================================================================
// CONSTRAINTS
// ============================================================================

/// Constraint kinds with their anchors in body-local coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstraintKind {
    Pin { anchor_a: Vec2, anchor_b: Vec2 },
    Slide { anchor_a: Vec2, anchor_b: Vec2, min: f32, max: f32 },
    Pivot { anchor_a: Vec2, anchor_b: Vec2 },
    /// Groove ends live on body A, the anchor on body B
    Groove { groove_a: Vec2, groove_b: Vec2, anchor_b: Vec2 },
    DampedSpring {
        anchor_a: Vec2,
        anchor_b: Vec2,
        rest_length: f32,
        stiffness: f32,
        damping: f32,
    },
    Gear { phase: f32, ratio: f32 },
    SimpleMotor { rate: f32 },
    DampedRotarySpring { rest_angle: f32, stiffness: f32, damping: f32 },
    RotaryLimit { min: f32, max: f32 },
    Ratchet { phase: f32, ratchet: f32 },
}

/// Two-body constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub kind: ConstraintKind,
    pub max_force: f32,
    /// Fraction of joint error left uncorrected after one second
    pub error_bias: f32,
}

impl Constraint {
    pub fn new(body_a: BodyHandle, body_b: BodyHandle, kind: ConstraintKind) -> Self {
        Self {
            body_a,
            body_b,
            kind,
            max_force: f32::INFINITY,
            error_bias: (1.0f32 - 0.1).powf(60.0),
        }
    }

    pub fn pivot(body_a: BodyHandle, body_b: BodyHandle, anchor_a: Vec2, anchor_b: Vec2) -> Self {
        Self::new(body_a, body_b, ConstraintKind::Pivot { anchor_a, anchor_b })
    }

    pub fn with_max_force(mut self, max_force: f32) -> Self {
        self.max_force = max_force;
        self
    }

    pub fn with_error_bias(mut self, error_bias: f32) -> Self {
        self.error_bias = error_bias;
        self
    }
}

// ============================================================================
// CONTACTS AND QUERIES
// ============================================================================

/// Contact point, stored relative to each body's position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactPoint {
    pub r1: Vec2,
    pub r2: Vec2,
}

/// Contacts between two bodies from the last step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactManifold {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    /// Points from A toward B
    pub normal: Vec2,
    pub points: Vec<ContactPoint>,
}

/// Result of a nearest-point query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointQueryInfo {
    pub shape: ShapeHandle,
    pub body: BodyHandle,
    /// Nearest point on the shape's surface
    pub point: Vec2,
    /// Distance to the surface, negative when the query point is inside
    pub distance: f32,
    /// Direction of increasing distance
    pub gradient: Vec2,
}

/// What the drawer and drag controller need from a physics world
pub trait PhysicsWorld {
    fn body(&self, handle: BodyHandle) -> Option<&Body>;
    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body>;
    fn add_body(&mut self, body: Body) -> BodyHandle;
    fn remove_body(&mut self, handle: BodyHandle) -> Option<Body>;

    /// Shapes on static bodies
    fn each_static_shape(&self, visit: &mut dyn FnMut(&Shape));
    /// Shapes on dynamic and kinematic bodies
    fn each_dynamic_shape(&self, visit: &mut dyn FnMut(&Shape));
    fn each_constraint(&self, visit: &mut dyn FnMut(&Constraint));
    fn each_contact(&self, visit: &mut dyn FnMut(&ContactManifold));

    /// Closest shape within `max_distance` of `point` that `filter` accepts
    fn point_query_nearest(
        &self,
        point: Vec2,
        max_distance: f32,
        filter: &ShapeFilter,
    ) -> Option<PointQueryInfo>;

    fn add_constraint(&mut self, constraint: Constraint) -> ConstraintHandle;
    fn remove_constraint(&mut self, handle: ConstraintHandle) -> Option<Constraint>;

    /// Idle seconds after which bodies fall asleep
    fn sleep_time_threshold(&self) -> f32;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_body_local_world_roundtrip() {
        let body = Body::dynamic(1.0).at(Vec2::new(10.0, 5.0)).rotated(FRAC_PI_2);
        let local = Vec2::new(2.0, 0.0);
        let world = body.local_to_world(local);
        assert!((world - Vec2::new(10.0, 7.0)).length() < 1e-5);
        assert!((body.world_to_local(world) - local).length() < 1e-5);
    }

    #[test]
    fn test_mass_kinds() {
        assert!(Body::dynamic(2.0).has_finite_mass());
        assert!(!Body::kinematic().has_finite_mass());
        assert!(!Body::fixed().has_finite_mass());
    }

    #[test]
    fn test_filter_rules() {
        let plain = ShapeFilter::ALL;
        assert!(!ShapeFilter::GRAB.rejects(&plain));
        assert!(ShapeFilter::GRAB.rejects(&ShapeFilter::NOT_GRABBABLE));

        let grouped = ShapeFilter { group: 7, ..ShapeFilter::ALL };
        assert!(grouped.rejects(&grouped));
        assert!(!grouped.rejects(&plain));

        let none = ShapeFilter { categories: 0, ..ShapeFilter::ALL };
        assert!(none.rejects(&plain));
    }

    #[test]
    fn test_geometry_to_world() {
        let body = Body::dynamic(1.0).at(Vec2::new(1.0, 1.0));
        let shape = Shape::boxed(BodyHandle(0), 2.0, 2.0, 0.0);
        match shape.geometry.to_world(&body) {
            ShapeGeometry::Polygon { verts, .. } => {
                assert_eq!(verts[0], Vec2::ZERO);
                assert_eq!(verts[2], Vec2::new(2.0, 2.0));
            }
            other => panic!("unexpected geometry {other:?}"),
        }
    }
}
