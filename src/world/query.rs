//! Nearest-point projection onto shape surfaces
//!
//! Distances are signed: negative means the query point is inside the shape.

use glam::Vec2;

use crate::reverse_perp;

/// Result of projecting a point onto a shape surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Closest point on the surface
    pub point: Vec2,
    /// Signed distance from the query point to `point`
    pub distance: f32,
    /// Unit direction of increasing distance
    pub gradient: Vec2,
}

/// Project onto a circle
pub fn project_circle(p: Vec2, center: Vec2, radius: f32) -> Projection {
    let delta = p - center;
    let dist = delta.length();
    // Center of the circle: any direction works
    let gradient = if dist > 0.0 { delta / dist } else { Vec2::X };
    Projection {
        point: center + gradient * radius,
        distance: dist - radius,
        gradient,
    }
}

/// Closest point to `p` on segment `a`-`b`
pub fn closest_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Project onto a capsule of `radius` around `a`-`b`
pub fn project_segment(p: Vec2, a: Vec2, b: Vec2, radius: f32) -> Projection {
    let q = closest_on_segment(p, a, b);
    let delta = p - q;
    let dist = delta.length();
    let gradient = if dist > 0.0 {
        delta / dist
    } else {
        // On the core segment: push out along the segment normal
        reverse_perp(b - a).try_normalize().unwrap_or(Vec2::X)
    };
    Projection {
        point: q + gradient * radius,
        distance: dist - radius,
        gradient,
    }
}

/// Project onto a convex counter-clockwise polygon with rounded corners
pub fn project_polygon(p: Vec2, verts: &[Vec2], radius: f32) -> Projection {
    let count = verts.len();
    match count {
        0 => {
            return Projection {
                point: p,
                distance: f32::INFINITY,
                gradient: Vec2::X,
            };
        }
        1 => return project_circle(p, verts[0], radius),
        2 => return project_segment(p, verts[0], verts[1], radius),
        _ => {}
    }

    // Signed distance to every edge line; all <= 0 means inside the core
    let mut max_edge = 0;
    let mut max_dist = f32::NEG_INFINITY;
    for i in 0..count {
        let a = verts[i];
        let b = verts[(i + 1) % count];
        let n = reverse_perp(b - a).normalize_or_zero();
        let d = n.dot(p - a);
        if d > max_dist {
            max_dist = d;
            max_edge = i;
        }
    }

    if max_dist <= 0.0 {
        let a = verts[max_edge];
        let b = verts[(max_edge + 1) % count];
        let n = reverse_perp(b - a).normalize_or_zero();
        return Projection {
            point: p - n * max_dist + n * radius,
            distance: max_dist - radius,
            gradient: n,
        };
    }

    let mut best = (verts[0], f32::INFINITY);
    for i in 0..count {
        let q = closest_on_segment(p, verts[i], verts[(i + 1) % count]);
        let d = q.distance_squared(p);
        if d < best.1 {
            best = (q, d);
        }
    }
    let (q, dist_sq) = best;
    let dist = dist_sq.sqrt();
    let gradient = (p - q) / dist;
    Projection {
        point: q + gradient * radius,
        distance: dist - radius,
        gradient,
    }
}
