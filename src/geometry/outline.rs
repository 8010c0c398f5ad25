//! Rounded / stroked outlines for convex polygons
//!
//! The polygon is drawn as one filled silhouette: the ring is pulled inward by
//! `inset` along each vertex's miter offset, then a band of width `outset` is
//! pushed outward along the edge normals. With a corner radius the outer
//! corners are arcs, otherwise they are straight miter corners.
//!
//! The miter offset `(n1 + n2) / (n1·n2 + 1)` is singular when two adjacent
//! edges point in opposite directions (a hairpin vertex). That case is left
//! unguarded and produces huge or NaN offsets.

use glam::Vec2;

use super::path::{Path, Winding};
use crate::consts::DRAW_POINT_LINE_SCALE;
use crate::reverse_perp;

/// Per-vertex extrusion data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extrusion {
    /// Miter direction scaled so that moving by `offset * d` keeps both
    /// adjacent edges at distance `d`
    pub offset: Vec2,
    /// Outward normal of the edge leaving this vertex
    pub normal: Vec2,
}

/// Miter offsets and outgoing edge normals for a counter-clockwise ring
pub fn extrude(verts: &[Vec2]) -> Vec<Extrusion> {
    let count = verts.len();
    (0..count)
        .map(|i| {
            let v0 = verts[(i + count - 1) % count];
            let v1 = verts[i];
            let v2 = verts[(i + 1) % count];

            let n1 = reverse_perp(v1 - v0).normalize();
            let n2 = reverse_perp(v2 - v1).normalize();

            let offset = (n1 + n2) / (n1.dot(n2) + 1.0);
            Extrusion { offset, normal: n2 }
        })
        .collect()
}

/// `(inset, outset)` distances for a polygon with the given corner radius
///
/// `inset` is <= 0 and pulls the fill inward so a one-unit band fits inside
/// the true edge; `outset` is measured from the inset ring.
pub fn outline_insets(radius: f32) -> (f32, f32) {
    let line = 1.0 / DRAW_POINT_LINE_SCALE;
    let inset = -(line - radius).max(0.0);
    let outset = line + radius - inset;
    (inset, outset)
}

/// Closed outline path of a convex polygon with rounded corners
pub fn polygon_outline(verts: &[Vec2], radius: f32) -> Path {
    let mut path = Path::new();
    let count = verts.len();
    if count < 3 {
        log::warn!("polygon outline needs 3+ vertices, got {}", count);
        return path;
    }

    let extrude = extrude(verts);
    let (inset, outset) = outline_insets(radius);
    let inner = |i: usize| verts[i] + extrude[i].offset * inset;

    // Inset body
    let v0 = inner(0);
    for i in 0..count - 2 {
        path.triangle(v0, inner(i + 1), inner(i + 2));
    }

    // Edge bands and corners; `j` trails `i` by one vertex
    let mut j = count - 1;
    for i in 0..count {
        let n_a = extrude[i].normal;
        let n_b = extrude[j].normal;

        let inner_a = inner(i);
        let inner_b = inner(j);

        let outer0 = inner_a + n_b * outset;
        let outer1 = inner_b + n_b * outset;

        path.triangle(inner_a, inner_b, outer1);
        path.triangle(inner_a, outer0, outer1);

        if radius > 0.0 {
            // Convex turn; collinear vertices round to an empty arc, not a disc
            let start = n_b.to_angle();
            let end = start + n_b.angle_to(n_a).max(0.0);
            path.move_to(inner_a)
                .arc(inner_a, outset, start, end, Winding::Positive)
                .close();
        } else {
            let outer2 = inner_a + extrude[i].offset * outset;
            let outer3 = inner_a + n_a * outset;
            path.triangle(inner_a, outer0, outer2);
            path.triangle(inner_a, outer2, outer3);
        }

        j = i;
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::path::PathOp;
    use proptest::prelude::*;
    use std::f32::consts::TAU;

    fn square() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ]
    }

    fn bounds(path: &Path) -> (Vec2, Vec2) {
        path.points()
            .fold((Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)), |(lo, hi), p| {
                (lo.min(p), hi.max(p))
            })
    }

    #[test]
    fn test_square_extrusion() {
        let ex = extrude(&square());
        assert_eq!(ex[0].offset, Vec2::new(-1.0, -1.0));
        assert_eq!(ex[0].normal, Vec2::new(0.0, -1.0));
        assert_eq!(ex[1].normal, Vec2::new(1.0, 0.0));
        assert_eq!(ex[2].offset, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_unit_insets_without_radius() {
        assert_eq!(outline_insets(0.0), (-1.0, 2.0));
        assert_eq!(outline_insets(0.25), (-0.75, 2.0));
        assert_eq!(outline_insets(3.0), (0.0, 4.0));
    }

    #[test]
    fn test_square_outline_expands_by_one() {
        let path = polygon_outline(&square(), 0.0);
        let (lo, hi) = bounds(&path);
        assert!((lo - Vec2::splat(-1.0)).abs().max_element() < 1e-5, "{lo:?}");
        assert!((hi - Vec2::splat(11.0)).abs().max_element() < 1e-5, "{hi:?}");

        // The miter corner lands exactly on the expanded square's corner
        assert!(path.points().any(|p| (p - Vec2::new(-1.0, -1.0)).length() < 1e-5));
        assert!(path.points().any(|p| (p - Vec2::new(11.0, 11.0)).length() < 1e-5));
        assert!(!path.ops().iter().any(|op| matches!(op, PathOp::Arc { .. })));
    }

    #[test]
    fn test_square_outline_fill_covers_expanded_square() {
        let mesh = polygon_outline(&square(), 0.0).fill();
        // 8x8 body + four 2x8 bands + four 2x2 corners, touching only along edges
        assert!((mesh.area() - 144.0).abs() < 1e-2, "area {}", mesh.area());
    }

    #[test]
    fn test_rounded_outline_uses_quarter_arcs() {
        let radius = 2.0;
        let path = polygon_outline(&square(), radius);
        let (_, outset) = outline_insets(radius);
        let arcs: Vec<_> = path
            .ops()
            .iter()
            .filter_map(|op| match *op {
                PathOp::Arc { center, radius, start, end, winding } => {
                    Some((center, radius, crate::geometry::path::arc_sweep(start, end, winding)))
                }
                _ => None,
            })
            .collect();
        assert_eq!(arcs.len(), 4);
        for (center, r, sweep) in arcs {
            assert_eq!(r, outset);
            assert!((sweep - TAU / 4.0).abs() < 1e-5);
            // No inset once the radius covers the line width
            assert!(square().contains(&center));
        }
        let (lo, hi) = bounds(&path);
        assert!((lo.x + 3.0).abs() < 1e-4 && (hi.x - 13.0).abs() < 1e-4);
    }

    #[test]
    fn test_collinear_corner_arc_is_not_a_full_turn() {
        // (3.3, 0.1) sits on the edge from (0, 0) to (6.6, 0.2) up to rounding
        let verts = [
            Vec2::new(0.0, 0.0),
            Vec2::new(3.3, 0.1),
            Vec2::new(6.6, 0.2),
            Vec2::new(3.3, 5.0),
        ];
        let path = polygon_outline(&verts, 1.0);
        let sweeps: Vec<f32> = path
            .ops()
            .iter()
            .filter_map(|op| match *op {
                PathOp::Arc { start, end, winding, .. } => {
                    Some(crate::geometry::path::arc_sweep(start, end, winding))
                }
                _ => None,
            })
            .collect();
        assert_eq!(sweeps.len(), 4);
        for sweep in &sweeps {
            assert!((0.0..std::f32::consts::PI).contains(sweep), "sweeps {sweeps:?}");
        }
        assert!(sweeps[1] < 1e-3, "sweeps {sweeps:?}");
        // Turns of a closed convex ring add up to one revolution
        let total: f32 = sweeps.iter().sum();
        assert!((total - TAU).abs() < 1e-3, "total {total}");
    }

    #[test]
    fn test_short_ring_is_empty() {
        assert!(polygon_outline(&[Vec2::ZERO, Vec2::X], 0.0).is_empty());
    }

    #[test]
    fn test_extrude_collinear_is_stable() {
        // Middle vertex on a straight edge: offset equals the edge normal
        let verts = [
            Vec2::new(0.0, 0.0),
            Vec2::new(5.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(5.0, 5.0),
        ];
        let ex = extrude(&verts);
        assert!((ex[1].offset - Vec2::new(0.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn test_extrude_hairpin_blows_up() {
        // Adjacent edges almost antiparallel: denominator n1·n2 + 1 -> 0
        let verts = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 0.01),
        ];
        let ex = extrude(&verts);
        assert!(!ex[1].offset.is_finite() || ex[1].offset.length() > 100.0);

        // Exactly antiparallel: 0 / 0
        let verts = [Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(5.0, 0.0)];
        let ex = extrude(&verts);
        assert!(ex[1].offset.is_nan());

        // Still no panic when building the outline
        let _ = polygon_outline(&verts, 0.0).fill();
    }

    proptest! {
        #[test]
        fn prop_regular_polygon_outline_bounds(
            sides in 3usize..12,
            size in 5.0f32..200.0,
            radius in 0.0f32..4.0,
        ) {
            let verts: Vec<Vec2> = (0..sides)
                .map(|i| crate::from_angle(TAU * i as f32 / sides as f32) * size)
                .collect();
            let (inset, outset) = outline_insets(radius);
            // Every emitted point stays inside the circumcircle grown by the
            // band width at the miter (offset length <= 1 / cos(half turn))
            let half_turn = std::f32::consts::PI / sides as f32;
            let reach = size + (outset + inset).abs() / half_turn.cos() + 1e-2;
            for p in polygon_outline(&verts, radius).points() {
                prop_assert!(p.length() <= reach, "{p:?} beyond {reach}");
            }
        }
    }
}
