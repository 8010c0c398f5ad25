//! Recorded 2D paths with fill and stroke tessellation
//!
//! Paths keep their ops (including arcs) as recorded so callers can inspect
//! them; flattening to polylines happens only when a mesh is requested.
//! Every subpath emitted by this crate is convex, so filling uses a plain
//! triangle fan per subpath and overlapping subpaths simply union.

use glam::Vec2;
use std::f32::consts::TAU;

use super::mesh::Mesh;
use crate::consts::{ARC_MAX_SEGMENTS, ARC_MIN_SEGMENTS, ARC_SEGMENTS_PER_RADIAN};
use crate::from_angle;

/// Arc sweep direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    /// Angle increases from start to end
    Positive,
    /// Angle decreases from start to end
    Negative,
}

/// A single recorded path operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathOp {
    MoveTo(Vec2),
    LineTo(Vec2),
    Arc {
        center: Vec2,
        radius: f32,
        start: f32,
        end: f32,
        winding: Winding,
    },
    Close,
}

/// Signed sweep of an arc, at most one full turn
pub fn arc_sweep(start: f32, end: f32, winding: Winding) -> f32 {
    let raw = end - start;
    match winding {
        Winding::Positive if raw >= 0.0 => raw.min(TAU),
        Winding::Positive => raw.rem_euclid(TAU),
        Winding::Negative if raw <= 0.0 => raw.max(-TAU),
        Winding::Negative => -(-raw).rem_euclid(TAU),
    }
}

/// Stroke settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeOptions {
    pub width: f32,
}

impl Default for StrokeOptions {
    fn default() -> Self {
        Self { width: 1.0 }
    }
}

/// Flattened subpath
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    pub points: Vec<Vec2>,
    pub closed: bool,
}

/// Recorded path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    ops: Vec<PathOp>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[PathOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn move_to(&mut self, p: Vec2) -> &mut Self {
        self.ops.push(PathOp::MoveTo(p));
        self
    }

    pub fn line_to(&mut self, p: Vec2) -> &mut Self {
        self.ops.push(PathOp::LineTo(p));
        self
    }

    /// Arc around `center`; connects from the current point with a line
    pub fn arc(
        &mut self,
        center: Vec2,
        radius: f32,
        start: f32,
        end: f32,
        winding: Winding,
    ) -> &mut Self {
        self.ops.push(PathOp::Arc {
            center,
            radius,
            start,
            end,
            winding,
        });
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.ops.push(PathOp::Close);
        self
    }

    /// Closed triangle subpath
    pub fn triangle(&mut self, a: Vec2, b: Vec2, c: Vec2) -> &mut Self {
        self.move_to(a).line_to(b).line_to(c).close()
    }

    /// Append all ops of another path
    pub fn append(&mut self, other: &Path) {
        self.ops.extend_from_slice(&other.ops);
    }

    /// Every point the path passes through after flattening
    pub fn points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.flatten().into_iter().flat_map(|p| p.points)
    }

    /// Flatten into polylines, one per subpath
    pub fn flatten(&self) -> Vec<Polyline> {
        let mut out = Vec::new();
        let mut current: Option<Polyline> = None;

        for op in &self.ops {
            match *op {
                PathOp::MoveTo(p) => {
                    if let Some(done) = current.take() {
                        out.push(done);
                    }
                    current = Some(Polyline {
                        points: vec![p],
                        closed: false,
                    });
                }
                PathOp::LineTo(p) => {
                    current.get_or_insert_with(Polyline::default).points.push(p);
                }
                PathOp::Arc {
                    center,
                    radius,
                    start,
                    end,
                    winding,
                } => {
                    let line = current.get_or_insert_with(Polyline::default);
                    let sweep = arc_sweep(start, end, winding);
                    let segments = ((sweep.abs() * ARC_SEGMENTS_PER_RADIAN).ceil() as u32)
                        .clamp(ARC_MIN_SEGMENTS, ARC_MAX_SEGMENTS);
                    for i in 0..=segments {
                        let theta = start + sweep * (i as f32 / segments as f32);
                        line.points.push(center + from_angle(theta) * radius);
                    }
                }
                PathOp::Close => {
                    if let Some(mut done) = current.take() {
                        done.closed = true;
                        out.push(done);
                    }
                }
            }
        }

        if let Some(done) = current {
            out.push(done);
        }
        out
    }

    /// Fill every subpath with a triangle fan
    pub fn fill(&self) -> Mesh {
        let mut mesh = Mesh::new();
        for line in self.flatten() {
            mesh.push_fan(&line.points);
        }
        mesh
    }

    /// Stroke every subpath with butt caps and round joins
    pub fn stroke(&self, options: &StrokeOptions) -> Mesh {
        let mut mesh = Mesh::new();
        let half = options.width * 0.5;
        if !(half > 0.0) {
            return mesh;
        }

        for line in self.flatten() {
            let pts = dedup(&line.points);
            if pts.len() < 2 {
                continue;
            }

            let closed = line.closed && pts.len() > 2;
            let mut segments: Vec<(Vec2, Vec2)> = pts.windows(2).map(|w| (w[0], w[1])).collect();
            if closed {
                segments.push((pts[pts.len() - 1], pts[0]));
            }

            for &(p0, p1) in &segments {
                let n = (p1 - p0).normalize_or_zero().perp() * half;
                mesh.push_quad(p0 + n, p1 + n, p1 - n, p0 - n);
            }

            let joints: &[Vec2] = if closed { &pts } else { &pts[1..pts.len() - 1] };
            for &joint in joints {
                push_round_join(&mut mesh, joint, half);
            }
        }
        mesh
    }
}

/// Drop consecutive duplicates, including a closing point equal to the first
fn dedup(points: &[Vec2]) -> Vec<Vec2> {
    let mut out: Vec<Vec2> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last().is_none_or(|&q| q.distance_squared(p) > f32::EPSILON) {
            out.push(p);
        }
    }
    if out.len() > 2 && out[0].distance_squared(out[out.len() - 1]) <= f32::EPSILON {
        out.pop();
    }
    out
}

fn push_round_join(mesh: &mut Mesh, center: Vec2, radius: f32) {
    const JOIN_SEGMENTS: usize = 8;
    let ring: Vec<Vec2> = (0..JOIN_SEGMENTS)
        .map(|i| center + from_angle(TAU * i as f32 / JOIN_SEGMENTS as f32) * radius)
        .collect();
    mesh.push_fan(&ring);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn unit_square() -> Path {
        let mut path = Path::new();
        path.move_to(Vec2::new(0.0, 0.0))
            .line_to(Vec2::new(1.0, 0.0))
            .line_to(Vec2::new(1.0, 1.0))
            .line_to(Vec2::new(0.0, 1.0))
            .close();
        path
    }

    #[test]
    fn test_arc_sweep_wraps() {
        assert!((arc_sweep(0.0, TAU, Winding::Positive) - TAU).abs() < 1e-6);
        assert!((arc_sweep(PI, PI * 0.5, Winding::Positive) - PI * 1.5).abs() < 1e-5);
        assert!((arc_sweep(0.0, PI * 0.5, Winding::Negative) + PI * 1.5).abs() < 1e-5);
        assert!((arc_sweep(0.0, 3.0 * TAU, Winding::Positive) - TAU).abs() < 1e-6);
    }

    #[test]
    fn test_flatten_subpaths() {
        let mut path = unit_square();
        path.move_to(Vec2::new(5.0, 5.0)).line_to(Vec2::new(6.0, 5.0));
        let lines = path.flatten();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].closed);
        assert_eq!(lines[0].points.len(), 4);
        assert!(!lines[1].closed);
    }

    #[test]
    fn test_arc_endpoints() {
        let mut path = Path::new();
        path.arc(Vec2::new(1.0, 1.0), 2.0, 0.0, PI, Winding::Positive);
        let line = &path.flatten()[0];
        let first = line.points[0];
        let last = *line.points.last().unwrap();
        assert!((first - Vec2::new(3.0, 1.0)).length() < 1e-5);
        assert!((last - Vec2::new(-1.0, 1.0)).length() < 1e-5);
        // Halfway point sits on the +Y side for a positive sweep
        let mid = line.points[line.points.len() / 2];
        assert!(mid.y > 2.9);
    }

    #[test]
    fn test_fill_square_area() {
        let mesh = unit_square().fill();
        assert_eq!(mesh.triangle_count(), 2);
        assert!((mesh.area() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_fill_circle_area_close_to_pi() {
        let mut path = Path::new();
        path.arc(Vec2::ZERO, 1.0, 0.0, TAU, Winding::Positive).close();
        let area = path.fill().area();
        assert!(area < PI && area > PI * 0.97, "area {area}");
    }

    #[test]
    fn test_stroke_closed_square() {
        let mesh = unit_square().stroke(&StrokeOptions { width: 0.2 });
        // 4 edge quads + 4 round joins of 6 triangles each
        assert_eq!(mesh.triangle_count(), 4 * 2 + 4 * 6);
        for p in &mesh.positions {
            assert!(p.x >= -0.1 - 1e-5 && p.x <= 1.1 + 1e-5);
            assert!(p.y >= -0.1 - 1e-5 && p.y <= 1.1 + 1e-5);
        }
    }

    #[test]
    fn test_stroke_open_segment_has_no_joins() {
        let mut path = Path::new();
        path.move_to(Vec2::ZERO).line_to(Vec2::new(10.0, 0.0));
        let mesh = path.stroke(&StrokeOptions { width: 2.0 });
        assert_eq!(mesh.triangle_count(), 2);
        assert!((mesh.area() - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_stroke_zero_width_is_empty() {
        assert!(unit_square().stroke(&StrokeOptions { width: 0.0 }).is_empty());
        assert!(unit_square().stroke(&StrokeOptions { width: f32::NAN }).is_empty());
    }

    #[test]
    fn test_stroke_skips_duplicate_points() {
        let mut path = Path::new();
        path.move_to(Vec2::ZERO)
            .line_to(Vec2::ZERO)
            .line_to(Vec2::new(1.0, 0.0))
            .close();
        // Two distinct points: one segment, no closing segment, no joins
        let mesh = path.stroke(&StrokeOptions::default());
        assert_eq!(mesh.triangle_count(), 2);
    }
}
