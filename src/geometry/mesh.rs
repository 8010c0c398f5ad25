//! Indexed triangle list

use glam::Vec2;

/// Triangle list with 16-bit indices
///
/// Pushes past `u16::MAX` vertices are dropped rather than wrapping indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vec2>,
    pub indices: Vec<u16>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn push_vertex(&mut self, p: Vec2) -> Option<u16> {
        let index = u16::try_from(self.positions.len()).ok()?;
        self.positions.push(p);
        Some(index)
    }

    /// Room for `count` more vertices
    fn has_room(&self, count: usize) -> bool {
        self.positions.len() + count <= u16::MAX as usize + 1
    }

    pub fn push_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2) {
        self.push_fan(&[a, b, c]);
    }

    /// Quad `a b c d` in ring order
    pub fn push_quad(&mut self, a: Vec2, b: Vec2, c: Vec2, d: Vec2) {
        self.push_fan(&[a, b, c, d]);
    }

    /// Triangle fan around `points[0]`; assumes the ring is convex
    pub fn push_fan(&mut self, points: &[Vec2]) {
        if points.len() < 3 {
            return;
        }
        if !self.has_room(points.len()) {
            log::warn!("mesh full, dropping {} vertices", points.len());
            return;
        }

        let mut ids = Vec::with_capacity(points.len());
        for &p in points {
            match self.push_vertex(p) {
                Some(id) => ids.push(id),
                None => return,
            }
        }
        for i in 1..ids.len() - 1 {
            self.indices.extend_from_slice(&[ids[0], ids[i], ids[i + 1]]);
        }
    }

    /// Append another mesh, rebasing its indices
    pub fn extend(&mut self, other: &Mesh) {
        if other.is_empty() {
            return;
        }
        if !self.has_room(other.positions.len()) {
            log::warn!("mesh full, dropping {} vertices", other.positions.len());
            return;
        }
        let base = self.positions.len() as u16;
        self.positions.extend_from_slice(&other.positions);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Iterate triangles as position triples
    pub fn triangles(&self) -> impl Iterator<Item = [Vec2; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| {
            [
                self.positions[t[0] as usize],
                self.positions[t[1] as usize],
                self.positions[t[2] as usize],
            ]
        })
    }

    /// Sum of absolute triangle areas
    pub fn area(&self) -> f32 {
        self.triangles()
            .map(|[a, b, c]| (b - a).perp_dot(c - a).abs() * 0.5)
            .sum()
    }
}
