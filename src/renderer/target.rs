//! Triangle sinks
//!
//! `RenderTarget` is the one call the drawer makes into a host renderer.
//! `MeshBatch` is the in-crate implementation: it appends every submission
//! into a single vertex/index buffer for one GPU upload per frame.

use super::vertex::Vertex;

/// How overlapping triangles of one submission combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    /// Every covered triangle is painted, overlaps blend twice
    #[default]
    FillAll,
    /// Pixels with a non-zero signed winding count are painted once
    NonZero,
    /// Pixels covered an odd number of times are painted once
    EvenOdd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TriangleOptions {
    pub fill_rule: FillRule,
    pub anti_alias: bool,
}

/// Accepts indexed triangle lists in screen coordinates
pub trait RenderTarget {
    fn draw_triangles(&mut self, vertices: &[Vertex], indices: &[u16], options: &TriangleOptions);
}

/// Contiguous index range submitted with one set of options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub first_index: u32,
    pub index_count: u32,
    pub options: TriangleOptions,
}

/// Accumulates submissions into one buffer pair
///
/// Adjacent `FillAll` submissions with identical options share a `DrawCall`.
/// Winding-rule submissions always get their own, since merging two of them
/// would change which pixels they cover.
#[derive(Debug, Clone, Default)]
pub struct MeshBatch {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    calls: Vec<DrawCall>,
}

impl MeshBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty the batch, keeping allocations for the next frame
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.calls.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Triangles as vertex triples, in submission order
    pub fn triangles(&self) -> impl Iterator<Item = [&Vertex; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| {
            [
                &self.vertices[t[0] as usize],
                &self.vertices[t[1] as usize],
                &self.vertices[t[2] as usize],
            ]
        })
    }
}

impl RenderTarget for MeshBatch {
    fn draw_triangles(&mut self, vertices: &[Vertex], indices: &[u16], options: &TriangleOptions) {
        if indices.is_empty() {
            return;
        }
        let base = self.vertices.len() as u32;
        let first_index = self.indices.len() as u32;
        self.vertices.extend_from_slice(vertices);
        self.indices
            .extend(indices.iter().map(|&i| base + u32::from(i)));

        let count = indices.len() as u32;
        match self.calls.last_mut() {
            Some(last) if last.options == *options && options.fill_rule == FillRule::FillAll => {
                last.index_count += count
            }
            _ => self.calls.push(DrawCall {
                first_index,
                index_count: count,
                options: *options,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri(x: f32) -> [Vertex; 3] {
        [
            Vertex::new(x, 0.0, [1.0; 4]),
            Vertex::new(x + 1.0, 0.0, [1.0; 4]),
            Vertex::new(x, 1.0, [1.0; 4]),
        ]
    }

    #[test]
    fn test_indices_rebased() {
        let mut batch = MeshBatch::new();
        let opts = TriangleOptions::default();
        batch.draw_triangles(&tri(0.0), &[0, 1, 2], &opts);
        batch.draw_triangles(&tri(5.0), &[0, 1, 2], &opts);
        assert_eq!(batch.indices(), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(batch.triangle_count(), 2);
        assert_eq!(batch.triangles().nth(1).unwrap()[0].position, [5.0, 0.0]);
    }

    #[test]
    fn test_calls_merge_on_same_options() {
        let mut batch = MeshBatch::new();
        let aa = TriangleOptions {
            fill_rule: FillRule::FillAll,
            anti_alias: true,
        };
        let plain = TriangleOptions::default();
        batch.draw_triangles(&tri(0.0), &[0, 1, 2], &aa);
        batch.draw_triangles(&tri(1.0), &[0, 1, 2], &aa);
        batch.draw_triangles(&tri(2.0), &[0, 1, 2], &plain);
        assert_eq!(
            batch.calls(),
            &[
                DrawCall {
                    first_index: 0,
                    index_count: 6,
                    options: aa
                },
                DrawCall {
                    first_index: 6,
                    index_count: 3,
                    options: plain
                },
            ]
        );
    }

    #[test]
    fn test_winding_rule_calls_never_merge() {
        let mut batch = MeshBatch::new();
        let even_odd = TriangleOptions {
            fill_rule: FillRule::EvenOdd,
            anti_alias: false,
        };
        batch.draw_triangles(&tri(0.0), &[0, 1, 2], &even_odd);
        batch.draw_triangles(&tri(0.0), &[0, 1, 2], &even_odd);
        assert_eq!(batch.calls().len(), 2);
        assert_eq!(batch.calls()[1].first_index, 3);
    }

    #[test]
    fn test_empty_submission_ignored() {
        let mut batch = MeshBatch::new();
        batch.draw_triangles(&tri(0.0), &[], &TriangleOptions::default());
        assert!(batch.is_empty());
        assert!(batch.vertices().is_empty());
        assert!(batch.calls().is_empty());
    }

    #[test]
    fn test_clear() {
        let mut batch = MeshBatch::new();
        batch.draw_triangles(&tri(0.0), &[0, 1, 2], &TriangleOptions::default());
        batch.clear();
        assert!(batch.is_empty());
        assert!(batch.calls().is_empty());
    }
}
