//! Mesh generation and submission
//!
//! `Drawer` builds triangle meshes from world state and hands them to a
//! `RenderTarget`. `MeshBatch` collects them for a single upload, which
//! `GpuRenderer` draws with wgpu.

pub mod constraints;
pub mod drawer;
pub mod pipeline;
pub mod shapes;
pub mod target;
pub mod vertex;

pub use constraints::{SPRING_VERTS, spring_points};
pub use drawer::{DrawStats, Drawer};
pub use pipeline::{DrawStep, GpuRenderer, PassPlan, Stage, plan_passes};
pub use target::{DrawCall, FillRule, MeshBatch, RenderTarget, TriangleOptions};
pub use vertex::Vertex;
