//! Geometry for debug drawing
//!
//! Everything here works in world units and knows nothing about colors or the
//! host renderer:
//! - `path`: recorded move/line/arc paths, flattened on demand
//! - `mesh`: indexed triangle lists produced by fill/stroke tessellation
//! - `outline`: miter extrusion of convex polygons
//! - `primitives`: circle, capsule and segment paths

pub mod mesh;
pub mod outline;
pub mod path;
pub mod primitives;

pub use mesh::Mesh;
pub use outline::{Extrusion, extrude, outline_insets, polygon_outline};
pub use path::{Path, PathOp, StrokeOptions, Winding};
pub use primitives::{angle_tick_path, capsule_path, circle_path, segment_path};
