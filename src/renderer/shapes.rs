//! Shape drawing, one arm per shape kind

use super::drawer::Drawer;
use super::target::RenderTarget;
use crate::color::Color;
use crate::world::{PhysicsWorld, Shape, ShapeGeometry};

impl Drawer {
    /// Draw a shape at its body's current transform
    ///
    /// Shapes whose body is missing from the world are skipped.
    pub fn draw_shape<W, T>(
        &self,
        world: &W,
        shape: &Shape,
        outline: Color,
        fill: Color,
        target: &mut T,
    ) where
        W: PhysicsWorld + ?Sized,
        T: RenderTarget + ?Sized,
    {
        let Some(body) = world.body(shape.body) else {
            log::trace!("skipping shape on missing body {:?}", shape.body);
            return;
        };
        let xf = body.transform();

        match &shape.geometry {
            ShapeGeometry::Circle { offset, radius } => {
                let center = xf.transform_point2(*offset);
                self.draw_circle(target, center, body.angle, *radius, outline, fill);
            }
            ShapeGeometry::Segment { a, b, radius } => {
                let a = xf.transform_point2(*a);
                let b = xf.transform_point2(*b);
                self.draw_fat_segment(target, a, b, *radius, outline, fill);
            }
            ShapeGeometry::Polygon { verts, radius } => {
                let verts: Vec<_> = verts.iter().map(|&v| xf.transform_point2(v)).collect();
                self.draw_polygon(target, &verts, *radius, fill);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::MeshBatch;
    use crate::world::{Body, MemoryWorld};
    use glam::Vec2;
    use std::f32::consts::FRAC_PI_2;

    fn bounds(batch: &MeshBatch) -> (Vec2, Vec2) {
        batch
            .vertices()
            .iter()
            .fold((Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)), |(lo, hi), v| {
                (lo.min(v.point()), hi.max(v.point()))
            })
    }

    #[test]
    fn test_circle_follows_body() {
        let mut world = MemoryWorld::new();
        let body = world.add_body(Body::dynamic(1.0).at(Vec2::new(20.0, 0.0)).rotated(FRAC_PI_2));
        let shape = Shape::circle(body, 3.0, Vec2::new(1.0, 0.0));

        let mut drawer = Drawer::new();
        drawer.options_mut().stroke_disabled = true;
        let mut batch = MeshBatch::new();
        drawer.draw_shape(&world, &shape, Color::WHITE, Color::WHITE, &mut batch);

        // Offset (1, 0) rotated a quarter turn lands at (20, 1)
        let (lo, hi) = bounds(&batch);
        let center = (lo + hi) * 0.5;
        assert!((center - Vec2::new(20.0, 1.0)).length() < 0.1, "{center:?}");
    }

    #[test]
    fn test_circle_tick_uses_outline_color() {
        let mut world = MemoryWorld::new();
        let body = world.add_body(Body::dynamic(1.0));
        let shape = Shape::circle(body, 3.0, Vec2::ZERO);
        let outline = Color::new(0.0, 1.0, 0.0, 1.0);
        let fill = Color::new(1.0, 0.0, 0.0, 0.5);

        let mut drawer = Drawer::new();
        drawer.options_mut().fill_disabled = true;
        let mut batch = MeshBatch::new();
        drawer.draw_shape(&world, &shape, outline, fill, &mut batch);

        assert!(batch.vertices().iter().all(|v| v.color == outline.to_array()));
        // Tick runs from the center out along +X
        assert!(
            batch
                .vertices()
                .iter()
                .any(|v| (v.point() - Vec2::new(0.0, 0.5)).length() < 1e-4)
        );
    }

    #[test]
    fn test_polygon_fill_only() {
        let mut world = MemoryWorld::new();
        let body = world.add_body(Body::fixed());
        let shape = Shape::boxed(body, 10.0, 10.0, 0.0);
        let outline = Color::new(0.0, 1.0, 0.0, 1.0);
        let fill = Color::new(1.0, 0.0, 0.0, 0.5);

        let drawer = Drawer::new();
        let mut batch = MeshBatch::new();
        drawer.draw_shape(&world, &shape, outline, fill, &mut batch);

        assert!(batch.vertices().iter().all(|v| v.color == fill.to_array()));
        let (lo, hi) = bounds(&batch);
        assert!((lo - Vec2::splat(-6.0)).abs().max_element() < 1e-4);
        assert!((hi - Vec2::splat(6.0)).abs().max_element() < 1e-4);
    }

    #[test]
    fn test_segment_capsule_extent() {
        let mut world = MemoryWorld::new();
        let body = world.add_body(Body::fixed());
        let shape = Shape::segment(body, Vec2::new(-10.0, 0.0), Vec2::new(10.0, 0.0), 2.0);

        let mut drawer = Drawer::new();
        drawer.options_mut().stroke_disabled = true;
        let mut batch = MeshBatch::new();
        drawer.draw_shape(&world, &shape, Color::WHITE, Color::WHITE, &mut batch);
        let (lo, hi) = bounds(&batch);
        assert!(lo.x <= -11.9 && hi.x >= 11.9);
        assert!((hi.y - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_missing_body_skipped() {
        let world = MemoryWorld::new();
        let shape = Shape::circle(crate::world::BodyHandle(9), 3.0, Vec2::ZERO);
        let drawer = Drawer::new();
        let mut batch = MeshBatch::new();
        drawer.draw_shape(&world, &shape, Color::WHITE, Color::WHITE, &mut batch);
        assert!(batch.is_empty());
    }
}
