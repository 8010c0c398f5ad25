//! Debug drawer
//!
//! Turns world geometry into filled and stroked triangle meshes. All geometry
//! is built in world coordinates; the drawer's `view` transform is applied to
//! each vertex right before submission, so pan / zoom / rotate and a y-flip
//! are just a different `view`.

use glam::{Affine2, Vec2};

use super::target::{FillRule, RenderTarget, TriangleOptions};
use super::vertex::Vertex;
use crate::color::Color;
use crate::consts::CONTACT_MARKER_LENGTH;
use crate::geometry::{
    Mesh, Path, StrokeOptions, angle_tick_path, capsule_path, circle_path, polygon_outline,
    segment_path,
};
use crate::grab::DragController;
use crate::input::InputSource;
use crate::theme::{DrawOptions, DrawerConfig, Theme};
use crate::world::{Body, PhysicsWorld, Shape};

/// Counts from one `draw_space` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawStats {
    pub static_shapes: usize,
    pub dynamic_shapes: usize,
    pub constraints: usize,
    pub contacts: usize,
    pub triangles: usize,
}

/// Forwards to another target while counting triangles
struct Counting<'a, T: RenderTarget + ?Sized> {
    inner: &'a mut T,
    triangles: usize,
}

impl<T: RenderTarget + ?Sized> RenderTarget for Counting<'_, T> {
    fn draw_triangles(&mut self, vertices: &[Vertex], indices: &[u16], options: &TriangleOptions) {
        self.triangles += indices.len() / 3;
        self.inner.draw_triangles(vertices, indices, options);
    }
}

/// Renders a physics world and owns the pointer drag controller
#[derive(Debug)]
pub struct Drawer {
    config: DrawerConfig,
    view: Affine2,
    drag: DragController,
}

/// The copy starts with its own idle drag controller
impl Clone for Drawer {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            view: self.view,
            drag: DragController::with_pick_radius(self.drag.pick_radius()),
        }
    }
}

impl Default for Drawer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drawer {
    pub fn new() -> Self {
        Self::with_config(DrawerConfig::default())
    }

    pub fn with_config(config: DrawerConfig) -> Self {
        let drag = DragController::with_pick_radius(config.pick_radius);
        Self {
            config,
            view: Affine2::IDENTITY,
            drag,
        }
    }

    pub fn config(&self) -> &DrawerConfig {
        &self.config
    }

    /// Replace the config; the pick radius is forwarded to the drag controller
    pub fn set_config(&mut self, config: DrawerConfig) {
        self.drag.set_pick_radius(config.pick_radius);
        self.config = config;
    }

    pub fn theme(&self) -> &Theme {
        &self.config.theme
    }

    pub fn theme_mut(&mut self) -> &mut Theme {
        &mut self.config.theme
    }

    pub fn options(&self) -> &DrawOptions {
        &self.config.options
    }

    pub fn options_mut(&mut self) -> &mut DrawOptions {
        &mut self.config.options
    }

    /// World to screen transform
    pub fn view(&self) -> Affine2 {
        self.view
    }

    pub fn set_view(&mut self, view: Affine2) {
        self.view = view;
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn drag_mut(&mut self) -> &mut DragController {
        &mut self.drag
    }

    /// Pointer handling for this tick, using the current view
    pub fn handle_mouse_event<W, I>(&mut self, world: &mut W, input: &I)
    where
        W: PhysicsWorld + ?Sized,
        I: InputSource + ?Sized,
    {
        self.drag.handle(world, input, &self.view);
    }

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    fn submit<T: RenderTarget + ?Sized>(
        &self,
        target: &mut T,
        mesh: &Mesh,
        color: Color,
    ) {
        if mesh.is_empty() {
            return;
        }
        let vertices: Vec<Vertex> = mesh
            .positions
            .iter()
            .map(|&p| Vertex::from_point(self.view.transform_point2(p), color))
            .collect();
        let options = TriangleOptions {
            fill_rule: FillRule::FillAll,
            anti_alias: self.config.options.anti_alias,
        };
        target.draw_triangles(&vertices, &mesh.indices, &options);
    }

    fn fill_path<T: RenderTarget + ?Sized>(
        &self,
        target: &mut T,
        path: &Path,
        color: Color,
    ) {
        let options = &self.config.options;
        if options.fill_disabled || !color.is_visible() {
            return;
        }
        self.submit(target, &path.fill(), color);
    }

    fn stroke_path<T: RenderTarget + ?Sized>(
        &self,
        target: &mut T,
        path: &Path,
        color: Color,
    ) {
        let options = &self.config.options;
        if options.stroke_disabled || !color.is_visible() {
            return;
        }
        let stroke = StrokeOptions {
            width: options.stroke_width,
        };
        self.submit(target, &path.stroke(&stroke), color);
    }

    // ------------------------------------------------------------------
    // Primitives (world coordinates)
    // ------------------------------------------------------------------

    /// Filled disc plus an outline with a radius tick at `angle`
    pub fn draw_circle<T: RenderTarget + ?Sized>(
        &self,
        target: &mut T,
        center: Vec2,
        angle: f32,
        radius: f32,
        outline: Color,
        fill: Color,
    ) {
        let mut path = circle_path(center, radius);
        self.fill_path(target, &path, fill);
        path.append(&angle_tick_path(center, angle, radius));
        self.stroke_path(target, &path, outline);
    }

    /// Thin line
    pub fn draw_segment<T: RenderTarget + ?Sized>(
        &self,
        target: &mut T,
        a: Vec2,
        b: Vec2,
        color: Color,
    ) {
        self.stroke_path(target, &segment_path(a, b), color);
    }

    /// Capsule around `a`-`b`
    pub fn draw_fat_segment<T: RenderTarget + ?Sized>(
        &self,
        target: &mut T,
        a: Vec2,
        b: Vec2,
        radius: f32,
        outline: Color,
        fill: Color,
    ) {
        let path = capsule_path(a, b, radius);
        self.fill_path(target, &path, fill);
        self.stroke_path(target, &path, outline);
    }

    /// Convex polygon with rounded corners, drawn as one filled outline
    pub fn draw_polygon<T: RenderTarget + ?Sized>(
        &self,
        target: &mut T,
        verts: &[Vec2],
        radius: f32,
        fill: Color,
    ) {
        self.fill_path(target, &polygon_outline(verts, radius), fill);
    }

    /// Small filled disc of the theme's dot radius
    pub fn draw_dot<T: RenderTarget + ?Sized>(&self, target: &mut T, center: Vec2, color: Color) {
        self.fill_path(target, &circle_path(center, self.config.theme.dot_radius), color);
    }

    // ------------------------------------------------------------------
    // World
    // ------------------------------------------------------------------

    /// Fill color for a dynamic body; sleeping wins over idle
    pub fn dynamic_fill(&self, body: &Body, sleep_time_threshold: f32) -> Color {
        let theme = &self.config.theme;
        if body.sleeping {
            theme.shape_sleeping_fill
        } else if body.idle_time > sleep_time_threshold {
            theme.shape_idle_fill
        } else {
            theme.shape_fill
        }
    }

    /// Draw every enabled category of the world
    pub fn draw_space<W, T>(&self, world: &W, target: &mut T) -> DrawStats
    where
        W: PhysicsWorld + ?Sized,
        T: RenderTarget + ?Sized,
    {
        let mut out = Counting {
            inner: target,
            triangles: 0,
        };
        let mut stats = DrawStats::default();
        let theme = &self.config.theme;
        let options = &self.config.options;

        if !options.static_disabled {
            world.each_static_shape(&mut |shape: &Shape| {
                self.draw_shape(world, shape, theme.outline, theme.static_fill, &mut out);
                stats.static_shapes += 1;
            });
        }

        if !options.dynamic_disabled {
            let threshold = world.sleep_time_threshold();
            world.each_dynamic_shape(&mut |shape: &Shape| {
                let Some(body) = world.body(shape.body) else {
                    return;
                };
                let fill = self.dynamic_fill(body, threshold);
                self.draw_shape(world, shape, theme.outline, fill, &mut out);
                stats.dynamic_shapes += 1;
            });
        }

        if !options.constraints_disabled {
            world.each_constraint(&mut |constraint| {
                self.draw_constraint(world, constraint, theme.constraint, &mut out);
                stats.constraints += 1;
            });
        }

        if !options.collision_points_disabled {
            world.each_contact(&mut |manifold| {
                let (Some(a), Some(b)) = (world.body(manifold.body_a), world.body(manifold.body_b))
                else {
                    return;
                };
                let n = manifold.normal * CONTACT_MARKER_LENGTH;
                for contact in &manifold.points {
                    let p1 = a.position + contact.r1;
                    let p2 = b.position + contact.r2;
                    self.draw_segment(&mut out, p1 - n, p2 + n, theme.collision_point);
                    stats.contacts += 1;
                }
            });
        }

        stats.triangles = out.triangles;
        log::trace!("draw_space: {:?}", stats);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::MeshBatch;
    use crate::world::{
        BodyHandle, Constraint, ContactManifold, ContactPoint, MemoryWorld, Shape,
    };

    fn scene() -> (MemoryWorld, BodyHandle, BodyHandle) {
        let mut world = MemoryWorld::new();
        let ground = world.add_body(Body::fixed());
        world
            .add_shape(Shape::segment(ground, Vec2::new(-100.0, 0.0), Vec2::new(100.0, 0.0), 2.0))
            .unwrap();
        let ball = world.add_body(Body::dynamic(1.0).at(Vec2::new(0.0, 10.0)));
        world.add_shape(Shape::circle(ball, 5.0, Vec2::ZERO)).unwrap();
        (world, ground, ball)
    }

    fn colors(batch: &MeshBatch) -> Vec<[f32; 4]> {
        let mut out: Vec<[f32; 4]> = Vec::new();
        for v in batch.vertices() {
            if !out.contains(&v.color) {
                out.push(v.color);
            }
        }
        out
    }

    #[test]
    fn test_draw_space_counts() {
        let (mut world, ground, ball) = scene();
        world.add_constraint(Constraint::pivot(ground, ball, Vec2::ZERO, Vec2::ZERO));
        world.add_contact(ContactManifold {
            body_a: ball,
            body_b: ground,
            normal: Vec2::new(0.0, -1.0),
            points: vec![ContactPoint {
                r1: Vec2::new(0.0, -5.0),
                r2: Vec2::new(0.0, 2.0),
            }],
        });

        let drawer = Drawer::new();
        let mut batch = MeshBatch::new();
        let stats = drawer.draw_space(&world, &mut batch);
        assert_eq!(stats.static_shapes, 1);
        assert_eq!(stats.dynamic_shapes, 1);
        assert_eq!(stats.constraints, 1);
        assert_eq!(stats.contacts, 1);
        assert_eq!(stats.triangles, batch.triangle_count());
        assert!(stats.triangles > 0);
    }

    #[test]
    fn test_category_toggles() {
        let (world, _, _) = scene();
        let mut drawer = Drawer::new();
        drawer.options_mut().static_disabled = true;
        drawer.options_mut().dynamic_disabled = true;
        let mut batch = MeshBatch::new();
        let stats = drawer.draw_space(&world, &mut batch);
        assert_eq!(stats, DrawStats::default());
        assert!(batch.is_empty());
    }

    #[test]
    fn test_fill_and_stroke_toggles() {
        let (world, _, _) = scene();
        let theme = Theme::default();

        let mut drawer = Drawer::new();
        drawer.options_mut().stroke_disabled = true;
        let mut batch = MeshBatch::new();
        drawer.draw_space(&world, &mut batch);
        assert!(!colors(&batch).contains(&theme.outline.to_array()));

        drawer.options_mut().stroke_disabled = false;
        drawer.options_mut().fill_disabled = true;
        batch.clear();
        drawer.draw_space(&world, &mut batch);
        assert_eq!(colors(&batch), vec![theme.outline.to_array()]);
    }

    #[test]
    fn test_dynamic_fill_states() {
        let drawer = Drawer::new();
        let theme = drawer.theme().clone();
        let mut body = Body::dynamic(1.0);
        assert_eq!(drawer.dynamic_fill(&body, 0.5), theme.shape_fill);
        body.idle_time = 1.0;
        assert_eq!(drawer.dynamic_fill(&body, 0.5), theme.shape_idle_fill);
        body.sleeping = true;
        assert_eq!(drawer.dynamic_fill(&body, 0.5), theme.shape_sleeping_fill);
    }

    #[test]
    fn test_view_applied_to_vertices() {
        let mut drawer = Drawer::new();
        drawer.set_view(Affine2::from_translation(Vec2::new(100.0, 0.0)));
        let mut batch = MeshBatch::new();
        drawer.draw_dot(&mut batch, Vec2::ZERO, Color::WHITE);
        let r = drawer.theme().dot_radius;
        for v in batch.vertices() {
            assert!((v.point() - Vec2::new(100.0, 0.0)).length() <= r + 1e-4);
        }
        assert!(!batch.is_empty());
    }

    #[test]
    fn test_contact_marker_extends_along_normal() {
        let mut world = MemoryWorld::new();
        let a = world.add_body(Body::dynamic(1.0));
        let b = world.add_body(Body::dynamic(1.0).at(Vec2::new(10.0, 0.0)));
        world.add_contact(ContactManifold {
            body_a: a,
            body_b: b,
            normal: Vec2::X,
            points: vec![ContactPoint {
                r1: Vec2::new(5.0, 0.0),
                r2: Vec2::new(-5.0, 0.0),
            }],
        });
        let drawer = Drawer::new();
        let mut batch = MeshBatch::new();
        drawer.draw_space(&world, &mut batch);
        let xs: Vec<f32> = batch.vertices().iter().map(|v| v.position[0]).collect();
        let min = xs.iter().cloned().fold(f32::MAX, f32::min);
        let max = xs.iter().cloned().fold(f32::MIN, f32::max);
        // Segment from 5 - 2 to 5 + 2 with butt caps
        assert!((min - 3.0).abs() < 1e-4 && (max - 7.0).abs() < 1e-4);
    }

    #[test]
    fn test_invisible_color_skipped() {
        let drawer = Drawer::new();
        let mut batch = MeshBatch::new();
        drawer.draw_circle(&mut batch, Vec2::ZERO, 0.0, 3.0, Color::TRANSPARENT, Color::TRANSPARENT);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_config_pick_radius_reaches_drag() {
        let mut config = DrawerConfig::default();
        config.pick_radius = 12.0;
        let mut drawer = Drawer::with_config(config.clone());
        assert_eq!(drawer.drag().pick_radius(), 12.0);
        config.pick_radius = 3.0;
        drawer.set_config(config);
        assert_eq!(drawer.drag().pick_radius(), 3.0);
    }

    #[test]
    fn test_clone_gets_fresh_drag_controller() {
        let (mut world, _, ball) = scene();
        let mut drawer = Drawer::new();
        assert!(drawer.drag_mut().grab(&mut world, Vec2::new(0.0, 10.0)));

        let copy = drawer.clone();
        assert!(!copy.drag().is_dragging());
        assert_eq!(copy.drag().mouse_body(), None);
        assert_eq!(copy.drag().pick_radius(), drawer.drag().pick_radius());
        assert_eq!(copy.view(), drawer.view());

        drawer.drag_mut().detach(&mut world);
        assert!(world.body(ball).is_some());
        assert_eq!(world.body_count(), 2);
    }

    #[test]
    fn test_anti_alias_option_reaches_target() {
        let (world, _, _) = scene();
        let mut drawer = Drawer::new();
        let mut batch = MeshBatch::new();
        drawer.draw_space(&world, &mut batch);
        assert!(batch.calls().iter().all(|c| c.options.anti_alias));

        drawer.options_mut().anti_alias = false;
        batch.clear();
        drawer.draw_space(&world, &mut batch);
        assert!(!batch.calls().is_empty());
        assert!(batch.calls().iter().all(|c| !c.options.anti_alias));
    }
}
