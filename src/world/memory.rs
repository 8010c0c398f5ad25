//! In-memory world
//!
//! Holds bodies, shapes, constraints and contacts in ID-ordered maps with no
//! dynamics of its own. Used by the demo binary and by tests; a real engine
//! plugs in through `PhysicsWorld` instead.

use std::collections::BTreeMap;

use glam::Vec2;

use super::{
    Body, BodyHandle, BodyKind, Constraint, ConstraintHandle, ContactManifold, PhysicsWorld,
    PointQueryInfo, Shape, ShapeFilter, ShapeHandle,
};

/// Default idle seconds before a body sleeps
pub const DEFAULT_SLEEP_TIME_THRESHOLD: f32 = 0.5;

/// Plain storage implementing `PhysicsWorld`
///
/// Iteration follows insertion order (IDs only ever grow).
#[derive(Debug, Clone)]
pub struct MemoryWorld {
    next_id: u32,
    bodies: BTreeMap<BodyHandle, Body>,
    shapes: BTreeMap<ShapeHandle, Shape>,
    constraints: BTreeMap<ConstraintHandle, Constraint>,
    contacts: Vec<ContactManifold>,
    sleep_time_threshold: f32,
}

impl Default for MemoryWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            bodies: BTreeMap::new(),
            shapes: BTreeMap::new(),
            constraints: BTreeMap::new(),
            contacts: Vec::new(),
            sleep_time_threshold: DEFAULT_SLEEP_TIME_THRESHOLD,
        }
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Attach a shape; returns `None` if the body does not exist
    pub fn add_shape(&mut self, shape: Shape) -> Option<ShapeHandle> {
        if !self.bodies.contains_key(&shape.body) {
            log::warn!("shape added to missing body {:?}", shape.body);
            return None;
        }
        let handle = ShapeHandle(self.next_id());
        self.shapes.insert(handle, shape);
        Some(handle)
    }

    pub fn shape(&self, handle: ShapeHandle) -> Option<&Shape> {
        self.shapes.get(&handle)
    }

    pub fn remove_shape(&mut self, handle: ShapeHandle) -> Option<Shape> {
        self.shapes.remove(&handle)
    }

    pub fn constraint(&self, handle: ConstraintHandle) -> Option<&Constraint> {
        self.constraints.get(&handle)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub fn add_contact(&mut self, manifold: ContactManifold) {
        self.contacts.push(manifold);
    }

    pub fn clear_contacts(&mut self) {
        self.contacts.clear();
    }

    pub fn set_sleep_time_threshold(&mut self, seconds: f32) {
        self.sleep_time_threshold = seconds;
    }

    fn shapes_where(&self, is_static: bool, visit: &mut dyn FnMut(&Shape)) {
        for shape in self.shapes.values() {
            let Some(body) = self.bodies.get(&shape.body) else {
                continue;
            };
            if (body.kind == BodyKind::Static) == is_static {
                visit(shape);
            }
        }
    }
}

impl PhysicsWorld for MemoryWorld {
    fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(&handle)
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(&handle)
    }

    fn add_body(&mut self, body: Body) -> BodyHandle {
        let handle = BodyHandle(self.next_id());
        self.bodies.insert(handle, body);
        handle
    }

    /// Removes the body along with its shapes and the constraints on it
    fn remove_body(&mut self, handle: BodyHandle) -> Option<Body> {
        let body = self.bodies.remove(&handle)?;
        self.shapes.retain(|_, shape| shape.body != handle);
        self.constraints
            .retain(|_, c| c.body_a != handle && c.body_b != handle);
        Some(body)
    }

    fn each_static_shape(&self, visit: &mut dyn FnMut(&Shape)) {
        self.shapes_where(true, visit);
    }

    fn each_dynamic_shape(&self, visit: &mut dyn FnMut(&Shape)) {
        self.shapes_where(false, visit);
    }

    fn each_constraint(&self, visit: &mut dyn FnMut(&Constraint)) {
        for constraint in self.constraints.values() {
            visit(constraint);
        }
    }

    fn each_contact(&self, visit: &mut dyn FnMut(&ContactManifold)) {
        for manifold in &self.contacts {
            visit(manifold);
        }
    }

    fn point_query_nearest(
        &self,
        point: Vec2,
        max_distance: f32,
        filter: &ShapeFilter,
    ) -> Option<PointQueryInfo> {
        if !point.is_finite() {
            return None;
        }
        let mut best: Option<PointQueryInfo> = None;
        for (&handle, shape) in &self.shapes {
            if filter.rejects(&shape.filter) {
                continue;
            }
            let Some(body) = self.bodies.get(&shape.body) else {
                continue;
            };
            let proj = shape.geometry.to_world(body).project(point);
            let limit = best.map_or(max_distance, |b| b.distance);
            if !proj.distance.is_nan() && proj.distance < limit {
                best = Some(PointQueryInfo {
                    shape: handle,
                    body: shape.body,
                    point: proj.point,
                    distance: proj.distance,
                    gradient: proj.gradient,
                });
            }
        }
        best
    }

    fn add_constraint(&mut self, constraint: Constraint) -> ConstraintHandle {
        let handle = ConstraintHandle(self.next_id());
        self.constraints.insert(handle, constraint);
        handle
    }

    fn remove_constraint(&mut self, handle: ConstraintHandle) -> Option<Constraint> {
        self.constraints.remove(&handle)
    }

    fn sleep_time_threshold(&self) -> f32 {
        self.sleep_time_threshold
    }
}
