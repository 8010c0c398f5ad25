//! Pointer drag controller
//!
//! A kinematic "mouse body" follows the pointer. On pointer-down the nearest
//! grabbable body under the pointer is pinned to it with a force-limited pivot;
//! on pointer-up the pivot is removed.
//!
//! Touch model: one live pointer. The earliest tracked touch owns the drag
//! until it ends; touches that start while one is tracked are ignored. With no
//! touch tracked, the mouse cursor is the pointer.

use glam::{Affine2, Vec2};

use crate::camera::screen_to_world;
use crate::consts::{GRAB_MAX_FORCE, MOUSE_LERP, PICK_RADIUS, TICK_RATE};
use crate::grab_error_bias;
use crate::input::{InputSource, TouchId};
use crate::world::{Body, BodyHandle, Constraint, ConstraintHandle, PhysicsWorld, ShapeFilter};

/// Drag state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// `body` is pinned to the mouse body by `constraint`
    Dragging {
        constraint: ConstraintHandle,
        body: BodyHandle,
    },
}

/// Where this tick's pointer came from
#[derive(Debug, Clone, Copy, PartialEq)]
struct Pointer {
    screen: Vec2,
    just_touched: bool,
}

/// Pointer drag state; owns a mouse body and joint in the world
#[derive(Debug)]
pub struct DragController {
    state: DragState,
    mouse_body: Option<BodyHandle>,
    touch: Option<TouchId>,
    pick_radius: f32,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}

impl DragController {
    pub fn new() -> Self {
        Self::with_pick_radius(PICK_RADIUS)
    }

    pub fn with_pick_radius(pick_radius: f32) -> Self {
        Self {
            state: DragState::Idle,
            mouse_body: None,
            touch: None,
            pick_radius,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Active drag pivot, if any
    pub fn constraint(&self) -> Option<ConstraintHandle> {
        match self.state {
            DragState::Dragging { constraint, .. } => Some(constraint),
            DragState::Idle => None,
        }
    }

    pub fn mouse_body(&self) -> Option<BodyHandle> {
        self.mouse_body
    }

    pub fn tracked_touch(&self) -> Option<TouchId> {
        self.touch
    }

    pub fn pick_radius(&self) -> f32 {
        self.pick_radius
    }

    pub fn set_pick_radius(&mut self, pick_radius: f32) {
        self.pick_radius = pick_radius;
    }

    /// Mouse body handle, adding the body to the world on first use
    fn ensure_mouse_body<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) -> BodyHandle {
        if let Some(handle) = self.mouse_body
            && world.body(handle).is_some()
        {
            return handle;
        }
        let handle = world.add_body(Body::kinematic());
        log::debug!("mouse body added as {:?}", handle);
        self.mouse_body = Some(handle);
        handle
    }

    /// Pick the live pointer, updating touch tracking
    fn resolve_pointer<W, I>(&mut self, world: &mut W, input: &I) -> Pointer
    where
        W: PhysicsWorld + ?Sized,
        I: InputSource + ?Sized,
    {
        if let Some(id) = self.touch {
            match input.touch_position(id) {
                Some(screen) if !input.touch_just_released(id) => {
                    return Pointer {
                        screen,
                        just_touched: false,
                    };
                }
                _ => {
                    log::debug!("touch {:?} ended", id);
                    self.release(world);
                    self.touch = None;
                }
            }
        }

        for id in input.just_pressed_touch_ids() {
            if let Some(screen) = input.touch_position(id) {
                self.touch = Some(id);
                return Pointer {
                    screen,
                    just_touched: true,
                };
            }
        }

        Pointer {
            screen: input.cursor_position(),
            just_touched: false,
        }
    }

    /// Run one tick of pointer handling
    ///
    /// `view` maps world to screen; the pointer is mapped back through its
    /// inverse. A non-invertible view yields a NaN cursor, which leaves the
    /// mouse body in place and picks nothing.
    pub fn handle<W, I>(&mut self, world: &mut W, input: &I, view: &Affine2)
    where
        W: PhysicsWorld + ?Sized,
        I: InputSource + ?Sized,
    {
        let mouse = self.ensure_mouse_body(world);
        let pointer = self.resolve_pointer(world, input);
        let cursor = screen_to_world(pointer.screen, view);

        if cursor.is_finite()
            && let Some(body) = world.body_mut(mouse)
        {
            if pointer.just_touched {
                body.velocity = Vec2::ZERO;
                body.position = cursor;
            } else {
                let next = body.position.lerp(cursor, MOUSE_LERP);
                body.velocity = (next - body.position) * TICK_RATE;
                body.position = next;
            }
        }

        if input.left_just_pressed() || pointer.just_touched {
            self.grab(world, cursor);
        }
        if input.left_just_released() {
            self.release(world);
        }
    }

    /// Try to start a drag at a world point; returns whether a body was picked
    ///
    /// An existing drag is released first. A non-finite point changes
    /// nothing, including the current drag.
    pub fn grab<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W, point: Vec2) -> bool {
        if !point.is_finite() {
            return false;
        }
        self.release(world);

        let Some(info) = world.point_query_nearest(point, self.pick_radius, &ShapeFilter::GRAB)
        else {
            return false;
        };
        let Some(body) = world.body(info.body) else {
            return false;
        };
        if !body.has_finite_mass() {
            log::trace!("ignoring pick on infinite-mass body {:?}", info.body);
            return false;
        }

        // Outside the shape, anchor on its surface rather than in empty space
        let nearest = if info.distance > 0.0 { info.point } else { point };
        let anchor_b = body.world_to_local(nearest);

        let mouse = self.ensure_mouse_body(world);
        let joint = Constraint::pivot(mouse, info.body, Vec2::ZERO, anchor_b)
            .with_max_force(GRAB_MAX_FORCE)
            .with_error_bias(grab_error_bias());
        let constraint = world.add_constraint(joint);
        log::debug!("grabbed {:?} at {:?}", info.body, nearest);

        self.state = DragState::Dragging {
            constraint,
            body: info.body,
        };
        true
    }

    /// End the drag, if any
    pub fn release<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) {
        if let DragState::Dragging { constraint, body } = self.state {
            world.remove_constraint(constraint);
            log::debug!("released {:?}", body);
            self.state = DragState::Idle;
        }
    }

    /// Release any drag and take the mouse body out of the world
    pub fn detach<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) {
        self.release(world);
        self.touch = None;
        if let Some(handle) = self.mouse_body.take() {
            world.remove_body(handle);
        }
    }
}
