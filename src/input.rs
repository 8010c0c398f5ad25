//! Pointer input snapshot
//!
//! `InputSource` is what the drag controller reads each tick. Hosts either
//! implement it over their own input system or feed `PointerEvent`s into a
//! `PointerInput`, which keeps the held state and the per-frame transitions.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;

/// Touch identifier as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TouchId(pub u64);

/// Per-tick pointer queries, all in screen coordinates
pub trait InputSource {
    fn cursor_position(&self) -> Vec2;
    fn left_just_pressed(&self) -> bool;
    fn left_just_released(&self) -> bool;

    /// Touches currently down
    fn touch_ids(&self) -> Vec<TouchId>;
    /// `None` once the touch is gone
    fn touch_position(&self, id: TouchId) -> Option<Vec2>;
    /// Touches that started this frame, in arrival order
    fn just_pressed_touch_ids(&self) -> Vec<TouchId>;
    fn touch_just_released(&self, id: TouchId) -> bool;
}

/// Platform-agnostic pointer event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    CursorMoved(Vec2),
    LeftPressed,
    LeftReleased,
    TouchStarted(TouchId, Vec2),
    TouchMoved(TouchId, Vec2),
    TouchEnded(TouchId),
}

/// Held pointer state plus this frame's transitions
#[derive(Debug, Clone, Default)]
pub struct PointerInput {
    cursor: Vec2,
    left_down: bool,
    touches: BTreeMap<TouchId, Vec2>,

    left_pressed: bool,
    left_released: bool,
    touches_started: Vec<TouchId>,
    touches_ended: BTreeSet<TouchId>,
}

impl PointerInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::CursorMoved(p) => self.cursor = p,
            PointerEvent::LeftPressed => {
                if !self.left_down {
                    self.left_down = true;
                    self.left_pressed = true;
                }
            }
            PointerEvent::LeftReleased => {
                if self.left_down {
                    self.left_down = false;
                    self.left_released = true;
                }
            }
            PointerEvent::TouchStarted(id, p) => {
                if self.touches.insert(id, p).is_none() {
                    self.touches_started.push(id);
                }
            }
            PointerEvent::TouchMoved(id, p) => {
                if let Some(pos) = self.touches.get_mut(&id) {
                    *pos = p;
                }
            }
            PointerEvent::TouchEnded(id) => {
                if self.touches.remove(&id).is_some() {
                    self.touches_ended.insert(id);
                }
            }
        }
    }

    /// Forget this frame's transitions; held state stays
    pub fn end_frame(&mut self) {
        self.left_pressed = false;
        self.left_released = false;
        self.touches_started.clear();
        self.touches_ended.clear();
    }

    pub fn left_down(&self) -> bool {
        self.left_down
    }
}

impl InputSource for PointerInput {
    fn cursor_position(&self) -> Vec2 {
        self.cursor
    }

    fn left_just_pressed(&self) -> bool {
        self.left_pressed
    }

    fn left_just_released(&self) -> bool {
        self.left_released
    }

    fn touch_ids(&self) -> Vec<TouchId> {
        self.touches.keys().copied().collect()
    }

    fn touch_position(&self, id: TouchId) -> Option<Vec2> {
        self.touches.get(&id).copied()
    }

    fn just_pressed_touch_ids(&self) -> Vec<TouchId> {
        self.touches_started.clone()
    }

    fn touch_just_released(&self, id: TouchId) -> bool {
        self.touches_ended.contains(&id)
    }
}
