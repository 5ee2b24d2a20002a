use std::cell::Cell;

use stasis_core::Vec2;

/// Saved offset plus the two flags the restoration machinery runs on.
///
/// Shared (`Rc`) between the controller and the callbacks it registers on
/// the viewport, so every field is a `Cell`: callbacks fire while other code
/// is mid-call and must never hit a borrow conflict.
#[derive(Debug, Default)]
pub struct ScrollState {
    saved_top: Cell<f32>,
    saved_left: Cell<f32>,
    active: Cell<bool>,
    restored: Cell<bool>,
    // Set while the engine writes the saved offset back.
    restoring: Cell<bool>,
}

/// Plain copy of [`ScrollState`] for inspection.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollSnapshot {
    pub saved_top: f32,
    pub saved_left: f32,
    pub active: bool,
    pub restored: bool,
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> Vec2 {
        Vec2 {
            x: self.saved_left.get(),
            y: self.saved_top.get(),
        }
    }

    pub fn saved_top(&self) -> f32 {
        self.saved_top.get()
    }

    pub fn saved_left(&self) -> f32 {
        self.saved_left.get()
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn is_restored(&self) -> bool {
        self.restored.get()
    }

    /// True while a restoration write is in flight. Scroll notifications
    /// fired by that write are not user position changes.
    pub fn is_restoring(&self) -> bool {
        self.restoring.get()
    }

    pub fn snapshot(&self) -> ScrollSnapshot {
        ScrollSnapshot {
            saved_top: self.saved_top.get(),
            saved_left: self.saved_left.get(),
            active: self.active.get(),
            restored: self.restored.get(),
        }
    }

    // Writers are crate-private: only the tracker records offsets and only
    // the controller/engine flip the flags.

    pub(crate) fn record(&self, offset: Vec2) {
        self.saved_top.set(offset.y);
        self.saved_left.set(offset.x);
    }

    pub(crate) fn set_active(&self, active: bool) {
        self.active.set(active);
    }

    pub(crate) fn set_restored(&self, restored: bool) {
        self.restored.set(restored);
    }

    pub(crate) fn while_restoring<R>(&self, f: impl FnOnce() -> R) -> R {
        let prev = self.restoring.replace(true);
        let result = f();
        self.restoring.set(prev);
        result
    }
}
