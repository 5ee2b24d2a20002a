use bitflags::bitflags;
use stasis_core::Vec2;

use super::config::DEFAULT_TOLERANCE;
use super::state::ScrollState;
use crate::scroll::Viewport;

bitflags! {
    /// Axes a restoration needs to be able to scroll on.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Axes: u8 {
        const HORIZONTAL = 0b01;
        const VERTICAL = 0b10;
    }
}

impl Axes {
    /// Every axis with a non-zero saved offset; vertical when nothing was
    /// scrolled at all.
    pub fn required_for(saved: Vec2) -> Axes {
        let mut axes = Axes::empty();
        if saved.x != 0.0 {
            axes |= Axes::HORIZONTAL;
        }
        if saved.y != 0.0 {
            axes |= Axes::VERTICAL;
        }
        if axes.is_empty() {
            axes = Axes::VERTICAL;
        }
        axes
    }

    /// True if `extent` is positive on every axis in `self`.
    pub fn fit_in(self, extent: Vec2) -> bool {
        (!self.contains(Axes::HORIZONTAL) || extent.x > 0.0)
            && (!self.contains(Axes::VERTICAL) || extent.y > 0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RestoreOutcome {
    /// Nothing to do until the next activation.
    AlreadyRestored,
    /// No viewport bound right now.
    Unavailable,
    /// Content cannot scroll yet; a later size change or the fallback retries.
    NotLaidOut,
    /// Written, but the viewport clamped it too far away from the saved offset.
    Clamped { actual: Vec2 },
    Restored,
}

impl RestoreOutcome {
    pub fn is_restored(&self) -> bool {
        matches!(self, RestoreOutcome::Restored | RestoreOutcome::AlreadyRestored)
    }
}

/// Re-applies the saved offset once the content is tall (or wide) enough.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RestorationEngine {
    tolerance: f32,
}

impl Default for RestorationEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

impl RestorationEngine {
    pub fn new(tolerance: f32) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// One attempt. Only ever flips `restored` to true; never touches the
    /// saved offset.
    pub fn attempt(&self, state: &ScrollState, viewport: Option<&dyn Viewport>) -> RestoreOutcome {
        if state.is_restored() {
            return RestoreOutcome::AlreadyRestored;
        }
        let Some(viewport) = viewport else {
            return RestoreOutcome::Unavailable;
        };

        let saved = state.saved();
        let extent = viewport.scroll_extent();
        if !Axes::required_for(saved).fit_in(extent) {
            log::trace!("restore deferred: extent {extent:?} cannot hold {saved:?}");
            return RestoreOutcome::NotLaidOut;
        }

        state.while_restoring(|| viewport.set_scroll_offset(saved));

        let actual = viewport.scroll_offset();
        if self.within_tolerance(actual, saved) {
            state.set_restored(true);
            log::debug!("scroll restored to {actual:?}");
            RestoreOutcome::Restored
        } else {
            log::trace!("restore clamped to {actual:?}, wanted {saved:?}");
            RestoreOutcome::Clamped { actual }
        }
    }

    fn within_tolerance(&self, actual: Vec2, saved: Vec2) -> bool {
        (actual.x - saved.x).abs() < self.tolerance && (actual.y - saved.y).abs() < self.tolerance
    }
}
