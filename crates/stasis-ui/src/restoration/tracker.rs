use std::rc::{Rc, Weak};

use stasis_core::Dispose;

use super::state::ScrollState;
use crate::scroll::{ScrollEvent, Viewport, ViewportRef, release_listener, same_viewport};

/// Records the viewport's offset into the shared [`ScrollState`] on every
/// scroll notification while the view is active.
///
/// User drags, host assignments and clamps after a content shrink all
/// count; the restoration engine's own write does not.
pub struct ScrollTracker {
    state: Rc<ScrollState>,
    binding: Option<Binding>,
}

struct Binding {
    viewport: Weak<dyn Viewport>,
    release: Dispose,
}

impl ScrollTracker {
    pub fn new(state: Rc<ScrollState>) -> Self {
        Self {
            state,
            binding: None,
        }
    }

    /// Binds the scroll listener to `viewport`, dropping any previous one
    /// first so events are never delivered twice.
    pub fn attach(&mut self, viewport: &ViewportRef) {
        self.detach();

        let state = Rc::downgrade(&self.state);
        let target = Rc::downgrade(viewport);
        let listener = viewport.subscribe_scroll(Box::new(move |ev: &ScrollEvent| {
            let (Some(state), Some(viewport)) = (state.upgrade(), target.upgrade()) else {
                return;
            };
            record_scroll(&state, &*viewport, ev);
        }));

        self.binding = Some(Binding {
            viewport: Rc::downgrade(viewport),
            release: release_listener(viewport, listener),
        });
    }

    /// Safe to call when nothing is attached or the viewport is gone.
    pub fn detach(&mut self) {
        if let Some(binding) = self.binding.take() {
            binding.release.run();
        }
    }

    pub fn is_attached(&self) -> bool {
        self.binding
            .as_ref()
            .is_some_and(|b| b.viewport.strong_count() > 0)
    }

    pub fn is_attached_to(&self, viewport: &ViewportRef) -> bool {
        self.binding
            .as_ref()
            .and_then(|b| b.viewport.upgrade())
            .is_some_and(|vp| same_viewport(&vp, viewport))
    }
}

impl Drop for ScrollTracker {
    fn drop(&mut self) {
        self.detach();
    }
}

fn record_scroll(state: &ScrollState, viewport: &dyn Viewport, ev: &ScrollEvent) {
    if state.is_restoring() {
        return;
    }
    if !state.is_active() {
        log::trace!("scroll while inactive ignored at {:?}", ev.offset);
        return;
    }
    // A collapsing or detached viewport reports bogus offsets (usually 0).
    if !viewport.is_visible() || viewport.viewport_size().is_empty() {
        log::trace!("scroll on hidden viewport ignored at {:?}", ev.offset);
        return;
    }
    let offset = viewport.scroll_offset();
    log::trace!("saved scroll offset {offset:?} ({:?})", ev.source);
    state.record(offset);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::restoration::engine::{RestorationEngine, RestoreOutcome};
    use crate::scroll::ScrollViewport;
    use stasis_core::{Size, Vec2};

    fn setup() -> (Rc<ScrollState>, Rc<ScrollViewport>, ViewportRef) {
        let state = Rc::new(ScrollState::new());
        let vp = ScrollViewport::shared(Size::new(100.0, 200.0));
        vp.set_content_size(Size::new(100.0, 2000.0));
        let handle: ViewportRef = vp.clone();
        (state, vp, handle)
    }

    #[test]
    fn records_every_offset_change_while_active() {
        let (state, vp, handle) = setup();
        let mut tracker = ScrollTracker::new(state.clone());
        tracker.attach(&handle);

        vp.user_scroll_to(Vec2::new(0.0, 50.0));
        assert_eq!(state.saved_top(), 0.0);

        state.set_active(true);
        vp.user_scroll_to(Vec2::new(0.0, 120.0));
        assert_eq!(state.saved_top(), 120.0);

        // Host assignment, e.g. a "back to top" button.
        vp.set_scroll_offset(Vec2::new(0.0, 400.0));
        assert_eq!(state.saved_top(), 400.0);

        // Content shrink clamps the offset.
        vp.set_content_size(Size::new(100.0, 500.0));
        assert_eq!(vp.scroll_offset().y, 300.0);
        assert_eq!(state.saved_top(), 300.0);
    }

    #[test]
    fn restoration_write_is_not_recorded() {
        let (state, vp, handle) = setup();
        vp.set_content_size(Size::new(100.0, 300.0));
        state.record(Vec2::new(0.0, 240.0));
        let mut tracker = ScrollTracker::new(state.clone());
        tracker.attach(&handle);
        state.set_active(true);

        // Partial layout: the write lands at 100 and must not replace 240.
        let outcome = RestorationEngine::default().attempt(&state, Some(&*vp));
        assert_eq!(
            outcome,
            RestoreOutcome::Clamped {
                actual: Vec2::new(0.0, 100.0)
            }
        );
        assert_eq!(vp.scroll_offset().y, 100.0);
        assert_eq!(state.saved_top(), 240.0);
        assert!(!state.is_restoring());
    }

    #[test]
    fn ignores_hidden_or_collapsed_viewport() {
        let (state, vp, handle) = setup();
        state.set_active(true);
        let mut tracker = ScrollTracker::new(state.clone());
        tracker.attach(&handle);

        vp.user_scroll_to(Vec2::new(0.0, 300.0));
        vp.set_visible(false);
        vp.user_scroll_to(Vec2::new(0.0, 10.0));
        assert_eq!(state.saved_top(), 300.0);

        vp.set_visible(true);
        vp.set_viewport_size(Size::new(100.0, 0.0));
        vp.user_scroll_to(Vec2::new(0.0, 20.0));
        assert_eq!(state.saved_top(), 300.0);
    }

    #[test]
    fn reattach_does_not_duplicate_listener() {
        let (state, vp, handle) = setup();
        let mut tracker = ScrollTracker::new(state);
        tracker.attach(&handle);
        tracker.attach(&handle);
        assert_eq!(vp.listener_count(), 1);
        assert!(tracker.is_attached_to(&handle));

        tracker.detach();
        tracker.detach();
        assert_eq!(vp.listener_count(), 0);
        assert!(!tracker.is_attached());
    }

    #[test]
    fn attaching_elsewhere_releases_old_viewport() {
        let (state, old_vp, old_handle) = setup();
        let (_, new_vp, new_handle) = setup();
        let mut tracker = ScrollTracker::new(state);

        tracker.attach(&old_handle);
        tracker.attach(&new_handle);
        assert_eq!(old_vp.listener_count(), 0);
        assert_eq!(new_vp.listener_count(), 1);
    }

    #[test]
    fn dropped_viewport_is_not_kept_alive() {
        let (state, vp, handle) = setup();
        let mut tracker = ScrollTracker::new(state);
        tracker.attach(&handle);

        drop(handle);
        drop(vp);
        assert!(!tracker.is_attached());
        tracker.detach();
    }
}
