use std::rc::{Rc, Weak};

use stasis_core::Dispose;

use super::engine::RestorationEngine;
use super::state::ScrollState;
use crate::scroll::{ResizeEvent, Viewport, ViewportRef, release_listener, same_viewport};

/// Source of "this viewport's size changed" signals.
///
/// The default [`ResizeNotifier`] listens to the viewport's own resize
/// events; hosts with a different layout engine plug in their own.
pub trait LayoutNotifier {
    /// Starts calling `on_change` after each size change of `viewport`.
    /// Callers stop any previous observation first.
    fn observe(&mut self, viewport: &ViewportRef, on_change: Rc<dyn Fn()>);
    /// Releases the underlying resource. Idempotent.
    fn stop(&mut self);
    /// The viewport currently observed, if it is still alive.
    fn observed(&self) -> Option<ViewportRef>;
}

#[derive(Default)]
pub struct ResizeNotifier {
    binding: Option<(Weak<dyn Viewport>, Dispose)>,
}

impl ResizeNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LayoutNotifier for ResizeNotifier {
    fn observe(&mut self, viewport: &ViewportRef, on_change: Rc<dyn Fn()>) {
        self.stop();
        let id = viewport.subscribe_resize(Box::new(move |_: &ResizeEvent| on_change()));
        self.binding = Some((Rc::downgrade(viewport), release_listener(viewport, id)));
    }

    fn stop(&mut self) {
        if let Some((_, release)) = self.binding.take() {
            release.run();
        }
    }

    fn observed(&self) -> Option<ViewportRef> {
        self.binding.as_ref().and_then(|(vp, _)| vp.upgrade())
    }
}

impl Drop for ResizeNotifier {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Retries restoration whenever layout moves while the view is active and
/// not yet restored. Holds no restoration logic of its own.
pub struct LayoutWatcher {
    state: Rc<ScrollState>,
    engine: RestorationEngine,
    notifier: Box<dyn LayoutNotifier>,
}

impl LayoutWatcher {
    pub fn new(state: Rc<ScrollState>, engine: RestorationEngine) -> Self {
        Self::with_notifier(state, engine, Box::new(ResizeNotifier::new()))
    }

    pub fn with_notifier(
        state: Rc<ScrollState>,
        engine: RestorationEngine,
        notifier: Box<dyn LayoutNotifier>,
    ) -> Self {
        Self {
            state,
            engine,
            notifier,
        }
    }

    /// No-op when already observing `viewport`; switches over otherwise.
    pub fn observe(&mut self, viewport: &ViewportRef) {
        if self.is_observing(viewport) {
            return;
        }
        self.notifier.stop();

        let state: Weak<ScrollState> = Rc::downgrade(&self.state);
        let target = Rc::downgrade(viewport);
        let engine = self.engine;
        self.notifier.observe(
            viewport,
            Rc::new(move || {
                let (Some(state), Some(viewport)) = (state.upgrade(), target.upgrade()) else {
                    return;
                };
                if state.is_active() && !state.is_restored() {
                    log::trace!("layout changed; retrying restore");
                    engine.attempt(&state, Some(&*viewport));
                }
            }),
        );
    }

    pub fn stop(&mut self) {
        self.notifier.stop();
    }

    pub fn is_observing(&self, viewport: &ViewportRef) -> bool {
        self.notifier
            .observed()
            .is_some_and(|vp| same_viewport(&vp, viewport))
    }

    pub fn is_watching(&self) -> bool {
        self.notifier.observed().is_some()
    }
}
