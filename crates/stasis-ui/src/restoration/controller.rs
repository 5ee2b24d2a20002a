use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use stasis_core::{EventLoop, Scope, SubId, TimerId};

use super::config::RestorationConfig;
use super::engine::{RestorationEngine, RestoreOutcome};
use super::state::{ScrollSnapshot, ScrollState};
use super::tracker::ScrollTracker;
use super::watcher::{LayoutNotifier, LayoutWatcher, ResizeNotifier};
use crate::error::ConfigError;
use crate::scroll::{ViewportRef, ViewportSlot};

/// The four lifecycle signals a keep-alive host delivers to a view.
pub trait Lifecycle {
    fn on_mounted(&self);
    fn on_activated(&self);
    fn on_deactivated(&self);
    fn on_unmounted(&self);
}

impl<T: Lifecycle + ?Sized> Lifecycle for Rc<T> {
    fn on_mounted(&self) {
        (**self).on_mounted()
    }
    fn on_activated(&self) {
        (**self).on_activated()
    }
    fn on_deactivated(&self) {
        (**self).on_deactivated()
    }
    fn on_unmounted(&self) {
        (**self).on_unmounted()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Created,
    Mounted,
    /// Activation requested; tracking starts one tick later.
    Active,
    Inactive,
    Unmounted,
}

/// Keeps a viewport's scroll offset across deactivate/activate cycles.
///
/// Dropping it counts as unmounting.
pub struct ScrollRestoration {
    inner: Rc<Controller>,
}

struct Controller {
    config: RestorationConfig,
    engine: RestorationEngine,
    events: EventLoop,
    state: Rc<ScrollState>,
    // Dropped on unmount so the viewport is not retained.
    slot: RefCell<Option<ViewportSlot>>,
    slot_sub: Cell<Option<SubId>>,
    tracker: RefCell<ScrollTracker>,
    watcher: RefCell<LayoutWatcher>,
    phase: Cell<Phase>,
    // Bumped on every transition; deferred work from an older epoch is stale.
    epoch: Cell<u64>,
    fallback: Cell<Option<TimerId>>,
}

impl ScrollRestoration {
    pub fn new(slot: ViewportSlot, events: EventLoop) -> Self {
        Self::build(
            slot,
            events,
            RestorationConfig::default(),
            Box::new(ResizeNotifier::new()),
        )
    }

    pub fn with_config(
        slot: ViewportSlot,
        events: EventLoop,
        config: RestorationConfig,
    ) -> Result<Self, ConfigError> {
        Self::with_notifier(slot, events, config, Box::new(ResizeNotifier::new()))
    }

    /// Uses a custom source of layout change signals.
    pub fn with_notifier(
        slot: ViewportSlot,
        events: EventLoop,
        config: RestorationConfig,
        notifier: Box<dyn LayoutNotifier>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(slot, events, config, notifier))
    }

    fn build(
        slot: ViewportSlot,
        events: EventLoop,
        config: RestorationConfig,
        notifier: Box<dyn LayoutNotifier>,
    ) -> Self {
        let state = Rc::new(ScrollState::new());
        let engine = RestorationEngine::new(config.tolerance);
        Self {
            inner: Rc::new(Controller {
                config,
                engine,
                events,
                tracker: RefCell::new(ScrollTracker::new(state.clone())),
                watcher: RefCell::new(LayoutWatcher::with_notifier(
                    state.clone(),
                    engine,
                    notifier,
                )),
                state,
                slot: RefCell::new(Some(slot)),
                slot_sub: Cell::new(None),
                phase: Cell::new(Phase::Created),
                epoch: Cell::new(0),
                fallback: Cell::new(None),
            }),
        }
    }

    pub fn state(&self) -> ScrollSnapshot {
        self.inner.state.snapshot()
    }

    pub fn phase(&self) -> Phase {
        self.inner.phase.get()
    }

    pub fn config(&self) -> &RestorationConfig {
        &self.inner.config
    }

    pub fn is_tracking(&self) -> bool {
        self.inner.tracker.borrow().is_attached()
    }

    pub fn is_watching_layout(&self) -> bool {
        self.inner.watcher.borrow().is_watching()
    }

    pub fn has_pending_fallback(&self) -> bool {
        self.inner.fallback.get().is_some()
    }

    /// One restoration attempt right now.
    pub fn attempt_restore(&self) -> RestoreOutcome {
        self.inner.attempt_restore()
    }

    /// Unmounts when `scope` is disposed.
    pub fn bind_scope(&self, scope: &Scope) {
        let weak: Weak<Controller> = Rc::downgrade(&self.inner);
        scope.add_disposer(move || {
            if let Some(c) = weak.upgrade() {
                c.unmount();
            }
        });
    }
}

impl Lifecycle for ScrollRestoration {
    fn on_mounted(&self) {
        Controller::mount(&self.inner);
    }

    fn on_activated(&self) {
        Controller::activate(&self.inner);
    }

    fn on_deactivated(&self) {
        self.inner.deactivate();
    }

    fn on_unmounted(&self) {
        self.inner.unmount();
    }
}

impl Drop for ScrollRestoration {
    fn drop(&mut self) {
        self.inner.unmount();
    }
}

impl Controller {
    fn viewport(&self) -> Option<ViewportRef> {
        self.slot.borrow().as_ref().and_then(|s| s.get())
    }

    fn bump_epoch(&self) -> u64 {
        let epoch = self.epoch.get() + 1;
        self.epoch.set(epoch);
        epoch
    }

    fn mount(this: &Rc<Self>) {
        if this.phase.get() != Phase::Created {
            log::warn!("on_mounted in phase {:?}; ignored", this.phase.get());
            return;
        }
        this.phase.set(Phase::Mounted);
        log::debug!("scroll restoration mounted");

        let Some(slot) = this.slot.borrow().clone() else {
            return;
        };
        let weak = Rc::downgrade(this);
        let sub = slot.subscribe(move |vp: &Option<ViewportRef>| {
            if let Some(c) = weak.upgrade() {
                c.viewport_changed(vp.clone());
            }
        });
        this.slot_sub.set(Some(sub));

        if let Some(vp) = slot.get() {
            this.viewport_changed(Some(vp));
        }
    }

    /// The host swapped (or removed) the element behind the slot.
    fn viewport_changed(&self, vp: Option<ViewportRef>) {
        if matches!(self.phase.get(), Phase::Created | Phase::Unmounted) {
            return;
        }
        match vp {
            Some(vp) => {
                self.tracker.borrow_mut().attach(&vp);
                if self.state.is_active() {
                    self.watcher.borrow_mut().observe(&vp);
                    self.engine.attempt(&self.state, Some(&*vp));
                }
            }
            None => {
                log::debug!("viewport went away; releasing listeners");
                self.tracker.borrow_mut().detach();
                self.watcher.borrow_mut().stop();
            }
        }
    }

    fn activate(this: &Rc<Self>) {
        match this.phase.get() {
            Phase::Unmounted => {
                log::warn!("on_activated after unmount; ignored");
                return;
            }
            Phase::Created => {
                log::warn!("on_activated before on_mounted; mounting first");
                Self::mount(this);
            }
            _ => {}
        }

        // A fresh cycle: restored resets before anything can attempt.
        this.state.set_restored(false);
        this.cancel_fallback();
        this.phase.set(Phase::Active);
        let epoch = this.bump_epoch();
        log::debug!("scroll restoration activating (epoch {epoch})");

        // Scroll events from the host's own render settling must land while
        // `active` is still false.
        let weak = Rc::downgrade(this);
        this.events.next_tick(move || {
            if let Some(c) = weak.upgrade() {
                Controller::finish_activation(&c, epoch);
            }
        });
    }

    fn finish_activation(this: &Rc<Self>, epoch: u64) {
        if this.epoch.get() != epoch || this.phase.get() != Phase::Active {
            log::trace!("stale activation (epoch {epoch}) dropped");
            return;
        }
        this.state.set_active(true);

        // Re-attach in case the element was replaced while suspended.
        if let Some(vp) = this.viewport() {
            this.tracker.borrow_mut().attach(&vp);
            this.watcher.borrow_mut().observe(&vp);
        }
        this.attempt_restore();

        let weak = Rc::downgrade(this);
        let timer = this.events.set_timeout(this.config.fallback_delay, move || {
            if let Some(c) = weak.upgrade() {
                c.run_fallback(epoch);
            }
        });
        this.fallback.set(Some(timer));
    }

    fn run_fallback(&self, epoch: u64) {
        self.fallback.set(None);
        if self.epoch.get() != epoch || !self.state.is_active() || self.state.is_restored() {
            return;
        }
        log::trace!("fallback restore attempt");
        self.attempt_restore();
    }

    fn attempt_restore(&self) -> RestoreOutcome {
        if self.phase.get() == Phase::Unmounted {
            return RestoreOutcome::Unavailable;
        }
        let vp = self.viewport();
        self.engine.attempt(&self.state, vp.as_deref())
    }

    fn deactivate(&self) {
        match self.phase.get() {
            Phase::Unmounted => return,
            Phase::Active => {}
            other => log::warn!("on_deactivated in phase {other:?}"),
        }
        self.state.set_active(false);
        self.phase.set(Phase::Inactive);
        self.bump_epoch();
        self.cancel_fallback();
        // The scroll listener stays attached; activation refreshes it.
        self.watcher.borrow_mut().stop();
        log::debug!("scroll restoration deactivated");
    }

    fn unmount(&self) {
        if self.phase.replace(Phase::Unmounted) == Phase::Unmounted {
            return;
        }
        self.state.set_active(false);
        self.bump_epoch();
        self.cancel_fallback();
        self.watcher.borrow_mut().stop();
        self.tracker.borrow_mut().detach();
        if let Some(slot) = self.slot.borrow_mut().take()
            && let Some(sub) = self.slot_sub.take()
        {
            slot.unsubscribe(sub);
        }
        log::debug!("scroll restoration unmounted");
    }

    fn cancel_fallback(&self) {
        if let Some(timer) = self.fallback.take() {
            self.events.clear_timeout(timer);
        }
    }
}
