//! # Scroll viewports
//!
//! A *viewport* is anything with a visible box, a (possibly larger) content
//! box and a 2D scroll offset. Stasis never owns one: widgets and the
//! restoration machinery talk to it through the [`Viewport`] trait and a
//! shared [`ViewportRef`], and they subscribe to two event sources on it:
//!
//! - scroll notifications ([`ScrollEvent`]), tagged with where the offset
//!   change came from;
//! - resize notifications, fired whenever the visible or content box changes.
//!
//! [`ScrollViewport`] is the in-memory implementation used by layout passes
//! and tests. Offsets always stay inside `[0, content - viewport]` per axis;
//! shrinking the content clamps the offset and reports a
//! [`ScrollSource::Clamp`] scroll.
//!
//! ```rust
//! use stasis_core::*;
//! use stasis_ui::scroll::*;
//!
//! let vp = ScrollViewport::new(Size::new(100.0, 200.0));
//! vp.set_content_size(Size::new(100.0, 1000.0));
//!
//! let leftover = vp.scroll_by(Vec2::new(0.0, 900.0));
//! assert_eq!(vp.scroll_offset(), Vec2::new(0.0, 800.0));
//! assert_eq!(leftover, Vec2::new(0.0, 100.0));
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use stasis_core::*;

/// Why a viewport's offset moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollSource {
    /// Wheel, touch, keyboard, scrollbar drag.
    User,
    /// Someone assigned the offset directly.
    Programmatic,
    /// The offset no longer fit after a size change.
    Clamp,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollEvent {
    pub offset: Vec2,
    pub source: ScrollSource,
}

/// Emitted after either box changed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResizeEvent {
    pub viewport: Size,
    pub content: Size,
}

pub trait Viewport {
    fn scroll_offset(&self) -> Vec2;
    /// Implementations may clamp the requested offset.
    fn set_scroll_offset(&self, offset: Vec2);
    fn viewport_size(&self) -> Size;
    fn content_size(&self) -> Size;
    /// Attached and laid out (the DOM's `offsetParent !== null`).
    fn is_visible(&self) -> bool;

    fn subscribe_scroll(&self, f: Box<dyn Fn(&ScrollEvent)>) -> ListenerId;
    fn subscribe_resize(&self, f: Box<dyn Fn(&ResizeEvent)>) -> ListenerId;
    /// Removes a scroll or resize listener; false if it was already gone.
    fn unsubscribe(&self, id: ListenerId) -> bool;

    /// How far the content can scroll on each axis.
    fn scroll_extent(&self) -> Vec2 {
        let c = self.content_size();
        let v = self.viewport_size();
        Vec2 {
            x: (c.width - v.width).max(0.0),
            y: (c.height - v.height).max(0.0),
        }
    }
}

pub type ViewportRef = Rc<dyn Viewport>;

/// Caller-owned slot that holds the viewport once it has been rendered.
pub type ViewportSlot = Signal<Option<ViewportRef>>;

pub fn viewport_slot() -> ViewportSlot {
    signal(None)
}

/// Identity comparison (ignores vtable differences).
pub fn same_viewport(a: &ViewportRef, b: &ViewportRef) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// Guard that drops listener `id` when run. Holds the viewport weakly, so a
/// viewport that is already gone makes it a no-op.
pub fn release_listener(viewport: &ViewportRef, id: ListenerId) -> Dispose {
    let viewport = Rc::downgrade(viewport);
    Dispose::new(move || {
        if let Some(viewport) = viewport.upgrade() {
            viewport.unsubscribe(id);
        }
    })
}

/// In-memory 2D scroll container.
pub struct ScrollViewport {
    offset: Cell<Vec2>,
    viewport: Cell<Size>,
    content: Cell<Size>,
    visible: Cell<bool>,
    // Scroll and resize callbacks share one id space so `unsubscribe` can
    // take either.
    listeners: RefCell<Listeners<ViewportEvent>>,
}

#[derive(Clone, Copy, Debug)]
enum ViewportEvent {
    Scroll(ScrollEvent),
    Resize(ResizeEvent),
}

impl Default for ScrollViewport {
    fn default() -> Self {
        Self::new(Size::ZERO)
    }
}

impl ScrollViewport {
    pub fn new(viewport: Size) -> Self {
        Self {
            offset: Cell::new(Vec2::ZERO),
            viewport: Cell::new(viewport.non_negative()),
            content: Cell::new(Size::ZERO),
            visible: Cell::new(true),
            listeners: RefCell::new(Listeners::new()),
        }
    }

    pub fn shared(viewport: Size) -> Rc<Self> {
        Rc::new(Self::new(viewport))
    }

    pub fn set_viewport_size(&self, size: Size) {
        let size = size.non_negative();
        if self.viewport.replace(size) != size {
            self.after_resize();
        }
    }

    pub fn set_content_size(&self, size: Size) {
        let size = size.non_negative();
        if self.content.replace(size) != size {
            self.after_resize();
        }
    }

    /// Hidden viewports keep their sizes; only `is_visible` changes.
    pub fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    /// Consume a user scroll delta, clamp to bounds, return leftover for a
    /// parent scroll container.
    pub fn scroll_by(&self, delta: Vec2) -> Vec2 {
        let before = self.offset.get();
        let after = self.clamped(before + delta);
        if after != before {
            self.offset.set(after);
            self.emit(ViewportEvent::Scroll(ScrollEvent {
                offset: after,
                source: ScrollSource::User,
            }));
        }
        delta - (after - before)
    }

    /// Jumps to `offset` as if the user dragged there.
    pub fn user_scroll_to(&self, offset: Vec2) {
        self.scroll_by(offset - self.offset.get());
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn clamped(&self, offset: Vec2) -> Vec2 {
        let max = self.scroll_extent();
        Vec2 {
            x: offset.x.clamp(0.0, max.x),
            y: offset.y.clamp(0.0, max.y),
        }
    }

    fn after_resize(&self) {
        let before = self.offset.get();
        let after = self.clamped(before);
        if after != before {
            self.offset.set(after);
            self.emit(ViewportEvent::Scroll(ScrollEvent {
                offset: after,
                source: ScrollSource::Clamp,
            }));
        }
        self.emit(ViewportEvent::Resize(ResizeEvent {
            viewport: self.viewport.get(),
            content: self.content.get(),
        }));
    }

    fn emit(&self, event: ViewportEvent) {
        emit_shared(&self.listeners, &event);
    }
}

impl Viewport for ScrollViewport {
    fn scroll_offset(&self) -> Vec2 {
        self.offset.get()
    }

    fn set_scroll_offset(&self, offset: Vec2) {
        let after = self.clamped(offset);
        if self.offset.replace(after) != after {
            self.emit(ViewportEvent::Scroll(ScrollEvent {
                offset: after,
                source: ScrollSource::Programmatic,
            }));
        }
    }

    fn viewport_size(&self) -> Size {
        self.viewport.get()
    }

    fn content_size(&self) -> Size {
        self.content.get()
    }

    fn is_visible(&self) -> bool {
        self.visible.get()
    }

    fn subscribe_scroll(&self, f: Box<dyn Fn(&ScrollEvent)>) -> ListenerId {
        self.listeners.borrow_mut().add(move |e| {
            if let ViewportEvent::Scroll(ev) = e {
                f(ev)
            }
        })
    }

    fn subscribe_resize(&self, f: Box<dyn Fn(&ResizeEvent)>) -> ListenerId {
        self.listeners.borrow_mut().add(move |e| {
            if let ViewportEvent::Resize(ev) = e {
                f(ev)
            }
        })
    }

    fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.borrow_mut().remove(id)
    }
}
